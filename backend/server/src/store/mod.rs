//! # Persistence
//!
//! Two backends behind the same traits:
//! - [`memory`]: process-local maps, used for local runs and tests
//! - [`crate::database`]: Redis hashes, with name text search served by Meilisearch
//!
//! Query logic (filters, sorting, pagination) lives in [`crate::catalog`] and runs over [`NameStore::all`], so
//! both backends answer queries identically.
//!
//! ## Popularity writes
//!
//! Popularity counters belong to the event methods ([`NameStore::record_view`],
//! [`NameStore::record_search_appearance`], [`NameStore::set_trend`]). `replace` writes every other field and
//! keeps the stored counters, so an admin edit never rolls back a concurrent view.
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BlogPost, NameRecord};

pub mod memory;

pub use memory::{MemoryBlogs, MemoryNames};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Record not found")]
    Missing,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Search error: {0}")]
    Search(#[from] meilisearch_sdk::errors::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait NameStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the name or slug is taken.
    async fn insert(&self, record: NameRecord) -> Result<NameRecord, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<NameRecord>, StoreError>;

    /// Case-insensitive exact match.
    async fn find_by_name(&self, name: &str) -> Result<Option<NameRecord>, StoreError>;

    /// Overwrites a stored record, keeping its popularity counters.
    async fn replace(&self, record: NameRecord) -> Result<NameRecord, StoreError>;

    /// [`NameStore::replace`] for a batch of distinct ids. Nothing is written unless every record exists and
    /// every new name and slug is free, both among stored records and within the batch. A name given up by one
    /// record in the batch cannot be taken by another in the same batch.
    async fn replace_all(&self, batch: Vec<NameRecord>) -> Result<Vec<NameRecord>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError>;

    async fn all(&self) -> Result<Vec<NameRecord>, StoreError>;

    /// Adds a view and recomputes the score. Returns the updated record.
    async fn record_view(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError>;

    /// Adds a search appearance and recomputes the score. Returns the updated record.
    async fn record_search_appearance(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError>;

    /// Overwrites the trend. The score is not recomputed. Returns whether the record exists.
    async fn set_trend(&self, id: Uuid, trend: f64) -> Result<bool, StoreError>;

    /// Ids of records matching the words of `query` in name or meaning, best match first.
    async fn text_search(&self, query: &str) -> Result<Vec<Uuid>, StoreError>;
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the slug is taken.
    async fn insert(&self, post: BlogPost) -> Result<BlogPost, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError>;

    /// Overwrites a stored post, keeping its view count.
    async fn replace(&self, post: BlogPost) -> Result<BlogPost, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError>;

    async fn all(&self) -> Result<Vec<BlogPost>, StoreError>;

    async fn record_view(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError>;
}

/// Lowercased alphanumeric words.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}
