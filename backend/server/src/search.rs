//! # Meilisearch
//!
//! Full-text index over names and meanings, used by `type=text` searches when names live in Redis.
//!
//! ## Schema
//! - Index `names`
//! - Fields: id (**uuid string**), name (**string**), meaning (**string**)
//! - Name hits outrank meaning hits through the searchable attribute order
//!
//! ## Sync
//! - On startup every stored name is upserted
//! - Afterwards each create, update and delete is mirrored right away
//!
//! Popularity is not indexed. Results only carry ids and the records are read back from Redis, so counters are
//! always live.
//!
//! ## Commands
//!
//! Grab relevant keys.
//! ```sh
//! curl -H "Authorization: Bearer $(cat /run/secrets/MEILI_MASTER_KEY)" http://localhost:7700/keys
//! ```
use std::sync::Arc;

use meilisearch_sdk::{
    client::Client,
    settings::{MinWordSizeForTypos, Settings, TypoToleranceSettings},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{models::NameRecord, store::StoreError};

pub const NAME_INDEX: &str = "names";
pub const NAME_ID: &str = "id";
pub const NAME_NAME: &str = "name";
pub const NAME_MEANING: &str = "meaning";

/// Upper bound on ids returned per query.
pub const SEARCH_LIMIT: usize = 1000;

#[derive(Serialize, Deserialize)]
pub struct MeiliName {
    pub id: Uuid,
    pub name: String,
    pub meaning: String,
}

impl From<&NameRecord> for MeiliName {
    fn from(record: &NameRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            meaning: record.meaning.clone(),
        }
    }
}

pub async fn init_meilisearch(meili_url: &str, meili_admin_key: &str) -> Result<Arc<Client>, StoreError> {
    let meili_client = Arc::new(Client::new(meili_url, Some(meili_admin_key))?);

    meili_client
        .index(NAME_INDEX)
        .set_settings(&init_settings())
        .await?
        .wait_for_completion(&meili_client, None, None)
        .await?;

    Ok(meili_client)
}

pub async fn upsert_names(meili_client: &Client, records: &[NameRecord]) -> Result<(), StoreError> {
    if records.is_empty() {
        return Ok(());
    }

    let meili_names: Vec<MeiliName> = records.iter().map(MeiliName::from).collect();

    let result = meili_client
        .index(NAME_INDEX)
        .add_or_update(&meili_names, Some(NAME_ID))
        .await?
        .wait_for_completion(meili_client, None, None)
        .await?;

    info!("Meili upserted {} names: {:?}", meili_names.len(), result);
    Ok(())
}

pub async fn remove_name(meili_client: &Client, id: Uuid) -> Result<(), StoreError> {
    meili_client
        .index(NAME_INDEX)
        .delete_document(id.to_string())
        .await?
        .wait_for_completion(meili_client, None, None)
        .await?;

    Ok(())
}

/// Ids in relevance order.
pub async fn search_name_ids(meili_client: &Client, query: &str) -> Result<Vec<Uuid>, StoreError> {
    let results = meili_client
        .index(NAME_INDEX)
        .search()
        .with_query(query)
        .with_limit(SEARCH_LIMIT)
        .execute::<MeiliName>()
        .await?;

    Ok(results.hits.into_iter().map(|hit| hit.result.id).collect())
}

fn init_settings() -> Settings {
    Settings::new()
        .with_ranking_rules([
            "words",
            "typo",
            "proximity",
            "attribute",
            "exactness",
            "sort",
        ])
        .with_searchable_attributes([NAME_NAME, NAME_MEANING])
        .with_typo_tolerance(TypoToleranceSettings {
            enabled: Some(true),
            disable_on_attributes: None,
            disable_on_words: None,
            min_word_size_for_typos: Some(MinWordSizeForTypos {
                one_typo: Some(5),
                two_typos: Some(9),
            }),
        })
}
