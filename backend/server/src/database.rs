//! # Redis
//!
//! RAM database for names and blog posts.
//!
//! ## Requirements
//!
//! - Fast lookups by id, slug and name
//! - Small dataset, a few thousand names and posts
//! - Popularity counters raised by every page view and search hit
//!
//! ## Implementation
//!
//! - One Redis hash per concern, keyed by record id
//! - Documents: JSON strings in `names:docs` / `blogs:docs`
//! - Unique indexes: `names:keys` (lowercased name), `names:slugs`, `blogs:slugs`, each mapping to the id and
//! claimed with `HSETNX`
//! - Counters: `names:views`, `names:searches`, `names:trends`, `names:scores`, `blogs:views`
//! - Counters are overlaid on the document whenever it is read, so the stored JSON never carries stale
//! popularity
//!
//! ## Popularity
//!
//! An event raises its counter with `HINCRBY` inside a `MULTI` block that also reads the other score inputs.
//! The increment itself is atomic, so no view is ever lost. The recomputed score is written afterwards with
//! `HSET`: two events landing together can leave the score computed from the older of the two counter sets
//! until the next event.
use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use lexicon::{Popularity, popularity::score};
use meilisearch_sdk::client::Client as MeiliClient;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
    pipe,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    models::{BlogPost, NameRecord},
    search::{remove_name, search_name_ids, upsert_names},
    store::{BlogStore, NameStore, StoreError},
};

const NAME_DOCS: &str = "names:docs";
const NAME_KEYS: &str = "names:keys";
const NAME_SLUGS: &str = "names:slugs";
const NAME_VIEWS: &str = "names:views";
const NAME_SEARCHES: &str = "names:searches";
const NAME_TRENDS: &str = "names:trends";
const NAME_SCORES: &str = "names:scores";

const BLOG_DOCS: &str = "blogs:docs";
const BLOG_SLUGS: &str = "blogs:slugs";
const BLOG_VIEWS: &str = "blogs:views";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Claims `value` in a unique index for `id`. Re-claiming one's own value succeeds.
async fn claim(
    connection: &mut ConnectionManager,
    index: &str,
    value: &str,
    id: Uuid,
    field: &'static str,
) -> Result<(), StoreError> {
    let id = id.to_string();

    if connection.hset_nx::<_, _, _, bool>(index, value, &id).await? {
        return Ok(());
    }

    let owner: Option<String> = connection.hget(index, value).await?;
    match owner {
        Some(owner) if owner == id => Ok(()),
        _ => Err(StoreError::Duplicate(field)),
    }
}

/// Drops unique index entries taken by a batch that could not be written.
async fn release(
    connection: &mut ConnectionManager,
    claimed: &[(&'static str, String)],
) -> Result<(), StoreError> {
    if claimed.is_empty() {
        return Ok(());
    }

    let mut pipeline = pipe();
    for (index, value) in claimed {
        pipeline.hdel(*index, value).ignore();
    }
    pipeline.query_async::<()>(connection).await?;

    Ok(())
}

pub struct RedisNames {
    connection: ConnectionManager,
    search: Arc<MeiliClient>,
}

impl RedisNames {
    /// Pushes every stored name into the search index.
    pub async fn new(connection: ConnectionManager, search: Arc<MeiliClient>) -> Result<Self, StoreError> {
        let names = Self { connection, search };

        let records = names.all().await?;
        upsert_names(&names.search, &records).await?;
        info!("Indexed {} names", records.len());

        Ok(names)
    }

    fn overlay(
        json: &str,
        views: Option<u64>,
        searches: Option<u64>,
        trend: Option<f64>,
        score: Option<f64>,
    ) -> Result<NameRecord, StoreError> {
        let mut record: NameRecord = serde_json::from_str(json)?;

        record.popularity = Popularity {
            score: score.unwrap_or_default(),
            trend: trend.unwrap_or_default(),
            views: views.unwrap_or_default(),
            search_appearances: searches.unwrap_or_default(),
        };

        Ok(record)
    }

    async fn lookup(&self, index: &str, value: &str) -> Result<Option<NameRecord>, StoreError> {
        let mut connection = self.connection.clone();

        let id: Option<String> = connection.hget(index, value).await?;
        match id.and_then(|id| id.parse::<Uuid>().ok()) {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    /// Raises one counter and rewrites the score from the values read in the same transaction.
    async fn bump(&self, id: Uuid, counter: &str) -> Result<Option<NameRecord>, StoreError> {
        let mut connection = self.connection.clone();
        let field = id.to_string();

        if !connection.hexists::<_, _, bool>(NAME_DOCS, &field).await? {
            return Ok(None);
        }

        let (views, searches, trend): (Option<u64>, Option<u64>, Option<f64>) = pipe()
            .atomic()
            .hincr(counter, &field, 1)
            .ignore()
            .hget(NAME_VIEWS, &field)
            .hget(NAME_SEARCHES, &field)
            .hget(NAME_TRENDS, &field)
            .query_async(&mut connection)
            .await?;

        let score = score(
            views.unwrap_or_default(),
            searches.unwrap_or_default(),
            trend.unwrap_or_default(),
        );
        connection.hset::<_, _, _, ()>(NAME_SCORES, &field, score).await?;

        self.get(id).await
    }

    async fn index(&self, record: &NameRecord) {
        if let Err(e) = upsert_names(&self.search, std::slice::from_ref(record)).await {
            warn!("Failed to index {}: {e}", record.name);
        }
    }
}

#[async_trait]
impl NameStore for RedisNames {
    async fn insert(&self, record: NameRecord) -> Result<NameRecord, StoreError> {
        let mut connection = self.connection.clone();
        let field = record.id.to_string();
        let key = name_key(&record.name);

        claim(&mut connection, NAME_KEYS, &key, record.id, "name").await?;
        if let Err(e) = claim(&mut connection, NAME_SLUGS, &record.slug, record.id, "slug").await {
            connection.hdel::<_, _, ()>(NAME_KEYS, &key).await?;
            return Err(e);
        }

        let json = serde_json::to_string(&record)?;
        let popularity = record.popularity;

        pipe()
            .atomic()
            .hset(NAME_DOCS, &field, json)
            .hset(NAME_VIEWS, &field, popularity.views)
            .hset(NAME_SEARCHES, &field, popularity.search_appearances)
            .hset(NAME_TRENDS, &field, popularity.trend)
            .hset(NAME_SCORES, &field, popularity.score)
            .query_async::<()>(&mut connection)
            .await?;

        self.index(&record).await;
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        let mut connection = self.connection.clone();
        let field = id.to_string();

        let (json, views, searches, trend, score): (
            Option<String>,
            Option<u64>,
            Option<u64>,
            Option<f64>,
            Option<f64>,
        ) = pipe()
            .hget(NAME_DOCS, &field)
            .hget(NAME_VIEWS, &field)
            .hget(NAME_SEARCHES, &field)
            .hget(NAME_TRENDS, &field)
            .hget(NAME_SCORES, &field)
            .query_async(&mut connection)
            .await?;

        json.map(|json| Self::overlay(&json, views, searches, trend, score))
            .transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<NameRecord>, StoreError> {
        self.lookup(NAME_SLUGS, slug).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<NameRecord>, StoreError> {
        self.lookup(NAME_KEYS, &name_key(name)).await
    }

    async fn replace(&self, record: NameRecord) -> Result<NameRecord, StoreError> {
        self.replace_all(vec![record]).await?.pop().ok_or(StoreError::Missing)
    }

    /// Claims every new name and slug first, releasing the claims already taken if one fails, then writes the
    /// whole batch in one `MULTI` block.
    async fn replace_all(&self, batch: Vec<NameRecord>) -> Result<Vec<NameRecord>, StoreError> {
        if batch.is_empty() {
            return Ok(batch);
        }

        let mut connection = self.connection.clone();
        let mut stored = Vec::with_capacity(batch.len());
        for record in &batch {
            stored.push(self.get(record.id).await?.ok_or(StoreError::Missing)?);
        }

        let mut claimed: Vec<(&'static str, String)> = Vec::new();
        for (old, new) in stored.iter().zip(&batch) {
            let mut claims = Vec::new();
            if name_key(&old.name) != name_key(&new.name) {
                claims.push((NAME_KEYS, name_key(&new.name), "name"));
            }
            if old.slug != new.slug {
                claims.push((NAME_SLUGS, new.slug.clone(), "slug"));
            }

            for (index, value, field) in claims {
                if let Err(e) = claim(&mut connection, index, &value, new.id, field).await {
                    release(&mut connection, &claimed).await?;
                    return Err(e);
                }
                claimed.push((index, value));
            }
        }

        let mut pipeline = pipe();
        pipeline.atomic();
        for (old, new) in stored.iter().zip(&batch) {
            if name_key(&old.name) != name_key(&new.name) {
                pipeline.hdel(NAME_KEYS, name_key(&old.name)).ignore();
            }
            if old.slug != new.slug {
                pipeline.hdel(NAME_SLUGS, &old.slug).ignore();
            }
            pipeline
                .hset(NAME_DOCS, new.id.to_string(), serde_json::to_string(new)?)
                .ignore();
        }
        pipeline.query_async::<()>(&mut connection).await?;

        let mut replaced = Vec::with_capacity(batch.len());
        for record in &batch {
            replaced.push(self.get(record.id).await?.ok_or(StoreError::Missing)?);
        }
        if let Err(e) = upsert_names(&self.search, &replaced).await {
            warn!("Failed to index {} names: {e}", replaced.len());
        }

        Ok(replaced)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        let Some(record) = self.get(id).await? else {
            return Ok(None);
        };

        let mut connection = self.connection.clone();
        let field = id.to_string();

        pipe()
            .atomic()
            .hdel(NAME_DOCS, &field)
            .hdel(NAME_KEYS, name_key(&record.name))
            .hdel(NAME_SLUGS, &record.slug)
            .hdel(NAME_VIEWS, &field)
            .hdel(NAME_SEARCHES, &field)
            .hdel(NAME_TRENDS, &field)
            .hdel(NAME_SCORES, &field)
            .query_async::<()>(&mut connection)
            .await?;

        if let Err(e) = remove_name(&self.search, id).await {
            warn!("Failed to unindex {}: {e}", record.name);
        }

        Ok(Some(record))
    }

    async fn all(&self) -> Result<Vec<NameRecord>, StoreError> {
        let mut connection = self.connection.clone();

        let (docs, views, searches, trends, scores): (
            HashMap<String, String>,
            HashMap<String, u64>,
            HashMap<String, u64>,
            HashMap<String, f64>,
            HashMap<String, f64>,
        ) = pipe()
            .hgetall(NAME_DOCS)
            .hgetall(NAME_VIEWS)
            .hgetall(NAME_SEARCHES)
            .hgetall(NAME_TRENDS)
            .hgetall(NAME_SCORES)
            .query_async(&mut connection)
            .await?;

        docs.iter()
            .map(|(id, json)| {
                Self::overlay(
                    json,
                    views.get(id).copied(),
                    searches.get(id).copied(),
                    trends.get(id).copied(),
                    scores.get(id).copied(),
                )
            })
            .collect()
    }

    async fn record_view(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        self.bump(id, NAME_VIEWS).await
    }

    async fn record_search_appearance(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        self.bump(id, NAME_SEARCHES).await
    }

    async fn set_trend(&self, id: Uuid, trend: f64) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let field = id.to_string();

        if !connection.hexists::<_, _, bool>(NAME_DOCS, &field).await? {
            return Ok(false);
        }

        connection.hset::<_, _, _, ()>(NAME_TRENDS, &field, trend).await?;
        Ok(true)
    }

    async fn text_search(&self, query: &str) -> Result<Vec<Uuid>, StoreError> {
        search_name_ids(&self.search, query).await
    }
}

pub struct RedisBlogs {
    connection: ConnectionManager,
}

impl RedisBlogs {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    fn overlay(json: &str, views: Option<u64>) -> Result<BlogPost, StoreError> {
        let mut post: BlogPost = serde_json::from_str(json)?;
        post.views = views.unwrap_or_default();

        Ok(post)
    }
}

#[async_trait]
impl BlogStore for RedisBlogs {
    async fn insert(&self, post: BlogPost) -> Result<BlogPost, StoreError> {
        let mut connection = self.connection.clone();
        let field = post.id.to_string();

        claim(&mut connection, BLOG_SLUGS, &post.slug, post.id, "slug").await?;

        pipe()
            .atomic()
            .hset(BLOG_DOCS, &field, serde_json::to_string(&post)?)
            .hset(BLOG_VIEWS, &field, post.views)
            .query_async::<()>(&mut connection)
            .await?;

        Ok(post)
    }

    async fn get(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
        let mut connection = self.connection.clone();
        let field = id.to_string();

        let (json, views): (Option<String>, Option<u64>) = pipe()
            .hget(BLOG_DOCS, &field)
            .hget(BLOG_VIEWS, &field)
            .query_async(&mut connection)
            .await?;

        json.map(|json| Self::overlay(&json, views)).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        let mut connection = self.connection.clone();

        let id: Option<String> = connection.hget(BLOG_SLUGS, slug).await?;
        match id.and_then(|id| id.parse::<Uuid>().ok()) {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    async fn replace(&self, post: BlogPost) -> Result<BlogPost, StoreError> {
        let mut connection = self.connection.clone();
        let stored = self.get(post.id).await?.ok_or(StoreError::Missing)?;

        if stored.slug != post.slug {
            claim(&mut connection, BLOG_SLUGS, &post.slug, post.id, "slug").await?;
        }

        let mut pipeline = pipe();
        pipeline.atomic();
        if stored.slug != post.slug {
            pipeline.hdel(BLOG_SLUGS, &stored.slug).ignore();
        }
        pipeline
            .hset(BLOG_DOCS, post.id.to_string(), serde_json::to_string(&post)?)
            .ignore();
        pipeline.query_async::<()>(&mut connection).await?;

        self.get(post.id).await?.ok_or(StoreError::Missing)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
        let Some(post) = self.get(id).await? else {
            return Ok(None);
        };

        let mut connection = self.connection.clone();
        let field = id.to_string();

        pipe()
            .atomic()
            .hdel(BLOG_DOCS, &field)
            .hdel(BLOG_SLUGS, &post.slug)
            .hdel(BLOG_VIEWS, &field)
            .query_async::<()>(&mut connection)
            .await?;

        Ok(Some(post))
    }

    async fn all(&self) -> Result<Vec<BlogPost>, StoreError> {
        let mut connection = self.connection.clone();

        let (docs, views): (HashMap<String, String>, HashMap<String, u64>) = pipe()
            .hgetall(BLOG_DOCS)
            .hgetall(BLOG_VIEWS)
            .query_async(&mut connection)
            .await?;

        docs.iter()
            .map(|(id, json)| Self::overlay(json, views.get(id).copied()))
            .collect()
    }

    async fn record_view(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
        let mut connection = self.connection.clone();
        let field = id.to_string();

        if !connection.hexists::<_, _, bool>(BLOG_DOCS, &field).await? {
            return Ok(None);
        }

        connection.hincr::<_, _, _, ()>(BLOG_VIEWS, &field, 1).await?;
        self.get(id).await
    }
}
