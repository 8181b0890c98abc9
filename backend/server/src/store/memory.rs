use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BlogStore, NameStore, StoreError, words};
use crate::models::{BlogPost, NameRecord};

/// Event methods update counters and score under one write lock, so concurrent events never race.
#[derive(Default)]
pub struct MemoryNames {
    records: RwLock<HashMap<Uuid, NameRecord>>,
}

fn check_unique<'a>(
    records: impl IntoIterator<Item = &'a NameRecord>,
    candidate: &NameRecord,
) -> Result<(), StoreError> {
    let others = records.into_iter().filter(|record| record.id != candidate.id);

    for record in others {
        if record.name.to_lowercase() == candidate.name.to_lowercase() {
            return Err(StoreError::Duplicate("name"));
        }
        if record.slug == candidate.slug {
            return Err(StoreError::Duplicate("slug"));
        }
    }

    Ok(())
}

impl MemoryNames {
    async fn update_with<F>(&self, id: Uuid, update: F) -> Option<NameRecord>
    where
        F: FnOnce(&mut NameRecord) + Send,
    {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id)?;
        update(record);

        Some(record.clone())
    }
}

#[async_trait]
impl NameStore for MemoryNames {
    async fn insert(&self, record: NameRecord) -> Result<NameRecord, StoreError> {
        let mut records = self.records.write().await;
        check_unique(records.values(), &record)?;

        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<NameRecord>, StoreError> {
        let records = self.records.read().await;

        Ok(records.values().find(|record| record.slug == slug).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<NameRecord>, StoreError> {
        let name = name.to_lowercase();
        let records = self.records.read().await;

        Ok(records
            .values()
            .find(|record| record.name.to_lowercase() == name)
            .cloned())
    }

    async fn replace(&self, record: NameRecord) -> Result<NameRecord, StoreError> {
        self.replace_all(vec![record]).await?.pop().ok_or(StoreError::Missing)
    }

    async fn replace_all(&self, mut batch: Vec<NameRecord>) -> Result<Vec<NameRecord>, StoreError> {
        let mut records = self.records.write().await;

        for record in &mut batch {
            let stored = records.get(&record.id).ok_or(StoreError::Missing)?;
            record.popularity = stored.popularity;
        }
        for candidate in &batch {
            check_unique(records.values().chain(&batch), candidate)?;
        }

        for record in &batch {
            records.insert(record.id, record.clone());
        }

        Ok(batch)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        Ok(self.records.write().await.remove(&id))
    }

    async fn all(&self) -> Result<Vec<NameRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn record_view(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        Ok(self
            .update_with(id, |record| record.popularity = record.popularity.with_view())
            .await)
    }

    async fn record_search_appearance(&self, id: Uuid) -> Result<Option<NameRecord>, StoreError> {
        Ok(self
            .update_with(id, |record| {
                record.popularity = record.popularity.with_search_appearance()
            })
            .await)
    }

    async fn set_trend(&self, id: Uuid, trend: f64) -> Result<bool, StoreError> {
        Ok(self
            .update_with(id, |record| record.popularity = record.popularity.with_trend(trend))
            .await
            .is_some())
    }

    async fn text_search(&self, query: &str) -> Result<Vec<Uuid>, StoreError> {
        let terms: Vec<String> = words(query).collect();
        let records = self.records.read().await;

        // name hits weigh twice as much as meaning hits
        let mut scored: Vec<(Uuid, usize)> = records
            .values()
            .map(|record| {
                let hits = |text: &str| words(text).filter(|word| terms.contains(word)).count();
                (record.id, hits(&record.name) * 2 + hits(&record.meaning))
            })
            .filter(|(_, weight)| *weight > 0)
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(scored.into_iter().map(|(id, _)| id).collect())
    }
}

#[derive(Default)]
pub struct MemoryBlogs {
    posts: RwLock<HashMap<Uuid, BlogPost>>,
}

fn check_unique_slug(posts: &HashMap<Uuid, BlogPost>, candidate: &BlogPost) -> Result<(), StoreError> {
    if posts
        .values()
        .any(|post| post.id != candidate.id && post.slug == candidate.slug)
    {
        return Err(StoreError::Duplicate("slug"));
    }

    Ok(())
}

#[async_trait]
impl BlogStore for MemoryBlogs {
    async fn insert(&self, post: BlogPost) -> Result<BlogPost, StoreError> {
        let mut posts = self.posts.write().await;
        check_unique_slug(&posts, &post)?;

        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        let posts = self.posts.read().await;

        Ok(posts.values().find(|post| post.slug == slug).cloned())
    }

    async fn replace(&self, mut post: BlogPost) -> Result<BlogPost, StoreError> {
        let mut posts = self.posts.write().await;
        let stored = posts.get(&post.id).ok_or(StoreError::Missing)?;
        check_unique_slug(&posts, &post)?;

        post.views = stored.views;
        posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
        Ok(self.posts.write().await.remove(&id))
    }

    async fn all(&self) -> Result<Vec<BlogPost>, StoreError> {
        Ok(self.posts.read().await.values().cloned().collect())
    }

    async fn record_view(&self, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
        let mut posts = self.posts.write().await;

        Ok(posts.get_mut(&id).map(|post| {
            post.views += 1;
            post.clone()
        }))
    }
}
