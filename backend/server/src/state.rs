use std::{sync::Arc, time::Instant};

use tracing::info;

use super::{
    config::{Config, Storage},
    database::{RedisBlogs, RedisNames, init_redis},
    search::init_meilisearch,
    store::{BlogStore, MemoryBlogs, MemoryNames, NameStore, StoreError},
};

pub struct AppState {
    pub config: Config,
    pub names: Arc<dyn NameStore>,
    pub blogs: Arc<dyn BlogStore>,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let state = match config.storage {
            Storage::Memory => {
                info!("Using in-memory storage");
                Self::in_memory(config)
            }
            Storage::Redis => {
                info!("Connecting to Redis at {}", config.redis_url);
                let redis_connection = init_redis(&config.redis_url).await?;

                let meili_key = config.meili_key.as_deref().unwrap_or_default();
                let meili_client = init_meilisearch(&config.meili_url, meili_key).await?;

                let names = RedisNames::new(redis_connection.clone(), meili_client).await?;
                let blogs = RedisBlogs::new(redis_connection);

                Arc::new(Self {
                    config,
                    names: Arc::new(names),
                    blogs: Arc::new(blogs),
                    started_at: Instant::now(),
                })
            }
        };

        Ok(state)
    }

    pub fn in_memory(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            names: Arc::new(MemoryNames::default()),
            blogs: Arc::new(MemoryBlogs::default()),
            started_at: Instant::now(),
        })
    }
}
