use crate::config::{AppConfig, StoreConfig};
use crate::users::memory::MemoryUserStore;
use crate::users::repo::{PgUserStore, UserStore};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let users = match &config.store {
            StoreConfig::Postgres {
                database_url,
                max_connections,
            } => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(database_url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }

                Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
            }
            StoreConfig::Memory => {
                tracing::warn!("using in-memory user store; data is lost on restart");
                Arc::new(MemoryUserStore::default()) as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(Arc::new(config), users))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    /// State backed by the given store and a memory-store config, for tests.
    #[cfg(test)]
    pub fn with_store(users: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            store: StoreConfig::Memory,
        });
        Self::from_parts(config, users)
    }
}
