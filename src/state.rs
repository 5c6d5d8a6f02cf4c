use std::sync::Arc;

use tracing::warn;

use crate::auth::jwt::SessionKeys;
use crate::config::AppConfig;
use crate::properties::risk::{PendingAssessor, RiskAssessor};
use crate::store::{MemoryStore, PgStore, PropertyStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub properties: Arc<dyn PropertyStore>,
    pub assessor: Arc<dyn RiskAssessor>,
    pub keys: SessionKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres and runs migrations, or falls back to the
    /// in-memory store when no database is configured.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let state = match config.database_url.as_deref() {
            Some(url) => {
                let pg = Arc::new(PgStore::connect(url).await?);
                pg.migrate().await?;
                Self::from_parts(pg.clone(), pg, Arc::new(PendingAssessor), config)
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
                Self::in_memory(config)
            }
        };
        Ok(state)
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        properties: Arc<dyn PropertyStore>,
        assessor: Arc<dyn RiskAssessor>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            properties,
            assessor,
            keys: SessionKeys::new(&config.jwt),
            config,
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(store.clone(), store, Arc::new(PendingAssessor), config)
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(Arc::new(AppConfig::for_tests()))
    }
}
