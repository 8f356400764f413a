use crate::auth::{CredentialHasher, JwtKeys};
use crate::config::AppConfig;
use crate::users::{PgUserStore, UserService, UserStore};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: UserService,
}

impl AppState {
    /// Connects to Postgres and wires the services. Returns the pool for migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let store = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let state = Self::from_parts(Arc::new(config), store)?;
        Ok((state, db))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt)?;
        let hasher =
            CredentialHasher::new(config.hash_work_factor).context("configure password hasher")?;
        let users = UserService::new(store, hasher, keys.clone());
        Ok(Self {
            config,
            keys,
            users,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::memory::MemoryUserStore;

        let store = Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>;
        Self::from_parts(Arc::new(AppConfig::for_tests()), store).expect("test state")
    }
}
