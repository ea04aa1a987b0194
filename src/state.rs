use std::sync::Arc;

use anyhow::Context;

use crate::{
    auth::{jwt::JwtKeys, password::Passwords, repo::UserStore},
    config::AppConfig,
    db::{self, PgStore},
    tasks::repo::TaskStore,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub keys: JwtKeys,
    pub passwords: Passwords,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let passwords = Passwords::new(&config.password).context("password hasher config")?;
        let keys = JwtKeys::new(&config.jwt);

        let store = Arc::new(PgStore::new(db::connect(&config).await?));

        Ok(Self {
            users: store.clone(),
            tasks: store,
            keys,
            passwords,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        Self::with_store(Arc::new(crate::memory::MemoryStore::default()))
    }

    pub fn with_store(store: Arc<crate::memory::MemoryStore>) -> Self {
        let config = AppConfig::for_tests();
        Self {
            users: store.clone(),
            tasks: store,
            keys: JwtKeys::new(&config.jwt),
            passwords: Passwords::new(&config.password).expect("test argon2 params are valid"),
            config: Arc::new(config),
        }
    }
}
