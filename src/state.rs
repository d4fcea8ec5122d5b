use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::password;
use crate::config::AppConfig;
use crate::users::{memory::MemoryUserStore, pg::PgUserStore, store::UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let users: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => {
                let store = PgUserStore::connect(url, config.max_connections).await?;
                store.migrate().await?;
                info!("using postgres user store");
                Arc::new(store)
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new())
            }
        };

        Ok(Self::from_parts(users, Arc::new(config)))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        password::warm_up();
        Self { users, config }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(Arc::new(MemoryUserStore::new()), Arc::new(config))
    }

    /// Releases the store's resources. Call once the server has stopped.
    pub async fn shutdown(&self) {
        self.users.close().await;
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: None,
        max_connections: 1,
        jwt: crate::config::JwtConfig {
            secret: "test".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 5,
        },
        default_role: "prodigy".into(),
        privileged_roles: vec!["mentor".into()],
    }
}
