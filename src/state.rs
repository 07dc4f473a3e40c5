use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    auth::{
        jwt::JwtKeys,
        memory::MemoryUserStore,
        repo::{PgUserStore, UserStore},
    },
    config::AppConfig,
    db,
    notifier::{LogNotifier, Notifier},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub store: Arc<dyn UserStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store = match &config.database_url {
            Some(url) => {
                let pool = db::connect(url).await?;
                db::migrate(&pool).await?;
                info!("using postgres user store");
                Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(config, store, Arc::new(LogNotifier)))
    }

    pub fn from_parts(config: AppConfig, store: Arc<dyn UserStore>, notifier: Arc<dyn Notifier>) -> Self {
        let jwt = JwtKeys::new(&config.jwt);
        Self {
            config: Arc::new(config),
            jwt,
            store,
            notifier,
        }
    }

    /// Memory store, log notifier, test secret.
    pub fn fake() -> Self {
        Self::from_parts(
            AppConfig::for_tests(),
            Arc::new(MemoryUserStore::new()),
            Arc::new(LogNotifier),
        )
    }
}
