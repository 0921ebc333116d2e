use std::sync::Arc;

use crate::auth::{
    repo::{PgUserRepository, UserRepository},
    services::AuthService,
};
use crate::cards::{
    repo::{CardRepository, PgCardRepository},
    services::CardService,
};
use crate::config::AppConfig;
use crate::db;
use crate::views::Views;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub cards: CardService,
    pub views: Arc<Views>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        if config.session.uses_insecure_secret() {
            tracing::warn!("SESSION_SECRET is not set; using an insecure default, set it in production");
        }

        let pool = db::connect(&config.database).await?;
        db::migrate(&pool).await?;

        Self::from_parts(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgCardRepository::new(pool)),
        )
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        cards: Arc<dyn CardRepository>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            auth: AuthService::new(users),
            cards: CardService::new(cards),
            views: Arc::new(Views::new()?),
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::testing::{MemoryCardRepository, MemoryUserRepository};

        let config = AppConfig::from_lookup(|key| match key {
            "SESSION_SECRET" => Some("test-secret".into()),
            _ => None,
        })
        .expect("test config");

        Self::from_parts(
            config,
            Arc::new(MemoryUserRepository::default()),
            Arc::new(MemoryCardRepository::default()),
        )
        .expect("test state")
    }
}
