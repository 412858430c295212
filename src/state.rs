use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::analysis::{FoodAnalyzer, GeminiClient, TextGenerator};
use crate::config::{AppConfig, StorageBackend};
use crate::identity::{
    IdentityProvider, MemoryIdentityProvider, PgIdentityProvider,
};
use crate::profiles::ProfileStore;
use crate::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: ProfileStore,
    pub analyzer: FoodAnalyzer,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let model = Arc::new(GeminiClient::new(&config.gemini)?) as Arc<dyn TextGenerator>;

        let (identity, docs): (Arc<dyn IdentityProvider>, Arc<dyn DocumentStore>) =
            match config.backend {
                StorageBackend::Postgres => {
                    let url = config
                        .database_url
                        .as_deref()
                        .context("DATABASE_URL is required for the postgres backend")?;
                    let db = PgPoolOptions::new()
                        .max_connections(10)
                        .connect(url)
                        .await
                        .context("connect to database")?;
                    sqlx::migrate!("./migrations")
                        .run(&db)
                        .await
                        .context("run migrations")?;
                    info!("using postgres storage");
                    (
                        Arc::new(PgIdentityProvider::new(db.clone())),
                        Arc::new(PgDocumentStore::new(db)),
                    )
                }
                StorageBackend::Memory => {
                    info!("using in-memory storage; data is lost on restart");
                    (
                        Arc::new(MemoryIdentityProvider::new()),
                        Arc::new(MemoryDocumentStore::new()),
                    )
                }
            };

        Ok(Self::from_parts(config, identity, docs, model))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        identity: Arc<dyn IdentityProvider>,
        docs: Arc<dyn DocumentStore>,
        model: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            identity,
            profiles: ProfileStore::new(docs),
            analyzer: FoodAnalyzer::new(model),
        }
    }

    /// In-memory state with a fixed test configuration and the given model.
    #[cfg(test)]
    pub fn fake(model: Arc<dyn TextGenerator>) -> Self {
        Self::fake_with(model, Arc::new(MemoryDocumentStore::new()))
    }

    /// Like [`AppState::fake`] but profiles live in `docs`.
    #[cfg(test)]
    pub fn fake_with(model: Arc<dyn TextGenerator>, docs: Arc<dyn DocumentStore>) -> Self {
        use crate::config::{GeminiConfig, JwtConfig};

        let config = Arc::new(AppConfig {
            backend: StorageBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            gemini: GeminiConfig {
                api_key: "fake".into(),
                model: "fake-model".into(),
                endpoint: "http://127.0.0.1:9".into(),
                timeout_secs: 1,
            },
            dev_routes: true,
        });

        Self::from_parts(
            config,
            Arc::new(MemoryIdentityProvider::new()),
            docs,
            model,
        )
    }
}
