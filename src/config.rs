use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

/// Which backend holds identities and profile documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub gemini: GeminiConfig,
    /// Mounts the developer-only route tree.
    pub dev_routes: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(v) => StorageBackend::parse(&v)?,
            Err(_) => StorageBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when STORAGE_BACKEND=postgres");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "macrotrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "macrotrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY")?,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".into()),
            endpoint: std::env::var("GEMINI_ENDPOINT")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            timeout_secs: std::env::var("GEMINI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };

        let dev_routes = std::env::var("APP_DEV_ROUTES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            backend,
            database_url,
            jwt,
            gemini,
            dev_routes,
        })
    }
}
