use std::str::FromStr;

use anyhow::Context;
use sqlx::postgres::PgConnectOptions;

pub const INSECURE_SESSION_SECRET: &str = "default-secret-change-this";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection options; `DATABASE_URL` wins over the individual `DB_*` parts.
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn uses_insecure_secret(&self) -> bool {
        self.secret == INSECURE_SESSION_SECRET
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            host: var("DB_HOST", "localhost"),
            port: var("DB_PORT", "5432")
                .parse()
                .context("DB_PORT must be a port number")?,
            user: var("DB_USER", "postgres"),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            name: var("DB_NAME", "mtg_collection"),
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        };

        let session = SessionConfig {
            secret: var("SESSION_SECRET", INSECURE_SESSION_SECRET),
            issuer: var("SESSION_ISSUER", "mtg-collection"),
            audience: var("SESSION_AUDIENCE", "mtg-collection-web"),
            ttl_minutes: lookup("SESSION_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60 * 24 * 7),
            cookie_secure: lookup("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        Ok(Self {
            database,
            session,
            host: var("APP_HOST", "0.0.0.0"),
            port: var("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a port number")?,
        })
    }
}
