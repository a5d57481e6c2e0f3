use anyhow::Context;
use serde::Deserialize;

/// Argon2id cost parameters used when hashing account passwords.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for argon2id)
        Self {
            memory_kib: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub default_role: String,
    pub hash: HashConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            host: "0.0.0.0".into(),
            port: 8080,
            default_role: "Employee".into(),
            hash: HashConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let hash = HashConfig {
            memory_kib: parse_var("ARGON2_MEMORY_KIB")?.unwrap_or(defaults.hash.memory_kib),
            time_cost: parse_var("ARGON2_TIME_COST")?.unwrap_or(defaults.hash.time_cost),
            parallelism: parse_var("ARGON2_PARALLELISM")?.unwrap_or(defaults.hash.parallelism),
        };
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            max_connections: parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            host: std::env::var("APP_HOST").unwrap_or(defaults.host),
            port: parse_var("APP_PORT")?.unwrap_or(defaults.port),
            default_role: std::env::var("DEFAULT_ROLE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.default_role),
            hash,
        })
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(None),
    }
}
