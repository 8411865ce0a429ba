//! Environment configuration

use anyhow::{bail, Context};
use std::time::Duration;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    /// `dev` | `staging` | `production`
    pub environment: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub request_timeout: Duration,
    /// Sustained requests per second across the whole server.
    pub rate_limit_rps: f64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let num = |key: &str, default: u64| lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default);

        let environment = get("APP_ENV", "dev");
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.len() >= 32 || environment == "dev" => secret,
            Some(_) => bail!("JWT_SECRET must be at least 32 characters outside dev"),
            None if environment == "dev" => DEV_JWT_SECRET.to_string(),
            None => bail!("JWT_SECRET must be set in {environment}"),
        };

        Ok(Self {
            port: u16::try_from(num("APP_PORT", 8080)).unwrap_or(8080),
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: u32::try_from(num("DB_MAX_CONNECTIONS", 10)).unwrap_or(10),
            jwt_secret,
            jwt_ttl: i64::try_from(num("JWT_TTL_HOURS", 24))
                .ok()
                .filter(|hours| *hours > 0)
                .and_then(chrono::Duration::try_hours)
                .unwrap_or_else(|| chrono::Duration::hours(24)),
            cors_origins: split_and_trim(&get("CORS_ORIGINS", "*")),
            log_level: get("LOG_LEVEL", "info"),
            request_timeout: Duration::from_secs(num("REQUEST_TIMEOUT_SECS", 30)),
            rate_limit_rps: lookup("RATE_LIMIT_RPS")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|rps| rps.is_finite() && *rps >= 0.0)
                .unwrap_or(10.0),
            rate_limit_burst: u32::try_from(num("RATE_LIMIT_BURST", 20)).ok().filter(|b| *b > 0).unwrap_or(20),
            environment,
        })
    }

    pub fn is_production(&self) -> bool { self.environment == "production" }

    pub fn address(&self) -> String { format!("0.0.0.0:{}", self.port) }
}

fn split_and_trim(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from).collect()
}
