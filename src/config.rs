use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres URL. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Adds the `Secure` attribute to the session cookie.
    pub cookie_secure: bool,
    pub request_timeout: Duration,
    pub static_dir: String,
    pub protected_prefixes: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "insurmap".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "insurmap-users".into()),
        };
        anyhow::ensure!(!jwt.secret.is_empty(), "JWT_SECRET must not be empty");

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "production".into());
        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);
        let protected_prefixes = std::env::var("PROTECTED_PREFIXES")
            .map(|v| parse_prefixes(&v))
            .unwrap_or_else(|_| default_protected_prefixes());

        Ok(Self {
            database_url,
            jwt,
            cookie_secure: !is_local_env(&app_env),
            request_timeout: Duration::from_secs(request_timeout),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into()),
            protected_prefixes,
        })
    }

    /// In-memory store, insecure cookie.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
            cookie_secure: false,
            request_timeout: Duration::from_secs(5),
            static_dir: "public".into(),
            protected_prefixes: default_protected_prefixes(),
        }
    }
}

fn default_protected_prefixes() -> Vec<String> {
    vec!["/dashboard".into(), "/app".into()]
}

fn is_local_env(app_env: &str) -> bool {
    matches!(
        app_env.trim().to_ascii_lowercase().as_str(),
        "development" | "dev" | "local"
    )
}

/// Splits a comma separated prefix list, normalizing each entry to a leading
/// `/` without a trailing one.
fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let p = p.trim_end_matches('/');
            if p.starts_with('/') {
                p.to_string()
            } else {
                format!("/{p}")
            }
        })
        .filter(|p| p != "/")
        .collect()
}
