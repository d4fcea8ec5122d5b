use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub default_role: String,
    /// Roles allowed to delete accounts other than their own.
    pub privileged_roles: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userbase".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userbase-clients".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };
        let privileged_roles = std::env::var("PRIVILEGED_ROLES")
            .map(|v| parse_roles(&v))
            .unwrap_or_else(|_| vec!["mentor".to_string()]);

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(8080),
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            default_role: std::env::var("DEFAULT_ROLE").unwrap_or_else(|_| "prodigy".into()),
            privileged_roles,
        })
    }

    pub fn is_privileged(&self, role: &str) -> bool {
        self.privileged_roles.iter().any(|r| r == role)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roles_trims_and_skips_blanks() {
        assert_eq!(parse_roles(" mentor, admin ,,"), vec!["mentor", "admin"]);
        assert!(parse_roles("").is_empty());
    }
}
