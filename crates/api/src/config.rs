use std::fmt::Display;
use std::str::FromStr;

use mdrrmo_core::tracking::DEFAULT_ACTIVE_WINDOW_SECS;

use crate::auth::jwt::JwtConfig;
use crate::services::cloudinary::CloudinaryConfig;
use crate::services::ollama::OllamaConfig;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials for the first super admin, created at startup when the
/// `admins` table is empty.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except `DATABASE_URL` and `JWT_SECRET` have defaults suitable
/// for local development. Optional integrations are `None` when their
/// variables are absent.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Pool size (default: `5`).
    pub db_max_connections: u32,
    /// JWT signing secret and token lifetime.
    pub jwt: JwtConfig,
    /// Whether auth cookies carry the `Secure` attribute (default: `false`).
    pub cookie_secure: bool,
    /// A responder session counts as live for this long after its last
    /// update (default: `300`).
    pub session_active_window_secs: i64,
    /// Period of the stale-session sweep (default: `60`).
    pub session_cleanup_interval_secs: u64,
    /// Shared secret accepted in `x-cron-secret` by the cleanup endpoint.
    pub cron_secret: Option<String>,
    pub ollama: Option<OllamaConfig>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `DATABASE_URL`                   | **required**            |
    /// | `DB_MAX_CONNECTIONS`             | `5`                     |
    /// | `JWT_SECRET`                     | **required**            |
    /// | `JWT_EXPIRY_HOURS`               | `12`                    |
    /// | `COOKIE_SECURE`                  | `false`                 |
    /// | `SESSION_ACTIVE_WINDOW_SECS`     | `300`                   |
    /// | `SESSION_CLEANUP_INTERVAL_SECS`  | `60`                    |
    /// | `CRON_SECRET`                    | unset                   |
    /// | `OLLAMA_HOST` / `_MODEL` / `_TIMEOUT_SECS` | unset / `llama3` / `30` |
    /// | `CLOUDINARY_CLOUD_NAME` / `_API_KEY` / `_API_SECRET` | unset |
    /// | `BOOTSTRAP_ADMIN_EMAIL` / `_PASSWORD` | unset              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(get("PORT"), "PORT", 3000)?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs =
            parse_or(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 30)?;

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections: u32 =
            parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }

        let jwt = JwtConfig {
            secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            expiry_hours: parse_or(get("JWT_EXPIRY_HOURS"), "JWT_EXPIRY_HOURS", 12)?,
        };

        let cookie_secure = parse_or(get("COOKIE_SECURE"), "COOKIE_SECURE", false)?;
        let session_active_window_secs = parse_or(
            get("SESSION_ACTIVE_WINDOW_SECS"),
            "SESSION_ACTIVE_WINDOW_SECS",
            DEFAULT_ACTIVE_WINDOW_SECS,
        )?;
        let session_cleanup_interval_secs = parse_or(
            get("SESSION_CLEANUP_INTERVAL_SECS"),
            "SESSION_CLEANUP_INTERVAL_SECS",
            60,
        )?;
        if session_active_window_secs <= 0 || session_cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_ACTIVE_WINDOW_SECS",
                reason: "session window and cleanup interval must be positive".into(),
            });
        }

        let ollama = match get("OLLAMA_HOST") {
            Some(host) => Some(OllamaConfig {
                host: host.trim_end_matches('/').to_string(),
                model: get("OLLAMA_MODEL").unwrap_or_else(|| "llama3".into()),
                timeout_secs: parse_or(get("OLLAMA_TIMEOUT_SECS"), "OLLAMA_TIMEOUT_SECS", 30)?,
            }),
            None => None,
        };

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "CLOUDINARY_CLOUD_NAME",
                    reason: "set all of CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and \
                             CLOUDINARY_API_SECRET, or none of them"
                        .into(),
                })
            }
        };

        let bootstrap_admin = match (
            get("BOOTSTRAP_ADMIN_EMAIL"),
            get("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
            jwt,
            cookie_secure,
            session_active_window_secs,
            session_cleanup_interval_secs,
            cron_secret: get("CRON_SECRET"),
            ollama,
            cloudinary,
            bootstrap_admin,
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| map.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/mdrrmo"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.session_active_window_secs, 300);
        assert_eq!(config.jwt.expiry_hours, 12);
        assert!(!config.cookie_secure);
        assert!(config.ollama.is_none());
        assert!(config.cloudinary.is_none());
        assert!(config.cron_secret.is_none());
    }

    #[test]
    fn missing_required_variables() {
        assert_matches!(
            load(&[("JWT_SECRET", "s")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
        assert_matches!(
            load(&[("DATABASE_URL", "postgres://x")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn invalid_number_is_reported() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));
        assert_matches!(load(&vars), Err(ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn optional_integrations() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("OLLAMA_HOST", "http://localhost:11434/"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "shh"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]);
        let config = load(&vars).unwrap();
        let ollama = config.ollama.unwrap();
        assert_eq!(ollama.host, "http://localhost:11434");
        assert_eq!(ollama.model, "llama3");
        assert_eq!(config.cloudinary.unwrap().cloud_name, "demo");
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
    }

    #[test]
    fn partial_cloudinary_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CLOUDINARY_CLOUD_NAME", "demo"));
        assert!(load(&vars).is_err());
    }
}
