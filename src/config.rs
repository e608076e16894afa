// ABOUTME: Environment-driven configuration for the server, document store, blob store and auth gate
// ABOUTME: Loaded once at startup and passed down explicitly; nothing here is global

use anyhow::{Result, anyhow};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub image_dir: String,
    pub jwt_secret: String,
    pub auth_cookie_name: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup so tests don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set to a non-empty value"))?;

        Ok(Self {
            host: lookup("PHOTOSHARE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PHOTOSHARE_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:photoshare.db?mode=rwc".to_string()),
            image_dir: lookup("IMAGE_DIR").unwrap_or_else(|| "images".to_string()),
            jwt_secret,
            auth_cookie_name: lookup("AUTH_COOKIE_NAME").unwrap_or_else(|| "jwt".to_string()),
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(raw) => raw.parse()?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_secret() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.auth_cookie_name, "jwt");
        assert_eq!(config.image_dir, "images");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_missing_or_blank_secret_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "   ")])).is_err());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("PHOTOSHARE_PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }
}
