use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Runtime settings read from the environment (and `.env` through dotenv).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Cookie signing key. Must be at least 64 bytes when present.
    pub secret_key: Option<Vec<u8>>,
    pub media_dir: PathBuf,
    pub secure_cookies: bool,
    pub create_tables: bool,
    pub sqlx_logging: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret_key = match std::env::var("SECRET_KEY") {
            Ok(key) if key.len() < 64 => {
                bail!("SECRET_KEY must be at least 64 bytes, got {}", key.len())
            }
            Ok(key) => Some(key.into_bytes()),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_owned()),
            secret_key,
            media_dir: std::env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "./media".to_owned())
                .into(),
            secure_cookies: env_flag("SECURE_COOKIES")?,
            create_tables: env_flag("DB_CREATE_TABLES")?,
            sqlx_logging: env_flag("SQLX_LOGGING")?,
        })
    }

    /// Settings for tests and local tooling: in-memory database, temporary media directory.
    pub fn for_media_dir(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            bind_address: "127.0.0.1:0".to_owned(),
            secret_key: None,
            media_dir: media_dir.into(),
            secure_cookies: false,
            create_tables: true,
            sqlx_logging: false,
        }
    }
}

fn env_flag(name: &str) -> Result<bool> {
    match std::env::var(name) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => bail!("{} cannot be parsed as a boolean: {:?}", name, value),
        },
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::env_flag;

    #[test]
    fn test_env_flag_defaults_to_false() {
        assert!(!env_flag("YATUBE_TEST_FLAG_UNSET").unwrap());
    }

    #[test]
    fn test_env_flag_parses_values() {
        std::env::set_var("YATUBE_TEST_FLAG_ON", "True");
        std::env::set_var("YATUBE_TEST_FLAG_OFF", "0");
        std::env::set_var("YATUBE_TEST_FLAG_BAD", "maybe");
        assert!(env_flag("YATUBE_TEST_FLAG_ON").unwrap());
        assert!(!env_flag("YATUBE_TEST_FLAG_OFF").unwrap());
        assert!(env_flag("YATUBE_TEST_FLAG_BAD").is_err());
    }
}
