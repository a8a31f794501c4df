use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides `session_cookie` when set and non-empty.
pub const SESSION_ENV: &str = "CLOUDSEND_SESSION";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Service root (default: http://127.0.0.1:5000)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `session` cookie from a logged-in browser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// Seconds between session liveness checks (default: 300)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// TCP connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".cloudsend").join("config.toml"))
}

impl Config {
    /// Load config from ~/.cloudsend/config.toml, returning defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to ~/.cloudsend/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Apply a `config set` key. Accepts the short aliases too.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base_url" | "url" => {
                url::Url::parse(value).with_context(|| format!("invalid base_url: {value}"))?;
                self.base_url = value.to_string();
            }
            "session_cookie" | "session" => {
                self.session_cookie = Some(value.to_string()).filter(|v| !v.is_empty());
            }
            "poll_interval_secs" | "poll" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid poll interval: {value}"))?;
                if secs == 0 {
                    bail!("poll interval must be at least 1 second");
                }
                self.poll_interval_secs = secs;
            }
            "connect_timeout_secs" | "timeout" => {
                self.connect_timeout_secs = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid timeout: {value}"))?;
            }
            _ => bail!("unknown config key: {key}"),
        }
        Ok(())
    }

    /// Session cookie from the environment, falling back to the file.
    pub fn session_cookie(&self) -> Option<String> {
        std::env::var(SESSION_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.session_cookie.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_cookie: None,
            poll_interval_secs: default_poll_interval_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScopedEnv;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let config = Config {
            base_url: "https://drop.example.com".to_string(),
            session_cookie: Some("abc.def".to_string()),
            poll_interval_secs: 60,
            connect_timeout_secs: 5,
        };

        let content = toml::to_string_pretty(&config).unwrap();
        fs::write(&path, &content).unwrap();

        let loaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.session_cookie, None);
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn config_partial_parse() {
        let content = "poll_interval_secs = 60\n";
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let config: Config = toml::from_str("poll_interval_secs = 0\n").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        config.set("url", "https://drop.example.com").unwrap();
        config.set("poll", "120").unwrap();
        config.set("session", "tok").unwrap();
        assert_eq!(config.base_url, "https://drop.example.com");
        assert_eq!(config.poll_interval_secs, 120);
        assert_eq!(config.session_cookie.as_deref(), Some("tok"));

        assert!(config.set("poll", "0").is_err());
        assert!(config.set("poll", "soon").is_err());
        assert!(config.set("base_url", "nope").is_err());
        assert!(config.set("colour", "blue").is_err());

        config.set("session", "").unwrap();
        assert_eq!(config.session_cookie, None);
    }

    #[test]
    fn load_and_save_use_home() {
        let tmp = TempDir::new().unwrap();
        let mut env = ScopedEnv::new();
        env.set("HOME", tmp.path().to_str().unwrap());

        assert_eq!(Config::load().unwrap(), Config::default());

        let mut config = Config::default();
        config.poll_interval_secs = 45;
        let path = config.save().unwrap();
        assert_eq!(path, tmp.path().join(".cloudsend").join("config.toml"));
        assert_eq!(Config::load().unwrap().poll_interval_secs, 45);
    }

    #[test]
    fn session_env_overrides_file() {
        let config = Config {
            session_cookie: Some("from-file".to_string()),
            ..Config::default()
        };
        let mut env = ScopedEnv::new();

        env.set(SESSION_ENV, "from-env");
        assert_eq!(config.session_cookie().as_deref(), Some("from-env"));

        env.set(SESSION_ENV, " ");
        assert_eq!(config.session_cookie().as_deref(), Some("from-file"));

        env.unset(SESSION_ENV);
        assert_eq!(config.session_cookie().as_deref(), Some("from-file"));
    }
}
