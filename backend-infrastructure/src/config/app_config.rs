use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;

use backend_domain::{DbConfig, RuntimeConfig};

use crate::config::{validate_http_url, validate_storage_backend};

pub const CONFIG_PATH_ENV: &str = "LOOTFEED_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub webhook_secret: Option<String>,
    pub api_token: Option<String>,
    pub storage_backend: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub retention_days: u32,
    pub broadcast_url: Option<String>,
    pub broadcast_channel: String,
    pub broadcast_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            webhook_secret: None,
            api_token: None,
            storage_backend: "clickhouse".to_string(),
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "lootfeed".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            retention_days: 7,
            broadcast_url: None,
            broadcast_channel: "loot-feed".to_string(),
            broadcast_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Path named by `LOOTFEED_CONFIG`, else `./config.toml`.
    pub fn config_path() -> String {
        env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.toml".to_string())
    }

    /// Missing file means defaults; callers report that once logging is up.
    pub async fn load() -> Result<Self> {
        let path = Self::config_path();
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        for field in [
            &mut self.webhook_secret,
            &mut self.api_token,
            &mut self.clickhouse_user,
            &mut self.clickhouse_password,
            &mut self.broadcast_url,
            &mut self.broadcast_token,
            &mut self.log_dir,
        ] {
            if field.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self.storage_backend = self.storage_backend.trim().to_lowercase();
        self.broadcast_channel = self.broadcast_channel.trim().to_string();
        if self.broadcast_channel.is_empty() {
            self.broadcast_channel = AppConfig::default().broadcast_channel;
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        validate_storage_backend(&self.storage_backend)?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if let Some(url) = &self.broadcast_url {
            validate_http_url("broadcast_url", url)?;
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            webhook_secret: self.webhook_secret.clone(),
            api_token: self.api_token.clone(),
            retention_days: self.retention_days,
            broadcast_url: self.broadcast_url.clone(),
            broadcast_channel: self.broadcast_channel.clone(),
            broadcast_token: self.broadcast_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> Result<DbConfig> {
        Ok(DbConfig {
            storage_backend: validate_storage_backend(&self.storage_backend)?,
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
            retention_days: self.retention_days,
        })
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("LOOTFEED_BIND_ADDR") {
            self.bind_addr = value;
        }
        // Legacy name used by existing bot deployments.
        if let Some(value) = lookup("WEBHOOK_SECRET") {
            self.webhook_secret = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_WEBHOOK_SECRET") {
            self.webhook_secret = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_STORAGE_BACKEND") {
            self.storage_backend = value;
        }
        if let Some(value) = lookup("LOOTFEED_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Some(value) = lookup("LOOTFEED_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Some(value) = lookup("LOOTFEED_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_RETENTION_DAYS") {
            self.retention_days = value.parse().unwrap_or(self.retention_days);
        }
        if let Some(value) = lookup("LOOTFEED_BROADCAST_URL") {
            self.broadcast_url = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_BROADCAST_CHANNEL") {
            self.broadcast_channel = value;
        }
        if let Some(value) = lookup("LOOTFEED_BROADCAST_TOKEN") {
            self.broadcast_token = Some(value);
        }
        if let Some(value) = lookup("LOOTFEED_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("LOOTFEED_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("LOOTFEED_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
