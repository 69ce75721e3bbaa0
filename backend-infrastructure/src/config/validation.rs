use anyhow::{anyhow, Result};

use backend_domain::StorageBackend;

pub fn validate_storage_backend(value: &str) -> Result<StorageBackend> {
    StorageBackend::parse(value).ok_or_else(|| {
        anyhow!(
            "invalid storage_backend '{}', expected 'clickhouse' or 'memory'",
            value
        )
    })
}

pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(anyhow!("{} must be an http(s) url, got '{}'", field, value));
    }
    Ok(())
}
