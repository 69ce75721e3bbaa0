use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};

use backend_domain::{LootSubmission, RuntimeConfig};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Bearer check for operator endpoints. Open when no `api_token` is set.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    match &config.api_token {
        Some(api_token) => extract_bearer(headers)
            .map(|token| secrets_match(&token, api_token))
            .unwrap_or(false),
        None => true,
    }
}

/// Shared-secret check for the bot webhook. Open when no secret is set.
pub fn authorize_webhook(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    let Some(secret) = config.webhook_secret.as_deref().filter(|s| !s.is_empty()) else {
        return true;
    };
    headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|provided| secrets_match(provided, secret))
        .unwrap_or(false)
}

/// Digests have a fixed length, so the comparison never exits on a shared prefix.
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub fn parse_submission(headers: &HeaderMap, body: &[u8]) -> Result<LootSubmission> {
    let content = maybe_gunzip(headers, body)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(anyhow!("expected a JSON object"));
    }
    Ok(serde_json::from_value(value)?)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("").eq_ignore_ascii_case("gzip") {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
