// External item metadata lookup, best effort

use std::time::Duration;

use serde::{Deserialize, Serialize};

use backend_domain::LootEntry;

use crate::api::{handle_response, ClientError};

pub const DEFAULT_METADATA_URL: &str = "https://d2io.vercel.app";

/// Catalog records are third-party data: a null or oddly typed field
/// degrades to its default instead of failing the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub magical_properties: Vec<String>,
    #[serde(default, deserialize_with = "lenient::scalar_string")]
    pub defense: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub damage: Vec<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub required_level: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::scalar_string")]
    pub image: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::scalar_string")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar_string")]
    pub base_item: Option<String>,
    #[serde(default, deserialize_with = "lenient::properties")]
    pub properties: ItemProperties,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::ItemProperties;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    pub fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    /// A lone scalar becomes a one-element list.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            other => scalar(other).into_iter().collect(),
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn properties<'de, D>(deserializer: D) -> Result<ItemProperties, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}

pub struct ItemMetadataClient {
    base_url: String,
    http: reqwest::Client,
}

impl ItemMetadataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<ItemMetadata>, ClientError> {
        let url = format!("{}/api/items", self.base_url);
        let response = self.http.get(&url).send().await?;
        handle_response(response).await
    }

    /// `Ok(None)` when the catalog has no matching item.
    pub async fn lookup(&self, entry: &LootEntry) -> Result<Option<ItemMetadata>, ClientError> {
        let catalog = self.fetch_catalog().await?;
        Ok(find_item(&catalog, entry).cloned())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Match by `itemId` first, then by case-insensitive name against `itemId` or `itemName`.
pub fn find_item<'a>(catalog: &'a [ItemMetadata], entry: &LootEntry) -> Option<&'a ItemMetadata> {
    let item_id = entry.item_id.trim();
    if !item_id.is_empty() {
        if let Some(item) = catalog.iter().find(|item| item.id == item_id) {
            return Some(item);
        }
    }
    [item_id, entry.item_name.trim()]
        .into_iter()
        .filter(|key| !key.is_empty())
        .find_map(|key| {
            catalog
                .iter()
                .find(|item| item.name.to_lowercase() == key.to_lowercase())
        })
}

/// Lowercase alphanumeric runs joined by `-`.
pub fn item_slug(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn image_url(base_url: &str, item: &ItemMetadata) -> String {
    let base = base_url.trim_end_matches('/');
    match item.image.as_deref().map(str::trim).filter(|path| !path.is_empty()) {
        Some(path) if path.starts_with("http://") || path.starts_with("https://") => path.to_string(),
        Some(path) if path.starts_with('/') => format!("{base}{path}"),
        Some(path) => format!("{base}/{path}"),
        None => format!("{base}/images/items/{}.png", item_slug(&item.name)),
    }
}
