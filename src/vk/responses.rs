use serde::Deserialize;
use serde_json::Value;

use super::error::VkError;
use crate::photos::{ImageVariant, PhotoRecord};

/// Top-level body of a VK API call: exactly one of `response` or `error`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub response: Option<PhotosPage>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// `response` of `photos.get`. Items are kept as dynamic JSON and decoded one
/// by one so a malformed item cannot fail the whole batch.
#[derive(Debug, Deserialize)]
pub struct PhotosPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

/// Convert a `photos.get` envelope into photo records.
pub fn into_photos(envelope: Envelope) -> Result<Vec<PhotoRecord>, VkError> {
    if let Some(err) = envelope.error {
        return Err(VkError::Api {
            code: err.error_code,
            message: err.error_msg,
        });
    }
    let page = envelope.response.ok_or_else(|| {
        VkError::UnexpectedResponse("neither `response` nor `error` present".to_string())
    })?;

    if page.count > page.items.len() as u64 {
        tracing::info!(
            total = page.count,
            fetched = page.items.len(),
            "Only the first page of photos is considered"
        );
    }

    Ok(page.items.iter().filter_map(photo_from_item).collect())
}

/// Decode one `photos.get` item. Returns `None` only when the item has no
/// usable id; every other missing field falls back to a default.
pub fn photo_from_item(item: &Value) -> Option<PhotoRecord> {
    let id = match &item["id"] {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => {
            tracing::warn!("Photo item without an id, skipping");
            return None;
        }
    };

    let sizes = item["sizes"]
        .as_array()
        .map(|sizes| sizes.iter().map(variant_from_size).collect())
        .unwrap_or_default();

    let like_count = item["likes"]["count"].as_u64().unwrap_or(0);

    Some(PhotoRecord::new(id, sizes, like_count))
}

fn variant_from_size(size: &Value) -> ImageVariant {
    ImageVariant {
        width: size["width"].as_i64(),
        height: size["height"].as_i64(),
        url: size["url"].as_str().unwrap_or_default().to_string(),
        kind: size["type"].as_str().map(str::to_string),
    }
}
