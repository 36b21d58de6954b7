use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// One created mini-page, as persisted in the store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub message: String,
    /// Opaque style selector chosen by the creator
    #[serde(default)]
    pub theme: String,
    /// Public path of the uploaded image, e.g. `/uploads/1700000000000.png`
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
}

/// RFC 3339 with millisecond precision and a `Z` suffix, e.g. `2024-05-01T10:00:00.000Z`.
fn serialize_millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
