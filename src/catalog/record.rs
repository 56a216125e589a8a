//! Catalog Records
//!
//! Stored documents and the normalized records served to clients. Stored
//! documents carry raw image bytes and embedding vectors; normalized records
//! carry the image as base64 with its content type beside it, and never the
//! embedding.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cache::clock::current_timestamp_ms;
use crate::catalog::page::SourceTag;
use crate::error::{AppError, Result};

/// Length of a document identifier in hex digits.
pub const RECORD_ID_LEN: usize = 24;

// == Record Id ==
/// A validated document identifier.
///
/// Two shapes are addressable: 24 hexadecimal digits (stored lowercased),
/// and the integer ids that seed files and the backend produce, kept as
/// their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Validates `raw` without touching any collaborator.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.len() == RECORD_ID_LEN && raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Self(raw.to_ascii_lowercase()));
        }
        if let Ok(n) = raw.parse::<i64>() {
            // Canonical decimal only, matching how numeric ids are stored
            if n.to_string() == raw {
                return Ok(Self(raw.to_string()));
            }
        }
        Err(AppError::InvalidRequest(format!(
            "'{}' is not a valid id: expected {} hex digits or an integer",
            raw, RECORD_ID_LEN
        )))
    }

    /// Mints a new id: seconds since epoch followed by a process counter.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let seconds = (current_timestamp_ms() / 1000) as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:08x}{:016x}", seconds, count))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Stored Documents ==
/// An asset as held by the primary store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetDocument {
    #[serde(
        alias = "_id",
        default = "generated_id",
        deserialize_with = "string_or_number"
    )]
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "base64_bytes")]
    pub image_data: Option<Vec<u8>>,
    pub image_content_type: Option<String>,
    pub model_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub embedding: Option<Vec<f32>>,
}

impl AssetDocument {
    /// Projects the document into its served form.
    pub fn project(&self) -> AssetRecord {
        AssetRecord {
            id: self.id.clone(),
            asset_type: self.asset_type.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            prompt: self.prompt.clone(),
            image_url: self.image_url.clone(),
            image_data_base64: self.image_data.as_deref().map(|b| STANDARD.encode(b)),
            image_content_type: self.image_content_type.clone(),
            model_url: self.model_url.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
        }
    }
}

/// A generation as held by the primary store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationDocument {
    #[serde(
        alias = "_id",
        default = "generated_id",
        deserialize_with = "string_or_number"
    )]
    pub id: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub character_id: Option<String>,
    pub prompt: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "base64_bytes")]
    pub image_data: Option<Vec<u8>>,
    pub image_content_type: Option<String>,
    pub leo_id: Option<String>,
    pub meshy: Option<MeshyTask>,
    pub created_at: Option<DateTime<Utc>>,
    pub embedding: Option<Vec<f32>>,
}

impl GenerationDocument {
    pub fn project(&self) -> GenerationRecord {
        GenerationRecord {
            id: self.id.clone(),
            character_id: self.character_id.clone(),
            prompt: self.prompt.clone(),
            status: self.status.clone(),
            image_url: self.image_url.clone(),
            image_data_base64: self.image_data.as_deref().map(|b| STANDARD.encode(b)),
            image_content_type: self.image_content_type.clone(),
            leo_id: self.leo_id.clone(),
            meshy: self.meshy.clone(),
            created_at: self.created_at,
            source: None,
        }
    }
}

// == Normalized Records ==
/// An asset as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A generation as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub character_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meshy: Option<MeshyTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Which collaborator served the record; only set for fallback records
    #[serde(rename = "__source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceTag>,
}

/// 3D model conversion task attached to a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshyTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

// == Serde Helpers ==
fn generated_id() -> String {
    RecordId::generate().0
}

/// Identifiers arrive as strings, numbers, or `{"$oid": "..."}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) | RawId::Oid { oid: s } => s,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// Binary payloads are base64 text on the JSON side.
fn base64_bytes<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|text| STANDARD.decode(text.as_bytes()).map_err(D::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_accepts_hex() {
        let id = RecordId::parse("65F1A2B3C4D5E6F708192A3B").unwrap();
        assert_eq!(id.as_str(), "65f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn test_record_id_accepts_integers() {
        assert_eq!(RecordId::parse("42").unwrap().as_str(), "42");
        assert_eq!(RecordId::parse(" -7 ").unwrap().as_str(), "-7");
    }

    #[test]
    fn test_record_id_rejects_malformed() {
        for raw in [
            "",
            "abc",
            "007",
            "+7",
            "1.5",
            "zzzzzzzzzzzzzzzzzzzzzzzz",
            "65f1a2b3c4d5e6f708192a3b00",
        ] {
            assert!(
                matches!(RecordId::parse(raw), Err(AppError::InvalidRequest(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
        assert!(RecordId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_projection_strips_embedding_and_encodes_image() {
        let doc: AssetDocument = serde_json::from_value(json!({
            "_id": "65f1a2b3c4d5e6f708192a3b",
            "type": "character",
            "name": "Knight",
            "image_data": "cG5n",
            "image_content_type": "image/png",
            "embedding": [0.1, 0.2, 0.3]
        }))
        .unwrap();
        assert_eq!(doc.image_data.as_deref(), Some(&b"png"[..]));

        let record = doc.project();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "65f1a2b3c4d5e6f708192a3b");
        assert_eq!(json["type"], "character");
        assert_eq!(json["image_data_base64"], "cG5n");
        assert_eq!(json["image_content_type"], "image/png");
        assert!(json.get("embedding").is_none());
        assert!(json.get("image_data").is_none());
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let doc = GenerationDocument {
            id: "65f1a2b3c4d5e6f708192a3b".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(doc.project()).unwrap();

        assert_eq!(json, json!({ "id": "65f1a2b3c4d5e6f708192a3b" }));
    }

    #[test]
    fn test_mixed_id_types_become_strings() {
        let numeric: GenerationRecord =
            serde_json::from_value(json!({ "id": 42, "character_id": 7 })).unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(numeric.character_id.as_deref(), Some("7"));

        let extended: AssetRecord =
            serde_json::from_value(json!({ "_id": { "$oid": "65f1a2b3c4d5e6f708192a3b" } }))
                .unwrap();
        assert_eq!(extended.id, "65f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn test_fallback_source_serializes_as_dunder_field() {
        let mut record = GenerationDocument {
            id: "a".to_string(),
            ..Default::default()
        }
        .project();
        record.source = Some(SourceTag::Fallback);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["__source"], "backend_fallback");
    }

    #[test]
    fn test_document_without_id_gets_one() {
        let doc: AssetDocument = serde_json::from_value(json!({ "name": "Orc" })).unwrap();
        assert!(RecordId::parse(&doc.id).is_ok());
    }
}
