//! Cache Entry Module
//!
//! Defines cached image entries and the payload a loader produces.

use base64::{engine::general_purpose::STANDARD, Engine as _};

// == Image Payload ==
/// A fetched image in its cacheable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type of the decoded bytes
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(data: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    /// Encodes raw image bytes.
    pub fn from_bytes(bytes: &[u8], content_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), content_type)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.data)
    }
}

// == Cache Entry ==
/// Represents a single cached image.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Base64-encoded payload
    pub data: String,
    /// MIME type of the payload
    pub content_type: String,
    /// Insertion time (Unix milliseconds)
    pub timestamp: u64,
    /// Insertion order, breaks ties between equal timestamps
    pub sequence: u64,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(payload: ImagePayload, timestamp: u64, sequence: u64) -> Self {
        Self {
            data: payload.data,
            content_type: payload.content_type,
            timestamp,
            sequence,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry may still be served.
    ///
    /// Boundary condition: an entry written at `t0` is stale for any
    /// `now >= t0 + max_age_ms`.
    pub fn is_fresh(&self, now: u64, max_age_ms: u64) -> bool {
        now.saturating_sub(self.timestamp) < max_age_ms
    }

    // == Data URI ==
    /// Formats the entry as `data:<content_type>;base64,<data>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.data)
    }
}
