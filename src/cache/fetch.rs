//! Image Fetch Module
//!
//! HTTP loader used to fill the image cache.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::debug;

use crate::cache::ImagePayload;
use crate::error::{AppError, Result};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Downloads images and turns them into cacheable payloads.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build image client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetches `url`; non-2xx responses are errors.
    pub async fn fetch(&self, url: Url) -> Result<ImagePayload> {
        debug!("Fetching image {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Backend(format!(
                "image fetch for {} returned {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| guess_content_type(&url).to_string());

        let bytes = response.bytes().await?;
        Ok(ImagePayload::from_bytes(&bytes, content_type))
    }
}

/// Parses and checks an image URL; only http(s) is accepted.
pub fn parse_image_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::InvalidRequest(format!("invalid image url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::InvalidRequest(format!(
            "unsupported image url scheme '{}'",
            other
        ))),
    }
}

fn guess_content_type(url: &Url) -> &'static str {
    let path = url.path().to_ascii_lowercase();
    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "glb" => "model/gltf-binary",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
