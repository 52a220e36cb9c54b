use crate::error::PreviewError;
use crate::metadata::Metadata;
use crate::render::{RenderedImage, Renderer};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use data_store::models::{BlockchainData, SnapshotRecord};
use data_store::store::ObjectStore;
use eth::types::NftId;
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Outcome of a preview lookup. `NotFound` is recoverable: a failed render
/// leaves no record, so the key stays eligible for a future attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Ready { url: String },
    NotFound,
}

/// Content-addressed cache of rendered preview images.
///
/// Object-store existence is the sole source of truth for "already
/// rendered". No lock is taken between the `head` check and the `put`:
/// two concurrent misses may both render and both write the same key,
/// which is wasteful but correct since the content is deterministic.
pub struct SnapshotCache {
    store: Arc<dyn ObjectStore>,
    base_url: String,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn ObjectStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    /// Derives the image key: a pure function of chain, token and the
    /// metadata's image reference (or the tokenURI when no image exists),
    /// case-normalized so equal inputs collide across processes.
    pub fn image_key(
        chain_id: &str,
        token: &NftId,
        data: &BlockchainData,
        metadata: &Metadata,
    ) -> String {
        let content = metadata.image.as_deref().unwrap_or(&data.token_uri);
        let content_hash = hex::encode(Sha256::digest(content.as_bytes()));
        let identity =
            format!("{chain_id}_{}_{}", token.address, token.token_id.0).to_lowercase();
        format!("{identity}_{content_hash}.jpg")
    }

    pub fn preview_url(&self, image_key: &str) -> String {
        format!("{}/images/{image_key}", self.base_url)
    }

    pub async fn get_or_create(
        &self,
        chain_id: &str,
        token: &NftId,
        data: &BlockchainData,
        metadata: &Metadata,
        renderer: &Renderer,
    ) -> Result<Preview, PreviewError> {
        let image_key = Self::image_key(chain_id, token, data, metadata);
        let exists = self
            .store
            .head(&image_key)
            .await
            .map_err(|source| PreviewError::CacheRead {
                key: image_key.clone(),
                source,
            })?;
        if exists {
            tracing::debug!("snapshot hit for {image_key}");
            return Ok(Preview::Ready {
                url: self.preview_url(&image_key),
            });
        }

        let target = self.render_target(metadata).await?;
        let RenderedImage { url: source_url } = renderer.render(&target).await?;
        tracing::debug!("downloading rendered image from {}", renderer.redact(&source_url));

        let bytes = match fetch_rendered(&source_url).await {
            Ok(bytes) => bytes,
            Err(PreviewError::RenderDownloadFailed { url, status }) => {
                tracing::warn!(
                    "render download failed with status {status} from {}",
                    renderer.redact(&url)
                );
                return Ok(Preview::NotFound);
            }
            Err(other) => return Err(other),
        };

        let record = SnapshotRecord {
            source_url,
            block: data.block.clone(),
        };
        self.store
            .put(&image_key, bytes, record.into_custom_metadata())
            .await
            .map_err(|source| PreviewError::CacheWrite {
                key: image_key.clone(),
                source,
            })?;
        tracing::info!("saved snapshot {image_key}");
        Ok(Preview::Ready {
            url: self.preview_url(&image_key),
        })
    }

    /// Builds the self-contained render target: the resolved metadata with
    /// any remote image inlined as a data URI, base64-encoded into the URL
    /// fragment. The renderer then needs zero further network fetches, so
    /// one render is deterministic and offline-safe once invoked.
    pub(crate) async fn render_target(
        &self,
        metadata: &Metadata,
    ) -> Result<String, PreviewError> {
        let mut resolved = metadata.clone();
        if let Some(image) = &resolved.image {
            if image.starts_with("http") {
                resolved.image = Some(inline_image(image).await?);
            }
        }
        let payload = serde_json::to_string(&resolved).map_err(|err| {
            PreviewError::MetadataParse {
                uri: "render target".into(),
                source: err.into(),
            }
        })?;
        Ok(format!(
            "{}/render/?hash=true#{}",
            self.base_url,
            STANDARD.encode(payload)
        ))
    }
}

/// Fetches a remote image and re-embeds it as a `data:` URI.
async fn inline_image(url: &str) -> Result<String, PreviewError> {
    let fetch_error = |source: reqwest::Error| PreviewError::MetadataFetch {
        url: url.to_string(),
        source: source.into(),
    };
    let response = reqwest::get(url)
        .await
        .map_err(fetch_error)?
        .error_for_status()
        .map_err(fetch_error)?;
    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = response.bytes().await.map_err(fetch_error)?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(&bytes)))
}

async fn fetch_rendered(url: &str) -> Result<Vec<u8>, PreviewError> {
    let request_failed = |source: reqwest::Error| PreviewError::RenderRequestFailed {
        target: url.to_string(),
        source,
    };
    let response = reqwest::get(url).await.map_err(request_failed)?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(PreviewError::RenderDownloadFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await.map_err(request_failed)?.to_vec())
}
