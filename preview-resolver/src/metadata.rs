mod data_uri;
mod ipfs;

pub use ipfs::IPFS_GATEWAY;

use crate::error::{uri_snippet, PreviewError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The renderable subset of an NFT metadata document. Derived from the
/// tokenURI on every use; never persisted on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Decode a raw tokenURI into structured metadata.
///
/// Inline `data:` URIs are handled locally; anything else is treated as a
/// remote reference (with `ipfs://` rewritten to the public gateway),
/// fetched and parsed. Remote documents additionally get every `ipfs://`
/// string value rewritten so consumers never see unresolvable schemes.
pub async fn decode(token_uri: &str) -> Result<Metadata, PreviewError> {
    if token_uri.starts_with("data:") {
        return data_uri::decode(token_uri);
    }
    let url = ipfs::to_gateway_url(token_uri);
    tracing::debug!("fetching metadata at {url}");
    let document = fetch_json(&url).await?;
    from_value(ipfs::rewrite_ipfs_refs(document), token_uri)
}

async fn fetch_json(url: &str) -> Result<Value, PreviewError> {
    let fetch_error = |source: reqwest::Error| PreviewError::MetadataFetch {
        url: url.to_string(),
        source: source.into(),
    };
    reqwest::get(url)
        .await
        .map_err(fetch_error)?
        .error_for_status()
        .map_err(fetch_error)?
        .json()
        .await
        .map_err(fetch_error)
}

pub(crate) fn from_value(value: Value, token_uri: &str) -> Result<Metadata, PreviewError> {
    serde_json::from_value(value).map_err(|err| PreviewError::MetadataParse {
        uri: uri_snippet(token_uri),
        source: err.into(),
    })
}
