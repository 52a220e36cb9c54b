use eth::types::NftId;

const URI_SNIPPET_LEN: usize = 160;

/// Bound a potentially enormous tokenURI (inline data URIs can run to
/// megabytes) to a prefix that still identifies it in error messages.
pub(crate) fn uri_snippet(uri: &str) -> String {
    if uri.len() <= URI_SNIPPET_LEN {
        return uri.to_string();
    }
    let cut = (0..=URI_SNIPPET_LEN)
        .rev()
        .find(|i| uri.is_char_boundary(*i))
        .unwrap_or(0);
    format!("{}… ({} bytes total)", &uri[..cut], uri.len())
}

/// Failure kinds of the resolution-and-snapshot pipeline.
///
/// Nothing is retried internally; retry policy belongs to callers.
/// `RenderDownloadFailed` is the one recoverable kind: a failed render
/// leaves no record, so the image key stays eligible for a later attempt.
/// No variant ever carries the render-service access credential.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// No RPC endpoint configured for the chain. Fatal, not retryable.
    #[error("no ethereum node configured for chain {chain_id}")]
    ConfigMissing { chain_id: String },

    /// The durable store failed on read. Not a miss: refetching here could
    /// mask storage corruption, so this surfaces as fatal.
    #[error("cache read for {key} failed: {source}")]
    CacheRead {
        key: String,
        source: anyhow::Error,
    },

    /// The durable store failed on write. Proceeding with unpersisted data
    /// would make a future identical request redo the work or diverge.
    #[error("cache write for {key} failed: {source}")]
    CacheWrite {
        key: String,
        source: anyhow::Error,
    },

    /// RPC or ABI failure on the required `tokenURI` read.
    #[error("failed to resolve {token} on chain {chain_id}: {source}")]
    Resolution {
        chain_id: String,
        token: NftId,
        source: anyhow::Error,
    },

    /// The decoder does not understand the URI's encoding.
    #[error("not supported: {uri}")]
    UnsupportedUriScheme { uri: String },

    /// The URI was recognized but its payload is not valid metadata.
    #[error("failed to parse metadata from {uri}: {source}")]
    MetadataParse {
        uri: String,
        source: anyhow::Error,
    },

    /// A remote metadata document (or referenced image) was unreachable.
    #[error("failed to fetch {url}: {source}")]
    MetadataFetch {
        url: String,
        source: anyhow::Error,
    },

    /// Transport failure talking to the render service.
    #[error("render request for {target} failed: {source}")]
    RenderRequestFailed {
        target: String,
        source: reqwest::Error,
    },

    /// The render service answered without a result URL.
    #[error("render service returned no url: {body}")]
    RenderServiceMalformedResponse { body: String },

    /// The rendered bytes could not be downloaded. Recoverable: callers map
    /// this to "not found" rather than a system fault.
    #[error("render download from {url} returned status {status}")]
    RenderDownloadFailed { url: String, status: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_short_uris_untouched() {
        assert_eq!(uri_snippet("ipfs://QmExample"), "ipfs://QmExample");
    }

    #[test]
    fn snippet_bounds_long_uris() {
        let uri = format!("data:application/json;base64,{}", "A".repeat(10_000));
        let snippet = uri_snippet(&uri);
        assert!(snippet.len() < 200);
        assert!(snippet.starts_with("data:application/json;base64,"));
        assert!(snippet.contains("10029 bytes total"));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let uri = "☳☰☶☴☲".repeat(100);
        let snippet = uri_snippet(&uri);
        assert!(snippet.contains("bytes total"));
    }

    #[test]
    fn config_missing_display() {
        let err = PreviewError::ConfigMissing {
            chain_id: "5".into(),
        };
        assert_eq!(
            err.to_string(),
            "no ethereum node configured for chain 5"
        );
    }
}
