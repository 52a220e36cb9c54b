use serde_json::Value;

pub const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

const IPFS_SCHEME: &str = "ipfs://";

/// Returns an HTTP gateway URL for an `ipfs://` reference; anything else
/// passes through unchanged.
pub(crate) fn to_gateway_url(uri: &str) -> String {
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(path) => format!("{IPFS_GATEWAY}{path}"),
        None => uri.to_string(),
    }
}

/// Recursively rewrite every string value with an `ipfs://` prefix to the
/// gateway form, so downstream consumers never see unresolvable scheme
/// references.
pub(crate) fn rewrite_ipfs_refs(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(to_gateway_url(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite_ipfs_refs).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, rewrite_ipfs_refs(value)))
                .collect(),
        ),
        other => other,
    }
}
