use super::{from_value, Metadata};
use crate::error::{uri_snippet, PreviewError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::borrow::Cow;

// Payload offsets are fixed by the prefix lengths; prefixes are matched on
// the raw string, payloads taken from the percent-decoded one.
const TEXT_PLAIN: &str = "data:text/plain,";
const TEXT_PLAIN_BASE64: &str = "data:text/plain;base64,";
const TEXT_PLAIN_UTF8: &str = "data:text/plain;charset=utf-8,";
const APPLICATION_JSON: &str = "data:application/json,";
const APPLICATION_JSON_BASE64: &str = "data:application/json;base64,";

pub(super) fn decode(token_uri: &str) -> Result<Metadata, PreviewError> {
    let decoded = percent_decoded(token_uri);
    let json = if token_uri.starts_with("data:text/plain") {
        if token_uri.starts_with(TEXT_PLAIN_BASE64) {
            parse_base64(payload(&decoded, TEXT_PLAIN_BASE64), token_uri)?
        } else if token_uri.starts_with(TEXT_PLAIN_UTF8) {
            parse(payload(&decoded, TEXT_PLAIN_UTF8), token_uri)?
        } else if token_uri.starts_with(TEXT_PLAIN) {
            parse(payload(&decoded, TEXT_PLAIN), token_uri)?
        } else {
            // Unknown text/plain parameter list: everything after the first
            // comma is the payload.
            match decoded.split_once(',') {
                Some((_, rest)) => parse(rest, token_uri)?,
                None => return Err(unsupported(token_uri)),
            }
        }
    } else if token_uri.starts_with(APPLICATION_JSON_BASE64) {
        parse_base64(payload(&decoded, APPLICATION_JSON_BASE64), token_uri)?
    } else if token_uri.starts_with(APPLICATION_JSON) {
        parse(payload(&decoded, APPLICATION_JSON), token_uri)?
    } else {
        return Err(unsupported(token_uri));
    };
    from_value(json, token_uri)
}

/// Percent-decode, falling back to the raw string when the unescaped bytes
/// are not valid UTF-8. Plenty of real tokenURIs are not valid
/// percent-encoding; decode failure alone is never fatal.
fn percent_decoded(raw: &str) -> Cow<'_, str> {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

fn payload<'a>(decoded: &'a str, prefix: &str) -> &'a str {
    decoded.get(prefix.len()..).unwrap_or_default()
}

fn parse(payload: &str, token_uri: &str) -> Result<Value, PreviewError> {
    serde_json::from_str(payload).map_err(|err| parse_error(token_uri, err.into()))
}

fn parse_base64(payload: &str, token_uri: &str) -> Result<Value, PreviewError> {
    let bytes = STANDARD
        .decode(payload.trim_end())
        .map_err(|err| parse_error(token_uri, err.into()))?;
    serde_json::from_slice(&bytes).map_err(|err| parse_error(token_uri, err.into()))
}

fn parse_error(token_uri: &str, source: anyhow::Error) -> PreviewError {
    PreviewError::MetadataParse {
        uri: uri_snippet(token_uri),
        source,
    }
}

fn unsupported(token_uri: &str) -> PreviewError {
    PreviewError::UnsupportedUriScheme {
        uri: uri_snippet(token_uri),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_json() {
        // base64 of {"name": "X"}
        let metadata = decode("data:application/json;base64,eyJuYW1lIjogIlgifQ==").unwrap();
        assert_eq!(metadata.name.as_deref(), Some("X"));
    }

    #[test]
    fn plain_text_json() {
        let metadata = decode("data:text/plain,{\"name\":\"Y\"}").unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Y"));
    }

    #[test]
    fn plain_text_base64_json() {
        let metadata = decode("data:text/plain;base64,eyJuYW1lIjogIlkifQ==").unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Y"));
    }

    #[test]
    fn charset_utf8_with_percent_escapes() {
        let metadata = decode(
            "data:text/plain;charset=utf-8,{\"name\":%20\"Escaped\",%20\"description\":%20\"All%20Colors\"}",
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Escaped"));
        assert_eq!(metadata.description.as_deref(), Some("All Colors"));
    }

    #[test]
    fn unknown_text_plain_params_fall_back_to_first_comma() {
        let metadata = decode("data:text/plain;charset=us-ascii,{\"name\":\"Generic\"}").unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Generic"));
    }

    #[test]
    fn json_utf8_variant_is_unsupported() {
        // Only the enumerated application/json forms are accepted.
        let result = decode("data:application/json;utf8,{\"name\":\"Good number 1\"}");
        assert!(matches!(
            result,
            Err(PreviewError::UnsupportedUriScheme { .. })
        ));
    }

    #[test]
    fn svg_data_uri_is_unsupported() {
        let result = decode("data:image/svg+xml;base64,PHN2Zy8+");
        assert!(matches!(
            result,
            Err(PreviewError::UnsupportedUriScheme { .. })
        ));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let result = decode("data:application/json,{\"name\": ");
        match result {
            Err(PreviewError::MetadataParse { uri, .. }) => {
                assert!(uri.starts_with("data:application/json,"))
            }
            other => panic!("expected MetadataParse, got {other:?}"),
        }
    }

    #[test]
    fn invalid_base64_is_parse_error() {
        let result = decode("data:application/json;base64,!!!not-base64!!!");
        assert!(matches!(result, Err(PreviewError::MetadataParse { .. })));
    }

    #[test]
    fn lone_percent_survives_decoding() {
        // A bare % that is not a valid escape stays literal.
        let metadata = decode("data:text/plain,{\"name\":\"100% sure\"}").unwrap();
        assert_eq!(metadata.name.as_deref(), Some("100% sure"));
    }

    #[test]
    fn enormous_uri_error_is_bounded() {
        let uri = format!("data:application/json,{}", "x".repeat(50_000));
        match decode(&uri) {
            Err(PreviewError::MetadataParse { uri, .. }) => assert!(uri.len() < 250),
            other => panic!("expected MetadataParse, got {other:?}"),
        }
    }
}
