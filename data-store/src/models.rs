use eth::types::BlockRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contract-level enrichment read alongside the tokenURI.
/// Both reads are best-effort; absent fields are a valid outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Everything read from the chain for one (chain, contract, token) key.
///
/// Created once per key and persisted write-once: a cache hit returns the
/// exact prior value with no re-validation against current chain state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainData {
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
    #[serde(rename = "tokenURIBase64")]
    pub token_uri_base64: String,
    #[serde(rename = "contractMetadata", default)]
    pub contract_metadata: ContractDetails,
    pub block: BlockRef,
}

/// Audit metadata stored with rendered image bytes. The image key itself is
/// the identity of a cached preview; this record only explains where the
/// bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub source_url: String,
    pub block: BlockRef,
}

impl SnapshotRecord {
    pub fn into_custom_metadata(self) -> HashMap<String, String> {
        HashMap::from([
            ("url".to_string(), self.source_url),
            ("number".to_string(), self.block.number.to_string()),
            ("hash".to_string(), self.block.hash),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    fn test_data() -> BlockchainData {
        BlockchainData {
            token_uri: "ipfs://QmExample/1.json".into(),
            token_uri_base64: "aXBmczovL1FtRXhhbXBsZS8xLmpzb24=".into(),
            contract_metadata: ContractDetails {
                name: Some("Example".into()),
                symbol: None,
            },
            block: BlockRef {
                number: 988,
                hash: "0xdeadbeef".into(),
            },
        }
    }

    #[test]
    fn wire_field_names() {
        let json: serde_json::Value = serde_json::to_value(test_data()).unwrap();
        assert_eq!(json["tokenURI"], "ipfs://QmExample/1.json");
        assert_eq!(json["tokenURIBase64"], "aXBmczovL1FtRXhhbXBsZS8xLmpzb24=");
        assert_eq!(json["contractMetadata"]["name"], "Example");
        // Absent optional fields are omitted, not serialized as null.
        assert!(json["contractMetadata"].get("symbol").is_none());
        assert_eq!(json["block"]["number"], 988);
    }

    #[test]
    fn roundtrip() {
        let data = test_data();
        let bytes = serde_json::to_vec(&data).unwrap();
        assert_eq!(serde_json::from_slice::<BlockchainData>(&bytes).unwrap(), data);
    }

    #[test]
    fn missing_contract_metadata_defaults() {
        let json = r#"{
            "tokenURI": "data:application/json,{}",
            "tokenURIBase64": "ZGF0YTp=",
            "block": { "number": 1, "hash": "0x01" }
        }"#;
        let data: BlockchainData = serde_json::from_str(json).unwrap();
        assert_eq!(data.contract_metadata, ContractDetails::default());
    }

    #[test]
    fn snapshot_custom_metadata() {
        let record = SnapshotRecord {
            source_url: "https://shots.example/abc.jpg".into(),
            block: BlockRef {
                number: 988,
                hash: "0xdeadbeef".into(),
            },
        };
        assert_eq!(
            record.into_custom_metadata(),
            hashmap! {
                "url".to_string() => "https://shots.example/abc.jpg".to_string(),
                "number".to_string() => "988".to_string(),
                "hash".to_string() => "0xdeadbeef".to_string(),
            }
        );
    }
}
