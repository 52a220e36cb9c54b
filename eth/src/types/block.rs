use serde::{Deserialize, Serialize};

/// The block used as the read height for one resolution.
/// Immutable once captured: every `eth_call` of a resolution is pinned to
/// this reference so the on-chain view stays internally consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block number
    pub number: u64,
    /// Block hash as the 0x-prefixed wire string.
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ref_serde() {
        let block = BlockRef {
            number: 12,
            hash: "0xabc".into(),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"number":12,"hash":"0xabc"}"#);
        assert_eq!(serde_json::from_str::<BlockRef>(&json).unwrap(), block);
    }
}
