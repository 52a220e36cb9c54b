use eth::types::Address;
use std::collections::HashMap;

/// Per-contract rewrites applied to a raw tokenURI before decoding.
///
/// Some deployed contracts return strings that break percent-decoding or
/// JSON parsing in known, enumerable ways. Fixes live in this table keyed
/// by (chain id, contract) so the compatibility surface stays auditable
/// and testable in isolation; this is not general sanitization.
#[derive(Debug, Clone, Default)]
pub struct PatchTable {
    patches: HashMap<(String, Address), fn(&str) -> String>,
}

impl PatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, chain_id: &str, contract: Address, transform: fn(&str) -> String) {
        self.patches
            .insert((chain_id.to_string(), contract), transform);
    }

    pub fn apply(&self, chain_id: &str, contract: &Address, token_uri: String) -> String {
        match self.patches.get(&(chain_id.to_string(), *contract)) {
            Some(transform) => {
                tracing::debug!("patching tokenURI of {contract} on chain {chain_id}");
                transform(&token_uri)
            }
            None => token_uri,
        }
    }
}

/// Escapes literal `50%` sequences to `50%25` so later percent-decoding
/// survives them. Known to be needed for contracts that embed unescaped
/// percentages in generated metadata.
pub fn escape_fifty_percent(uri: &str) -> String {
    uri.replace("50%", "50%25")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_percent_escaping() {
        assert_eq!(
            escape_fifty_percent("data:text/plain,{\"name\":\"50% off\"}"),
            "data:text/plain,{\"name\":\"50%25 off\"}"
        );
        assert_eq!(escape_fifty_percent("ipfs://QmExample"), "ipfs://QmExample");
    }

    #[test]
    fn patches_apply_only_to_registered_pair() {
        let mut table = PatchTable::new();
        let broken = Address::from(7);
        table.register("1", broken, escape_fifty_percent);

        let uri = "https://api.example/50%".to_string();
        assert_eq!(
            table.apply("1", &broken, uri.clone()),
            "https://api.example/50%25"
        );
        // Same contract on another chain is untouched.
        assert_eq!(table.apply("100", &broken, uri.clone()), uri);
        // Other contracts are untouched.
        assert_eq!(table.apply("1", &Address::from(8), uri.clone()), uri);
    }
}
