use crate::{config::Config, error::PreviewError, patch::PatchTable};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use data_store::models::{BlockchainData, ContractDetails};
use data_store::store::DataCache;
use eth::rpc::{Client, NodeReading};
use eth::types::NftId;
use futures::future::join;
use std::{collections::HashMap, sync::Arc};

/// Confirmation depth subtracted from the chain head before any read, so
/// cached data is never pinned to a reorg-prone block.
pub const FINALITY_DEPTH: u64 = 12;

/// Resolves (chain, contract, token) into a write-once `BlockchainData`
/// record, consulting the durable cache before any RPC work.
pub struct Resolver {
    nodes: HashMap<String, Arc<dyn NodeReading>>,
    cache: Arc<dyn DataCache>,
    patches: PatchTable,
}

impl Resolver {
    pub fn new(config: &Config, cache: Arc<dyn DataCache>, patches: PatchTable) -> Self {
        let nodes = config
            .chains
            .iter()
            .map(|(chain_id, endpoint)| {
                let node: Arc<dyn NodeReading> = Arc::new(Client::new(endpoint.clone()));
                (chain_id.clone(), node)
            })
            .collect();
        Self::with_nodes(nodes, cache, patches)
    }

    /// Constructor over prebuilt node handles, for alternate transports and
    /// tests.
    pub fn with_nodes(
        nodes: HashMap<String, Arc<dyn NodeReading>>,
        cache: Arc<dyn DataCache>,
        patches: PatchTable,
    ) -> Self {
        Self {
            nodes,
            cache,
            patches,
        }
    }

    pub fn cache_key(chain_id: &str, token: &NftId) -> String {
        format!("eip721:{chain_id}:{}:{}", token.address, token.token_id.0).to_lowercase()
    }

    pub async fn resolve(
        &self,
        chain_id: &str,
        token: &NftId,
    ) -> Result<BlockchainData, PreviewError> {
        let key = Self::cache_key(chain_id, token);
        let cached = self.cache.get(&key).await.map_err(|source| {
            PreviewError::CacheRead {
                key: key.clone(),
                source,
            }
        })?;
        if let Some(bytes) = cached {
            tracing::debug!("cache hit for {key}");
            return serde_json::from_slice(&bytes).map_err(|err| PreviewError::CacheRead {
                key,
                source: anyhow::Error::from(err).context("corrupt cache entry"),
            });
        }

        let node = self
            .nodes
            .get(chain_id)
            .ok_or_else(|| PreviewError::ConfigMissing {
                chain_id: chain_id.to_string(),
            })?;
        tracing::info!("resolving {token} on chain {chain_id}");
        let data = self
            .fetch(chain_id, node.as_ref(), token)
            .await
            .map_err(|source| PreviewError::Resolution {
                chain_id: chain_id.to_string(),
                token: *token,
                source,
            })?;

        let bytes = serde_json::to_vec(&data).map_err(|err| PreviewError::CacheWrite {
            key: key.clone(),
            source: err.into(),
        })?;
        self.cache
            .put(&key, bytes)
            .await
            .map_err(|source| PreviewError::CacheWrite { key, source })?;
        Ok(data)
    }

    /// One consistent read of the chain: head height, finalized block, then
    /// all three calls pinned to that block.
    async fn fetch(
        &self,
        chain_id: &str,
        node: &dyn NodeReading,
        token: &NftId,
    ) -> Result<BlockchainData> {
        let head = node.block_number().await.context("head height")?;
        let block = node
            .block_by_number(head.saturating_sub(FINALITY_DEPTH))
            .await
            .context("finalized block")?;

        let token_uri = node.token_uri(token, &block).await?;
        let (name, symbol) = join(
            node.name(token.address, &block),
            node.symbol(token.address, &block),
        )
        .await;

        let token_uri = self.patches.apply(chain_id, &token.address, token_uri);
        let token_uri_base64 = STANDARD.encode(&token_uri);
        Ok(BlockchainData {
            token_uri,
            token_uri_base64,
            contract_metadata: ContractDetails { name, symbol },
            block,
        })
    }
}
