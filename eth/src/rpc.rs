mod client;

pub use client::Client;

use crate::types::{Address, BlockRef, NftId};
use anyhow::Result;
use async_trait::async_trait;

/// Read-only view of one chain's JSON-RPC node.
///
/// `token_uri` is the only required call of a resolution; the contract-level
/// reads are optional enrichment and therefore return `Option` instead of
/// surfacing node errors.
#[async_trait]
pub trait NodeReading: Send + Sync {
    /// Current chain head height.
    async fn block_number(&self) -> Result<u64>;

    /// Number and hash of the block at the given height.
    async fn block_by_number(&self, height: u64) -> Result<BlockRef>;

    /// `tokenURI(uint256)` read at the given block.
    async fn token_uri(&self, token: &NftId, block: &BlockRef) -> Result<String>;

    /// Best-effort `name()` read at the given block.
    async fn name(&self, contract: Address, block: &BlockRef) -> Option<String>;

    /// Best-effort `symbol()` read at the given block.
    async fn symbol(&self, contract: Address, block: &BlockRef) -> Option<String>;
}
