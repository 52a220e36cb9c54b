use crate::{
    config::Config,
    error::PreviewError,
    metadata::{self, Metadata},
    patch::PatchTable,
    render::Renderer,
    resolver::Resolver,
    snapshot::{Preview, SnapshotCache},
};
use data_store::models::BlockchainData;
use data_store::store::{DataCache, ObjectStore};
use eth::types::NftId;
use std::sync::Arc;

/// Everything a resolved token provides for a link-preview page.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPreview {
    pub data: BlockchainData,
    pub metadata: Metadata,
    pub preview: Preview,
}

/// Wires the full pipeline: resolve -> decode -> snapshot.
///
/// Callers (HTTP handlers) translate the outcome into transport responses;
/// this type owns no wire format.
pub struct Previewer {
    resolver: Resolver,
    snapshots: SnapshotCache,
    renderer: Renderer,
}

impl Previewer {
    pub fn new(
        config: &Config,
        cache: Arc<dyn DataCache>,
        store: Arc<dyn ObjectStore>,
        patches: PatchTable,
    ) -> Self {
        Self {
            resolver: Resolver::new(config, cache, patches),
            snapshots: SnapshotCache::new(store, config.base_url.clone()),
            renderer: Renderer::new(config.render_service.clone(), config.base_url.clone()),
        }
    }

    pub async fn preview(
        &self,
        chain_id: &str,
        token: &NftId,
    ) -> Result<TokenPreview, PreviewError> {
        let data = self.resolver.resolve(chain_id, token).await?;
        let metadata = metadata::decode(&data.token_uri).await?;
        let preview = self
            .snapshots
            .get_or_create(chain_id, token, &data, &metadata, &self.renderer)
            .await?;
        Ok(TokenPreview {
            data,
            metadata,
            preview,
        })
    }
}
