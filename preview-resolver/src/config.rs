use anyhow::{Context, Result};
use std::collections::HashMap;
use url::Url;

const CHAIN_PREFIX: &str = "ETHEREUM_NODE_";

/// External screenshot service access. Endpoint and credential come as a
/// pair; without them the renderer runs in degraded placeholder mode.
#[derive(Debug, Clone)]
pub struct RenderServiceConfig {
    pub endpoint: Url,
    pub access_key: String,
}

/// Explicit pipeline configuration, injected at construction.
///
/// Chain endpoints live here rather than in ambient environment lookups;
/// a chain id with no mapping fails as `ConfigMissing`, never as a
/// fallback to some default node.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chain id -> JSON-RPC endpoint.
    pub chains: HashMap<String, Url>,
    /// Public base for canonical `/images` and `/render` URLs, no trailing
    /// slash.
    pub base_url: String,
    pub render_service: Option<RenderServiceConfig>,
}

impl Config {
    /// Assemble the explicit configuration from `ETHEREUM_NODE_<chainId>`
    /// variables, `BASE_URL` and the optional screenshot service pair.
    pub fn from_env() -> Result<Self> {
        let mut chains = HashMap::new();
        for (key, value) in std::env::vars() {
            if let Some(chain_id) = key.strip_prefix(CHAIN_PREFIX) {
                let url = Url::parse(&value).with_context(|| format!("invalid url in {key}"))?;
                chains.insert(chain_id.to_string(), url);
            }
        }
        let base_url = std::env::var("BASE_URL")
            .context("missing BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let render_service = match std::env::var("SCREENSHOT_SERVICE_ENDPOINT") {
            Ok(endpoint) => Some(RenderServiceConfig {
                endpoint: Url::parse(&endpoint).context("invalid SCREENSHOT_SERVICE_ENDPOINT")?,
                access_key: std::env::var("SCREENSHOT_SERVICE_API_KEY")
                    .context("missing SCREENSHOT_SERVICE_API_KEY")?,
            }),
            Err(_) => None,
        };
        tracing::info!(
            chains = chains.len(),
            base_url = %base_url,
            render_service = render_service.is_some(),
            "configuration loaded"
        );
        Ok(Self {
            chains,
            base_url,
            render_service,
        })
    }
}
