use super::NodeReading;
use crate::types::{Address, BlockRef, NftId};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use solabi::{decode::Decode, encode::Encode, ethprim::U256, selector, FunctionEncoder};
use url::Url;

const NAME: FunctionEncoder<(), (String,)> = FunctionEncoder::new(selector!("name()"));
const SYMBOL: FunctionEncoder<(), (String,)> = FunctionEncoder::new(selector!("symbol()"));
const TOKEN_URI: FunctionEncoder<(U256,), (String,)> =
    FunctionEncoder::new(selector!("tokenURI(uint256)"));

/// JSON-RPC client for a single chain endpoint.
pub struct Client {
    http: reqwest::Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl Client {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// One `{id: 1, jsonrpc: "2.0"}` request. A response with a non-empty
    /// `error` or a missing `result` is a failure.
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        tracing::debug!("rpc request {method} to {}", self.endpoint);
        let response: RpcResponse = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{method} transport"))?
            .json()
            .await
            .with_context(|| format!("{method} response body"))?;
        if let Some(error) = response.error.filter(|e| !e.is_null()) {
            return Err(anyhow!("{method} failed: {error}"));
        }
        response
            .result
            .filter(|result| !result.is_null())
            .ok_or_else(|| anyhow!("no result for {method}"))
    }

    async fn call(&self, to: Address, data: Vec<u8>, block: &BlockRef) -> Result<Vec<u8>> {
        let params = json!([
            { "to": to, "data": format!("0x{}", hex::encode(&data)) },
            block.hash,
        ]);
        let result = self.request("eth_call", params).await?;
        let bytes = result
            .as_str()
            .ok_or_else(|| anyhow!("eth_call result is not a string: {result}"))?;
        hex::decode(bytes.trim_start_matches("0x")).context("eth_call result hex")
    }

    fn parse_quantity(value: &Value, context: &str) -> Result<u64> {
        let string = value
            .as_str()
            .ok_or_else(|| anyhow!("{context} is not a string: {value}"))?;
        u64::from_str_radix(string.trim_start_matches("0x"), 16)
            .with_context(|| format!("{context} quantity {string}"))
    }

    fn decode_function_result_string<T>(
        res: Vec<u8>,
        encoder: FunctionEncoder<T, (String,)>,
    ) -> Option<String>
    where
        T: Encode + Decode,
    {
        match encoder.decode_returns(&res) {
            Ok(decoded_string) => Some(decoded_string.0.replace('\0', "")),
            Err(err) => {
                if !res.is_empty() {
                    // Only log if result is non-empty
                    tracing::warn!("failed to decode bytes {:?} with {}", res, err);
                }
                None
            }
        }
    }
}

#[async_trait]
impl NodeReading for Client {
    async fn block_number(&self) -> Result<u64> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        Self::parse_quantity(&result, "head height")
    }

    async fn block_by_number(&self, height: u64) -> Result<BlockRef> {
        let result = self
            .request(
                "eth_getBlockByNumber",
                json!([format!("0x{height:x}"), false]),
            )
            .await?;
        let number = Self::parse_quantity(
            result.get("number").unwrap_or(&Value::Null),
            "block number",
        )?;
        let hash = result
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("block {height} has no hash"))?;
        Ok(BlockRef {
            number,
            hash: hash.to_string(),
        })
    }

    async fn token_uri(&self, token: &NftId, block: &BlockRef) -> Result<String> {
        let bytes = self
            .call(
                token.address,
                TOKEN_URI.encode_params(&(token.token_id.0,)),
                block,
            )
            .await
            .with_context(|| format!("tokenURI for {token}"))?;
        match TOKEN_URI.decode_returns(&bytes) {
            Ok((uri,)) => Ok(uri.replace('\0', "")),
            Err(err) => Err(anyhow!("failed to decode tokenURI for {token}: {err}")),
        }
    }

    async fn name(&self, contract: Address, block: &BlockRef) -> Option<String> {
        match self.call(contract, NAME.encode_params(&()), block).await {
            Ok(bytes) => Self::decode_function_result_string(bytes, NAME),
            Err(err) => {
                tracing::debug!("name for {contract} unavailable: {err:#}");
                None
            }
        }
    }

    async fn symbol(&self, contract: Address, block: &BlockRef) -> Option<String> {
        match self.call(contract, SYMBOL.encode_params(&()), block).await {
            Ok(bytes) => Self::decode_function_result_string(bytes, SYMBOL),
            Err(err) => {
                tracing::debug!("symbol for {contract} unavailable: {err:#}");
                None
            }
        }
    }
}
