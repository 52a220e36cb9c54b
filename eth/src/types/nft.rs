use crate::types::{Address, U256};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct NftId {
    pub address: Address,
    pub token_id: U256,
}

impl Display for NftId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address.0, self.token_id.0)
    }
}

impl FromStr for NftId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, token_id) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("expected ADDRESS/TOKEN_ID, got {s}"))?;
        Ok(Self {
            address: address.parse().map_err(|_| anyhow!("bad address in {s}"))?,
            token_id: U256::from_dec_str(token_id).with_context(|| format!("bad token id in {s}"))?,
        })
    }
}
