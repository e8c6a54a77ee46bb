//! Various data structures

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

mod policy;
mod rental;

pub use policy::*;
pub use rental::*;

/// Hex account address, `0x` prefixed.
#[derive(
    Default, Serialize, Deserialize, Debug, Display, Clone, PartialEq, Eq, Hash, Ord, PartialOrd,
)]
pub struct AccountAddress(pub String);

impl AccountAddress {
    /// Prefix shown in tables where the full address does not fit.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(6) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        AccountAddress(s)
    }
}
impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        AccountAddress(s.into())
    }
}

impl FromStr for AccountAddress {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix("0x") else {
            anyhow::bail!("account address {s} is missing the 0x prefix");
        };
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("account address {s} is not hex");
        }
        Ok(AccountAddress(s.to_lowercase()))
    }
}

#[derive(
    Default, Serialize, Deserialize, Debug, Display, Clone, PartialEq, Eq, Hash, Ord, PartialOrd,
)]
pub struct TxHash(pub String);

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        TxHash(s)
    }
}
impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        TxHash(s.into())
    }
}

/// A transaction the network has applied, successfully or not.
#[serde_with::serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransaction {
    pub hash: TxHash,
    #[serde_as(as = "serde_with::PickFirst<(serde_with::DisplayFromStr, _)>")]
    pub version: u64,
    pub success: bool,
    pub vm_status: String,
}
