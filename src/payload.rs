//! Wire shapes of contract invocations.

use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use serde::Serialize;
use serde_with::{serde_as, DeserializeFromStr, DisplayFromStr, SerializeDisplay};

use crate::model::AccountAddress;

/// Module qualified function name, `address::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct EntryFunctionId {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
}

impl Display for EntryFunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)
    }
}

impl FromStr for EntryFunctionId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split("::");
        let (Some(address), Some(module), Some(name), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            anyhow::bail!("{s} is not of the form address::module::function");
        };
        Ok(EntryFunctionId {
            address: address
                .parse()
                .context(format!("parsing function id {s}"))?,
            module: module.to_string(),
            name: name.to_string(),
        })
    }
}

/// Positional argument of an entry or view function.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MoveArg {
    Address(AccountAddress),
    // The fullnode JSON API takes u64 as decimal strings
    U64(#[serde_as(as = "DisplayFromStr")] u64),
    Bool(bool),
    String(String),
}

impl From<u64> for MoveArg {
    fn from(v: u64) -> Self {
        MoveArg::U64(v)
    }
}
impl From<bool> for MoveArg {
    fn from(v: bool) -> Self {
        MoveArg::Bool(v)
    }
}
impl From<AccountAddress> for MoveArg {
    fn from(v: AccountAddress) -> Self {
        MoveArg::Address(v)
    }
}
impl From<&AccountAddress> for MoveArg {
    fn from(v: &AccountAddress) -> Self {
        MoveArg::Address(v.clone())
    }
}
impl From<String> for MoveArg {
    fn from(v: String) -> Self {
        MoveArg::String(v)
    }
}
impl From<&str> for MoveArg {
    fn from(v: &str) -> Self {
        MoveArg::String(v.to_string())
    }
}

/// Invocation descriptor handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "entry_function_payload")]
pub struct EntryFunctionPayload {
    pub function: EntryFunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<MoveArg>,
}

impl EntryFunctionPayload {
    pub fn new(function: EntryFunctionId, arguments: Vec<MoveArg>) -> Self {
        EntryFunctionPayload {
            function,
            type_arguments: vec![],
            arguments,
        }
    }
}
