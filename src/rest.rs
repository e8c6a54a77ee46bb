//! Access to a fullnode's REST API.

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    model::{CommittedTransaction, TxHash},
    view::ViewRequest,
};

pub mod client;

/// The two network operations the client needs. Implemented over HTTP by
/// [`client::FullnodeApiHttpClient`].
#[async_trait]
pub trait FullnodeApi: Send + Sync {
    /// Runs a view function and returns its raw result slots.
    async fn view(&self, request: &ViewRequest) -> Result<Vec<serde_json::Value>>;

    /// Blocks until the transaction is committed. There is no timeout.
    async fn wait_for_transaction(&self, hash: &TxHash) -> Result<CommittedTransaction>;
}
