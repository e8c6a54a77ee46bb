//! The wallet boundary. Keys never cross it: the wallet signs and submits,
//! we only get the pending transaction hash back.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    model::{AccountAddress, TxHash},
    payload::EntryFunctionPayload,
};

/// Code wallets report when the user declines to sign (EIP-1193 convention).
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet returned code {code}: {message}")]
    Rejected { code: i64, message: String },
    #[error("no wallet account connected")]
    NotConnected,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WalletError {
    pub fn user_rejected() -> Self {
        WalletError::Rejected {
            code: USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, WalletError::Rejected { code, .. } if *code == USER_REJECTED_CODE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
}

#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connected account, if any.
    fn address(&self) -> Option<AccountAddress>;

    async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError>;
}

/// Session capability handed to everything that acts on behalf of the user.
#[derive(Clone)]
pub struct Session {
    wallet: Arc<dyn Wallet>,
}

impl Session {
    pub fn new(wallet: impl Wallet + 'static) -> Self {
        Session {
            wallet: Arc::new(wallet),
        }
    }

    /// A session with no account, for read-only use.
    pub fn disconnected() -> Self {
        Session::new(Disconnected)
    }

    pub fn address(&self) -> Option<AccountAddress> {
        self.wallet.address()
    }

    pub fn account(&self) -> Result<AccountAddress, WalletError> {
        self.wallet.address().ok_or(WalletError::NotConnected)
    }

    pub async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError> {
        self.wallet.sign_and_submit(payload).await
    }
}

struct Disconnected;

#[async_trait]
impl Wallet for Disconnected {
    fn address(&self) -> Option<AccountAddress> {
        None
    }

    async fn sign_and_submit(
        &self,
        _payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError> {
        Err(WalletError::NotConnected)
    }
}
