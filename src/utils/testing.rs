//! In-memory stand-ins for the fullnode and the wallet.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::{
    model::{AccountAddress, CommittedTransaction, TxHash},
    payload::EntryFunctionPayload,
    rest::FullnodeApi,
    view::{ViewFunction, ViewRequest},
    wallet::{PendingTransaction, Wallet, WalletError},
};

#[derive(Clone, Default)]
pub struct MockFullnode {
    views: Arc<Mutex<HashMap<String, Vec<serde_json::Value>>>>,
    view_error: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<ViewRequest>>>,
    aborted: Arc<Mutex<Option<String>>>,
    waited: Arc<Mutex<Vec<TxHash>>>,
    finality_delay: Arc<Mutex<Duration>>,
}

impl MockFullnode {
    pub fn set_view(&self, function: ViewFunction, slots: Vec<serde_json::Value>) {
        let name: &'static str = function.into();
        self.views.lock().unwrap().insert(name.to_string(), slots);
    }

    pub fn fail_views(&self, message: &str) {
        *self.view_error.lock().unwrap() = Some(message.to_string());
    }

    /// Committed transactions will report a failed execution with this status.
    pub fn abort_transactions(&self, vm_status: &str) {
        *self.aborted.lock().unwrap() = Some(vm_status.to_string());
    }

    /// Transactions take this long to commit.
    pub fn delay_transactions(&self, delay: Duration) {
        *self.finality_delay.lock().unwrap() = delay;
    }

    pub fn view_requests(&self) -> Vec<ViewRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn view_count(&self, function: ViewFunction) -> usize {
        let name: &'static str = function.into();
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.function.name == name)
            .count()
    }

    pub fn waited_for(&self) -> Vec<TxHash> {
        self.waited.lock().unwrap().clone()
    }
}

#[async_trait]
impl FullnodeApi for MockFullnode {
    async fn view(&self, request: &ViewRequest) -> Result<Vec<serde_json::Value>> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = self.view_error.lock().unwrap().clone() {
            bail!("{message}");
        }
        Ok(self
            .views
            .lock()
            .unwrap()
            .get(&request.function.name)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_for_transaction(&self, hash: &TxHash) -> Result<CommittedTransaction> {
        self.waited.lock().unwrap().push(hash.clone());
        let delay = *self.finality_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let aborted = self.aborted.lock().unwrap().clone();
        Ok(CommittedTransaction {
            hash: hash.clone(),
            version: 1,
            success: aborted.is_none(),
            vm_status: aborted.unwrap_or_else(|| "Executed successfully".to_string()),
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum WalletBehaviour {
    Sign,
    Reject,
    Fail,
}

#[derive(Clone)]
pub struct MockWallet {
    address: Option<AccountAddress>,
    behaviour: WalletBehaviour,
    signed: Arc<Mutex<Vec<EntryFunctionPayload>>>,
}

impl MockWallet {
    pub fn new(address: &str, behaviour: WalletBehaviour) -> Self {
        MockWallet {
            address: Some(address.into()),
            behaviour,
            signed: Arc::default(),
        }
    }

    pub fn signed(&self) -> Vec<EntryFunctionPayload> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Option<AccountAddress> {
        self.address.clone()
    }

    async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError> {
        match self.behaviour {
            WalletBehaviour::Reject => Err(WalletError::user_rejected()),
            WalletBehaviour::Fail => Err(anyhow::anyhow!("wallet extension crashed").into()),
            WalletBehaviour::Sign => {
                let mut signed = self.signed.lock().unwrap();
                signed.push(payload.clone());
                Ok(PendingTransaction {
                    hash: TxHash(format!("0x{:064x}", signed.len())),
                })
            }
        }
    }
}
