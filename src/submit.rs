//! Sign, submit and wait for finality.
//!
//! Each submission walks `Idle -> Submitted -> Confirmed` or ends in
//! `Failed`. The state is published on a watch channel so a caller can show
//! a busy indicator while a transaction is `Submitted`, even though
//! [`TransactionSubmitter::submit`] holds the submitter for the whole wait.
//! Waiting has no timeout.

use anyhow::anyhow;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    error::{ClientError, ErrorCategory},
    model::{CommittedTransaction, TxHash},
    payload::EntryFunctionPayload,
    rest::FullnodeApi,
    wallet::Session,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitted(TxHash),
    Confirmed(CommittedTransaction),
    Failed(ErrorCategory),
}

impl SubmissionState {
    fn can_become(&self, next: &SubmissionState) -> bool {
        matches!(
            (self, next),
            (SubmissionState::Idle, SubmissionState::Submitted(_))
                | (SubmissionState::Idle, SubmissionState::Failed(_))
                | (SubmissionState::Submitted(_), SubmissionState::Confirmed(_))
                | (SubmissionState::Submitted(_), SubmissionState::Failed(_))
        )
    }

    /// Busy indicator: true exactly while waiting for finality.
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Submitted(_))
    }
}

/// Read side of a submitter's state, usable while a submission is running.
pub type SubmissionWatch = watch::Receiver<SubmissionState>;

pub struct TransactionSubmitter<N> {
    node: N,
    session: Session,
    state: watch::Sender<SubmissionState>,
}

impl<N: FullnodeApi> TransactionSubmitter<N> {
    pub fn new(node: N, session: Session) -> Self {
        TransactionSubmitter {
            node,
            session,
            state: watch::Sender::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    pub fn subscribe(&self) -> SubmissionWatch {
        self.state.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn transition(&self, next: SubmissionState) {
        self.state.send_modify(|state| {
            debug_assert!(
                state.can_become(&next),
                "illegal submission transition {:?} -> {:?}",
                state,
                next
            );
            debug!("Submission {:?} -> {:?}", state, next);
            *state = next;
        });
    }

    fn fail(&self, err: ClientError) -> ClientError {
        self.transition(SubmissionState::Failed(err.category()));
        err
    }

    /// Submits `payload` through the session's wallet and waits until the
    /// network has committed it.
    pub async fn submit(
        &mut self,
        payload: &EntryFunctionPayload,
    ) -> Result<CommittedTransaction, ClientError> {
        self.state.send_replace(SubmissionState::Idle);

        if let Err(e) = self.session.account() {
            return Err(self.fail(ClientError::SubmissionFailed(e.into())));
        }

        let pending = match self.session.sign_and_submit(payload).await {
            Ok(pending) => pending,
            Err(e) => return Err(self.fail(e.into())),
        };
        info!("📤 Submitted {} as {}", payload.function, pending.hash);
        self.transition(SubmissionState::Submitted(pending.hash.clone()));

        let committed = match self.node.wait_for_transaction(&pending.hash).await {
            Ok(committed) => committed,
            Err(e) => {
                return Err(self.fail(ClientError::SubmissionFailed(
                    e.context(format!("waiting for {}", pending.hash)),
                )))
            }
        };

        if !committed.success {
            return Err(self.fail(ClientError::SubmissionFailed(anyhow!(
                "{} aborted in transaction {}: {}",
                payload.function,
                committed.hash,
                committed.vm_status
            ))));
        }

        info!("✅ {} committed at version {}", committed.hash, committed.version);
        self.transition(SubmissionState::Confirmed(committed.clone()));
        Ok(committed)
    }
}
