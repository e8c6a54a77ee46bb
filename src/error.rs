//! Failure taxonomy of the client and how each failure is surfaced.

use derive_more::Display;
use tracing::{error, info, warn};

use crate::{amount::AmountError, wallet::WalletError};

pub const USER_REJECTED_MESSAGE: &str = "Transaction rejected by user.";
pub const OPERATION_FAILED_MESSAGE: &str = "Transaction failed. Please try again.";
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transaction rejected by user")]
    UserRejected,
    #[error("transaction submission failed: {0:#}")]
    SubmissionFailed(anyhow::Error),
    #[error("view query failed: {0:#}")]
    QueryFailed(anyhow::Error),
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

/// What the user should be told, as opposed to what went wrong.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserRejected,
    OperationFailed,
}

impl From<WalletError> for ClientError {
    fn from(e: WalletError) -> Self {
        if e.is_user_rejection() {
            ClientError::UserRejected
        } else {
            ClientError::SubmissionFailed(e.into())
        }
    }
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::UserRejected => ErrorCategory::UserRejected,
            ClientError::SubmissionFailed(e) | ClientError::QueryFailed(e) => classify(e),
            ClientError::InvalidAmount(_) => ErrorCategory::OperationFailed,
        }
    }

    /// Logs the failure at the level its category calls for and returns
    /// the notification to show.
    pub fn notify(&self, action: &str) -> Notification {
        if let ClientError::InvalidAmount(e) = self {
            warn!("{action}: {e}");
            return Notification::error(INVALID_AMOUNT_MESSAGE);
        }
        match self.category() {
            ErrorCategory::UserRejected => {
                info!("{action}: {self}");
                Notification::warning(USER_REJECTED_MESSAGE)
            }
            ErrorCategory::OperationFailed => {
                error!("{action}: {self}");
                Notification::error(OPERATION_FAILED_MESSAGE)
            }
        }
    }
}

/// Looks through the whole error chain for a wallet rejection.
pub fn classify(err: &anyhow::Error) -> ErrorCategory {
    let rejected = err.chain().any(|cause| {
        cause
            .downcast_ref::<WalletError>()
            .is_some_and(WalletError::is_user_rejection)
            || matches!(
                cause.downcast_ref::<ClientError>(),
                Some(ClientError::UserRejected)
            )
    });
    if rejected {
        ErrorCategory::UserRejected
    } else {
        ErrorCategory::OperationFailed
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("[{severity}] {message}")]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Success,
            message: message.into(),
        }
    }
    pub fn warning(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}
