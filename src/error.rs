//! Error types for the hook and its two boundaries (wallet, tx service)

use thiserror::Error;

/// Every failure the hook can report to the peer. Serialized only at the
/// boundary, via [`BridgeError::kind`] and `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Wallet '{0}' not found")]
    ProviderNotFound(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Network query failed: {0}")]
    NetworkQueryFailed(String),

    #[error("Connection to '{0}' superseded")]
    ConnectionSuperseded(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("A transaction is already in progress")]
    SendInProgress,

    #[error("Transaction context init failed: {0}")]
    ContextInitFailed(String),

    #[error("Address resolution failed: {0}")]
    AddressResolutionFailed(String),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
}

impl BridgeError {
    /// Stable wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::ProviderNotFound(_) => "provider_not_found",
            BridgeError::AuthorizationFailed(_) => "authorization_failed",
            BridgeError::NetworkQueryFailed(_) => "network_query_failed",
            BridgeError::ConnectionSuperseded(_) => "connection_superseded",
            BridgeError::NotConnected => "not_connected",
            BridgeError::SendInProgress => "send_in_progress",
            BridgeError::ContextInitFailed(_) => "context_init_failed",
            BridgeError::AddressResolutionFailed(_) => "address_resolution_failed",
            BridgeError::BuildFailed(_) => "build_failed",
            BridgeError::SigningRejected(_) => "signing_rejected",
            BridgeError::SigningFailed(_) => "signing_failed",
            BridgeError::SubmissionFailed(_) => "submission_failed",
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

/// CIP-30 error codes. `APIError` and `TxSignError` share the numeric space
/// loosely, so each has its own decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletErrorCode {
    InvalidRequest,
    InternalError,
    Refused,
    AccountChange,
    ProofGeneration,
    UserDeclined,
    Unknown,
}

impl WalletErrorCode {
    /// APIError: -1 InvalidRequest, -2 InternalError, -3 Refused, -4 AccountChange
    pub fn from_api_code(code: i64) -> Self {
        match code {
            -1 => Self::InvalidRequest,
            -2 => Self::InternalError,
            -3 => Self::Refused,
            -4 => Self::AccountChange,
            _ => Self::Unknown,
        }
    }

    /// TxSignError: 1 ProofGeneration, 2 UserDeclined
    pub fn from_sign_code(code: i64) -> Self {
        match code {
            1 => Self::ProofGeneration,
            2 => Self::UserDeclined,
            other => Self::from_api_code(other),
        }
    }

    /// The user (or the extension on their behalf) said no.
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Refused | Self::UserDeclined)
    }
}

/// Failure raised by a wallet extension call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{info}")]
pub struct WalletError {
    pub code: WalletErrorCode,
    pub info: String,
}

impl WalletError {
    pub fn new(code: WalletErrorCode, info: impl Into<String>) -> Self {
        Self { code, info: info.into() }
    }

    pub fn declined(info: impl Into<String>) -> Self { Self::new(WalletErrorCode::UserDeclined, info) }
    pub fn refused(info: impl Into<String>) -> Self { Self::new(WalletErrorCode::Refused, info) }
    pub fn internal(info: impl Into<String>) -> Self { Self::new(WalletErrorCode::InternalError, info) }
}

/// Failure raised by the transaction-building service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(msg: impl Into<String>) -> Self { Self(msg.into()) }
}

impl From<WalletError> for ServiceError {
    fn from(e: WalletError) -> Self { Self(e.info) }
}
