//! Tx-building boundary: bind a context to a wallet, then build → sign → submit

use crate::config::Network;
use crate::error::{ServiceError, WalletError};
use crate::wallet::WalletApi;
use async_trait::async_trait;
use std::fmt;
use std::rc::Rc;

/// Single-output payment. Always built fresh, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub destination: String,
    pub lovelace: u64,
}

impl PaymentIntent {
    pub fn to_self(address: String, lovelace: u64) -> Self { Self { destination: address, lovelace } }
}

/// Submission identifier returned by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Wallet-bound transaction context. Each step hands its output to the next.
#[async_trait(?Send)]
pub trait TxContext {
    type Unsigned: 'static;
    type Signed: 'static;

    /// The wallet's own receiving address.
    async fn address(&self) -> Result<String, ServiceError>;
    async fn build(&self, intent: &PaymentIntent) -> Result<Self::Unsigned, ServiceError>;
    /// Signing goes through the wallet, so failures keep the CIP-30 code.
    async fn sign(&self, tx: Self::Unsigned) -> Result<Self::Signed, WalletError>;
    async fn submit(&self, tx: Self::Signed) -> Result<TxHash, ServiceError>;
}

/// Factory for contexts. One bind per wallet handle.
#[async_trait(?Send)]
pub trait TxBuilder {
    type Api: WalletApi;
    type Context: TxContext;

    async fn bind(&self, api: Rc<Self::Api>, network: Network) -> Result<Self::Context, ServiceError>;
}
