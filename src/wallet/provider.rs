//! Wallet boundary: CIP-30 provider + API traits and the provider registry

use crate::error::{WalletError, WalletErrorCode};
use async_trait::async_trait;

/// Session-scoped capability returned by `enable`.
#[async_trait(?Send)]
pub trait WalletApi {
    /// 1 mainnet, 0 testnets.
    async fn network_id(&self) -> Result<u8, WalletError>;
    async fn used_addresses(&self) -> Result<Vec<String>, WalletError>;
    async fn change_address(&self) -> Result<String, WalletError>;
    /// Returns the witness set (CBOR hex) for `tx_cbor`.
    async fn sign_tx(&self, tx_cbor: &str, partial: bool) -> Result<String, WalletError>;
    /// Returns the transaction id.
    async fn submit_tx(&self, tx_cbor: &str) -> Result<String, WalletError>;
}

/// Validate a `getNetworkId` result: a whole number in `0..=255`.
pub fn parse_network_id(raw: f64) -> Result<u8, WalletError> {
    if raw.fract() == 0.0 && (0.0..=255.0).contains(&raw) {
        Ok(raw as u8)
    } else {
        Err(WalletError::new(WalletErrorCode::InvalidRequest, format!("getNetworkId returned {}", raw)))
    }
}

/// A named wallet extension entry (`window.cardano.<name>`).
#[async_trait(?Send)]
pub trait WalletProvider {
    type Api: WalletApi;

    /// Capability predicate: does this entry expose `enable`?
    fn supports_enable(&self) -> bool;

    /// Ask for authorization. May prompt the user.
    async fn enable(&self) -> Result<Self::Api, WalletError>;
}

/// Ordered snapshot of providers, captured once at mount.
pub struct ProviderRegistry<P> {
    entries: Vec<(String, P)>,
}

impl<P: WalletProvider> ProviderRegistry<P> {
    pub fn new(entries: Vec<(String, P)>) -> Self { Self { entries } }
    pub fn empty() -> Self { Self { entries: Vec::new() } }

    /// Names of connectable entries, in registry order.
    pub fn connectable(&self) -> Vec<String> {
        self.entries.iter().filter(|(_, p)| p.supports_enable()).map(|(n, _)| n.clone()).collect()
    }

    /// Look up a connectable entry. Entries without `enable` are invisible.
    pub fn get(&self, name: &str) -> Option<&P> {
        if name.is_empty() { return None; }
        self.entries.iter().find(|(n, p)| n == name && p.supports_enable()).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<P: WalletProvider> FromIterator<(String, P)> for ProviderRegistry<P> {
    fn from_iter<I: IntoIterator<Item = (String, P)>>(iter: I) -> Self { Self::new(iter.into_iter().collect()) }
}
