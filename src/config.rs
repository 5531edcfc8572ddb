//! Hook Configuration - passed from the embedding layer

use crate::core::events::SELF_PAYMENT_LOVELACE;

/// Target Cardano network. Fixed for the lifetime of a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network { #[default] Mainnet, Preprod, Preview }

impl Network {
    /// Name understood by the tx-building service.
    pub fn as_str(&self) -> &'static str {
        match self { Network::Mainnet => "Mainnet", Network::Preprod => "Preprod", Network::Preview => "Preview" }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Network::Mainnet),
            "preprod" => Some(Network::Preprod),
            "preview" => Some(Network::Preview),
            _ => None,
        }
    }

    /// CIP-30 `getNetworkId` value: 1 for mainnet, 0 for every testnet.
    pub fn network_id(&self) -> u8 {
        match self { Network::Mainnet => 1, Network::Preprod | Network::Preview => 0 }
    }
}

/// Hook configuration. The embedding layer constructs this.
#[derive(Debug, Clone)]
pub struct HookConfig {
    pub network: Network,
    pub lovelace: u64,
}

impl Default for HookConfig {
    fn default() -> Self { Self { network: Network::default(), lovelace: SELF_PAYMENT_LOVELACE } }
}

impl HookConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_network(mut self, network: Network) -> Self { self.network = network; self }
    pub fn with_lovelace(mut self, lovelace: u64) -> Self { self.lovelace = lovelace; self }
}
