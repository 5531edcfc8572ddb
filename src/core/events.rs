//! Event name constants for the hook protocol
//!
//! Centralized registry for every event crossing the peer channel.

/// Peer → hook
pub mod inbound {
    pub const CONNECT_WALLET: &str = "connect_wallet";
    pub const DISCONNECT_WALLET: &str = "disconnect_wallet";
    pub const SEND_TO_SELF: &str = "send_to_self";
}

/// Hook → peer
pub mod outbound {
    pub const WALLETS_AVAILABLE: &str = "wallets_available";
    pub const WALLET_CONNECTED: &str = "wallet_connected";
    pub const TX_SUBMITTED: &str = "tx_submitted";
    pub const TX_ERROR: &str = "tx_error";
}

pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// 2 ADA: 1 ADA min-UTxO plus a fee buffer
pub const SELF_PAYMENT_LOVELACE: u64 = 2 * LOVELACE_PER_ADA;
