//! Protocol: typed intents and reports exchanged with the peer
//!
//! Inbound events are parsed into [`Intent`]; outbound [`Report`]s become an
//! event name plus a JSON payload. Mount is implicit and has no intent.

use super::events::{inbound, outbound};
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Connect { wallet: String },
    Disconnect,
    SendToSelf,
}

#[derive(Debug, Deserialize)]
struct ConnectPayload {
    #[serde(default)]
    wallet: String,
}

impl Intent {
    /// Parse an inbound event. Unknown names yield `None`.
    pub fn from_event(event: &str, payload: Value) -> Option<Self> {
        match event {
            inbound::CONNECT_WALLET => {
                let wallet = match payload {
                    Value::Null => String::new(),
                    payload => match serde_json::from_value::<ConnectPayload>(payload) {
                        Ok(parsed) => parsed.wallet,
                        Err(e) => {
                            warn!(error = %e, "Malformed connect_wallet payload");
                            String::new()
                        }
                    },
                };
                Some(Intent::Connect { wallet })
            }
            inbound::DISCONNECT_WALLET => Some(Intent::Disconnect),
            inbound::SEND_TO_SELF => Some(Intent::SendToSelf),
            _ => None,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Intent::Connect { .. } => inbound::CONNECT_WALLET,
            Intent::Disconnect => inbound::DISCONNECT_WALLET,
            Intent::SendToSelf => inbound::SEND_TO_SELF,
        }
    }
}

/// `wallet_connected` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connected {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wallet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub network_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    WalletsAvailable { wallets: Vec<String> },
    WalletConnected(Connected),
    TxSubmitted { tx_hash: String },
    TxError { error: String, kind: String },
}

impl Report {
    pub fn connected(wallet: &str, network_id: u8) -> Self {
        Report::WalletConnected(Connected {
            ok: true,
            wallet: Some(wallet.to_string()),
            network_id: Some(network_id),
            error: None,
            kind: None,
        })
    }

    pub fn connect_failed(err: &BridgeError) -> Self {
        Report::WalletConnected(Connected {
            ok: false,
            wallet: None,
            network_id: None,
            error: Some(err.to_string()),
            kind: Some(err.kind().to_string()),
        })
    }

    pub fn tx_error(err: &BridgeError) -> Self {
        Report::TxError { error: err.to_string(), kind: err.kind().to_string() }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Report::WalletsAvailable { .. } => outbound::WALLETS_AVAILABLE,
            Report::WalletConnected(_) => outbound::WALLET_CONNECTED,
            Report::TxSubmitted { .. } => outbound::TX_SUBMITTED,
            Report::TxError { .. } => outbound::TX_ERROR,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Report::WalletsAvailable { wallets } => serde_json::json!({"wallets": wallets}),
            Report::WalletConnected(c) => serde_json::to_value(c).unwrap_or(Value::Null),
            Report::TxSubmitted { tx_hash } => serde_json::json!({"txHash": tx_hash}),
            Report::TxError { error, kind } => serde_json::json!({"error": error, "kind": kind}),
        }
    }

    /// `{"event": ..., "payload": ...}` framing used by line-oriented peers.
    pub fn to_frame(&self) -> Value {
        serde_json::json!({"event": self.event_name(), "payload": self.payload()})
    }
}
