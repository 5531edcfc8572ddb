//! cardano-hook: CIP-30 wallet bridge for server-driven UIs.
//!
//! A hook bound to one UI element discovers the browser's Cardano wallets,
//! connects to one, and sends a fixed self-payment through it. Every outcome
//! goes back to the server peer as exactly one event.
//!
//! # Architecture
//!
//! ```text
//! peer (server UI process)
//!   │  connect_wallet / disconnect_wallet / send_to_self
//!   ▼
//! WalletHook ──────────────────────────────► EventSink (reports)
//!   │
//!   ├── WalletSession (wallet)
//!   │     ├── ProviderRegistry (captured at mount)
//!   │     └── WalletHandle (at most one)
//!   │
//!   └── TxPipeline (tx)
//!         └── TxContext (memoized per handle)
//!               address → build → sign → submit
//! ```
//!
//! # Events
//!
//! | Direction | Event | Payload |
//! |-----------|-------|---------|
//! | in | `connect_wallet` | `{wallet}` |
//! | in | `disconnect_wallet` | none |
//! | in | `send_to_self` | none |
//! | out | `wallets_available` | `{wallets}` |
//! | out | `wallet_connected` | `{ok, wallet?, networkId?, error?, kind?}` |
//! | out | `tx_submitted` | `{txHash}` |
//! | out | `tx_error` | `{error, kind}` |
//!
//! # Features
//!
//! - `native` - tracing subscriber, simulated wallet backend, CLI
//! - `wasm` - browser bindings (`window.cardano`, JS tx service)
//!
//! # Usage
//!
//! ```ignore
//! use cardano_hook::{ChannelSink, HookConfig, WalletHook};
//!
//! let (sink, reports) = ChannelSink::new();
//! let hook = WalletHook::new(registry, tx_service, sink, HookConfig::new());
//! hook.mounted();
//! hook.handle_event("connect_wallet", json!({"wallet": "nami"})).await;
//! hook.handle_event("send_to_self", Value::Null).await;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod core;
pub mod error;
pub mod hook;
pub mod tx;
pub mod wallet;

#[cfg(any(feature = "native", feature = "wasm"))]
pub mod logging;

// =============================================================================
// Native-only modules (CLI, tests, tokio)
// =============================================================================
#[cfg(feature = "native")]
pub mod sim;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use config::{HookConfig, Network};
pub use core::protocol::{Intent, Report};
pub use error::{BridgeError, BridgeResult, ServiceError, WalletError, WalletErrorCode};
pub use hook::{ChannelSink, EventSink, WalletHook};
pub use tx::{PaymentIntent, TxBuilder, TxContext, TxHash, TxPipeline};
pub use wallet::{HandleId, ProviderRegistry, SessionState, WalletApi, WalletHandle, WalletProvider, WalletSession};

#[cfg(feature = "wasm")]
pub use wasm::CardanoHook;
