//! Wallet module - CIP-30 providers and the connection session
//!
//! # Architecture
//!
//! ```text
//! ProviderRegistry (captured once at mount)
//!     │
//!     ├── connectable() ──► wallets_available
//!     │
//!     └── get(name) ──► WalletProvider::enable()
//!                              │
//!                              ▼
//!                      WalletSession (single live handle)
//!                              │
//!                              ▼
//!                      WalletHandle { id, wallet, api }
//! ```
//!
//! # Session States
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Disconnected | connect | Connecting |
//! | Connecting | enable + network ok | Connected |
//! | Connecting | any failure | Disconnected |
//! | Connected | connect | Connecting (old handle dropped) |
//! | any | disconnect | Disconnecting → Disconnected |

mod provider;
mod session;

pub use provider::{parse_network_id, ProviderRegistry, WalletApi, WalletProvider};
pub use session::{Connection, HandleId, SessionState, WalletHandle, WalletSession};
