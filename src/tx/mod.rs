//! Transaction module - wallet-bound context and the self-payment pipeline
//!
//! ```text
//! send_to_self ─► ensure_context ─► address ─► build ─► sign ─► submit ─► TxHash
//!                     │
//!                     └── TxBuilder::bind(handle, network), memoized per HandleId
//! ```
//!
//! Any failing step short-circuits into a single [`BridgeError`](crate::BridgeError).

mod pipeline;
mod service;

pub use pipeline::TxPipeline;
pub use service::{PaymentIntent, TxBuilder, TxContext, TxHash};
