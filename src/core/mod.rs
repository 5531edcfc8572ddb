//! Shared protocol definitions (compile everywhere)

pub mod events;
pub mod protocol;
