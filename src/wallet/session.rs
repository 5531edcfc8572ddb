//! WalletSession - connection state machine and the single live handle

use super::provider::{ProviderRegistry, WalletApi, WalletProvider};
use crate::error::{BridgeError, BridgeResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState { #[default] Disconnected, Connecting, Connected, Disconnecting }

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Disconnecting => "disconnecting",
        }
    }
}

/// Identity of one acquired handle. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

/// The live wallet capability plus where it came from.
pub struct WalletHandle<A> {
    pub id: HandleId,
    pub wallet: String,
    pub api: Rc<A>,
}

impl<A> Clone for WalletHandle<A> {
    fn clone(&self) -> Self { Self { id: self.id, wallet: self.wallet.clone(), api: self.api.clone() } }
}

/// Result of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub wallet: String,
    pub network_id: u8,
}

pub struct WalletSession<P: WalletProvider> {
    registry: ProviderRegistry<P>,
    state: Cell<SessionState>,
    handle: RefCell<Option<WalletHandle<P::Api>>>,
    next_handle: Cell<u64>,
    // Bumped by every connect attempt and every disconnect; a suspended
    // connect only commits if it is still the latest operation.
    epoch: Cell<u64>,
}

impl<P: WalletProvider> WalletSession<P> {
    pub fn new(registry: ProviderRegistry<P>) -> Self {
        Self {
            registry,
            state: Cell::new(SessionState::Disconnected),
            handle: RefCell::new(None),
            next_handle: Cell::new(0),
            epoch: Cell::new(0),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry<P> { &self.registry }
    pub fn state(&self) -> SessionState { self.state.get() }
    pub fn is_connected(&self) -> bool { self.handle.borrow().is_some() }
    pub fn current(&self) -> Option<WalletHandle<P::Api>> { self.handle.borrow().clone() }

    /// Connectable provider names, in registry order. Never fails.
    pub fn discover(&self) -> Vec<String> {
        let wallets = self.registry.connectable();
        debug!(total = self.registry.len(), connectable = wallets.len(), "Discovered wallet providers");
        wallets
    }

    pub async fn connect(&self, name: &str) -> BridgeResult<Connection> {
        let provider = self.registry.get(name).ok_or_else(|| BridgeError::ProviderNotFound(name.to_string()))?;

        // Replacing: the old handle is abandoned, CIP-30 has no revoke.
        if self.handle.borrow_mut().take().is_some() {
            debug!(wallet = name, "Dropping previous wallet handle");
        }
        let epoch = self.bump_epoch();
        self.state.set(SessionState::Connecting);
        info!(wallet = name, "Connecting wallet");

        let result = async {
            let api = provider.enable().await.map_err(|e| BridgeError::AuthorizationFailed(e.info))?;
            let network_id = api.network_id().await.map_err(|e| BridgeError::NetworkQueryFailed(e.info))?;
            Ok::<_, BridgeError>((api, network_id))
        }
        .await;

        if self.epoch.get() != epoch {
            warn!(wallet = name, "Connect attempt superseded, discarding result");
            return Err(BridgeError::ConnectionSuperseded(name.to_string()));
        }

        match result {
            Ok((api, network_id)) => {
                let id = HandleId(self.next_handle.get() + 1);
                self.next_handle.set(id.0);
                *self.handle.borrow_mut() = Some(WalletHandle { id, wallet: name.to_string(), api: Rc::new(api) });
                self.state.set(SessionState::Connected);
                info!(wallet = name, network_id, handle = id.0, "Wallet connected");
                Ok(Connection { wallet: name.to_string(), network_id })
            }
            Err(e) => {
                self.state.set(SessionState::Disconnected);
                warn!(wallet = name, error = %e, "Wallet connection failed");
                Err(e)
            }
        }
    }

    /// Release the handle. Idempotent; returns whether one was held.
    pub fn disconnect(&self) -> bool {
        self.bump_epoch();
        self.state.set(SessionState::Disconnecting);
        let released = self.handle.borrow_mut().take();
        self.state.set(SessionState::Disconnected);
        if let Some(h) = &released {
            info!(wallet = %h.wallet, handle = h.id.0, "Wallet disconnected");
        }
        released.is_some()
    }

    fn bump_epoch(&self) -> u64 {
        let next = self.epoch.get() + 1;
        self.epoch.set(next);
        next
    }
}
