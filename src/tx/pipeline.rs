//! TxPipeline - lazily bound context and the send-to-self sequence

use super::service::{PaymentIntent, TxBuilder, TxContext, TxHash};
use crate::config::HookConfig;
use crate::error::{BridgeError, BridgeResult, WalletError};
use crate::wallet::{HandleId, WalletHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) { None } else { Some(Self(flag)) }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) { self.0.set(false); }
}

pub struct TxPipeline<B: TxBuilder> {
    builder: B,
    config: HookConfig,
    context: RefCell<Option<(HandleId, Rc<B::Context>)>>,
    // Bumped on reset; a bind that straddles a reset is not memoized.
    epoch: Cell<u64>,
    in_flight: Cell<bool>,
}

impl<B: TxBuilder> TxPipeline<B> {
    pub fn new(builder: B, config: HookConfig) -> Self {
        Self { builder, config, context: RefCell::new(None), epoch: Cell::new(0), in_flight: Cell::new(false) }
    }

    pub fn config(&self) -> &HookConfig { &self.config }
    pub fn is_sending(&self) -> bool { self.in_flight.get() }

    /// Handle the cached context belongs to, if any.
    pub fn context_handle(&self) -> Option<HandleId> { self.context.borrow().as_ref().map(|(id, _)| *id) }

    /// Drop the cached context. Called whenever the wallet handle changes.
    pub fn reset(&self) {
        self.epoch.set(self.epoch.get() + 1);
        if let Some((id, _)) = self.context.borrow_mut().take() {
            debug!(handle = id.0, "Transaction context discarded");
        }
    }

    pub async fn ensure_context(&self, handle: Option<&WalletHandle<B::Api>>) -> BridgeResult<Rc<B::Context>> {
        let handle = handle.ok_or(BridgeError::NotConnected)?;
        if let Some((id, ctx)) = self.context.borrow().as_ref() {
            if *id == handle.id { return Ok(ctx.clone()); }
        }

        let epoch = self.epoch.get();
        debug!(handle = handle.id.0, network = self.config.network.as_str(), "Binding transaction context");
        let ctx = self.builder.bind(handle.api.clone(), self.config.network).await
            .map_err(|e| BridgeError::ContextInitFailed(e.0))?;
        let ctx = Rc::new(ctx);
        if self.epoch.get() == epoch {
            *self.context.borrow_mut() = Some((handle.id, ctx.clone()));
        }
        Ok(ctx)
    }

    /// Build, sign and submit a fixed payment back to the wallet's own address.
    pub async fn send_to_self(&self, handle: Option<WalletHandle<B::Api>>) -> BridgeResult<TxHash> {
        let handle = handle.ok_or(BridgeError::NotConnected)?;
        let _guard = InFlight::acquire(&self.in_flight).ok_or(BridgeError::SendInProgress)?;

        let result = self.run(&handle).await;
        match &result {
            Ok(hash) => info!(wallet = %handle.wallet, tx_hash = %hash, "Transaction submitted"),
            Err(e) => warn!(wallet = %handle.wallet, kind = e.kind(), error = %e, "Transaction failed"),
        }
        result
    }

    async fn run(&self, handle: &WalletHandle<B::Api>) -> BridgeResult<TxHash> {
        let ctx = self.ensure_context(Some(handle)).await?;

        let address = ctx.address().await.map_err(|e| BridgeError::AddressResolutionFailed(e.0))?;
        debug!(%address, "Resolved wallet address");

        let intent = PaymentIntent::to_self(address, self.config.lovelace);
        let unsigned = ctx.build(&intent).await.map_err(|e| BridgeError::BuildFailed(e.0))?;
        debug!(lovelace = intent.lovelace, "Transaction built");

        let signed = ctx.sign(unsigned).await.map_err(signing_error)?;
        debug!("Transaction signed");

        ctx.submit(signed).await.map_err(|e| BridgeError::SubmissionFailed(e.0))
    }
}

fn signing_error(e: WalletError) -> BridgeError {
    if e.code.is_declined() { BridgeError::SigningRejected(e.info) } else { BridgeError::SigningFailed(e.info) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalletErrorCode;

    #[test]
    fn in_flight_guard_is_exclusive_and_released() {
        let flag = Cell::new(false);
        let first = InFlight::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlight::acquire(&flag).is_none());
        drop(first);
        assert!(!flag.get());
        assert!(InFlight::acquire(&flag).is_some());
    }

    #[test]
    fn declined_signatures_are_rejections() {
        let declined = signing_error(WalletError::declined("user declined"));
        assert_eq!(declined, BridgeError::SigningRejected("user declined".into()));
        let refused = signing_error(WalletError::refused("refused"));
        assert_eq!(refused.kind(), "signing_rejected");
        let proof = signing_error(WalletError::new(WalletErrorCode::ProofGeneration, "no key"));
        assert_eq!(proof, BridgeError::SigningFailed("no key".into()));
    }
}
