//! WalletHook: the component bound to one UI element
//!
//! Owns the session and the pipeline, turns intents into operations and
//! every outcome into exactly one report on the [`EventSink`].

use crate::config::HookConfig;
use crate::core::protocol::{Intent, Report};
use crate::error::BridgeError;
use crate::tx::{TxBuilder, TxPipeline};
use crate::wallet::{ProviderRegistry, SessionState, WalletProvider, WalletSession};
use futures::channel::mpsc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use serde_json::Value;
use std::cell::Cell;
use tracing::{debug, info, warn};

/// Outbound half of the peer channel.
pub trait EventSink {
    fn push_event(&self, report: Report);
}

impl<F: Fn(Report)> EventSink for F {
    fn push_event(&self, report: Report) { self(report) }
}

/// Sink backed by an unbounded channel.
#[derive(Clone)]
pub struct ChannelSink(mpsc::UnboundedSender<Report>);

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Report>) {
        let (tx, rx) = mpsc::unbounded();
        (Self(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn push_event(&self, report: Report) {
        if self.0.unbounded_send(report).is_err() {
            debug!("Peer channel closed, report dropped");
        }
    }
}

pub struct WalletHook<P, B, S>
where
    P: WalletProvider,
    B: TxBuilder<Api = P::Api>,
    S: EventSink,
{
    session: WalletSession<P>,
    pipeline: TxPipeline<B>,
    sink: S,
    mounted: Cell<bool>,
}

impl<P, B, S> WalletHook<P, B, S>
where
    P: WalletProvider,
    B: TxBuilder<Api = P::Api>,
    S: EventSink,
{
    pub fn new(registry: ProviderRegistry<P>, builder: B, sink: S, config: HookConfig) -> Self {
        Self {
            session: WalletSession::new(registry),
            pipeline: TxPipeline::new(builder, config),
            sink,
            mounted: Cell::new(false),
        }
    }

    pub fn session(&self) -> &WalletSession<P> { &self.session }
    pub fn pipeline(&self) -> &TxPipeline<B> { &self.pipeline }
    pub fn state(&self) -> SessionState { self.session.state() }

    /// Announce connectable wallets. Only the first call reports.
    pub fn mounted(&self) {
        if self.mounted.replace(true) {
            warn!("Hook already mounted, skipping discovery");
            return;
        }
        let wallets = self.session.discover();
        info!(wallets = ?wallets, "Wallets available");
        self.sink.push_event(Report::WalletsAvailable { wallets });
    }

    /// Release the handle and context. No report.
    pub fn destroyed(&self) {
        self.release();
        self.mounted.set(false);
        debug!("Hook destroyed");
    }

    /// Entry point for raw peer events.
    pub async fn handle_event(&self, event: &str, payload: Value) {
        match Intent::from_event(event, payload) {
            Some(intent) => self.handle(intent).await,
            None => warn!(event, "Ignoring unknown event"),
        }
    }

    pub async fn handle(&self, intent: Intent) {
        debug!(event = intent.event_name(), "Intent received");
        match intent {
            Intent::Connect { wallet } => self.connect(&wallet).await,
            Intent::Disconnect => self.disconnect(),
            Intent::SendToSelf => self.send_to_self().await,
        }
    }

    pub async fn connect(&self, wallet: &str) {
        let result = self.session.connect(wallet).await;
        match &result {
            Err(BridgeError::ProviderNotFound(_)) | Err(BridgeError::ConnectionSuperseded(_)) => {}
            _ => self.pipeline.reset(),
        }
        let report = match result {
            Ok(conn) => {
                let expected = self.pipeline.config().network;
                if conn.network_id != expected.network_id() {
                    warn!(wallet = %conn.wallet, network_id = conn.network_id, expected = expected.as_str(), "Wallet is on a different network");
                }
                Report::connected(&conn.wallet, conn.network_id)
            }
            Err(e) => Report::connect_failed(&e),
        };
        self.sink.push_event(report);
    }

    pub fn disconnect(&self) {
        self.release();
    }

    pub async fn send_to_self(&self) {
        let report = match self.pipeline.send_to_self(self.session.current()).await {
            Ok(hash) => Report::TxSubmitted { tx_hash: hash.0 },
            Err(e) => Report::tx_error(&e),
        };
        self.sink.push_event(report);
    }

    /// Drive intents until the channel closes. Handlers interleave at their
    /// suspension points; acceptance order is arrival order.
    pub async fn run(&self, mut intents: mpsc::UnboundedReceiver<Intent>) {
        let mut pending = FuturesUnordered::new();
        loop {
            let next = futures::select! {
                intent = intents.next() => Some(intent),
                () = pending.select_next_some() => None,
                complete => break,
            };
            match next {
                Some(Some(intent)) => pending.push(self.handle(intent)),
                Some(None) => break,
                None => {}
            }
        }
        while pending.next().await.is_some() {}
    }

    fn release(&self) {
        if !self.session.disconnect() {
            debug!("Disconnect with no live wallet");
        }
        self.pipeline.reset();
    }
}
