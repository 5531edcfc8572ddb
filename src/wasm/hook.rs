//! CardanoHook: the JS-facing hook object
//!
//! Created in the UI hook's `mounted()`, freed in `destroyed()`:
//!
//! ```text
//! mounted() {
//!   this.wallet = new CardanoHook(this.pushEvent.bind(this), txService, "Mainnet");
//!   this.wallet.mounted();
//!   for (const ev of ["connect_wallet", "disconnect_wallet", "send_to_self"])
//!     this.handleEvent(ev, (payload) => this.wallet.handleEvent(ev, payload));
//! }
//! destroyed() { this.wallet.destroyed(); this.wallet.free(); }
//! ```

use super::log;
use super::provider::{JsProviderRegistry, JsWalletProvider};
use super::service::JsTxService;
use crate::config::{HookConfig, Network};
use crate::core::protocol::Report;
use crate::hook::{EventSink, WalletHook};
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Forwards reports to the peer's `pushEvent(event, payload)`.
pub struct JsEventSink {
    push: js_sys::Function,
}

impl EventSink for JsEventSink {
    fn push_event(&self, report: Report) {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let payload = report.payload().serialize(&serializer).unwrap_or(JsValue::NULL);
        if let Err(e) = self.push.call2(&JsValue::NULL, &JsValue::from_str(report.event_name()), &payload) {
            log!("[CardanoHook] pushEvent failed: {:?}", e);
        }
    }
}

#[wasm_bindgen]
pub struct CardanoHook {
    inner: Rc<WalletHook<JsWalletProvider, JsTxService, JsEventSink>>,
}

#[wasm_bindgen]
impl CardanoHook {
    /// Capture `window.cardano` and bind to the peer. `network` defaults to Mainnet.
    #[wasm_bindgen(constructor)]
    pub fn new(push_event: js_sys::Function, tx_service: JsValue, network: Option<String>) -> Result<CardanoHook, JsValue> {
        let network = match network.as_deref() {
            Some(name) => Network::from_str(name).ok_or_else(|| JsValue::from_str(&format!("Unknown network: {}", name)))?,
            None => Network::default(),
        };
        let registry = JsProviderRegistry::capture();
        log!("[CardanoHook] Captured {} provider entries, network {}", registry.len(), network.as_str());
        Ok(Self {
            inner: Rc::new(WalletHook::new(
                registry,
                JsTxService::new(tx_service),
                JsEventSink { push: push_event },
                HookConfig::new().with_network(network),
            )),
        })
    }

    /// Report `wallets_available`.
    #[wasm_bindgen]
    pub fn mounted(&self) {
        self.inner.mounted();
    }

    /// Dispatch one peer event. Resolves once its report has been pushed;
    /// an unreadable payload is treated as null.
    #[wasm_bindgen(js_name = "handleEvent")]
    pub fn handle_event(&self, event: String, payload: JsValue) -> js_sys::Promise {
        let inner = self.inner.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let payload: Value = if payload.is_undefined() || payload.is_null() {
                Value::Null
            } else {
                serde_wasm_bindgen::from_value(payload).unwrap_or_else(|e| {
                    log!("[CardanoHook] Unreadable {} payload, treating as null: {}", event, e);
                    Value::Null
                })
            };
            inner.handle_event(&event, payload).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Current session state: disconnected | connecting | connected | disconnecting
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.inner.state().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn destroyed(&self) {
        self.inner.destroyed();
        log!("[CardanoHook] Destroyed");
    }
}
