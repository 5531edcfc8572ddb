//! WASM module: the hook running inside the browser tab
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         CardanoHook (JS API)            │
//! │  mounted, handleEvent, destroyed        │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │    WalletHook (session + pipeline)      │
//! └────────┬───────────────────────┬────────┘
//!          │                       │
//! ┌────────▼─────────┐   ┌─────────▼────────┐
//! │ window.cardano   │   │ JS tx service    │
//! │ JsWalletProvider │   │ JsTxService      │
//! │ JsWalletApi      │   │ JsTxContext      │
//! └──────────────────┘   └──────────────────┘
//! ```

mod hook;
mod provider;
mod service;

pub use hook::CardanoHook;
pub use provider::{JsProviderRegistry, JsWalletApi, JsWalletProvider};
pub use service::{JsTxContext, JsTxService};

use crate::logging::LineLayer;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = tracing_subscriber::registry()
        .with(LevelFilter::DEBUG)
        .with(LineLayer::new(console_line))
        .try_init();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

/// `tracing` level → matching `console.*` method.
fn console_line(level: &Level, line: &str) {
    let line = JsValue::from_str(line);
    match *level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

/// Call `target[method](...args)` and await the returned promise.
pub(crate) async fn call_async(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let func: js_sys::Function = js_sys::Reflect::get(target, &JsValue::from_str(method))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("'{}' is not a function", method)))?;
    let argv: js_sys::Array = args.iter().collect();
    let ret = func.apply(target, &argv)?;
    wasm_bindgen_futures::JsFuture::from(js_sys::Promise::resolve(&ret)).await
}

/// Best-effort message out of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    for key in ["info", "message"] {
        if let Ok(v) = js_sys::Reflect::get(value, &JsValue::from_str(key)) {
            if let Some(s) = v.as_string() {
                return s;
            }
        }
    }
    format!("{:?}", value)
}
