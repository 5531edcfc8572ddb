//! window.cardano bindings: provider discovery and the CIP-30 API object

use super::{call_async, js_message, log};
use crate::error::{WalletError, WalletErrorCode};
use crate::wallet::{parse_network_id, ProviderRegistry, WalletApi, WalletProvider};
use async_trait::async_trait;
use wasm_bindgen::prelude::*;

/// Map a thrown CIP-30 error (`{code, info}`) to a [`WalletError`].
fn wallet_error(value: JsValue, decode: fn(i64) -> WalletErrorCode) -> WalletError {
    let code = js_sys::Reflect::get(&value, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| decode(c as i64))
        .unwrap_or(WalletErrorCode::Unknown);
    WalletError::new(code, js_message(&value))
}

fn api_error(value: JsValue) -> WalletError { wallet_error(value, WalletErrorCode::from_api_code) }
pub(crate) fn sign_error(value: JsValue) -> WalletError { wallet_error(value, WalletErrorCode::from_sign_code) }

/// One `window.cardano.<name>` entry.
pub struct JsWalletProvider {
    name: String,
    inner: JsValue,
}

impl JsWalletProvider {
    pub fn new(name: String, inner: JsValue) -> Self { Self { name, inner } }
}

#[async_trait(?Send)]
impl WalletProvider for JsWalletProvider {
    type Api = JsWalletApi;

    fn supports_enable(&self) -> bool {
        js_sys::Reflect::get(&self.inner, &JsValue::from_str("enable"))
            .map(|f| f.is_function())
            .unwrap_or(false)
    }

    async fn enable(&self) -> Result<JsWalletApi, WalletError> {
        log!("[CardanoHook] Enabling {}", self.name);
        let api = call_async(&self.inner, "enable", &[]).await.map_err(api_error)?;
        Ok(JsWalletApi { inner: api })
    }
}

/// The object `enable()` resolved to.
///
/// `sign_tx` is the raw CIP-30 call for Rust-side builders; the JS tx
/// service signs through its own wrapper. Address lookup and submission
/// fall back here when the service context omits them.
pub struct JsWalletApi {
    inner: JsValue,
}

impl JsWalletApi {
    /// Raw API object, for JS libraries that wrap CIP-30 themselves.
    pub fn raw(&self) -> &JsValue { &self.inner }

    async fn string_list(&self, method: &str) -> Result<Vec<String>, WalletError> {
        let value = call_async(&self.inner, method, &[]).await.map_err(api_error)?;
        Ok(js_sys::Array::from(&value).iter().filter_map(|v| v.as_string()).collect())
    }
}

#[async_trait(?Send)]
impl WalletApi for JsWalletApi {
    async fn network_id(&self) -> Result<u8, WalletError> {
        let value = call_async(&self.inner, "getNetworkId", &[]).await.map_err(api_error)?;
        let raw = value.as_f64()
            .ok_or_else(|| WalletError::new(WalletErrorCode::InvalidRequest, "getNetworkId returned a non-number"))?;
        parse_network_id(raw)
    }

    async fn used_addresses(&self) -> Result<Vec<String>, WalletError> { self.string_list("getUsedAddresses").await }

    async fn change_address(&self) -> Result<String, WalletError> {
        let value = call_async(&self.inner, "getChangeAddress", &[]).await.map_err(api_error)?;
        value.as_string().ok_or_else(|| WalletError::new(WalletErrorCode::InvalidRequest, "getChangeAddress returned a non-string"))
    }

    async fn sign_tx(&self, tx_cbor: &str, partial: bool) -> Result<String, WalletError> {
        let args = [JsValue::from_str(tx_cbor), JsValue::from_bool(partial)];
        let value = call_async(&self.inner, "signTx", &args).await.map_err(sign_error)?;
        value.as_string().ok_or_else(|| WalletError::internal("signTx returned a non-string"))
    }

    async fn submit_tx(&self, tx_cbor: &str) -> Result<String, WalletError> {
        let value = call_async(&self.inner, "submitTx", &[JsValue::from_str(tx_cbor)]).await.map_err(api_error)?;
        value.as_string().ok_or_else(|| WalletError::internal("submitTx returned a non-string"))
    }
}

pub struct JsProviderRegistry;

impl JsProviderRegistry {
    /// Snapshot `window.cardano` in key order. Missing object → empty registry.
    pub fn capture() -> ProviderRegistry<JsWalletProvider> {
        let Some(window) = web_sys::window() else { return ProviderRegistry::empty() };
        let cardano = match js_sys::Reflect::get(&window, &JsValue::from_str("cardano")) {
            Ok(v) if v.is_object() => v,
            _ => return ProviderRegistry::empty(),
        };
        js_sys::Object::entries(cardano.unchecked_ref())
            .iter()
            .filter_map(|entry| {
                let pair = js_sys::Array::from(&entry);
                let name = pair.get(0).as_string()?;
                let inner = pair.get(1);
                (inner.is_object()).then(|| (name.clone(), JsWalletProvider::new(name, inner)))
            })
            .collect()
    }
}
