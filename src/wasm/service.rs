//! JS tx service adapter
//!
//! The page supplies an object wrapping its tx library (e.g. Lucid):
//!
//! ```text
//! {
//!   bind(api, network) → Promise<ctx>,
//! }
//! ctx = {
//!   address?() → Promise<string>,
//!   build(address, lovelace: bigint) → Promise<tx>,
//!   sign(tx) → Promise<signedTx>,     // throws the wallet's TxSignError
//!   submit?(signedTx) → Promise<string>,
//! }
//! ```
//!
//! Without `address`, the first used address (else the change address) comes
//! straight from the wallet. Without `submit`, a signed CBOR hex string goes
//! to the wallet's `submitTx`.

use super::provider::{sign_error, JsWalletApi};
use super::{call_async, js_message};
use crate::config::Network;
use crate::error::{ServiceError, WalletError};
use crate::tx::{PaymentIntent, TxBuilder, TxContext, TxHash};
use crate::wallet::WalletApi;
use async_trait::async_trait;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

fn service_error(value: JsValue) -> ServiceError { ServiceError::new(js_message(&value)) }

fn expect_string(value: JsValue, what: &str) -> Result<String, ServiceError> {
    value.as_string().ok_or_else(|| ServiceError::new(format!("{} returned a non-string", what)))
}

pub struct JsTxService {
    inner: JsValue,
}

impl JsTxService {
    pub fn new(inner: JsValue) -> Self { Self { inner } }
}

#[async_trait(?Send)]
impl TxBuilder for JsTxService {
    type Api = JsWalletApi;
    type Context = JsTxContext;

    async fn bind(&self, api: Rc<JsWalletApi>, network: Network) -> Result<JsTxContext, ServiceError> {
        let args = [api.raw().clone(), JsValue::from_str(network.as_str())];
        let inner = call_async(&self.inner, "bind", &args).await.map_err(service_error)?;
        Ok(JsTxContext { inner, wallet: api })
    }
}

pub struct JsTxContext {
    inner: JsValue,
    wallet: Rc<JsWalletApi>,
}

impl JsTxContext {
    fn has(&self, method: &str) -> bool {
        js_sys::Reflect::get(&self.inner, &JsValue::from_str(method))
            .map(|f| f.is_function())
            .unwrap_or(false)
    }
}

#[async_trait(?Send)]
impl TxContext for JsTxContext {
    type Unsigned = JsValue;
    type Signed = JsValue;

    async fn address(&self) -> Result<String, ServiceError> {
        if self.has("address") {
            let value = call_async(&self.inner, "address", &[]).await.map_err(service_error)?;
            return expect_string(value, "address");
        }
        match self.wallet.used_addresses().await?.into_iter().next() {
            Some(addr) => Ok(addr),
            None => Ok(self.wallet.change_address().await?),
        }
    }

    async fn build(&self, intent: &PaymentIntent) -> Result<JsValue, ServiceError> {
        let args = [JsValue::from_str(&intent.destination), js_sys::BigInt::from(intent.lovelace).into()];
        call_async(&self.inner, "build", &args).await.map_err(service_error)
    }

    async fn sign(&self, tx: JsValue) -> Result<JsValue, WalletError> {
        call_async(&self.inner, "sign", &[tx]).await.map_err(sign_error)
    }

    async fn submit(&self, tx: JsValue) -> Result<TxHash, ServiceError> {
        if self.has("submit") {
            let value = call_async(&self.inner, "submit", &[tx]).await.map_err(service_error)?;
            return expect_string(value, "submit").map(TxHash);
        }
        let cbor = expect_string(tx, "sign")?;
        Ok(TxHash(self.wallet.submit_tx(&cbor).await?))
    }
}
