//! Sim: in-memory CIP-30 wallet and tx service
//!
//! Scripted stand-ins for the browser extension and the tx-building library.
//! Every boundary call is counted in a shared [`SimCalls`] ledger so callers
//! can assert what did (and did not) happen.

use crate::config::Network;
use crate::error::{ServiceError, WalletError, WalletErrorCode};
use crate::tx::{PaymentIntent, TxBuilder, TxContext, TxHash};
use crate::wallet::{WalletApi, WalletProvider};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const DEFAULT_ADDRESS: &str = "addr1qxsim0000000000000000000000000000000000000000000000000000000";

/// Boundary call counters.
#[derive(Debug, Default)]
pub struct SimCalls {
    pub enable: Cell<u32>,
    pub network_id: Cell<u32>,
    pub bind: Cell<u32>,
    pub address: Cell<u32>,
    pub build: Cell<u32>,
    pub sign: Cell<u32>,
    pub submit: Cell<u32>,
    /// Last payment handed to `build`.
    pub last_intent: RefCell<Option<PaymentIntent>>,
}

impl SimCalls {
    pub fn new() -> Rc<Self> { Rc::new(Self::default()) }

    /// build + sign + submit
    pub fn pipeline_calls(&self) -> u32 { self.build.get() + self.sign.get() + self.submit.get() }

    pub fn last_intent(&self) -> Option<PaymentIntent> { self.last_intent.borrow().clone() }

    fn hit(counter: &Cell<u32>) { counter.set(counter.get() + 1); }
}

/// Extension behaviour.
#[derive(Debug, Clone)]
pub struct WalletScript {
    pub has_enable: bool,
    pub deny_enable: bool,
    pub fail_network: bool,
    pub network_id: u8,
    pub address: String,
    pub reject_sign: bool,
    pub fail_sign: bool,
    /// Times `enable` yields before answering.
    pub enable_yields: u32,
    /// Times `sign_tx` yields before answering.
    pub sign_yields: u32,
}

impl Default for WalletScript {
    fn default() -> Self {
        Self {
            has_enable: true,
            deny_enable: false,
            fail_network: false,
            network_id: 1,
            address: DEFAULT_ADDRESS.into(),
            reject_sign: false,
            fail_sign: false,
            enable_yields: 0,
            sign_yields: 0,
        }
    }
}

impl WalletScript {
    pub fn network(mut self, id: u8) -> Self { self.network_id = id; self }
    pub fn address(mut self, addr: impl Into<String>) -> Self { self.address = addr.into(); self }
    pub fn without_enable(mut self) -> Self { self.has_enable = false; self }
    pub fn deny_enable(mut self) -> Self { self.deny_enable = true; self }
    pub fn fail_network(mut self) -> Self { self.fail_network = true; self }
    pub fn reject_sign(mut self) -> Self { self.reject_sign = true; self }
    pub fn fail_sign(mut self) -> Self { self.fail_sign = true; self }
    pub fn slow_enable(mut self, yields: u32) -> Self { self.enable_yields = yields; self }
    pub fn slow_sign(mut self, yields: u32) -> Self { self.sign_yields = yields; self }
}

pub struct SimProvider {
    script: WalletScript,
    calls: Rc<SimCalls>,
}

impl SimProvider {
    pub fn new(script: WalletScript, calls: Rc<SimCalls>) -> Self { Self { script, calls } }
}

#[async_trait(?Send)]
impl WalletProvider for SimProvider {
    type Api = SimWallet;

    fn supports_enable(&self) -> bool { self.script.has_enable }

    async fn enable(&self) -> Result<SimWallet, WalletError> {
        SimCalls::hit(&self.calls.enable);
        for _ in 0..self.script.enable_yields {
            tokio::task::yield_now().await;
        }
        if self.script.deny_enable {
            return Err(WalletError::refused("user declined connection"));
        }
        Ok(SimWallet { script: self.script.clone(), calls: self.calls.clone() })
    }
}

pub struct SimWallet {
    script: WalletScript,
    calls: Rc<SimCalls>,
}

#[async_trait(?Send)]
impl WalletApi for SimWallet {
    async fn network_id(&self) -> Result<u8, WalletError> {
        SimCalls::hit(&self.calls.network_id);
        if self.script.fail_network {
            return Err(WalletError::internal("network unavailable"));
        }
        Ok(self.script.network_id)
    }

    async fn used_addresses(&self) -> Result<Vec<String>, WalletError> { Ok(vec![self.script.address.clone()]) }

    async fn change_address(&self) -> Result<String, WalletError> { Ok(self.script.address.clone()) }

    async fn sign_tx(&self, tx_cbor: &str, _partial: bool) -> Result<String, WalletError> {
        SimCalls::hit(&self.calls.sign);
        for _ in 0..self.script.sign_yields {
            tokio::task::yield_now().await;
        }
        if self.script.reject_sign {
            return Err(WalletError::declined("user declined to sign"));
        }
        if self.script.fail_sign {
            return Err(WalletError::new(WalletErrorCode::ProofGeneration, "missing signing key"));
        }
        Ok(digest(&[tx_cbor, &self.script.address]))
    }

    async fn submit_tx(&self, tx_cbor: &str) -> Result<String, WalletError> { Ok(digest(&[tx_cbor])) }
}

/// Tx-service behaviour.
#[derive(Debug, Clone, Default)]
pub struct ServiceScript {
    pub fail_bind: Option<String>,
    pub fail_build: Option<String>,
    pub fail_submit: Option<String>,
    /// Fixed submission id; otherwise derived from the signed body.
    pub tx_hash: Option<String>,
    /// Times `bind` yields before answering.
    pub bind_yields: u32,
}

impl ServiceScript {
    pub fn tx_hash(mut self, hash: impl Into<String>) -> Self { self.tx_hash = Some(hash.into()); self }
    pub fn fail_bind(mut self, msg: impl Into<String>) -> Self { self.fail_bind = Some(msg.into()); self }
    pub fn fail_build(mut self, msg: impl Into<String>) -> Self { self.fail_build = Some(msg.into()); self }
    pub fn fail_submit(mut self, msg: impl Into<String>) -> Self { self.fail_submit = Some(msg.into()); self }
    pub fn slow_bind(mut self, yields: u32) -> Self { self.bind_yields = yields; self }
}

pub struct SimTxBuilder {
    script: ServiceScript,
    calls: Rc<SimCalls>,
}

impl SimTxBuilder {
    pub fn new(script: ServiceScript, calls: Rc<SimCalls>) -> Self { Self { script, calls } }
}

#[async_trait(?Send)]
impl TxBuilder for SimTxBuilder {
    type Api = SimWallet;
    type Context = SimContext;

    async fn bind(&self, api: Rc<SimWallet>, network: Network) -> Result<SimContext, ServiceError> {
        SimCalls::hit(&self.calls.bind);
        for _ in 0..self.script.bind_yields {
            tokio::task::yield_now().await;
        }
        if let Some(msg) = &self.script.fail_bind {
            return Err(ServiceError::new(msg.clone()));
        }
        Ok(SimContext { wallet: api, network, script: self.script.clone(), calls: self.calls.clone(), nonce: Cell::new(0) })
    }
}

pub struct SimContext {
    wallet: Rc<SimWallet>,
    network: Network,
    script: ServiceScript,
    calls: Rc<SimCalls>,
    nonce: Cell<u64>,
}

#[derive(Debug, Clone)]
pub struct SimTx { pub body: String }

#[derive(Debug, Clone)]
pub struct SimSignedTx { pub body: String, pub witness: String }

#[async_trait(?Send)]
impl TxContext for SimContext {
    type Unsigned = SimTx;
    type Signed = SimSignedTx;

    async fn address(&self) -> Result<String, ServiceError> {
        SimCalls::hit(&self.calls.address);
        let used = self.wallet.used_addresses().await?;
        match used.into_iter().next() {
            Some(addr) => Ok(addr),
            None => Ok(self.wallet.change_address().await?),
        }
    }

    async fn build(&self, intent: &PaymentIntent) -> Result<SimTx, ServiceError> {
        SimCalls::hit(&self.calls.build);
        *self.calls.last_intent.borrow_mut() = Some(intent.clone());
        if let Some(msg) = &self.script.fail_build {
            return Err(ServiceError::new(msg.clone()));
        }
        let nonce = self.nonce.get() + 1;
        self.nonce.set(nonce);
        Ok(SimTx { body: format!("{}:{}:{}:{}", self.network.as_str(), intent.destination, intent.lovelace, nonce) })
    }

    async fn sign(&self, tx: SimTx) -> Result<SimSignedTx, WalletError> {
        let witness = self.wallet.sign_tx(&tx.body, false).await?;
        Ok(SimSignedTx { body: tx.body, witness })
    }

    async fn submit(&self, tx: SimSignedTx) -> Result<TxHash, ServiceError> {
        SimCalls::hit(&self.calls.submit);
        if let Some(msg) = &self.script.fail_submit {
            return Err(ServiceError::new(msg.clone()));
        }
        match &self.script.tx_hash {
            Some(hash) => Ok(TxHash(hash.clone())),
            None => Ok(TxHash(self.wallet.submit_tx(&format!("{}#{}", tx.body, tx.witness)).await?)),
        }
    }
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}
