//! Hook Tests: peer-visible behaviour over the simulated wallet
//!
//! These tests verify:
//! 1. Discovery reports exactly the connectable wallets, in order
//! 2. Connect failures never acquire a handle
//! 3. The happy path emits wallets_available → wallet_connected → tx_submitted
//! 4. Every failed send emits exactly one tx_error
//! 5. Overlapping sends are rejected, disconnect never aborts an in-flight send
//! 6. The intent loop drains its channel
//! 7. Null or malformed payloads still produce exactly one report

#![cfg(feature = "native")]

use cardano_hook::sim::{ServiceScript, SimCalls, SimProvider, SimTxBuilder, WalletScript, DEFAULT_ADDRESS};
use cardano_hook::{ChannelSink, HookConfig, Intent, Network, ProviderRegistry, Report, SessionState, WalletHook};
use futures::channel::mpsc;
use serde_json::{json, Value};
use std::rc::Rc;

type SimHook = WalletHook<SimProvider, SimTxBuilder, ChannelSink>;

struct Harness {
    hook: SimHook,
    reports: mpsc::UnboundedReceiver<Report>,
    calls: Rc<SimCalls>,
}

impl Harness {
    fn new(wallets: Vec<(&str, WalletScript)>, service: ServiceScript) -> Self {
        Self::with_config(wallets, service, HookConfig::new())
    }

    fn with_config(wallets: Vec<(&str, WalletScript)>, service: ServiceScript, config: HookConfig) -> Self {
        let calls = SimCalls::new();
        let registry: ProviderRegistry<SimProvider> = wallets
            .into_iter()
            .map(|(name, script)| (name.to_string(), SimProvider::new(script, calls.clone())))
            .collect();
        let (sink, reports) = ChannelSink::new();
        let hook = WalletHook::new(registry, SimTxBuilder::new(service, calls.clone()), sink, config);
        Self { hook, reports, calls }
    }

    fn nami(service: ServiceScript) -> Self {
        Self::new(vec![("nami", WalletScript::default())], service)
    }

    /// Everything reported so far, as wire frames.
    fn drain(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(Some(report)) = self.reports.try_next() {
            out.push(report.to_frame());
        }
        out
    }
}

#[tokio::test]
async fn happy_path_end_to_end() {
    let mut h = Harness::nami(ServiceScript::default().tx_hash("abc123"));

    h.hook.mounted();
    h.hook.handle_event("connect_wallet", json!({"wallet": "nami"})).await;
    h.hook.handle_event("send_to_self", Value::Null).await;

    assert_eq!(
        h.drain(),
        vec![
            json!({"event": "wallets_available", "payload": {"wallets": ["nami"]}}),
            json!({"event": "wallet_connected", "payload": {"ok": true, "wallet": "nami", "networkId": 1}}),
            json!({"event": "tx_submitted", "payload": {"txHash": "abc123"}}),
        ]
    );
    assert_eq!(h.hook.state(), SessionState::Connected);
    assert_eq!(h.calls.enable.get(), 1);
    assert_eq!(h.calls.pipeline_calls(), 3);
    let intent = h.calls.last_intent().unwrap();
    assert_eq!((intent.destination.as_str(), intent.lovelace), (DEFAULT_ADDRESS, 2_000_000));
}

#[tokio::test]
async fn discovery_filters_and_keeps_registry_order() {
    let mut h = Harness::new(
        vec![
            ("yoroi", WalletScript::default()),
            ("ccvault", WalletScript::default().without_enable()),
            ("eternl", WalletScript::default()),
            ("nami", WalletScript::default()),
        ],
        ServiceScript::default(),
    );
    h.hook.mounted();
    assert_eq!(h.drain(), vec![json!({"event": "wallets_available", "payload": {"wallets": ["yoroi", "eternl", "nami"]}})]);

    // Discovery happens once per mount
    h.hook.mounted();
    assert!(h.drain().is_empty());
    assert_eq!(h.calls.enable.get(), 0);
}

#[tokio::test]
async fn empty_registry_reports_empty_list() {
    let mut h = Harness::new(vec![], ServiceScript::default());
    h.hook.mounted();
    assert_eq!(h.drain(), vec![json!({"event": "wallets_available", "payload": {"wallets": []}})]);
}

#[tokio::test]
async fn connect_to_unknown_or_unqualified_wallet_fails_without_enable() {
    let mut h = Harness::new(
        vec![("nami", WalletScript::default()), ("ccvault", WalletScript::default().without_enable())],
        ServiceScript::default(),
    );

    for name in ["flint", "ccvault", ""] {
        h.hook.connect(name).await;
        let frames = h.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "wallet_connected");
        assert_eq!(frames[0]["payload"]["ok"], false);
        assert_eq!(frames[0]["payload"]["kind"], "provider_not_found");
        assert_eq!(h.hook.state(), SessionState::Disconnected);
        assert!(!h.hook.session().is_connected());
    }
    assert_eq!(h.calls.enable.get(), 0);

    // Missing payload field is an empty name
    h.hook.handle_event("connect_wallet", json!({})).await;
    assert_eq!(h.drain()[0]["payload"]["error"], "Wallet '' not found");
}

#[tokio::test]
async fn unknown_wallet_keeps_existing_connection() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.connect("nami").await;
    h.hook.connect("flint").await;
    let frames = h.drain();
    assert_eq!(frames[1]["payload"]["ok"], false);
    assert_eq!(h.hook.state(), SessionState::Connected);
    assert!(h.hook.session().is_connected());
}

#[tokio::test]
async fn declined_authorization_reports_failure() {
    let mut h = Harness::new(vec![("nami", WalletScript::default().deny_enable())], ServiceScript::default());
    h.hook.connect("nami").await;
    assert_eq!(
        h.drain(),
        vec![json!({"event": "wallet_connected", "payload": {
            "ok": false,
            "error": "Authorization failed: user declined connection",
            "kind": "authorization_failed"
        }})]
    );
    assert_eq!(h.hook.state(), SessionState::Disconnected);
    assert!(h.hook.session().current().is_none());
}

#[tokio::test]
async fn network_query_failure_discards_handle() {
    let mut h = Harness::new(vec![("nami", WalletScript::default().fail_network())], ServiceScript::default());
    h.hook.connect("nami").await;
    assert_eq!(h.drain()[0]["payload"]["kind"], "network_query_failed");
    assert_eq!(h.hook.state(), SessionState::Disconnected);
    assert!(!h.hook.session().is_connected());
}

#[tokio::test]
async fn network_mismatch_still_connects() {
    let mut h = Harness::with_config(
        vec![("nami", WalletScript::default().network(1))],
        ServiceScript::default(),
        HookConfig::new().with_network(Network::Preprod),
    );
    h.hook.connect("nami").await;
    assert_eq!(h.drain()[0]["payload"], json!({"ok": true, "wallet": "nami", "networkId": 1}));
}

#[tokio::test]
async fn disconnect_is_silent_and_idempotent() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.handle_event("disconnect_wallet", Value::Null).await;
    assert_eq!(h.hook.state(), SessionState::Disconnected);

    h.hook.connect("nami").await;
    h.hook.handle_event("disconnect_wallet", json!({})).await;
    h.hook.handle_event("disconnect_wallet", json!({})).await;

    let frames = h.drain();
    assert_eq!(frames.len(), 1, "only the connect reports");
    assert!(h.hook.session().current().is_none());
    assert_eq!(h.hook.pipeline().context_handle(), None);
}

#[tokio::test]
async fn send_without_connect_touches_nothing() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.send_to_self().await;
    assert_eq!(
        h.drain(),
        vec![json!({"event": "tx_error", "payload": {"error": "Wallet not connected", "kind": "not_connected"}})]
    );
    assert_eq!(h.calls.bind.get(), 0);
    assert_eq!(h.calls.pipeline_calls(), 0);
}

#[tokio::test]
async fn send_after_disconnect_is_not_connected() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.connect("nami").await;
    h.hook.disconnect();
    h.hook.send_to_self().await;
    let frames = h.drain();
    assert_eq!(frames.last().unwrap()["payload"]["kind"], "not_connected");
    assert_eq!(h.calls.pipeline_calls(), 0);
}

#[tokio::test]
async fn rejected_signing_reports_once_and_stays_connected() {
    let mut h = Harness::new(vec![("nami", WalletScript::default().reject_sign())], ServiceScript::default().tx_hash("abc123"));
    h.hook.connect("nami").await;
    h.drain();

    h.hook.send_to_self().await;
    let frames = h.drain();
    assert_eq!(
        frames,
        vec![json!({"event": "tx_error", "payload": {
            "error": "Signing rejected: user declined to sign",
            "kind": "signing_rejected"
        }})]
    );
    assert_eq!(h.hook.state(), SessionState::Connected);
    assert_eq!(h.calls.submit.get(), 0);
    assert!(!h.hook.pipeline().is_sending());
}

#[tokio::test]
async fn signing_failure_is_not_a_rejection() {
    let mut h = Harness::new(vec![("nami", WalletScript::default().fail_sign())], ServiceScript::default());
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    assert_eq!(h.drain()[1]["payload"]["kind"], "signing_failed");
}

#[tokio::test]
async fn build_failure_short_circuits() {
    let mut h = Harness::nami(ServiceScript::default().fail_build("Insufficient input in transaction"));
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    let frames = h.drain();
    assert_eq!(frames[1]["payload"]["error"], "Build failed: Insufficient input in transaction");
    assert_eq!(frames[1]["payload"]["kind"], "build_failed");
    assert_eq!(h.calls.sign.get(), 0);
    assert_eq!(h.calls.submit.get(), 0);
}

#[tokio::test]
async fn submission_failure_reports_once() {
    let mut h = Harness::nami(ServiceScript::default().fail_submit("node rejected"));
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1], json!({"event": "tx_error", "payload": {"error": "Submission failed: node rejected", "kind": "submission_failed"}}));
}

#[tokio::test]
async fn context_init_failure_reports_and_is_retried() {
    let mut h = Harness::nami(ServiceScript::default().fail_bind("provider unreachable"));
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    h.hook.send_to_self().await;
    let frames = h.drain();
    assert_eq!(frames[1]["payload"]["kind"], "context_init_failed");
    assert_eq!(frames[2]["payload"]["kind"], "context_init_failed");
    assert_eq!(h.calls.bind.get(), 2, "failed binds are not memoized");
}

#[tokio::test]
async fn repeated_sends_reuse_context() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    h.hook.send_to_self().await;

    let frames = h.drain();
    assert_eq!(frames[1]["event"], "tx_submitted");
    assert_eq!(frames[2]["event"], "tx_submitted");
    assert_ne!(frames[1]["payload"]["txHash"], frames[2]["payload"]["txHash"]);
    assert_eq!(h.calls.bind.get(), 1);
    assert_eq!(h.calls.build.get(), 2);
}

#[tokio::test]
async fn reconnect_rebuilds_context_for_new_handle() {
    let mut h = Harness::new(
        vec![("nami", WalletScript::default()), ("eternl", WalletScript::default())],
        ServiceScript::default(),
    );
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    let first = h.hook.session().current().unwrap().id;
    assert_eq!(h.hook.pipeline().context_handle(), Some(first));

    h.hook.connect("eternl").await;
    assert_eq!(h.hook.pipeline().context_handle(), None);
    let second = h.hook.session().current().unwrap();
    assert_ne!(second.id, first);
    assert_eq!(second.wallet, "eternl");

    h.hook.send_to_self().await;
    assert_eq!(h.hook.pipeline().context_handle(), Some(second.id));
    assert_eq!(h.calls.bind.get(), 2);
    assert_eq!(h.drain().iter().filter(|f| f["event"] == "tx_submitted").count(), 2);
}

#[tokio::test]
async fn overlapping_sends_are_rejected() {
    let mut h = Harness::new(vec![("nami", WalletScript::default().slow_sign(2))], ServiceScript::default().tx_hash("abc123"));
    h.hook.connect("nami").await;
    h.drain();

    futures::join!(h.hook.send_to_self(), h.hook.send_to_self());

    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert!(frames.contains(&json!({"event": "tx_submitted", "payload": {"txHash": "abc123"}})));
    assert!(frames.contains(&json!({"event": "tx_error", "payload": {
        "error": "A transaction is already in progress",
        "kind": "send_in_progress"
    }})));
    assert_eq!(h.calls.sign.get(), 1);

    // Guard released afterwards
    h.hook.send_to_self().await;
    assert_eq!(h.drain()[0]["event"], "tx_submitted");
}

#[tokio::test]
async fn disconnect_does_not_abort_inflight_send() {
    let mut h = Harness::new(vec![("nami", WalletScript::default().slow_sign(3))], ServiceScript::default().tx_hash("abc123"));
    h.hook.connect("nami").await;
    h.drain();

    futures::join!(h.hook.send_to_self(), async {
        tokio::task::yield_now().await;
        h.hook.disconnect();
    });

    assert_eq!(h.drain(), vec![json!({"event": "tx_submitted", "payload": {"txHash": "abc123"}})]);
    assert_eq!(h.hook.state(), SessionState::Disconnected);
    assert_eq!(h.hook.pipeline().context_handle(), None);

    h.hook.send_to_self().await;
    assert_eq!(h.drain()[0]["payload"]["kind"], "not_connected");
}

#[tokio::test]
async fn null_or_malformed_payloads_still_report_once() {
    let mut h = Harness::nami(ServiceScript::default());

    for payload in [Value::Null, json!({"wallet": 123}), json!("garbage")] {
        h.hook.handle_event("connect_wallet", payload).await;
        let frames = h.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "wallet_connected");
        assert_eq!(frames[0]["payload"]["kind"], "provider_not_found");
    }

    h.hook.handle_event("send_to_self", Value::Null).await;
    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["event"], "tx_error");
}

#[tokio::test]
async fn unknown_events_are_ignored() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.handle_event("sign_data", json!({"payload": "00"})).await;
    assert!(h.drain().is_empty());
}

#[tokio::test]
async fn destroyed_releases_session() {
    let mut h = Harness::nami(ServiceScript::default());
    h.hook.mounted();
    h.hook.connect("nami").await;
    h.hook.send_to_self().await;
    h.hook.destroyed();

    assert!(h.hook.session().current().is_none());
    assert_eq!(h.hook.pipeline().context_handle(), None);
    assert_eq!(h.drain().len(), 3);
}

#[tokio::test]
async fn run_loop_processes_until_channel_closes() {
    let mut h = Harness::nami(ServiceScript::default().tx_hash("abc123"));

    let (tx, rx) = mpsc::unbounded();
    tx.unbounded_send(Intent::Connect { wallet: "nami".into() }).unwrap();
    drop(tx);
    h.hook.run(rx).await;
    assert_eq!(h.drain()[0]["payload"]["ok"], true);

    let (tx, rx) = mpsc::unbounded();
    tx.unbounded_send(Intent::SendToSelf).unwrap();
    drop(tx);
    h.hook.run(rx).await;
    assert_eq!(h.drain(), vec![json!({"event": "tx_submitted", "payload": {"txHash": "abc123"}})]);

    let (tx, rx) = mpsc::unbounded();
    tx.unbounded_send(Intent::Disconnect).unwrap();
    drop(tx);
    h.hook.run(rx).await;
    assert!(h.drain().is_empty());
    assert_eq!(h.hook.state(), SessionState::Disconnected);
}
