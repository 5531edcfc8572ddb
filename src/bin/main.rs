//! cardano-hook CLI - drive a WalletHook over the simulated wallet
//!
//! Reads peer events as JSON lines on stdin and writes reports as JSON lines
//! on stdout. Logs go to stderr.
//!
//!   {"event": "connect_wallet", "payload": {"wallet": "nami"}}
//!   {"event": "send_to_self"}
//!   {"event": "disconnect_wallet"}

use anyhow::anyhow;
use cardano_hook::core::protocol::{Intent, Report};
use cardano_hook::logging::init_logging;
use cardano_hook::sim::{ServiceScript, SimCalls, SimProvider, SimTxBuilder, WalletScript};
use cardano_hook::{HookConfig, Network, ProviderRegistry, WalletHook};
use futures::channel::mpsc;
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    payload: Value,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return Ok(());
    }
    if opts.version {
        println!("cardano-hook {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let network = match opts.network.as_deref() {
        Some(name) => Network::from_str(name).ok_or_else(|| anyhow!("Unknown network: {}", name))?,
        None => Network::default(),
    };
    let calls = SimCalls::new();
    let hook = WalletHook::new(
        opts.registry(network, &calls),
        SimTxBuilder::new(opts.service_script(), calls.clone()),
        |report: Report| println!("{}", report.to_frame()),
        HookConfig::new().with_network(network),
    );

    hook.mounted();

    let (tx, rx) = mpsc::unbounded::<Intent>();
    let feed = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let frame: Frame = match serde_json::from_str(line) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed line");
                    continue;
                }
            };
            match Intent::from_event(&frame.event, frame.payload) {
                Some(intent) => {
                    if tx.unbounded_send(intent).is_err() {
                        break;
                    }
                }
                None => warn!(event = %frame.event, "Ignoring unknown event"),
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    let (fed, ()) = tokio::join!(feed, hook.run(rx));
    hook.destroyed();
    info!(
        enable = calls.enable.get(),
        build = calls.build.get(),
        sign = calls.sign.get(),
        submit = calls.submit.get(),
        "Session finished"
    );
    fed
}

#[derive(Default)]
struct ParsedArgs {
    wallets: Vec<String>,
    legacy: Vec<String>,
    network: Option<String>,
    network_id: Option<u8>,
    address: Option<String>,
    tx_hash: Option<String>,
    deny_enable: bool,
    reject_sign: bool,
    fail_build: bool,
    fail_submit: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let value = args.get(i + 1).cloned();
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--deny-enable" => opts.deny_enable = true,
                "--reject-sign" => opts.reject_sign = true,
                "--fail-build" => opts.fail_build = true,
                "--fail-submit" => opts.fail_submit = true,
                "--wallets" | "-w" => {
                    if let Some(v) = value {
                        opts.wallets.extend(split_list(&v));
                        i += 1;
                    }
                }
                "--legacy" => {
                    if let Some(v) = value {
                        opts.legacy.push(v);
                        i += 1;
                    }
                }
                "--network" | "-n" => {
                    if value.is_some() {
                        opts.network = value;
                        i += 1;
                    }
                }
                "--network-id" => {
                    if let Some(v) = value {
                        opts.network_id = v.parse().ok();
                        i += 1;
                    }
                }
                "--address" => {
                    if value.is_some() {
                        opts.address = value;
                        i += 1;
                    }
                }
                "--tx-hash" => {
                    if value.is_some() {
                        opts.tx_hash = value;
                        i += 1;
                    }
                }
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // Environment fallbacks (lower priority than CLI args)
        if opts.wallets.is_empty() {
            opts.wallets = env::var("CARDANO_HOOK_WALLETS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| vec!["nami".to_string()]);
        }
        if opts.network.is_none() {
            opts.network = env::var("CARDANO_HOOK_NETWORK").ok().filter(|s| !s.is_empty());
        }

        opts
    }

    fn registry(&self, network: Network, calls: &Rc<SimCalls>) -> ProviderRegistry<SimProvider> {
        let mut script = WalletScript::default().network(self.network_id.unwrap_or(network.network_id()));
        if let Some(addr) = &self.address { script = script.address(addr.clone()); }
        if self.deny_enable { script = script.deny_enable(); }
        if self.reject_sign { script = script.reject_sign(); }

        let connectable = self.wallets.iter().map(|name| (name.clone(), SimProvider::new(script.clone(), calls.clone())));
        let legacy = self.legacy.iter().map(|name| (name.clone(), SimProvider::new(script.clone().without_enable(), calls.clone())));
        connectable.chain(legacy).collect()
    }

    fn service_script(&self) -> ServiceScript {
        let mut script = ServiceScript::default();
        if let Some(hash) = &self.tx_hash { script = script.tx_hash(hash.clone()); }
        if self.fail_build { script = script.fail_build("Insufficient input in transaction"); }
        if self.fail_submit { script = script.fail_submit("Submission rejected by node"); }
        script
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

fn print_usage() {
    println!(
        r#"cardano-hook - CIP-30 wallet hook over a simulated extension

USAGE:
    cardano-hook [options] < events.jsonl

INPUT (stdin, one JSON object per line):
    {{"event": "connect_wallet", "payload": {{"wallet": "nami"}}}}
    {{"event": "disconnect_wallet"}}
    {{"event": "send_to_self"}}

OUTPUT (stdout, one JSON object per line):
    wallets_available       → {{wallets}}
    wallet_connected        → {{ok, wallet?, networkId?, error?, kind?}}
    tx_submitted            → {{txHash}}
    tx_error                → {{error, kind}}

WALLET OPTIONS:
    --wallets, -w <a,b>     Connectable wallets (env: CARDANO_HOOK_WALLETS, default: nami)
    --legacy <name>         Registry entry without enable (can repeat)
    --network, -n <net>     mainnet|preprod|preview (env: CARDANO_HOOK_NETWORK)
    --network-id <n>        Network id the wallet reports
    --address <addr>        Wallet address
    --deny-enable           Wallet refuses connection
    --reject-sign           User declines signing

SERVICE OPTIONS:
    --tx-hash <hash>        Fixed submission id
    --fail-build            Build fails (insufficient input)
    --fail-submit           Submission fails

OTHER:
    --help, -h              Print this help
    --version, -V           Print version

LOGGING:
    RUST_LOG=debug          Filter (default: info)
    CARDANO_HOOK_LOG_JSON=1 JSON log lines on stderr
"#
    );
}
