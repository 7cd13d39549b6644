//! The command line declared by `tri-demo`.
//!
//! Every variable is bound to a field of [`Settings`], so validating the
//! tree and applying its defaults leaves a fully populated configuration.

use std::sync::PoisonError;
use std::time::Duration;

use serde::Serialize;
use tracing::info;
use tri_core::build::*;
use tri_core::{Node, Shared, Target, shared};

/// Name of the declared application.
pub const APP_NAME: &str = "pod";

/// Configuration storage owned by the application.
///
/// Cloning shares the underlying cells.
#[derive(Debug, Clone)]
pub struct Settings {
    pub datadir: Shared<String>,
    pub ctl_datadir: Shared<String>,
    pub debug: Shared<bool>,
    pub timeout: Shared<Duration>,
    pub rpcport: Shared<u32>,
    pub peers: Shared<Vec<String>>,
    pub feerate: Shared<f64>,
    pub threads: Shared<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            datadir: shared(String::new()),
            ctl_datadir: shared(String::new()),
            debug: shared(false),
            timeout: shared(Duration::ZERO),
            rpcport: shared(0),
            peers: shared(Vec::new()),
            feerate: shared(0.0),
            threads: shared(0),
        }
    }
}

/// Plain copy of [`Settings`] for printing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub datadir: String,
    pub ctl_datadir: String,
    pub debug: bool,
    /// Rendered with `Debug`, e.g. `30s`.
    pub timeout: String,
    pub rpcport: u32,
    pub peers: Vec<String>,
    pub feerate: f64,
    pub threads: i64,
}

fn read<T: Clone>(cell: &Shared<T>) -> T {
    cell.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl Settings {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            datadir: read(&self.datadir),
            ctl_datadir: read(&self.ctl_datadir),
            debug: read(&self.debug),
            timeout: format!("{:?}", read(&self.timeout)),
            rpcport: read(&self.rpcport),
            peers: read(&self.peers),
            feerate: read(&self.feerate),
            threads: read(&self.threads),
        }
    }
}

/// Builds the specification tree of `tri-demo` with slots bound to `settings`.
pub fn declare(settings: &Settings) -> Node {
    // The thread count goes through a setter rather than a shared cell.
    let threads = settings.threads.clone();
    let set_threads = Target::from_fn(move |n: i64| {
        *threads.lock().unwrap_or_else(PoisonError::into_inner) = n;
    });

    let ctl_settings = settings.clone();
    let node_settings = settings.clone();

    application(APP_NAME)
        .with(brief("an all in one node and wallet controller"))
        .with(usage("pod [flags] [command] [args]"))
        .with(version(0, 1, 1).with("alpha"))
        .with(default_command("ctl"))
        .with(
            var("datadir")
                .with(short('D'))
                .with(brief("directory holding all application data"))
                .with(usage("--datadir=<path>"))
                .with(help("All state, logs and keys are stored below this path."))
                .with(default("~/.pod"))
                .with(slot([Target::bind(&settings.datadir)])),
        )
        .with(
            var("debug")
                .with(brief("enable verbose diagnostics"))
                .with(default(false))
                .with(slot([Target::bind(&settings.debug)])),
        )
        .with(
            var("timeout")
                .with(brief("how long to wait for a peer to answer"))
                .with(default(Duration::from_secs(30)))
                .with(slot([Target::bind(&settings.timeout)])),
        )
        .with(
            trigger("init")
                .with(short('I'))
                .with(brief("write a fresh configuration file"))
                .with(help("Runs before the selected command unless disabled."))
                .with(default_on())
                .with_action(|_| {
                    info!("init trigger");
                    0
                }),
        )
        .with(
            trigger("save")
                .with(brief("persist the configuration on shutdown"))
                .with(run_after())
                .with_action(|_| 0),
        )
        .with(commands([
            command("ctl")
                .with(short('c'))
                .with(brief("send queries to a running node"))
                .with(usage("pod ctl [flags] <method> [params]"))
                .with(help("Talks to the node over its RPC interface."))
                .with(group("client"))
                .with(examples(&[
                    ("pod ctl getinfo", "print a summary of node state"),
                    ("pod ctl --rpcport=9000 stop", "stop a node on a custom port"),
                ]))
                .with(
                    var("datadir")
                        .with(short('d'))
                        .with(brief("data directory used by the controller"))
                        .with(default("~/.pod"))
                        .with(group("paths"))
                        .with(slot([
                            Target::bind(&settings.datadir),
                            Target::bind(&settings.ctl_datadir),
                        ])),
                )
                .with(
                    var("rpcport")
                        .with(short('p'))
                        .with(brief("port of the node RPC server"))
                        .with(default(8334u32))
                        .with(slot([Target::bind(&settings.rpcport)])),
                )
                .with(
                    trigger("wallet")
                        .with(short('w'))
                        .with(brief("send the query to the wallet instead"))
                        .with(terminates())
                        .with_action(|_| 0),
                )
                .with_action(move |_| {
                    let s = ctl_settings.snapshot();
                    println!("ctl: datadir={} rpcport={}", s.ctl_datadir, s.rpcport);
                    0
                }),
            command("node")
                .with(short('n'))
                .with(brief("run a full node"))
                .with(group("server"))
                .with(examples(&[("pod node", "start the node with defaults")]))
                .with(
                    var("peers")
                        .with(brief("addresses to connect to at startup"))
                        .with(default(vec![
                            "seed.example.org".to_string(),
                            "127.0.0.1:8333".to_string(),
                        ]))
                        .with(slot([Target::bind(&settings.peers)])),
                )
                .with(
                    var("feerate")
                        .with(brief("minimum relay fee per kilobyte"))
                        .with(default(0.0001))
                        .with(slot([Target::bind(&settings.feerate)])),
                )
                .with(
                    var("threads")
                        .with(short('t'))
                        .with(brief("number of verification threads"))
                        .with(default(4i64))
                        .with(slot([set_threads])),
                )
                .with_action(move |_| {
                    let s = node_settings.snapshot();
                    println!("node: peers={} threads={}", s.peers.join(","), s.threads);
                    0
                }),
        ]))
}
