//! trapline - remote serial protocol stub serving a simulated target over TCP.
//!
//! Connect with `gdb -ex "target remote 127.0.0.1:1234"`.

mod args;
mod runner;
mod tcp;

use anyhow::{anyhow, Context};
use args::Args;
use clap::Parser;
use log::{info, warn};
use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use trapline::config::StubConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => {
            StubConfig::from_file(Some(path)).ok_or_else(|| anyhow!("cannot load config {path}"))?
        }
        None => StubConfig::from_file(None).unwrap_or_default(),
    };

    let addr: SocketAddr = args.listen.parse().context("Invalid listen address")?;
    let listener = TcpListener::bind(addr).with_context(|| format!("bind {addr}"))?;
    let local = listener.local_addr()?;
    info!(target: "host", "{} target, stub config: {config:?}", args.arch);
    println!("listening on {local}");
    std::io::stdout().flush()?;

    // One debugger at a time, each connection starts a fresh program.
    loop {
        let (stream, peer) = match listener.accept() {
            Ok(v) => v,
            Err(err) => {
                warn!(target: "host", "accept failed: {err:#}");
                continue;
            }
        };
        info!(target: "host", "debugger connected: {peer}");

        if let Err(err) = runner::serve(stream, &args, &config) {
            warn!(target: "host", "session ended with error: {err:#}");
        }

        if args.oneshot {
            break;
        }
    }
    Ok(())
}
