// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod http;
pub mod logging;
pub mod stream;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_or_default;
use crate::config::model::Config;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the HTTP route table (which drives the runner/sequencer per request)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(&args.config)?;

    if let Some(port) = args.port {
        cfg.server.port = port;
    }

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                cfg.server.host, cfg.server.port
            )
        })?;

    let router = http::router(cfg);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "opsdeck listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("opsdeck exiting");
    Ok(())
}

/// Ctrl-C → graceful shutdown. In-flight streams are allowed to drain.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested, stopping server"),
        Err(e) => {
            eprintln!("failed to listen for Ctrl+C: {e}");
            // No signal handling available; keep serving until killed.
            std::future::pending::<()>().await;
        }
    }
}

/// Simple dry-run output: print the resolved settings.
fn print_dry_run(cfg: &Config) {
    println!("opsdeck dry-run");
    println!("  server.host = {}", cfg.server.host);
    println!("  server.port = {}", cfg.server.port);
    println!("  repos.root = {}", cfg.repos.root.display());
    if let Some(ref marker) = cfg.deploy.cwd_marker {
        println!("  deploy.cwd_marker = {marker}");
    }
    println!("  assistant.bin = {}", cfg.assistant.bin);
    if !cfg.assistant.args.is_empty() {
        println!("  assistant.args = {:?}", cfg.assistant.args);
    }
    if !cfg.assistant.env.is_empty() {
        println!(
            "  assistant.env = {:?}",
            cfg.assistant.env.keys().collect::<Vec<_>>()
        );
    }
    if !cfg.assistant.clear_env.is_empty() {
        println!("  assistant.clear_env = {:?}", cfg.assistant.clear_env);
    }
    println!("  convert.bin = {}", cfg.convert.bin);
}
