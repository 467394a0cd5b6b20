//! Console Bot
//!
//! Drives the Herald router from a terminal. Every stdin line is a chat
//! message from the user `console`; replies are printed to stdout and logs
//! go to stderr.
//!
//! ```text
//! $>say -l hello there          → HELLO THERE
//! <@1000> sum 1 2 3.5           → 6.5
//! $>roll -s 20 -n 3 -vv         → 3d20: [4, 17, 9] = 30
//! $>tags -t a -t b --sep " | "  → a | b
//! $>flags x --n=2 -ab -- --raw  → the parsed invocation as JSON
//! $>broken                      → instructions for the missing handler
//! bot: $>say ignored            → nothing; bot messages are dropped
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --self-id 1000
//! ```

mod commands;
mod console;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use herald::prelude::*;
use herald::runtime::RuntimeBuilder;
use tracing::info;

use crate::console::StdinSource;

#[derive(Debug, Parser)]
#[command(name = "console-bot", version, about = "Chat with a Herald bot from your terminal")]
struct Cli {
    /// Configuration file; `herald.toml` in the current directory otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Identity used to recognise `<@id>` mentions.
    #[arg(long, default_value = "1000")]
    self_id: String,

    /// Overrides the configured command prefix.
    #[arg(short, long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = RuntimeBuilder::new().set("logging.output", "stderr");
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(prefix) = &cli.prefix {
        builder = builder.set("router.command_prefix", prefix);
    }
    let runtime = builder.build()?;

    commands::register(&runtime);

    let source = StdinSource::new(&cli.self_id);
    let closed = source.closed();
    runtime.register_source(source).await;

    info!(
        prefix = %runtime.config().router.command_prefix,
        self_id = %cli.self_id,
        commands = ?runtime.router().command_names(),
        "Console bot ready"
    );

    runtime
        .run_until(async move {
            tokio::select! {
                _ = closed.notified() => info!("Input closed"),
                _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C"),
            }
        })
        .await?;
    info!(stats = %runtime.stats(), "Console bot finished");

    Ok(())
}
