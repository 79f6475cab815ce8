//! wirecheck CLI entry point.

mod args;
mod harness;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use crate::args::{Cli, Commands, RunArgs};
use crate::harness::connection::{Connection, PortStatus};
use crate::harness::context::HarnessContext;
use crate::harness::journal::Journal;
use crate::harness::mailbox::Mailbox;
use crate::harness::paths;
use crate::harness::registry::Registry;
use crate::harness::runner::MailboxLoop;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

/// The harness is single-threaded and cooperative by design; a
/// current-thread runtime keeps it that way.
fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(run_args) => run_harness(run_args),

        Commands::Clean(clean_args) => {
            let dir = paths::resolve_mailbox_dir(clean_args.dir);
            let mailbox = Mailbox::new(dir.clone());
            mailbox
                .setup()
                .with_context(|| format!("Failed to reset mailbox at {}", dir.display()))?;
            info!(dir = %dir.display(), "mailbox reset");
            Ok(())
        }

        Commands::Probe(probe_args) => {
            let runtime = runtime()?;
            let status = runtime.block_on(Connection::probe(probe_args.port));
            println!(
                "{}",
                match status {
                    PortStatus::Open => "open",
                    PortStatus::Closed => "closed",
                }
            );
            Ok(())
        }

        Commands::Examples => {
            println!("{}", args::EXAMPLES_TEXT);
            Ok(())
        }
    }
}

/// Set up the mailbox and run the dispatch loop until `quit`.
fn run_harness(run_args: RunArgs) -> anyhow::Result<()> {
    let dir = paths::resolve_mailbox_dir(run_args.dir);
    let mailbox = Mailbox::new(dir.clone());
    mailbox
        .setup()
        .with_context(|| format!("Failed to set up mailbox at {}", dir.display()))?;

    let journal = match run_args.journal {
        Some(path) => Journal::new(path),
        None => Journal::disabled(),
    };

    let mut harness = MailboxLoop::new(
        mailbox,
        Registry::with_network_ops(),
        HarnessContext::new(journal),
    )
    .with_idle_wait(Duration::from_millis(run_args.idle_wait));

    let runtime = runtime()?;
    runtime
        .block_on(harness.run())
        .context("Mailbox loop aborted")?;
    Ok(())
}
