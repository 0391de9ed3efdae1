use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use exc::cli::{self, Action};
use exc::prompt::{Confirm, Scripted, TerminalConfirm};
use exc::{Cli, Context, Executor, Lifecycle};

fn init_tracing(debug: bool) {
    // RUST_LOG applies unless --debug forces our own crates to debug.
    let filter = if debug {
        EnvFilter::new("exc=debug,exc_common=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!("debug mode enabled");

    let action = cli.action();
    if action == Action::Help {
        Cli::command()
            .print_help()
            .context("Failed to print help")?;
        println!();
        return Ok(());
    }

    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(Scripted(true))
    } else {
        Box::new(TerminalConfirm)
    };
    let lifecycle = Lifecycle::new(Context::from_env(cli.debug), Executor::system(), confirm);

    cli::dispatch(&lifecycle, action);
    Ok(())
}
