// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MobWallet CLI
//!
//! Entry point for the `mobwallet` binary. Parses CLI arguments, initializes
//! logging, and runs one staging surface per command against the wallet
//! daemon.
//!
//! - `send`    build, confirm, and submit a payment
//! - `gift`    open and claim a gift code
//! - `format`  picoMOB to MOB
//! - `parse`   MOB to picoMOB
//! - `status`  balance and sync status
//! - `version` print build version information

mod cli;
mod console;
mod daemon;
mod logging;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;

use mobwallet_core::account::Accounts;
use mobwallet_core::amount::{format_minor_units_to_decimal, parse_decimal_to_minor_units, MonetaryAmount};
use mobwallet_core::config::DEFAULT_FEE_PICO_MOB;
use mobwallet_core::form::{max_sendable, GiftForm, SendForm};
use mobwallet_core::guard::MountGuard;
use mobwallet_core::ledger::{LedgerStatus, NOT_SYNCED_MESSAGE};
use mobwallet_core::staging::{Intent, Outcome, StagingState, TransactionStager};

use cli::{Commands, MobWalletCli};
use console::ConsoleNotifier;
use daemon::DaemonClient;

/// Exit status for a run cut short by Ctrl+C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MobWalletCli::parse();
    logging::init_logging(logging::DEFAULT_DIRECTIVES, cli.log_format);

    match cli.command {
        Commands::Send(args) => {
            let daemon = connect(&cli.daemon_url)?;
            send(daemon, args).await
        }
        Commands::Gift(args) => {
            let daemon = connect(&cli.daemon_url)?;
            gift(daemon, args).await
        }
        Commands::Status => {
            let daemon = connect(&cli.daemon_url)?;
            status(&daemon).await
        }
        Commands::Format(args) => format_amount(args),
        Commands::Parse(args) => parse_amount(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn connect(url: &str) -> Result<Arc<DaemonClient>> {
    let client = DaemonClient::new(url).context("failed to create daemon client")?;
    tracing::debug!(url = client.url(), "daemon client ready");
    Ok(Arc::new(client))
}

/// Account and sync status, fetched together.
async fn session(daemon: &DaemonClient) -> Result<(Accounts, LedgerStatus)> {
    let (account, ledger) = tokio::try_join!(daemon.get_account(), daemon.get_ledger_status())
        .with_context(|| format!("failed to reach wallet daemon at {}", daemon.url()))?;
    Ok((Accounts::single(account), ledger))
}

async fn send(daemon: Arc<DaemonClient>, args: cli::SendArgs) -> Result<()> {
    let (accounts, ledger) = session(&daemon).await?;
    if !ledger.is_synced() {
        bail!(NOT_SYNCED_MESSAGE);
    }

    let form = SendForm {
        sender: args.from.unwrap_or_default(),
        amount: args.amount,
        fee: args.fee,
        recipient: args.recipient,
    };
    let intent = form.validate(&accounts)?;
    tracing::info!(
        amount = %intent.amount,
        fee = %intent.fee,
        recipient = %intent.recipient,
        "send requested"
    );
    stage(daemon, accounts, ledger, intent.into(), args.yes).await
}

async fn gift(daemon: Arc<DaemonClient>, args: cli::GiftArgs) -> Result<()> {
    let (accounts, ledger) = session(&daemon).await?;

    let form = GiftForm {
        redeemer: args.to.unwrap_or_default(),
        code: args.code,
    };
    let intent = form.validate(&accounts)?;
    tracing::info!(redeemer = %intent.redeemer, "gift requested");
    stage(daemon, accounts, ledger, intent.into(), args.yes).await
}

/// Runs one intent on a fresh surface. Ctrl+C tears the surface down; a
/// submission already on the wire is allowed to finish first.
async fn stage(
    daemon: Arc<DaemonClient>,
    accounts: Accounts,
    ledger: LedgerStatus,
    intent: Intent,
    assume_yes: bool,
) -> Result<()> {
    let guard = MountGuard::new();
    let stager = Arc::new(TransactionStager::new(
        daemon,
        Arc::new(ConsoleNotifier),
        guard.handle(),
        accounts,
        ledger,
    ));

    let mut worker = tokio::spawn(drive(Arc::clone(&stager), intent, assume_yes));
    tokio::select! {
        joined = &mut worker => return joined.context("staging task panicked")?,
        res = signal::ctrl_c() => {
            res.context("failed to listen for Ctrl+C")?;
            let kind = stager.intent().map(|i| i.kind().to_string()).unwrap_or_default();
            tracing::warn!(state = %stager.state(), %kind, "interrupted, closing surface");
            guard.unmount();
        }
    }

    // Read after unmounting: a submit that has not reached `Submitting` by
    // now is refused with `Detached`.
    if stager.state() == StagingState::Submitting {
        println!("Waiting for the daemon to finish the submission...");
        match worker.await {
            Ok(Ok(())) => {
                tracing::info!("submission returned after interrupt");
                println!(
                    "The daemon answered the submission. Run `mobwallet status` to check your balance."
                );
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "submission ended with an error after interrupt");
                eprintln!("Submission ended with an error: {:#}", e);
            }
            Err(e) => {
                tracing::error!(error = %e, "staging task panicked after interrupt");
                eprintln!("Submission task did not finish cleanly: {}", e);
            }
        }
    } else {
        worker.abort();
    }
    std::process::exit(INTERRUPTED_EXIT_CODE);
}

/// request, then confirm or cancel.
async fn drive(stager: Arc<TransactionStager>, intent: Intent, assume_yes: bool) -> Result<()> {
    match stager.request(intent).await? {
        Outcome::Applied(StagingState::Confirming) => {}
        Outcome::Applied(state) => bail!("transaction was not staged: {}", state),
        Outcome::Suppressed => return Ok(()),
    }

    let summary = stager
        .confirmation_summary()
        .context("staged proposal has no matching account")?;
    let proceed = if assume_yes {
        println!("{}", console::render_summary(&summary));
        true
    } else {
        console::prompt_confirmation(&summary).await?
    };

    if !proceed {
        stager.cancel()?;
        return Ok(());
    }

    match stager.confirm().await? {
        Outcome::Applied(StagingState::Settled) | Outcome::Suppressed => Ok(()),
        Outcome::Applied(state) => bail!("transaction did not settle: {}", state),
    }
}

async fn status(daemon: &DaemonClient) -> Result<()> {
    let (accounts, ledger) = session(daemon).await?;
    let default_fee = MonetaryAmount::from(DEFAULT_FEE_PICO_MOB);
    for account in accounts.iter() {
        let sendable = max_sendable(&account.balance, &default_fee);
        println!(
            "{}",
            console::render_balance(&account.label(), &account.address, &account.balance, &sendable)
        );
    }
    match (ledger.network_highest_block_index, ledger.next_block) {
        (Some(highest), Some(next)) => println!("Ledger  next block {} of {}", next, highest),
        _ => println!("Ledger  block indices unknown"),
    }
    if !ledger.is_synced() {
        println!("{}", NOT_SYNCED_MESSAGE);
    }
    Ok(())
}

fn format_amount(args: cli::FormatArgs) -> Result<()> {
    let amount = MonetaryAmount::from_minor_units_str(args.pico_mob.trim())
        .context("expected a picoMOB integer")?;
    println!("{}", format_minor_units_to_decimal(&amount));
    Ok(())
}

fn parse_amount(args: cli::ParseArgs) -> Result<()> {
    let amount = parse_decimal_to_minor_units(args.amount.trim())?;
    println!("{}", amount.to_minor_units_string());
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("mobwallet {}", env!("CARGO_PKG_VERSION"));
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
