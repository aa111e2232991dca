//! # CLI Interface
//!
//! Defines the command-line argument structure for `mobwallet` using
//! `clap` derive. Daemon location and log format are global and fall back
//! to environment variables.

use clap::{Args, Parser, Subcommand};

use mobwallet_core::config::DEFAULT_FEE;

use crate::logging::LogFormat;

/// Where the wallet daemon listens unless told otherwise.
pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:9090";

/// Send MOB and open gift codes through a local wallet daemon.
///
/// Every transaction is built by the daemon first and shown for
/// confirmation before anything is submitted to the network.
#[derive(Parser, Debug)]
#[command(
    name = "mobwallet",
    about = "Send MOB and open gift codes through a local wallet daemon",
    version,
    propagate_version = true
)]
pub struct MobWalletCli {
    /// JSON-RPC endpoint of the wallet daemon.
    #[arg(
        long,
        global = true,
        env = "MOBWALLET_DAEMON_URL",
        default_value = DEFAULT_DAEMON_URL
    )]
    pub daemon_url: String,

    /// Log output format on stderr.
    #[arg(
        long,
        global = true,
        env = "MOBWALLET_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, confirm, and submit a payment.
    Send(SendArgs),
    /// Open a gift code and claim it into your account.
    Gift(GiftArgs),
    /// Render a picoMOB integer as a MOB amount.
    Format(FormatArgs),
    /// Convert a MOB amount to picoMOB.
    Parse(ParseArgs),
    /// Show the account balance and ledger sync status.
    Status,
    /// Print version information and exit.
    Version,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Amount in MOB, e.g. `1.5`. No digit grouping.
    pub amount: String,

    /// Recipient public address.
    pub recipient: String,

    /// Network fee in MOB.
    #[arg(long, default_value = DEFAULT_FEE)]
    pub fee: String,

    /// Address of the account to pay from. Defaults to the primary account.
    #[arg(long)]
    pub from: Option<String>,

    /// Submit without asking for confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the `gift` subcommand.
#[derive(Args, Debug)]
pub struct GiftArgs {
    /// The gift code to open.
    pub code: String,

    /// Address of the account receiving the gift. Defaults to the primary
    /// account.
    #[arg(long)]
    pub to: Option<String>,

    /// Claim without asking for confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the `format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Amount in picoMOB (digits only).
    pub pico_mob: String,
}

/// Arguments for the `parse` subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Amount in MOB, e.g. `0.01`.
    pub amount: String,
}
