//! Terminal rendering: notifications, the confirmation dialog, and the
//! y/N prompt.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use mobwallet_core::amount::{format_mob, MonetaryAmount};
use mobwallet_core::staging::{ConfirmationSummary, IntentKind, Notifier, Severity};

/// Prints notifications to the terminal. Errors go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        let line = render_notification(message, severity);
        match severity {
            Severity::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

pub fn render_notification(message: &str, severity: Severity) -> String {
    let tag = match severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Warning => "warn",
        Severity::Error => "error",
    };
    format!("[{}] {}", tag, message)
}

/// The confirmation dialog as plain text.
pub fn render_summary(summary: &ConfirmationSummary) -> String {
    let mut lines = Vec::new();
    match summary.kind {
        IntentKind::Send => {
            lines.push("Please check and confirm this transaction:".to_string());
            lines.push(format!("  Recipient         {}", summary.receiver));
            lines.push(format!("  Balance           {}", format_mob(&summary.balance)));
            lines.push(format!("  Amount            {}", format_mob(&summary.total_value)));
            lines.push(format!("  Fee               {}", format_mob(&summary.fee)));
            lines.push(format!("  Total             {}", format_mob(&summary.total_sent)));
            match &summary.remaining_balance {
                Some(rest) => lines.push(format!("  Remaining balance {}", format_mob(rest))),
                None => lines.push("  Remaining balance (exceeds balance)".to_string()),
            }
        }
        IntentKind::Gift => {
            lines.push("Please check and confirm this gift:".to_string());
            lines.push(format!("  Account           {}", summary.receiver));
            lines.push(format!("  Balance           {}", format_mob(&summary.balance)));
            lines.push(format!("  Gift value        {}", format_mob(&summary.total_value)));
            lines.push(format!("  Fee               {}", format_mob(&summary.fee)));
            if let Some(after) = &summary.increased_balance {
                lines.push(format!("  New balance       {}", format_mob(after)));
            }
        }
    }
    lines.join("\n")
}

/// Reads a yes/no answer. Anything but `y`/`yes` is no.
pub fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Shows the dialog and waits for the user's answer on stdin.
pub async fn prompt_confirmation(summary: &ConfirmationSummary) -> Result<bool> {
    println!("{}", render_summary(summary));
    print!("Confirm? [y/N] ");
    io::stdout().flush().context("failed to flush stdout")?;

    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await
    .context("prompt task failed")?
    .context("failed to read confirmation")?;
    Ok(parse_answer(&answer))
}

/// Account block for `status`. `sendable` is the balance less the default
/// fee.
pub fn render_balance(
    label: &str,
    address: &str,
    balance: &MonetaryAmount,
    sendable: &MonetaryAmount,
) -> String {
    format!(
        "{}{}\n  Balance      {}\n  Max sendable {}",
        label,
        address,
        format_mob(balance),
        format_mob(sendable)
    )
}
