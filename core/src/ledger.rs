//! Ledger sync status as reported by the daemon.
//!
//! The send form refuses to build a payment until the wallet has caught up
//! with the network. The predicate below is the one the wallet has always
//! shipped, including its asymmetric edges; see `DESIGN.md` before changing
//! it.

use serde::{Deserialize, Serialize};

use crate::config::SYNC_BLOCK_SLACK;

/// Message shown in place of the send button while [`LedgerStatus::is_synced`]
/// is false.
pub const NOT_SYNCED_MESSAGE: &str = "Wallet must sync with ledger before sending MOB.";

/// Block indices reported by the daemon. Either may be unknown right after
/// start-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatus {
    /// Highest block index the network has published.
    pub network_highest_block_index: Option<i64>,
    /// Next block the local wallet will scan.
    pub next_block: Option<i64>,
}

impl LedgerStatus {
    /// Creates a status from known indices.
    pub fn new(network_highest_block_index: i64, next_block: i64) -> Self {
        Self {
            network_highest_block_index: Some(network_highest_block_index),
            next_block: Some(next_block),
        }
    }

    /// Whether the wallet is close enough to the network tip to send.
    ///
    /// Unknown or negative indices are never synced. A wallet more than one
    /// block *ahead* of the network is treated as not synced; otherwise it is
    /// synced while the network is fewer than [`SYNC_BLOCK_SLACK`] blocks
    /// ahead of `next_block`.
    pub fn is_synced(&self) -> bool {
        let (highest, next) = match (self.network_highest_block_index, self.next_block) {
            (Some(highest), Some(next)) => (highest, next),
            _ => return false,
        };
        if highest < 0 || next < 0 || next - 1 > highest {
            return false;
        }
        highest - next < SYNC_BLOCK_SLACK
    }
}
