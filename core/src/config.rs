//! # Wallet Constants
//!
//! Every magic number the staging pipeline relies on lives here: the
//! minor-unit exponent, the default fee, the ticker used in messages, and
//! the block slack the send form tolerates before calling the wallet synced.

// ---------------------------------------------------------------------------
// Denomination
// ---------------------------------------------------------------------------

/// Number of fractional digits in a MOB amount. One MOB is 10^12 picoMOB.
pub const MINOR_UNIT_DECIMALS: usize = 12;

/// Minor units (picoMOB) per major unit (MOB).
pub const MINOR_UNITS_PER_MOB: u64 = 1_000_000_000_000;

/// Ticker appended to formatted amounts in user-facing messages.
pub const CURRENCY_TICKER: &str = "MOB";

/// Decimal separator accepted by the parser and produced by the formatter.
pub const DECIMAL_SEPARATOR: char = '.';

/// Digit-group separator. Display only; the parser rejects it.
pub const GROUP_SEPARATOR: char = ',';

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Default network fee as the send form pre-fills it: 0.01 MOB.
pub const DEFAULT_FEE: &str = "0.010000000000";

/// [`DEFAULT_FEE`] in picoMOB.
pub const DEFAULT_FEE_PICO_MOB: u64 = 10_000_000_000;

// ---------------------------------------------------------------------------
// Ledger Sync
// ---------------------------------------------------------------------------

/// The wallet counts as synced while the network's highest block index is
/// less than this many blocks ahead of the wallet's next block.
pub const SYNC_BLOCK_SLACK: i64 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_match_decimals() {
        assert_eq!(
            MINOR_UNITS_PER_MOB,
            10u64.pow(MINOR_UNIT_DECIMALS as u32)
        );
    }

    #[test]
    fn default_fee_constants_agree() {
        // 0.01 MOB = 10^10 picoMOB, and the string form has all 12 digits.
        assert_eq!(DEFAULT_FEE_PICO_MOB, MINOR_UNITS_PER_MOB / 100);
        let (_, frac) = DEFAULT_FEE.split_once(DECIMAL_SEPARATOR).unwrap();
        assert_eq!(frac.len(), MINOR_UNIT_DECIMALS);
    }

    #[test]
    fn separators_are_distinct() {
        assert_ne!(DECIMAL_SEPARATOR, GROUP_SEPARATOR);
    }
}
