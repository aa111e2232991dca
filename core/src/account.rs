//! # Accounts
//!
//! Read-only account snapshots as the session hands them to the staging
//! pipeline. The daemon owns the real balance; whenever it reports a new
//! one the caller builds a fresh [`Accounts`] and swaps it in wholesale.
//!
//! The collection is a genuine list even though today's wallet only ever
//! has one account, so the send form can select a sender by address
//! instead of assuming a single global entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::MonetaryAmount;

/// One spendable account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Public address (b58 code).
    pub address: String,
    /// Optional user-chosen name.
    pub name: Option<String>,
    /// Current balance in picoMOB.
    pub balance: MonetaryAmount,
}

impl Account {
    /// Creates an account snapshot.
    pub fn new(address: impl Into<String>, name: Option<String>, balance: MonetaryAmount) -> Self {
        Self {
            address: address.into(),
            name,
            balance,
        }
    }

    /// Label shown next to the sender radio button: `"<name>: "`, or
    /// `"Unnamed Account: "` when no usable name is set.
    pub fn label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{}: ", name),
            _ => "Unnamed Account: ".to_string(),
        }
    }
}

/// An account list with no entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("account list must contain at least one account")]
pub struct EmptyAccounts;

/// A non-empty, ordered set of accounts. The first entry is the default
/// sender. Serializes as a plain list; an empty list is rejected on the way
/// in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Account>", into = "Vec<Account>")]
pub struct Accounts {
    entries: Vec<Account>,
}

impl Accounts {
    /// A collection holding exactly one account.
    pub fn single(account: Account) -> Self {
        Self {
            entries: vec![account],
        }
    }

    /// Builds a collection from a list. Returns `None` for an empty list.
    pub fn from_vec(entries: Vec<Account>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self { entries })
    }

    /// The default sender.
    pub fn primary(&self) -> &Account {
        // Non-empty by construction.
        &self.entries[0]
    }

    /// Looks up an account by its public address.
    pub fn find(&self, address: &str) -> Option<&Account> {
        self.entries.iter().find(|a| a.address == address)
    }

    /// Iterates in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.entries.iter()
    }

    /// Number of accounts (always at least one).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<Account>> for Accounts {
    type Error = EmptyAccounts;

    fn try_from(entries: Vec<Account>) -> Result<Self, Self::Error> {
        Self::from_vec(entries).ok_or(EmptyAccounts)
    }
}

impl From<Accounts> for Vec<Account> {
    fn from(accounts: Accounts) -> Self {
        accounts.entries
    }
}
