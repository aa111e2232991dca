// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MobWallet Core: Transaction Staging
//!
//! Everything between "the user typed an amount" and "the daemon accepted the
//! transaction". The daemon builds and signs; this crate decides what may be
//! asked of it, holds the proposal while the user thinks it over, and makes
//! sure a closed window never receives a late answer.
//!
//! ## Architecture
//!
//! - **amount**: exact picoMOB arithmetic, decimal parsing and display.
//! - **account**: account snapshots the pipeline validates against.
//! - **ledger**: the sync predicate that gates sending.
//! - **form**: field-level validation of the send and gift forms.
//! - **guard**: the mount flag that ties async results to a live surface.
//! - **staging**: the request, confirm, and submit state machine.
//! - **config**: denomination and fee constants.
//!
//! ## Ground Rules
//!
//! 1. No floating point touches an amount.
//! 2. A proposal is either complete or absent.
//! 3. Daemon failures become state, not panics.

pub mod account;
pub mod amount;
pub mod config;
pub mod form;
pub mod guard;
pub mod ledger;
pub mod staging;
