//! # orgledger-ledger
//!
//! The balance ledger: per-(organization, owner, token) rows with
//! available/locked accounting, plus the supply-conservation checker.
//!
//! Primitives exposed to the rest of the workspace:
//! - `credit` / `debit` — gateway deposits and withdrawals
//! - `lock` / `unlock` — offer creation and removal
//! - `settle` — the only cross-account value path, spends locked funds only

pub mod balance_ledger;
pub mod conservation;

pub use balance_ledger::BalanceLedger;
pub use conservation::SupplyConservation;
