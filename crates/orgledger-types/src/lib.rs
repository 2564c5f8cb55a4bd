//! # orgledger-types
//!
//! Shared types and errors for the **orgledger** token ledger and matching
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrgId`], [`OfferId`], [`TokenIdx`], [`AccountId`],
//!   [`TradeId`], [`AuthenticatedCaller`]
//! - **Amounts**: [`TokenSymbol`], [`TokenAmount`]
//! - **Balance model**: [`BalanceEntry`]
//! - **Offer model**: [`Offer`], [`OfferSide`], [`OfferStatus`]
//! - **Fill model**: [`Fill`]
//! - **Parameters**: [`ParamValue`]
//! - **Errors**: [`OrgledgerError`] with `OL_ERR_` prefix codes
//! - **Constants**: the native token and system-wide limits

pub mod asset;
pub mod balance;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;
pub mod params;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use orgledger_types::{Offer, OfferSide, TokenAmount, ...};

pub use asset::*;
pub use balance::*;
pub use error::*;
pub use ids::*;
pub use offer::*;
pub use params::*;
pub use trade::*;

// Constants are accessed via `orgledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
