//! # orgledger-match
//!
//! Offer lifecycle and matching on top of the balance ledger, plus the
//! deposit/withdraw gateway that moves value in and out of an organization.
//!
//! - [`OfferBook`] — per-organization offer store with price-time ranking
//! - [`MatchingEngine`] — create/remove/accept with locked-funds settlement
//! - [`Gateway`] — inbound deposit handling and outbound withdrawals

pub mod engine;
pub mod gateway;
pub mod offer_book;
pub mod rank;

pub use engine::MatchingEngine;
pub use gateway::{Gateway, TransferNotice, TransferSink};
pub use offer_book::OfferBook;
