//! Explicit ranking keys for offer matching.
//!
//! Instead of a bit-packed ordinal, each side of the book gets its own
//! ordered tuple compared lexicographically, field by field:
//!
//! - **Asks** (SELL offers): `(token_idx, price ↑, created_at ↑, offer_id ↑)`
//!   — the best ask is the *lowest* price, earliest creation first.
//! - **Bids** (BUY offers): `(token_idx, price ↓ via `Reverse`, created_at ↑,
//!   offer_id ↑)` — the best bid is the *highest* price, earliest first.
//!
//! This is price-time priority with the price direction made explicit per
//! side. Closed offers are removed from the index at close time, so status
//! never participates in the ordering. The trailing offer id makes every key
//! unique within one organization's book.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use orgledger_types::{Offer, OfferId, TokenIdx};
use rust_decimal::Decimal;

/// Ranking key for SELL offers. Lowest price first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AskKey {
    pub token_idx: TokenIdx,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub offer_id: OfferId,
}

impl AskKey {
    #[must_use]
    pub fn for_offer(offer: &Offer) -> Self {
        Self {
            token_idx: offer.token_idx,
            price: offer.price_per_unit.amount,
            created_at: offer.created_at,
            offer_id: offer.id,
        }
    }

    /// Smallest possible key for a token index (range-scan lower bound).
    #[must_use]
    pub fn min(token_idx: TokenIdx) -> Self {
        Self {
            token_idx,
            price: Decimal::MIN,
            created_at: DateTime::<Utc>::MIN_UTC,
            offer_id: OfferId(0),
        }
    }

    /// Largest possible key for a token index (range-scan upper bound).
    #[must_use]
    pub fn max(token_idx: TokenIdx) -> Self {
        Self {
            token_idx,
            price: Decimal::MAX,
            created_at: DateTime::<Utc>::MAX_UTC,
            offer_id: OfferId(u64::MAX),
        }
    }
}

/// Ranking key for BUY offers. Highest price first (`Reverse` on price).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BidKey {
    pub token_idx: TokenIdx,
    pub price: Reverse<Decimal>,
    pub created_at: DateTime<Utc>,
    pub offer_id: OfferId,
}

impl BidKey {
    #[must_use]
    pub fn for_offer(offer: &Offer) -> Self {
        Self {
            token_idx: offer.token_idx,
            price: Reverse(offer.price_per_unit.amount),
            created_at: offer.created_at,
            offer_id: offer.id,
        }
    }

    /// Smallest possible key for a token index (range-scan lower bound).
    #[must_use]
    pub fn min(token_idx: TokenIdx) -> Self {
        Self {
            token_idx,
            price: Reverse(Decimal::MAX),
            created_at: DateTime::<Utc>::MIN_UTC,
            offer_id: OfferId(0),
        }
    }

    /// Largest possible key for a token index (range-scan upper bound).
    #[must_use]
    pub fn max(token_idx: TokenIdx) -> Self {
        Self {
            token_idx,
            price: Reverse(Decimal::MIN),
            created_at: DateTime::<Utc>::MAX_UTC,
            offer_id: OfferId(u64::MAX),
        }
    }
}
