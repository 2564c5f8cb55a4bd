//! Offer types for the matching engine.
//!
//! An offer is scoped to one organization and references the token it trades
//! by index into the organization's allow-list. Creating an offer locks the
//! creator's funds; `reserved` tracks exactly how much of that lock is still
//! outstanding so removal and closure release the right amount.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, OfferId, OrgId, Result, TokenAmount, TokenIdx};

/// Which side of the trade the offer creator is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OfferSide {
    Sell,
    Buy,
}

impl OfferSide {
    /// The side an acceptor of this offer takes.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Sell => Self::Buy,
            Self::Buy => Self::Sell,
        }
    }
}

impl std::fmt::Display for OfferSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sell => write!(f, "SELL"),
            Self::Buy => write!(f, "BUY"),
        }
    }
}

/// Lifecycle status of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OfferStatus {
    Open,
    Closed,
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// An outstanding buy/sell offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub org_id: OrgId,
    pub creator: AccountId,
    pub side: OfferSide,
    pub status: OfferStatus,
    /// Remaining tradable amount (base token).
    pub available_quantity: TokenAmount,
    /// Original amount (base token).
    pub total_quantity: TokenAmount,
    /// Price per one unit of base, denominated in the quote token.
    pub price_per_unit: TokenAmount,
    /// What is still locked on the creator's balance for this offer:
    /// base quantity for a SELL, remaining quote cost for a BUY.
    pub reserved: TokenAmount,
    /// Which of the organization's tokens this offer trades.
    pub token_idx: TokenIdx,
    /// Opaque price-conversion metadata; stored, never interpreted.
    pub conversion_info: BTreeMap<String, TokenAmount>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == OfferStatus::Open
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.available_quantity.is_zero()
    }

    /// Cumulative traded amount (total − available).
    pub fn filled_quantity(&self) -> Result<TokenAmount> {
        self.total_quantity.checked_sub(&self.available_quantity)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy(side: OfferSide, quantity: TokenAmount, price_per_unit: TokenAmount) -> Self {
        let reserved = match side {
            OfferSide::Sell => quantity.clone(),
            OfferSide::Buy => quantity.quote_cost(&price_per_unit),
        };
        Self {
            id: OfferId(0),
            org_id: OrgId(0),
            creator: AccountId::from("creator"),
            side,
            status: OfferStatus::Open,
            available_quantity: quantity.clone(),
            total_quantity: quantity,
            price_per_unit,
            reserved,
            token_idx: TokenIdx(1),
            conversion_info: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}
