//! Fill records produced by the matching engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, OfferId, OfferSide, OrgId, TokenAmount, TradeId};

/// The immutable record of one settled fill against an offer.
///
/// The maker is the offer creator; the taker is the accepting account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// Deterministic from (org, offer, fill sequence).
    pub trade_id: TradeId,
    pub org_id: OrgId,
    pub offer_id: OfferId,
    /// The offer creator.
    pub maker: AccountId,
    /// The accepting account.
    pub taker: AccountId,
    /// Which side the taker was on.
    pub taker_side: OfferSide,
    /// Executed base-token quantity.
    pub base_quantity: TokenAmount,
    /// Quote-token cost = quantity × price, truncated to quote precision.
    pub quote_cost: TokenAmount,
    pub executed_at: DateTime<Utc>,
}

impl std::fmt::Display for Fill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill[{}] {} {} {} for {}",
            self.trade_id, self.offer_id, self.taker_side, self.base_quantity, self.quote_cost,
        )
    }
}
