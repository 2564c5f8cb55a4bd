//! Per-organization offer store with ordered ranking indexes.
//!
//! Offers live in a plain map keyed by sequential id; each side additionally
//! maintains a `BTreeSet` of ranking keys (see [`crate::rank`]) so the best
//! counter-offer for a token is a range scan away. The ranking key is fully
//! derivable from the offer, so removal rebuilds the key from the stored row
//! instead of carrying a reverse index.

use std::collections::{BTreeSet, HashMap};

use orgledger_types::{
    Offer, OfferId, OfferSide, OfferStatus, OrgId, OrgledgerError, Result, TokenAmount, TokenIdx,
};

use crate::rank::{AskKey, BidKey};

#[derive(Debug, Default)]
struct OrgOffers {
    next_id: u64,
    offers: HashMap<OfferId, Offer>,
    asks: BTreeSet<AskKey>,
    bids: BTreeSet<BidKey>,
}

/// All outstanding offers, partitioned by organization.
#[derive(Debug, Default)]
pub struct OfferBook {
    orgs: HashMap<OrgId, OrgOffers>,
}

impl OfferBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orgs: HashMap::new(),
        }
    }

    /// Persist a new offer, assigning the next id in its organization's
    /// sequence. The offer's `id` field is overwritten.
    pub fn insert(&mut self, mut offer: Offer) -> OfferId {
        let org = self.orgs.entry(offer.org_id).or_default();
        let id = OfferId(org.next_id);
        org.next_id += 1;
        offer.id = id;
        match offer.side {
            OfferSide::Sell => {
                org.asks.insert(AskKey::for_offer(&offer));
            }
            OfferSide::Buy => {
                org.bids.insert(BidKey::for_offer(&offer));
            }
        }
        org.offers.insert(id, offer);
        id
    }

    pub fn get(&self, org_id: OrgId, offer_id: OfferId) -> Result<&Offer> {
        self.orgs
            .get(&org_id)
            .and_then(|org| org.offers.get(&offer_id))
            .ok_or(OrgledgerError::OfferNotFound(offer_id))
    }

    /// Delete an offer, returning the removed row marked CLOSED.
    pub fn remove(&mut self, org_id: OrgId, offer_id: OfferId) -> Result<Offer> {
        let org = self
            .orgs
            .get_mut(&org_id)
            .ok_or(OrgledgerError::OfferNotFound(offer_id))?;
        let mut offer = org
            .offers
            .remove(&offer_id)
            .ok_or(OrgledgerError::OfferNotFound(offer_id))?;
        match offer.side {
            OfferSide::Sell => {
                org.asks.remove(&AskKey::for_offer(&offer));
            }
            OfferSide::Buy => {
                org.bids.remove(&BidKey::for_offer(&offer));
            }
        }
        offer.status = OfferStatus::Closed;
        Ok(offer)
    }

    /// Set the remaining tradable quantity. Quantity does not participate in
    /// the ranking key, so no reindexing happens.
    ///
    /// # Errors
    /// `InvariantViolation` if the new quantity is negative or exceeds the
    /// offer's original total.
    pub fn update_quantity(
        &mut self,
        org_id: OrgId,
        offer_id: OfferId,
        new_available: TokenAmount,
    ) -> Result<()> {
        let offer = self.get_mut(org_id, offer_id)?;
        offer.total_quantity.ensure_same_symbol(&new_available)?;
        if new_available.is_negative() || new_available.amount > offer.total_quantity.amount {
            return Err(OrgledgerError::InvariantViolation(format!(
                "quantity {new_available} out of range for {offer_id}"
            )));
        }
        offer.available_quantity = new_available;
        Ok(())
    }

    /// Set the remaining reserved (still-locked) amount.
    pub fn update_reserved(
        &mut self,
        org_id: OrgId,
        offer_id: OfferId,
        new_reserved: TokenAmount,
    ) -> Result<()> {
        let offer = self.get_mut(org_id, offer_id)?;
        offer.reserved.ensure_same_symbol(&new_reserved)?;
        if new_reserved.is_negative() {
            return Err(OrgledgerError::InvariantViolation(format!(
                "negative reserve {new_reserved} for {offer_id}"
            )));
        }
        offer.reserved = new_reserved;
        Ok(())
    }

    /// Best open offer on the given side for one token: lowest-priced ask or
    /// highest-priced bid, earliest creation breaking ties.
    #[must_use]
    pub fn best_match(&self, org_id: OrgId, side: OfferSide, token_idx: TokenIdx) -> Option<&Offer> {
        let org = self.orgs.get(&org_id)?;
        let id = match side {
            OfferSide::Sell => org
                .asks
                .range(AskKey::min(token_idx)..=AskKey::max(token_idx))
                .next()
                .map(|key| key.offer_id),
            OfferSide::Buy => org
                .bids
                .range(BidKey::min(token_idx)..=BidKey::max(token_idx))
                .next()
                .map(|key| key.offer_id),
        }?;
        org.offers.get(&id)
    }

    /// Number of open offers in one organization.
    #[must_use]
    pub fn open_count(&self, org_id: OrgId) -> usize {
        self.orgs.get(&org_id).map_or(0, |org| org.offers.len())
    }

    fn get_mut(&mut self, org_id: OrgId, offer_id: OfferId) -> Result<&mut Offer> {
        self.orgs
            .get_mut(&org_id)
            .and_then(|org| org.offers.get_mut(&offer_id))
            .ok_or(OrgledgerError::OfferNotFound(offer_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use orgledger_types::TokenSymbol;
    use rust_decimal::Decimal;

    use super::*;

    fn dtk(amount: i64) -> TokenAmount {
        TokenAmount::new(Decimal::new(amount, 0), TokenSymbol::new("DTK", 4))
    }

    fn tlos(amount: i64) -> TokenAmount {
        TokenAmount::new(Decimal::new(amount, 0), TokenSymbol::new("TLOS", 4))
    }

    fn make_offer(org: u64, side: OfferSide, price: i64, secs: i64) -> Offer {
        let mut offer = Offer::dummy(side, dtk(10), tlos(price));
        offer.org_id = OrgId(org);
        offer.created_at = Utc.timestamp_opt(secs, 0).unwrap();
        offer
    }

    #[test]
    fn insert_assigns_sequential_ids_per_org() {
        let mut book = OfferBook::new();
        let a = book.insert(make_offer(1, OfferSide::Sell, 2, 0));
        let b = book.insert(make_offer(1, OfferSide::Buy, 2, 0));
        let c = book.insert(make_offer(2, OfferSide::Sell, 2, 0));
        assert_eq!(a, OfferId(0));
        assert_eq!(b, OfferId(1));
        // A different organization has its own sequence.
        assert_eq!(c, OfferId(0));
        assert_eq!(book.open_count(OrgId(1)), 2);
        assert_eq!(book.open_count(OrgId(2)), 1);
    }

    #[test]
    fn get_missing_offer_fails() {
        let book = OfferBook::new();
        assert!(matches!(
            book.get(OrgId(1), OfferId(0)),
            Err(OrgledgerError::OfferNotFound(_))
        ));
    }

    #[test]
    fn remove_deletes_row_and_index() {
        let mut book = OfferBook::new();
        let id = book.insert(make_offer(1, OfferSide::Sell, 2, 0));
        let removed = book.remove(OrgId(1), id).unwrap();
        assert_eq!(removed.id, id);
        assert!(book.get(OrgId(1), id).is_err());
        assert!(book.best_match(OrgId(1), OfferSide::Sell, TokenIdx(1)).is_none());
        // Second removal fails.
        assert!(book.remove(OrgId(1), id).is_err());
    }

    #[test]
    fn best_ask_is_lowest_price_then_earliest() {
        let mut book = OfferBook::new();
        book.insert(make_offer(1, OfferSide::Sell, 3, 10));
        let cheap_late = book.insert(make_offer(1, OfferSide::Sell, 2, 50));
        book.insert(make_offer(1, OfferSide::Sell, 2, 60));

        let best = book.best_match(OrgId(1), OfferSide::Sell, TokenIdx(1)).unwrap();
        // Price beats time; among equal prices the earlier offer wins.
        assert_eq!(best.id, cheap_late);
    }

    #[test]
    fn best_bid_is_highest_price_then_earliest() {
        let mut book = OfferBook::new();
        book.insert(make_offer(1, OfferSide::Buy, 2, 10));
        let rich_early = book.insert(make_offer(1, OfferSide::Buy, 3, 20));
        book.insert(make_offer(1, OfferSide::Buy, 3, 30));

        let best = book.best_match(OrgId(1), OfferSide::Buy, TokenIdx(1)).unwrap();
        assert_eq!(best.id, rich_early);
    }

    #[test]
    fn best_match_respects_token_idx() {
        let mut book = OfferBook::new();
        let mut other_token = make_offer(1, OfferSide::Sell, 1, 0);
        other_token.token_idx = TokenIdx(2);
        book.insert(other_token);

        assert!(book.best_match(OrgId(1), OfferSide::Sell, TokenIdx(1)).is_none());
        assert!(book.best_match(OrgId(1), OfferSide::Sell, TokenIdx(2)).is_some());
    }

    #[test]
    fn update_quantity_within_bounds() {
        let mut book = OfferBook::new();
        let id = book.insert(make_offer(1, OfferSide::Sell, 2, 0));
        book.update_quantity(OrgId(1), id, dtk(4)).unwrap();
        assert_eq!(book.get(OrgId(1), id).unwrap().available_quantity, dtk(4));

        let err = book.update_quantity(OrgId(1), id, dtk(11)).unwrap_err();
        assert!(matches!(err, OrgledgerError::InvariantViolation(_)));
        let err = book.update_quantity(OrgId(1), id, dtk(-1)).unwrap_err();
        assert!(matches!(err, OrgledgerError::InvariantViolation(_)));
    }

    #[test]
    fn update_reserved_rejects_mismatched_symbol() {
        let mut book = OfferBook::new();
        let id = book.insert(make_offer(1, OfferSide::Sell, 2, 0));
        let err = book.update_reserved(OrgId(1), id, tlos(1)).unwrap_err();
        assert!(matches!(err, OrgledgerError::TokenMismatch { .. }));
    }

    #[test]
    fn removed_offers_come_back_marked_closed() {
        // The store holds open offers only; closing = removal, and the
        // removed record carries CLOSED status so downstream consumers see
        // a self-describing row.
        let mut book = OfferBook::new();
        let id = book.insert(make_offer(1, OfferSide::Sell, 2, 0));
        assert!(book.get(OrgId(1), id).unwrap().is_open());
        let offer = book.remove(OrgId(1), id).unwrap();
        assert_eq!(offer.status, OfferStatus::Closed);
        assert!(!offer.is_open());
        assert_eq!(book.open_count(OrgId(1)), 0);
    }
}
