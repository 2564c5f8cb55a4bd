//! The matching engine: offer lifecycle and fill settlement.
//!
//! Every mutating entry point validates all preconditions before touching
//! the ledger or the offer store, so a failed request leaves no partial
//! state behind. The settlement choreography per accepted offer:
//!
//! - **SELL offer** (taker buys): lock the taker's quote cost, settle
//!   taker→creator in quote, settle creator→taker in base.
//! - **BUY offer** (taker sells): lock the taker's base quantity, settle
//!   taker→creator in base, settle creator→taker in quote.
//!
//! Both legs spend locked funds only. The offer's `reserved` amount shrinks
//! by what each fill settles out of the creator's lock; whatever remains at
//! closure (quote-side rounding residue on BUY offers) is unlocked back to
//! the creator.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use orgledger_ledger::BalanceLedger;
use orgledger_registry::OrgDirectory;
use orgledger_types::constants::{native_symbol, native_token_account};
use orgledger_types::{
    AccountId, AuthenticatedCaller, Fill, Offer, OfferId, OfferSide, OfferStatus, OrgId,
    OrgledgerError, Result, TokenAmount, TokenIdx, TradeId,
};

use crate::offer_book::OfferBook;

/// Offer store plus the fill-sequence counters that make trade ids
/// deterministic.
#[derive(Debug, Default)]
pub struct MatchingEngine {
    book: OfferBook,
    fill_seq: HashMap<(OrgId, OfferId), u64>,
}

impl MatchingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            book: OfferBook::new(),
            fill_seq: HashMap::new(),
        }
    }

    /// Create an offer, locking the creator's funds: the base quantity for a
    /// SELL, the full quote cost for a BUY.
    ///
    /// The priced token must be one of the organization's registered tokens
    /// (never the native token itself), and the price is always denominated
    /// in the native token.
    pub fn create_offer(
        &mut self,
        caller: &AuthenticatedCaller,
        directory: &OrgDirectory,
        ledger: &mut BalanceLedger,
        org_id: OrgId,
        side: OfferSide,
        quantity: TokenAmount,
        price_per_unit: TokenAmount,
        conversion_info: BTreeMap<String, TokenAmount>,
    ) -> Result<OfferId> {
        if !quantity.is_positive() {
            return Err(OrgledgerError::InvalidOffer {
                reason: format!("quantity must be positive, got {quantity}"),
            });
        }
        if !price_per_unit.is_positive() {
            return Err(OrgledgerError::InvalidOffer {
                reason: format!("price must be positive, got {price_per_unit}"),
            });
        }
        if price_per_unit.symbol != native_symbol() {
            return Err(OrgledgerError::InvalidOffer {
                reason: format!(
                    "price must be denominated in {}, got {}",
                    native_symbol(),
                    price_per_unit.symbol
                ),
            });
        }
        let (token_idx, token_account) = directory.resolve_token(org_id, &quantity)?;
        if token_idx == TokenIdx(0) {
            return Err(OrgledgerError::InvalidOffer {
                reason: "cannot trade the native token against itself".into(),
            });
        }

        let (lock_account, reserved) = match side {
            OfferSide::Sell => (token_account, quantity.clone()),
            OfferSide::Buy => {
                let cost = quantity.quote_cost(&price_per_unit);
                if !cost.is_positive() {
                    return Err(OrgledgerError::InvalidOffer {
                        reason: format!("offer cost {cost} rounds to zero"),
                    });
                }
                (native_token_account(), cost)
            }
        };
        ledger.lock(org_id, caller.account(), &lock_account, &reserved)?;

        let offer = Offer {
            id: OfferId(0), // assigned by the store
            org_id,
            creator: caller.account().clone(),
            side,
            status: OfferStatus::Open,
            available_quantity: quantity.clone(),
            total_quantity: quantity,
            price_per_unit,
            reserved,
            token_idx,
            conversion_info,
            created_at: Utc::now(),
        };
        let offer_id = self.book.insert(offer);
        tracing::info!(%org_id, %offer_id, %side, caller = %caller.account(), "offer created");
        Ok(offer_id)
    }

    /// Cancel an open offer and unlock whatever is still reserved for it.
    /// Creator only.
    pub fn remove_offer(
        &mut self,
        caller: &AuthenticatedCaller,
        directory: &OrgDirectory,
        ledger: &mut BalanceLedger,
        org_id: OrgId,
        offer_id: OfferId,
    ) -> Result<()> {
        let offer = self.book.get(org_id, offer_id)?;
        if !caller.is(&offer.creator) {
            return Err(OrgledgerError::Unauthorized {
                account: caller.account().clone(),
            });
        }
        let lock_account = lock_account_for(directory, offer)?;
        let offer = self.book.remove(org_id, offer_id)?;
        self.fill_seq.remove(&(org_id, offer_id));
        ledger.unlock(org_id, &offer.creator, &lock_account, &offer.reserved)?;
        tracing::info!(%org_id, %offer_id, caller = %caller.account(), "offer removed");
        Ok(())
    }

    /// Accept an open offer for up to `quantity` of its base token.
    ///
    /// Trades `min(quantity, available)` and settles both legs; the offer
    /// closes when fully filled. The returned [`Fill`] carries a trade id
    /// that is deterministic in (organization, offer, fill sequence).
    pub fn accept_offer(
        &mut self,
        caller: &AuthenticatedCaller,
        directory: &OrgDirectory,
        ledger: &mut BalanceLedger,
        org_id: OrgId,
        offer_id: OfferId,
        quantity: TokenAmount,
    ) -> Result<Fill> {
        let offer = self.book.get(org_id, offer_id)?.clone();
        if caller.is(&offer.creator) {
            return Err(OrgledgerError::SelfTradeBlocked);
        }
        offer.available_quantity.ensure_same_symbol(&quantity)?;
        if !quantity.is_positive() {
            return Err(OrgledgerError::InvalidOffer {
                reason: format!("accept quantity must be positive, got {quantity}"),
            });
        }

        // Oversized requests trade what the offer still has.
        let traded = if quantity.amount > offer.available_quantity.amount {
            offer.available_quantity.clone()
        } else {
            quantity
        };
        let cost = traded.quote_cost(&offer.price_per_unit);
        if !cost.is_positive() {
            return Err(OrgledgerError::InvalidOffer {
                reason: format!("trade cost {cost} rounds to zero"),
            });
        }

        let (base_account, _) = directory.token_by_idx(org_id, offer.token_idx)?;
        let quote_account = native_token_account();
        let taker = caller.account();
        let maker = &offer.creator;

        // Everything after this point must be unable to fail: verify both
        // settlement legs up front, then mutate.
        match offer.side {
            OfferSide::Sell => {
                ensure_reserved_covers(&offer, &traded)?;
                ensure_available(ledger, org_id, taker, &quote_account, &cost)?;
                if !ledger.can_settle(maker, org_id, &base_account, &traded) {
                    return Err(OrgledgerError::InvariantViolation(format!(
                        "{offer_id}: creator lock below fill quantity {traded}"
                    )));
                }
                ledger.lock(org_id, taker, &quote_account, &cost)?;
                ledger.settle(taker, maker, org_id, &quote_account, &cost)?;
                ledger.settle(maker, taker, org_id, &base_account, &traded)?;
            }
            OfferSide::Buy => {
                ensure_reserved_covers(&offer, &cost)?;
                ensure_available(ledger, org_id, taker, &base_account, &traded)?;
                if !ledger.can_settle(maker, org_id, &quote_account, &cost) {
                    return Err(OrgledgerError::InvariantViolation(format!(
                        "{offer_id}: creator lock below fill cost {cost}"
                    )));
                }
                ledger.lock(org_id, taker, &base_account, &traded)?;
                ledger.settle(taker, maker, org_id, &base_account, &traded)?;
                ledger.settle(maker, taker, org_id, &quote_account, &cost)?;
            }
        }

        let spent_from_lock = match offer.side {
            OfferSide::Sell => &traded,
            OfferSide::Buy => &cost,
        };
        let new_reserved = offer.reserved.checked_sub(spent_from_lock)?;
        let new_available = offer.available_quantity.checked_sub(&traded)?;

        let seq = self.fill_seq.entry((org_id, offer_id)).or_insert(0);
        let trade_id = TradeId::deterministic(org_id.0, offer_id.0, *seq);
        *seq += 1;

        if new_available.is_zero() {
            // Fully filled: close the offer and release any rounding residue
            // still locked on the creator's row (BUY offers only). Offer ids
            // are never reused, so the fill counter goes with the row.
            self.book.remove(org_id, offer_id)?;
            self.fill_seq.remove(&(org_id, offer_id));
            if new_reserved.is_positive() {
                let lock_account = match offer.side {
                    OfferSide::Sell => base_account.clone(),
                    OfferSide::Buy => quote_account.clone(),
                };
                ledger.unlock(org_id, maker, &lock_account, &new_reserved)?;
            }
        } else {
            self.book.update_quantity(org_id, offer_id, new_available.clone())?;
            self.book.update_reserved(org_id, offer_id, new_reserved)?;
        }

        let fill = Fill {
            trade_id,
            org_id,
            offer_id,
            maker: maker.clone(),
            taker: taker.clone(),
            taker_side: offer.side.opposite(),
            base_quantity: traded,
            quote_cost: cost,
            executed_at: Utc::now(),
        };
        tracing::info!(
            %org_id, %offer_id, %trade_id,
            quantity = %fill.base_quantity, cost = %fill.quote_cost,
            closed = new_available.is_zero(),
            "offer accepted"
        );
        Ok(fill)
    }

    /// Look up an open offer.
    pub fn offer(&self, org_id: OrgId, offer_id: OfferId) -> Result<&Offer> {
        self.book.get(org_id, offer_id)
    }

    /// Best open offer on the given side for one token.
    #[must_use]
    pub fn best_match(&self, org_id: OrgId, side: OfferSide, token_idx: TokenIdx) -> Option<&Offer> {
        self.book.best_match(org_id, side, token_idx)
    }

    /// Number of open offers in one organization.
    #[must_use]
    pub fn open_count(&self, org_id: OrgId) -> usize {
        self.book.open_count(org_id)
    }
}

/// Which account's row holds the creator's lock for this offer.
fn lock_account_for(directory: &OrgDirectory, offer: &Offer) -> Result<AccountId> {
    match offer.side {
        OfferSide::Sell => {
            let (account, _) = directory.token_by_idx(offer.org_id, offer.token_idx)?;
            Ok(account)
        }
        OfferSide::Buy => Ok(native_token_account()),
    }
}

fn ensure_reserved_covers(offer: &Offer, amount: &TokenAmount) -> Result<()> {
    if offer.reserved.amount < amount.amount {
        return Err(OrgledgerError::InvariantViolation(format!(
            "{}: reserved {} below required {amount}",
            offer.id, offer.reserved
        )));
    }
    Ok(())
}

fn ensure_available(
    ledger: &BalanceLedger,
    org_id: OrgId,
    owner: &AccountId,
    token_account: &AccountId,
    amount: &TokenAmount,
) -> Result<()> {
    let balance = ledger.balance(org_id, owner, token_account, &amount.symbol);
    if balance.available.amount < amount.amount {
        return Err(OrgledgerError::InsufficientFunds {
            needed: amount.clone(),
            available: balance.available,
        });
    }
    Ok(())
}
