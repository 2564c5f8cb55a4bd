//! Balance tracking types.
//!
//! Every (organization, owner, token) row splits its funds into `available`
//! (immediately spendable) and `locked` (reserved by an open offer). Both
//! halves carry the same symbol and are never negative.

use serde::{Deserialize, Serialize};

use crate::{Result, TokenAmount, TokenSymbol};

/// One balance row: available vs. locked funds of a single token kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Spendable by the owner: withdrawals, new offer locks.
    pub available: TokenAmount,
    /// Reserved by open offers; released only by unlock or settlement.
    pub locked: TokenAmount,
}

impl BalanceEntry {
    /// A zero balance of the given symbol.
    #[must_use]
    pub fn new(symbol: TokenSymbol) -> Self {
        Self {
            available: TokenAmount::zero(symbol.clone()),
            locked: TokenAmount::zero(symbol),
        }
    }

    /// Total balance (available + locked).
    pub fn total(&self) -> Result<TokenAmount> {
        self.available.checked_add(&self.locked)
    }

    /// Whether this row holds no funds at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.locked.is_zero()
    }
}
