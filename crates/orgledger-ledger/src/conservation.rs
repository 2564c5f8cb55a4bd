//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced after any sequence of operations:
//! ```text
//! ∀ (org, token): Σ(available + locked) == Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! Offer creation, removal, and settlement only move funds between the two
//! halves of rows or between owners; only gateway deposits and withdrawals
//! change the totals. A failed check means the ledger has a bug.

use std::collections::HashMap;

use orgledger_types::{OrgId, OrgledgerError, Result, TokenSymbol};
use rust_decimal::Decimal;

type SupplyKey = (OrgId, TokenSymbol);

/// Tracks per-(organization, token) deposit/withdrawal totals and validates
/// conservation against the ledger's actual row sums.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    deposits: HashMap<SupplyKey, Decimal>,
    withdrawals: HashMap<SupplyKey, Decimal>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            deposits: HashMap::new(),
            withdrawals: HashMap::new(),
        }
    }

    /// Record an inbound deposit.
    pub fn record_deposit(&mut self, org_id: OrgId, symbol: &TokenSymbol, amount: Decimal) {
        *self
            .deposits
            .entry((org_id, symbol.clone()))
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Record an outbound withdrawal.
    pub fn record_withdrawal(&mut self, org_id: OrgId, symbol: &TokenSymbol, amount: Decimal) {
        *self
            .withdrawals
            .entry((org_id, symbol.clone()))
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Expected supply: deposits − withdrawals.
    #[must_use]
    pub fn expected_supply(&self, org_id: OrgId, symbol: &TokenSymbol) -> Decimal {
        let key = (org_id, symbol.clone());
        let deposited = self.deposits.get(&key).copied().unwrap_or(Decimal::ZERO);
        let withdrawn = self.withdrawals.get(&key).copied().unwrap_or(Decimal::ZERO);
        deposited - withdrawn
    }

    /// Verify the actual supply against the expected supply.
    ///
    /// # Errors
    /// [`OrgledgerError::InvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, org_id: OrgId, symbol: &TokenSymbol, actual: Decimal) -> Result<()> {
        let expected = self.expected_supply(org_id, symbol);
        if actual != expected {
            return Err(OrgledgerError::InvariantViolation(format!(
                "{org_id} {symbol}: actual supply {actual} != expected {expected}"
            )));
        }
        Ok(())
    }
}
