//! The balance ledger.
//!
//! One row per (organization, owner, token account, symbol), split into
//! `available` and `locked` funds. All mutations are atomic: either the full
//! operation succeeds or the row is unchanged. `settle` is the only path by
//! which value crosses accounts, and it spends locked funds exclusively —
//! an offer's committed funds can never be drained through `available`.
//!
//! Token-membership validation (which symbols an organization accepts) is
//! the gateway's responsibility; the ledger only enforces exact symbol
//! agreement between a row and its operands.

use std::collections::HashMap;

use orgledger_types::{
    AccountId, BalanceEntry, OrgId, OrgledgerError, Result, TokenAmount, TokenSymbol,
};
use rust_decimal::Decimal;

type RowKey = (OrgId, AccountId, AccountId, TokenSymbol);

/// Ledger of per-(organization, owner, token) balances.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    rows: HashMap<RowKey, BalanceEntry>,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Increase `available`, creating the row on first deposit.
    pub fn credit(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        let entry = self.row_mut(org_id, owner, token_account, amount)?;
        entry.available = entry.available.checked_add(amount)?;
        Ok(())
    }

    /// Decrease `available`.
    ///
    /// # Errors
    /// `InsufficientFunds` if `available < amount`.
    pub fn debit(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        let entry = self.existing_row_mut(org_id, owner, token_account, amount)?;
        if entry.available.amount < amount.amount {
            return Err(OrgledgerError::InsufficientFunds {
                needed: amount.clone(),
                available: entry.available.clone(),
            });
        }
        entry.available = entry.available.checked_sub(amount)?;
        Ok(())
    }

    /// Move `amount` from `available` to `locked` on the same row.
    ///
    /// # Errors
    /// `InsufficientFunds` if `available < amount`.
    pub fn lock(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        let entry = self.existing_row_mut(org_id, owner, token_account, amount)?;
        if entry.available.amount < amount.amount {
            return Err(OrgledgerError::InsufficientFunds {
                needed: amount.clone(),
                available: entry.available.clone(),
            });
        }
        entry.available = entry.available.checked_sub(amount)?;
        entry.locked = entry.locked.checked_add(amount)?;
        Ok(())
    }

    /// Move `amount` from `locked` back to `available`.
    ///
    /// # Errors
    /// `InvariantViolation` if `locked < amount` — correct callers never
    /// unlock more than they locked, so this is a ledger bug, not user error.
    pub fn unlock(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        let entry = self.existing_locked_row_mut(org_id, owner, token_account, amount)?;
        entry.locked = entry.locked.checked_sub(amount)?;
        entry.available = entry.available.checked_add(amount)?;
        Ok(())
    }

    /// Atomically move `amount` from `from`'s `locked` to `to`'s `available`.
    ///
    /// The only cross-account value path. Never touches the sender's
    /// `available`, so only previously locked funds can be spent by a match.
    ///
    /// # Errors
    /// `InvariantViolation` if the sender's locked funds are insufficient.
    pub fn settle(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        org_id: OrgId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        {
            let sender = self.existing_locked_row_mut(org_id, from, token_account, amount)?;
            sender.locked = sender.locked.checked_sub(amount)?;
        }
        {
            let receiver = self.row_mut(org_id, to, token_account, amount)?;
            receiver.available = receiver.available.checked_add(amount)?;
        }
        tracing::debug!(%org_id, %from, %to, %amount, "settled locked funds");
        Ok(())
    }

    /// The balance row for a (org, owner, token) triple; zero if absent.
    #[must_use]
    pub fn balance(
        &self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        symbol: &TokenSymbol,
    ) -> BalanceEntry {
        self.rows
            .get(&(
                org_id,
                owner.clone(),
                token_account.clone(),
                symbol.clone(),
            ))
            .cloned()
            .unwrap_or_else(|| BalanceEntry::new(symbol.clone()))
    }

    /// Whether the sender's locked funds cover `amount`. Lets callers verify
    /// a settlement precondition before mutating anything.
    #[must_use]
    pub fn can_settle(
        &self,
        from: &AccountId,
        org_id: OrgId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> bool {
        self.balance(org_id, from, token_account, &amount.symbol)
            .locked
            .amount
            >= amount.amount
    }

    /// Σ(available + locked) across all owners of one (org, symbol).
    #[must_use]
    pub fn total_supply(&self, org_id: OrgId, symbol: &TokenSymbol) -> Decimal {
        self.rows
            .iter()
            .filter(|((org, _, _, sym), _)| *org == org_id && sym == symbol)
            .map(|(_, entry)| entry.available.amount + entry.locked.amount)
            .sum()
    }

    /// Number of rows (zero-balance rows persist; they still count).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_mut(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<&mut BalanceEntry> {
        let entry = self
            .rows
            .entry((
                org_id,
                owner.clone(),
                token_account.clone(),
                amount.symbol.clone(),
            ))
            .or_insert_with(|| BalanceEntry::new(amount.symbol.clone()));
        entry.available.ensure_same_symbol(amount)?;
        Ok(entry)
    }

    fn existing_row_mut(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<&mut BalanceEntry> {
        let entry = self
            .rows
            .get_mut(&(
                org_id,
                owner.clone(),
                token_account.clone(),
                amount.symbol.clone(),
            ))
            .ok_or_else(|| OrgledgerError::InsufficientFunds {
                needed: amount.clone(),
                available: TokenAmount::zero(amount.symbol.clone()),
            })?;
        entry.available.ensure_same_symbol(amount)?;
        Ok(entry)
    }

    fn existing_locked_row_mut(
        &mut self,
        org_id: OrgId,
        owner: &AccountId,
        token_account: &AccountId,
        amount: &TokenAmount,
    ) -> Result<&mut BalanceEntry> {
        let entry = self
            .rows
            .get_mut(&(
                org_id,
                owner.clone(),
                token_account.clone(),
                amount.symbol.clone(),
            ))
            .ok_or_else(|| {
                OrgledgerError::InvariantViolation(format!(
                    "no locked funds for {owner} in {org_id}: {amount}"
                ))
            })?;
        entry.locked.ensure_same_symbol(amount)?;
        if entry.locked.amount < amount.amount {
            return Err(OrgledgerError::InvariantViolation(format!(
                "locked balance {} below requested {amount} for {owner}",
                entry.locked
            )));
        }
        Ok(entry)
    }
}

fn ensure_non_negative(amount: &TokenAmount) -> Result<()> {
    if amount.is_negative() {
        return Err(OrgledgerError::InvariantViolation(format!(
            "negative ledger operand: {amount}"
        )));
    }
    Ok(())
}
