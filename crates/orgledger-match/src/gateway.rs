//! The deposit/withdraw gateway.
//!
//! Inbound token transfers arrive as notifications from the hosting
//! platform; the memo names the target organization as a decimal id.
//! Outbound withdrawals debit the caller's own balance and enqueue a
//! transfer notice on a [`TransferSink`] for the host to deliver.
//!
//! The gateway owns the supply-conservation counters: it is the only
//! component that changes an organization's total supply, so it records
//! every deposit and withdrawal and can verify the ledger against them.

use orgledger_ledger::{BalanceLedger, SupplyConservation};
use orgledger_registry::OrgDirectory;
use orgledger_types::{
    AccountId, AuthenticatedCaller, OrgId, OrgledgerError, Result, TokenAmount, TokenSymbol,
};

/// An outbound token transfer for the hosting platform to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotice {
    /// The token contract that should perform the transfer.
    pub token_account: AccountId,
    pub from: AccountId,
    pub to: AccountId,
    pub quantity: TokenAmount,
    pub memo: String,
}

/// Destination for outbound transfers. Delivery is the host's problem;
/// enqueueing never fails, which keeps `withdraw` all-or-nothing.
pub trait TransferSink {
    fn send(&mut self, notice: TransferNotice);
}

/// Deposit/withdraw entry points plus supply accounting.
#[derive(Debug)]
pub struct Gateway {
    /// The account the ledger itself lives under; outbound transfers are
    /// sent from here.
    host: AccountId,
    supply: SupplyConservation,
}

impl Gateway {
    #[must_use]
    pub fn new(host: AccountId) -> Self {
        Self {
            host,
            supply: SupplyConservation::new(),
        }
    }

    /// Handle an inbound transfer notification. The memo must be the target
    /// organization's id as a decimal string, and the notifying token
    /// account must match the token registered for that organization.
    ///
    /// Returns the credited organization.
    pub fn on_deposit(
        &mut self,
        directory: &OrgDirectory,
        ledger: &mut BalanceLedger,
        token_account: &AccountId,
        from: &AccountId,
        quantity: &TokenAmount,
        memo: &str,
    ) -> Result<OrgId> {
        if !quantity.is_positive() {
            return Err(OrgledgerError::InvalidTransfer {
                reason: format!("deposit must be positive, got {quantity}"),
            });
        }
        let org_id = memo
            .trim()
            .parse::<u64>()
            .map(OrgId)
            .map_err(|_| OrgledgerError::InvalidTransferMemo { memo: memo.into() })?;
        directory.verify_registered(org_id, token_account, &quantity.symbol)?;

        ledger.credit(org_id, from, token_account, quantity)?;
        self.supply
            .record_deposit(org_id, &quantity.symbol, quantity.amount);
        tracing::info!(%org_id, %from, %quantity, "deposit credited");
        Ok(org_id)
    }

    /// Withdraw from the caller's own available balance. Debits the ledger,
    /// then enqueues the outbound transfer on the sink.
    pub fn withdraw(
        &mut self,
        caller: &AuthenticatedCaller,
        directory: &OrgDirectory,
        ledger: &mut BalanceLedger,
        sink: &mut dyn TransferSink,
        org_id: OrgId,
        quantity: &TokenAmount,
    ) -> Result<()> {
        if !quantity.is_positive() {
            return Err(OrgledgerError::InvalidTransfer {
                reason: format!("withdrawal must be positive, got {quantity}"),
            });
        }
        let (_, token_account) = directory.resolve_token(org_id, quantity)?;
        ledger.debit(org_id, caller.account(), &token_account, quantity)?;
        self.supply
            .record_withdrawal(org_id, &quantity.symbol, quantity.amount);

        sink.send(TransferNotice {
            token_account,
            from: self.host.clone(),
            to: caller.account().clone(),
            quantity: quantity.clone(),
            memo: format!("withdrawal from {org_id}"),
        });
        tracing::info!(%org_id, to = %caller.account(), %quantity, "withdrawal sent");
        Ok(())
    }

    /// Check that the ledger's actual supply for (org, token) equals the
    /// recorded deposits minus withdrawals.
    pub fn verify_supply(
        &self,
        ledger: &BalanceLedger,
        org_id: OrgId,
        symbol: &TokenSymbol,
    ) -> Result<()> {
        self.supply
            .verify(org_id, symbol, ledger.total_supply(org_id, symbol))
    }
}
