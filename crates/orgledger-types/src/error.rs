//! Error types for orgledger.
//!
//! All errors use the `OL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Registry errors (organizations, tokens, parameters)
//! - 2xx: Balance ledger errors
//! - 3xx: Offer / matching errors
//! - 4xx: Gateway errors
//! - 9xx: Internal errors

use thiserror::Error;

use crate::{AccountId, OfferId, OrgId, TokenAmount};

/// Central error enum for all orgledger operations.
///
/// Every user-facing variant is a synchronous precondition failure reported
/// before any mutation; `InvariantViolation` signals a ledger bug, never
/// user error.
#[derive(Debug, Error)]
pub enum OrgledgerError {
    // =================================================================
    // Registry Errors (1xx)
    // =================================================================
    /// The organization does not exist.
    #[error("OL_ERR_100: Organization not found: {0}")]
    OrganizationNotFound(OrgId),

    /// The token is not registered for this organization.
    #[error("OL_ERR_101: Invalid token for {org_id}: {symbol}")]
    InvalidToken { org_id: OrgId, symbol: String },

    /// The (token account, symbol) pair is already registered.
    #[error("OL_ERR_102: This token symbol is already added: {token_account} {symbol}")]
    DuplicateToken {
        token_account: AccountId,
        symbol: String,
    },

    /// No configuration parameter stored under this key.
    #[error("OL_ERR_103: Parameter not found: {key}")]
    ParamNotFound { key: String },

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough available balance to perform the operation.
    #[error("OL_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        needed: TokenAmount,
        available: TokenAmount,
    },

    /// Operand token kinds do not match exactly (code + precision).
    #[error("OL_ERR_201: Token mismatch: expected {expected}, got {got}")]
    TokenMismatch { expected: String, got: String },

    // =================================================================
    // Offer / Matching Errors (3xx)
    // =================================================================
    /// The offer does not exist or is already closed.
    #[error("OL_ERR_300: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer request failed validation (bad quantity, price, side).
    #[error("OL_ERR_301: Invalid offer: {reason}")]
    InvalidOffer { reason: String },

    /// The caller is not the required principal for this operation.
    #[error("OL_ERR_302: Unauthorized: caller {account} is not the required principal")]
    Unauthorized { account: AccountId },

    /// An account tried to accept its own offer.
    #[error("OL_ERR_303: Self-trade prevented: acceptor is the offer creator")]
    SelfTradeBlocked,

    // =================================================================
    // Gateway Errors (4xx)
    // =================================================================
    /// The inbound transfer memo did not name a target organization.
    #[error("OL_ERR_400: Invalid transfer memo: {memo:?}")]
    InvalidTransferMemo { memo: String },

    /// A deposit or withdrawal request failed validation.
    #[error("OL_ERR_401: Invalid transfer: {reason}")]
    InvalidTransfer { reason: String },

    // =================================================================
    // Internal (9xx)
    // =================================================================
    /// Ledger invariant broken — a programming defect, unreachable with
    /// correct callers. Aborts the request; persisted state stays intact.
    #[error("OL_ERR_900: Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OrgledgerError>;

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::TokenSymbol;

    #[test]
    fn error_display_contains_prefix() {
        let err = OrgledgerError::OrganizationNotFound(OrgId(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("OL_ERR_100"), "Got: {msg}");
        assert!(msg.contains("org:7"));
    }

    #[test]
    fn insufficient_funds_display() {
        let sym = TokenSymbol::new("TLOS", 4);
        let err = OrgledgerError::InsufficientFunds {
            needed: TokenAmount::new(Decimal::new(100, 0), sym.clone()),
            available: TokenAmount::new(Decimal::new(50, 0), sym),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OL_ERR_200"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_ol_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(OrgledgerError::OfferNotFound(OfferId(1))),
            Box::new(OrgledgerError::SelfTradeBlocked),
            Box::new(OrgledgerError::DuplicateToken {
                token_account: AccountId::from("token.c"),
                symbol: "4,CTK".into(),
            }),
            Box::new(OrgledgerError::InvalidTransferMemo { memo: "???".into() }),
            Box::new(OrgledgerError::InvariantViolation("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OL_ERR_"),
                "Error missing OL_ERR_ prefix: {msg}"
            );
        }
    }
}
