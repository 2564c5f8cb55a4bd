//! Fixed-precision token amounts.
//!
//! Every magnitude in the ledger is a [`Decimal`] tagged with a
//! [`TokenSymbol`] (code + precision). Ledger operations require the symbols
//! of their operands to match exactly; there is no implicit conversion or
//! rounding. Quote costs derived from a price are truncated toward zero to
//! the quote symbol's precision.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{OrgledgerError, Result};

/// A token symbol: short uppercase code plus fixed decimal precision.
///
/// Two symbols are the same token kind only if both code and precision match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenSymbol {
    code: String,
    precision: u32,
}

impl TokenSymbol {
    #[must_use]
    pub fn new(code: impl Into<String>, precision: u32) -> Self {
        Self {
            code: code.into(),
            precision,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn precision(&self) -> u32 {
        self.precision
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Precision-first form, e.g. "4,TLOS".
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// A token magnitude tagged with its symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub amount: Decimal,
    pub symbol: TokenSymbol,
}

impl TokenAmount {
    #[must_use]
    pub fn new(amount: Decimal, symbol: TokenSymbol) -> Self {
        Self { amount, symbol }
    }

    /// The zero amount of the given symbol.
    #[must_use]
    pub fn zero(symbol: TokenSymbol) -> Self {
        Self::new(Decimal::ZERO, symbol)
    }

    /// A different magnitude of the same symbol.
    #[must_use]
    pub fn with_amount(&self, amount: Decimal) -> Self {
        Self::new(amount, self.symbol.clone())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Fails with `TokenMismatch` unless `other` carries the same symbol.
    pub fn ensure_same_symbol(&self, other: &Self) -> Result<()> {
        if self.symbol == other.symbol {
            Ok(())
        } else {
            Err(OrgledgerError::TokenMismatch {
                expected: self.symbol.to_string(),
                got: other.symbol.to_string(),
            })
        }
    }

    /// Sum of two amounts of the same symbol.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.ensure_same_symbol(other)?;
        Ok(self.with_amount(self.amount + other.amount))
    }

    /// Difference of two amounts of the same symbol. The result may be
    /// negative; callers check their own bounds before mutating state.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.ensure_same_symbol(other)?;
        Ok(self.with_amount(self.amount - other.amount))
    }

    /// Quote-currency cost of trading `self` units at `price` per unit.
    ///
    /// The fractional remainder beyond the quote precision is truncated
    /// toward zero, never rounded up.
    #[must_use]
    pub fn quote_cost(&self, price: &Self) -> Self {
        let raw = self.amount * price.amount;
        let truncated =
            raw.round_dp_with_strategy(price.symbol.precision, RoundingStrategy::ToZero);
        Self::new(truncated, price.symbol.clone())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.symbol.code)
    }
}
