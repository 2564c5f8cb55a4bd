//! System-wide constants for orgledger.

use crate::{AccountId, TokenSymbol};

/// Account of the contract issuing the canonical native token.
pub const NATIVE_TOKEN_ACCOUNT: &str = "eosio.token";

/// Symbol code of the native token. Offer prices are always denominated in it.
pub const NATIVE_TOKEN_CODE: &str = "TLOS";

/// Fixed precision of the native token.
pub const NATIVE_TOKEN_PRECISION: u32 = 4;

/// Maximum tokens registrable per organization (keeps `TokenIdx` in range).
pub const MAX_TOKENS_PER_ORG: usize = u8::MAX as usize;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The native token's symbol.
#[must_use]
pub fn native_symbol() -> TokenSymbol {
    TokenSymbol::new(NATIVE_TOKEN_CODE, NATIVE_TOKEN_PRECISION)
}

/// The native token's issuing account.
#[must_use]
pub fn native_token_account() -> AccountId {
    AccountId::new(NATIVE_TOKEN_ACCOUNT)
}
