//! Identifiers used throughout orgledger.
//!
//! Table-scoped entities (`OrgId`, `OfferId`, `TokenIdx`) use sequential
//! numeric ids assigned by their owning store. External accounts keep their
//! host-platform names as opaque strings. `TradeId` is a UUID derived
//! deterministically from its fill coordinates so replays of the same fill
//! produce the same id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OrgId
// ---------------------------------------------------------------------------

/// Identifier of an organization. Sequential, assigned by the directory.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct OrgId(pub u64);

impl OrgId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OfferId
// ---------------------------------------------------------------------------

/// Identifier of an offer. Sequential within one organization's offer store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OfferId(pub u64);

impl OfferId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offer:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenIdx
// ---------------------------------------------------------------------------

/// Position of a token in an organization's allow-list.
///
/// Index 0 is always the system-wide native token; indexes 1.. refer to the
/// organization's registered tokens in registration order (append-only, so
/// indexes are stable for the lifetime of the organization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenIdx(pub u8);

impl fmt::Display for TokenIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tok:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An external account name on the hosting platform.
///
/// Used both for member accounts (balance owners, offer creators) and for
/// token-issuing contract accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// AuthenticatedCaller
// ---------------------------------------------------------------------------

/// The caller identity of a mutating request.
///
/// The hosting layer authenticates the request and constructs this value;
/// the core compares it against the required principal itself instead of
/// trusting an ambient check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller(AccountId);

impl AuthenticatedCaller {
    #[must_use]
    pub fn new(account: AccountId) -> Self {
        Self(account)
    }

    #[must_use]
    pub fn account(&self) -> &AccountId {
        &self.0
    }

    /// Whether this caller is the given principal.
    #[must_use]
    pub fn is(&self, principal: &AccountId) -> bool {
        &self.0 == principal
    }
}

impl fmt::Display for AuthenticatedCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caller:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TradeId
// ---------------------------------------------------------------------------

/// Unique identifier of a settled fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TradeId(pub Uuid);

impl TradeId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic `TradeId` from the fill's coordinates.
    ///
    /// The same (organization, offer, fill sequence) always yields the same
    /// id, so re-running a request log reproduces identical fill records.
    #[must_use]
    pub fn deterministic(org_id: u64, offer_id: u64, fill_seq: u64) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"orgledger:trade_id:v1:");
        hasher.update(org_id.to_le_bytes());
        hasher.update(offer_id.to_le_bytes());
        hasher.update(fill_seq.to_le_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash[..16].try_into().expect("SHA-256 produces 32 bytes");
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
