//! # orgledger-registry
//!
//! The external collaborators of the core ledger: the organization directory
//! (keyed-record CRUD with attribute maps), the per-organization token
//! allow-list, and the generic configuration store.
//!
//! None of these carry invariants beyond "record must exist" plus the
//! append-only, duplicate-free token list; the Balance Ledger and Matching
//! Engine call into them to validate organizations and resolve tokens.

pub mod config;
pub mod org;

pub use config::{ConfigParam, ConfigStore};
pub use org::{OrgDirectory, Organization};
