//! Variant values for configuration parameters and organization attributes.

use serde::{Deserialize, Serialize};

use crate::{AccountId, TokenAmount};

/// A dynamically typed parameter value.
///
/// Stored in the configuration store and in per-organization attribute maps;
/// the core never interprets these beyond storing and returning them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Uint(u64),
    Int(i64),
    Float(f64),
    Account(AccountId),
    Amount(TokenAmount),
    Text(String),
}
