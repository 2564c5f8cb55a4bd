//! Generic key/value configuration store.
//!
//! Holds operator-set parameters as [`ParamValue`] variants with a free-form
//! description. No invariants beyond key existence on reads.

use std::collections::BTreeMap;

use orgledger_types::{OrgledgerError, ParamValue, Result};

/// One stored parameter.
#[derive(Debug, Clone)]
pub struct ConfigParam {
    pub value: ParamValue,
    pub description: String,
}

/// In-memory configuration table.
#[derive(Debug, Default)]
pub struct ConfigStore {
    params: BTreeMap<String, ConfigParam>,
}

impl ConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Insert or overwrite a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: ParamValue, description: impl Into<String>) {
        self.params.insert(
            key.into(),
            ConfigParam {
                value,
                description: description.into(),
            },
        );
    }

    /// Read a parameter value.
    pub fn get(&self, key: &str) -> Result<&ParamValue> {
        self.params
            .get(key)
            .map(|p| &p.value)
            .ok_or_else(|| OrgledgerError::ParamNotFound { key: key.into() })
    }

    /// Remove a parameter.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        self.params
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| OrgledgerError::ParamNotFound { key: key.into() })
    }

    /// Drop all parameters.
    pub fn reset(&mut self) {
        self.params.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut store = ConfigStore::new();
        store.set("testparam", ParamValue::Uint(20), "test param");
        assert_eq!(store.get("testparam").unwrap(), &ParamValue::Uint(20));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_overwrites() {
        let mut store = ConfigStore::new();
        store.set("k", ParamValue::Uint(1), "");
        store.set("k", ParamValue::Int(-2), "");
        assert_eq!(store.get("k").unwrap(), &ParamValue::Int(-2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_key_errors() {
        let store = ConfigStore::new();
        assert!(matches!(
            store.get("nope"),
            Err(OrgledgerError::ParamNotFound { .. })
        ));
    }

    #[test]
    fn unset_and_reset() {
        let mut store = ConfigStore::new();
        store.set("a", ParamValue::Uint(1), "");
        store.set("b", ParamValue::Uint(2), "");
        store.unset("a").unwrap();
        assert!(store.get("a").is_err());
        assert!(store.unset("a").is_err());
        store.reset();
        assert!(store.is_empty());
    }
}
