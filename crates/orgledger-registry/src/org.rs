//! The organization directory.
//!
//! Plain keyed-record CRUD plus the per-organization token allow-list. The
//! only invariants are "record must exist" and the append-only, duplicate-free
//! token list; the ledger and matching engine call into this directory to
//! validate organizations and resolve tokens.

use std::collections::BTreeMap;

use orgledger_types::constants::{MAX_TOKENS_PER_ORG, native_symbol, native_token_account};
use orgledger_types::{
    AccountId, AuthenticatedCaller, OrgId, OrgledgerError, ParamValue, Result, TokenAmount,
    TokenIdx, TokenSymbol,
};

/// One registered organization.
#[derive(Debug, Clone)]
pub struct Organization {
    pub org_id: OrgId,
    pub name: AccountId,
    pub creator: AccountId,
    /// Content hash of the organization's off-chain metadata.
    pub metadata_uri: String,
    pub attributes: BTreeMap<String, ParamValue>,
    /// Organization-specific token allow-list, append-only.
    /// The native token is implicit and not stored here.
    pub tokens: Vec<(AccountId, TokenSymbol)>,
}

/// Directory of organizations, keyed by sequential [`OrgId`].
#[derive(Debug, Default)]
pub struct OrgDirectory {
    orgs: BTreeMap<OrgId, Organization>,
    next_id: OrgId,
}

impl OrgDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orgs: BTreeMap::new(),
            next_id: OrgId(0),
        }
    }

    /// Register a new organization. Registration itself is gated by the
    /// hosting platform's administration, so no caller check here.
    pub fn create(
        &mut self,
        name: AccountId,
        creator: AccountId,
        metadata_uri: impl Into<String>,
    ) -> OrgId {
        let org_id = self.next_id;
        self.next_id = self.next_id.next();
        self.orgs.insert(
            org_id,
            Organization {
                org_id,
                name: name.clone(),
                creator,
                metadata_uri: metadata_uri.into(),
                attributes: BTreeMap::new(),
                tokens: Vec::new(),
            },
        );
        tracing::info!(%org_id, %name, "organization registered");
        org_id
    }

    pub fn get(&self, org_id: OrgId) -> Result<&Organization> {
        self.orgs
            .get(&org_id)
            .ok_or(OrgledgerError::OrganizationNotFound(org_id))
    }

    /// Replace the organization's metadata URI. Creator only.
    pub fn update(
        &mut self,
        caller: &AuthenticatedCaller,
        org_id: OrgId,
        metadata_uri: impl Into<String>,
    ) -> Result<()> {
        let org = self.get_mut_authorized(caller, org_id)?;
        org.metadata_uri = metadata_uri.into();
        Ok(())
    }

    /// Delete the organization record. Creator only.
    pub fn remove(&mut self, caller: &AuthenticatedCaller, org_id: OrgId) -> Result<()> {
        self.get_mut_authorized(caller, org_id)?;
        self.orgs.remove(&org_id);
        Ok(())
    }

    /// Insert or overwrite attribute values. Creator only.
    pub fn upsert_attributes(
        &mut self,
        caller: &AuthenticatedCaller,
        org_id: OrgId,
        attributes: Vec<(String, ParamValue)>,
    ) -> Result<()> {
        let org = self.get_mut_authorized(caller, org_id)?;
        for (key, value) in attributes {
            org.attributes.insert(key, value);
        }
        Ok(())
    }

    /// Delete attributes by key; keys that are not present are ignored.
    pub fn delete_attributes(
        &mut self,
        caller: &AuthenticatedCaller,
        org_id: OrgId,
        keys: &[String],
    ) -> Result<()> {
        let org = self.get_mut_authorized(caller, org_id)?;
        for key in keys {
            org.attributes.remove(key);
        }
        Ok(())
    }

    // =================================================================
    // Token allow-list
    // =================================================================

    /// Register a token for the organization. Creator only, append-only.
    ///
    /// # Errors
    /// `DuplicateToken` if the (token account, symbol) pair is already
    /// registered (the native token counts as registered everywhere).
    pub fn add_token(
        &mut self,
        caller: &AuthenticatedCaller,
        org_id: OrgId,
        token_account: AccountId,
        symbol: TokenSymbol,
    ) -> Result<TokenIdx> {
        let org = self.get_mut_authorized(caller, org_id)?;
        let is_native = token_account == native_token_account() && symbol == native_symbol();
        let duplicate = is_native
            || org
                .tokens
                .iter()
                .any(|(acct, sym)| acct == &token_account && sym == &symbol);
        if duplicate {
            return Err(OrgledgerError::DuplicateToken {
                token_account,
                symbol: symbol.to_string(),
            });
        }
        if org.tokens.len() >= MAX_TOKENS_PER_ORG {
            return Err(OrgledgerError::InvalidToken {
                org_id,
                symbol: symbol.to_string(),
            });
        }
        org.tokens.push((token_account.clone(), symbol.clone()));
        // Index 0 is the native token; list entries start at 1.
        let idx = TokenIdx(u8::try_from(org.tokens.len()).unwrap_or(u8::MAX));
        tracing::info!(%org_id, %token_account, %symbol, %idx, "token registered");
        Ok(idx)
    }

    /// Resolve which token account issues the given amount's symbol, along
    /// with its index in the organization's list.
    ///
    /// # Errors
    /// `InvalidToken` if the symbol is registered neither system-wide nor
    /// for this organization.
    pub fn resolve_token(
        &self,
        org_id: OrgId,
        amount: &TokenAmount,
    ) -> Result<(TokenIdx, AccountId)> {
        let org = self.get(org_id)?;
        if amount.symbol == native_symbol() {
            return Ok((TokenIdx(0), native_token_account()));
        }
        org.tokens
            .iter()
            .position(|(_, sym)| sym == &amount.symbol)
            .map(|pos| {
                let (acct, _) = &org.tokens[pos];
                (TokenIdx(u8::try_from(pos + 1).unwrap_or(u8::MAX)), acct.clone())
            })
            .ok_or_else(|| OrgledgerError::InvalidToken {
                org_id,
                symbol: amount.symbol.to_string(),
            })
    }

    /// Look up a token by its allow-list index.
    pub fn token_by_idx(&self, org_id: OrgId, idx: TokenIdx) -> Result<(AccountId, TokenSymbol)> {
        let org = self.get(org_id)?;
        if idx.0 == 0 {
            return Ok((native_token_account(), native_symbol()));
        }
        org.tokens
            .get(usize::from(idx.0) - 1)
            .cloned()
            .ok_or(OrgledgerError::InvalidToken {
                org_id,
                symbol: idx.to_string(),
            })
    }

    /// Check that the exact (token account, symbol) pair is registered for
    /// the organization. Used by the deposit gateway, where the notifying
    /// contract account must match the registered issuer.
    pub fn verify_registered(
        &self,
        org_id: OrgId,
        token_account: &AccountId,
        symbol: &TokenSymbol,
    ) -> Result<()> {
        let org = self.get(org_id)?;
        let native = token_account == &native_token_account() && symbol == &native_symbol();
        if native
            || org
                .tokens
                .iter()
                .any(|(acct, sym)| acct == token_account && sym == symbol)
        {
            Ok(())
        } else {
            Err(OrgledgerError::InvalidToken {
                org_id,
                symbol: symbol.to_string(),
            })
        }
    }

    /// Drop every organization record.
    pub fn reset(&mut self) {
        self.orgs.clear();
        self.next_id = OrgId(0);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.orgs.len()
    }

    fn get_mut_authorized(
        &mut self,
        caller: &AuthenticatedCaller,
        org_id: OrgId,
    ) -> Result<&mut Organization> {
        let org = self
            .orgs
            .get_mut(&org_id)
            .ok_or(OrgledgerError::OrganizationNotFound(org_id))?;
        if !caller.is(&org.creator) {
            return Err(OrgledgerError::Unauthorized {
                account: caller.account().clone(),
            });
        }
        Ok(org)
    }
}
