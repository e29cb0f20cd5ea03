//! Asset registry interface for document and finding tokens.
//!
//! The coordinator treats token contracts as opaque: it only asks who owns a
//! token. [`InMemoryAssetRegistry`] backs the reference runtime.

use std::collections::BTreeMap;

use daudit_types::{Address, DauditError, Result, TokenId, constants};

/// A non-fungible token registry at a fixed contract address.
pub trait AssetRegistry {
    /// Address identifying this registry instance.
    fn contract(&self) -> Address;

    /// Issue a new token to `owner`, pointing at an off-chain `locator`.
    fn mint(&mut self, owner: Address, locator: &str) -> Result<TokenId>;

    fn owner_of(&self, token: TokenId) -> Option<Address>;

    fn metadata_locator(&self, token: TokenId) -> Option<&str>;

    fn transfer(&mut self, from: Address, to: Address, token: TokenId) -> Result<()>;
}

/// Fail unless `token` exists in `registry` and belongs to `caller`.
///
/// # Errors
/// `TokenNotFound` or `NotTokenOwner`.
pub fn ensure_token_owner(
    registry: &dyn AssetRegistry,
    caller: Address,
    token: TokenId,
) -> Result<()> {
    match registry.owner_of(token) {
        None => Err(DauditError::TokenNotFound {
            contract: registry.contract(),
            token,
        }),
        Some(owner) if owner != caller => Err(DauditError::NotTokenOwner { caller, token }),
        Some(_) => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenEntry {
    owner: Address,
    locator: String,
}

/// Token registry held in memory. Token ids start at 1.
#[derive(Debug, Clone)]
pub struct InMemoryAssetRegistry {
    contract: Address,
    next_token: TokenId,
    tokens: BTreeMap<TokenId, TokenEntry>,
}

impl InMemoryAssetRegistry {
    #[must_use]
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            next_token: TokenId(constants::FIRST_TOKEN_ID),
            tokens: BTreeMap::new(),
        }
    }

    /// Number of tokens minted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl AssetRegistry for InMemoryAssetRegistry {
    fn contract(&self) -> Address {
        self.contract
    }

    fn mint(&mut self, owner: Address, locator: &str) -> Result<TokenId> {
        if owner.is_zero() {
            return Err(DauditError::InvalidAddress {
                reason: "cannot mint to the zero address".to_string(),
            });
        }
        let token = self.next_token;
        self.next_token = token.next();
        self.tokens.insert(
            token,
            TokenEntry {
                owner,
                locator: locator.to_string(),
            },
        );
        tracing::debug!(contract = %self.contract, %token, %owner, "Token minted");
        Ok(token)
    }

    fn owner_of(&self, token: TokenId) -> Option<Address> {
        self.tokens.get(&token).map(|t| t.owner)
    }

    fn metadata_locator(&self, token: TokenId) -> Option<&str> {
        self.tokens.get(&token).map(|t| t.locator.as_str())
    }

    fn transfer(&mut self, from: Address, to: Address, token: TokenId) -> Result<()> {
        if to.is_zero() {
            return Err(DauditError::InvalidAddress {
                reason: "cannot transfer to the zero address".to_string(),
            });
        }
        let contract = self.contract;
        let entry = self
            .tokens
            .get_mut(&token)
            .ok_or(DauditError::TokenNotFound { contract, token })?;
        if entry.owner != from {
            return Err(DauditError::NotTokenOwner {
                caller: from,
                token,
            });
        }
        entry.owner = to;
        Ok(())
    }
}
