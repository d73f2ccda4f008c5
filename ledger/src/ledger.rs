//! # Balances, Allowances, and the Transfer Capability
//!
//! The [`Ledger`] is an in-memory account ledger: per-asset, per-account
//! balances plus ERC20-style allowances. It is the reference implementation
//! of the [`TokenLedger`] trait — the seam through which the locking vault
//! (or any other contract) moves value without ever owning the books.
//!
//! ## Allowance Model
//!
//! A holder who wants a contract to collect funds calls
//! [`approve`](Ledger::approve), granting the contract's account a spending
//! limit. The contract then pulls via [`transfer_from`](TokenLedger::transfer_from),
//! which debits the owner, credits the recipient, and decrements the
//! allowance by the transferred amount. `approve` overwrites the previous
//! limit rather than adding to it.
//!
//! ## Atomicity
//!
//! Every operation validates all of its preconditions before touching any
//! balance. A failed transfer leaves balances, allowances, and supply
//! exactly as they were — there is no partial debit or credit.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::asset::{AssetId, AssetInfo};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced asset does not exist.
    #[error("asset not found: {0}")]
    AssetNotFound(AssetId),

    /// An asset with this symbol already exists.
    #[error("duplicate symbol: an asset with symbol '{0}' already exists")]
    DuplicateSymbol(String),

    /// The caller is not the issuer of this asset.
    #[error("unauthorized: only the issuer can mint asset {asset}")]
    UnauthorizedMint {
        /// The asset that was being minted.
        asset: AssetId,
    },

    /// Minting would push total supply past `u64::MAX`.
    #[error("supply overflow: minting {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u64,
    },

    /// Crediting an account would push its balance past `u64::MAX`.
    #[error("balance overflow: account {account} cannot receive {amount}")]
    BalanceOverflow {
        /// The account that was being credited.
        account: String,
        /// The amount that caused the overflow.
        amount: u64,
    },

    /// Attempted to move more than the available balance.
    #[error("insufficient balance: account {account} has {available}, requested {requested}")]
    InsufficientBalance {
        /// The account that was being debited.
        account: String,
        /// The current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// The spender's allowance does not cover the requested transfer.
    #[error(
        "insufficient allowance: spender {spender} is approved for {approved} by {owner}, requested {requested}"
    )]
    InsufficientAllowance {
        /// The account whose funds were being pulled.
        owner: String,
        /// The account attempting the pull.
        spender: String,
        /// The currently approved limit.
        approved: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Zero-amount transfers are a no-op and likely indicate a caller bug.
    #[error("zero-amount operations are not permitted")]
    ZeroAmount,
}

// ---------------------------------------------------------------------------
// TokenLedger trait
// ---------------------------------------------------------------------------

/// The transfer capability a contract consumes.
///
/// This is deliberately the narrowest possible surface: a contract can move
/// funds it holds, pull funds it was approved for, and read balances.
/// Registration, minting, and approvals stay on the concrete [`Ledger`] —
/// they are invoked by account owners, never by contracts.
pub trait TokenLedger {
    /// Moves `amount` of `asset` from `from` to `to`.
    fn transfer(&mut self, asset: &str, from: &str, to: &str, amount: u64)
        -> Result<(), LedgerError>;

    /// Pulls `amount` of `asset` from `owner` to `to`, spending part of the
    /// allowance `owner` previously granted to `spender`.
    fn transfer_from(
        &mut self,
        asset: &str,
        owner: &str,
        spender: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Returns the balance of `account` for `asset`, or 0.
    fn balance_of(&self, asset: &str, account: &str) -> u64;
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// In-memory account ledger with allowance support.
///
/// In production this state would live behind a persistence layer; the
/// in-memory representation carries the full validation logic and is what
/// the vault's test suites and the demo run against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Registered assets keyed by their unique id.
    assets: HashMap<AssetId, AssetInfo>,
    /// Per-asset, per-account balances: `asset -> (account -> balance)`.
    balances: HashMap<AssetId, HashMap<String, u64>>,
    /// Per-asset allowances: `asset -> (owner -> (spender -> limit))`.
    allowances: HashMap<AssetId, HashMap<String, HashMap<String, u64>>>,
    /// Index from symbol to asset id for uniqueness enforcement.
    symbol_index: HashMap<String, AssetId>,
}

impl Ledger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new asset and returns its unique id.
    ///
    /// The asset starts with zero supply; the issuer must [`mint`](Self::mint)
    /// to create it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateSymbol`] if the symbol is taken.
    pub fn register_asset(
        &mut self,
        name: &str,
        symbol: &str,
        decimals: u8,
        issuer: &str,
    ) -> Result<AssetId, LedgerError> {
        let symbol_upper = symbol.to_uppercase();
        if self.symbol_index.contains_key(&symbol_upper) {
            return Err(LedgerError::DuplicateSymbol(symbol.to_string()));
        }

        let id: AssetId = Uuid::new_v4().to_string();
        let info = AssetInfo {
            id: id.clone(),
            name: name.to_string(),
            symbol: symbol_upper.clone(),
            decimals,
            issuer: issuer.to_string(),
            total_supply: 0,
            created_at: Utc::now(),
        };

        self.assets.insert(id.clone(), info);
        self.balances.insert(id.clone(), HashMap::new());
        self.allowances.insert(id.clone(), HashMap::new());
        self.symbol_index.insert(symbol_upper, id.clone());

        info!(asset = %id, symbol, issuer, "asset registered");
        Ok(id)
    }

    /// Mints new units of `asset` to `to`. Only the asset's issuer may mint.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AssetNotFound`] for an unknown asset,
    /// [`LedgerError::UnauthorizedMint`] if `caller` is not the issuer, and
    /// [`LedgerError::SupplyOverflow`] / [`LedgerError::BalanceOverflow`] if
    /// the mint would wrap.
    pub fn mint(
        &mut self,
        asset: &str,
        caller: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let info = self
            .assets
            .get(asset)
            .ok_or_else(|| LedgerError::AssetNotFound(asset.to_string()))?;

        if caller != info.issuer {
            return Err(LedgerError::UnauthorizedMint {
                asset: asset.to_string(),
            });
        }

        let new_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;

        // Validate the credit before committing either side.
        let current = self.balance_of(asset, to);
        let new_balance = current
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                account: to.to_string(),
                amount,
            })?;

        if let Some(info) = self.assets.get_mut(asset) {
            info.total_supply = new_supply;
        }
        self.balances
            .entry(asset.to_string())
            .or_default()
            .insert(to.to_string(), new_balance);

        info!(asset, to, amount, "minted");
        Ok(())
    }

    /// Sets the allowance `owner` grants to `spender` for `asset`.
    ///
    /// Overwrites any previous allowance — this is a limit, not a budget
    /// increment.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AssetNotFound`] for an unknown asset.
    pub fn approve(
        &mut self,
        asset: &str,
        owner: &str,
        spender: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if !self.assets.contains_key(asset) {
            return Err(LedgerError::AssetNotFound(asset.to_string()));
        }

        self.allowances
            .entry(asset.to_string())
            .or_default()
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);

        debug!(asset, owner, spender, amount, "allowance set");
        Ok(())
    }

    /// Returns the allowance `owner` has granted to `spender`, or 0.
    pub fn allowance(&self, asset: &str, owner: &str, spender: &str) -> u64 {
        self.allowances
            .get(asset)
            .and_then(|per_owner| per_owner.get(owner))
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the total supply of an asset, or 0 if it does not exist.
    pub fn total_supply(&self, asset: &str) -> u64 {
        self.assets.get(asset).map(|a| a.total_supply).unwrap_or(0)
    }

    /// Returns metadata for an asset, or `None` if it does not exist.
    pub fn asset_info(&self, asset: &str) -> Option<&AssetInfo> {
        self.assets.get(asset)
    }

    /// Returns the number of registered assets.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Validates a balance movement without committing it.
    ///
    /// Returns the post-transfer balances `(from_after, to_after)`.
    fn check_movement(
        &self,
        asset: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<(u64, u64), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if !self.assets.contains_key(asset) {
            return Err(LedgerError::AssetNotFound(asset.to_string()));
        }

        let from_balance = self.balance_of(asset, from);
        let from_after =
            from_balance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    account: from.to_string(),
                    available: from_balance,
                    requested: amount,
                })?;

        // Self-transfers must not double-count: debit and credit cancel.
        let to_after = if from == to {
            from_balance
        } else {
            self.balance_of(asset, to)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow {
                    account: to.to_string(),
                    amount,
                })?
        };

        Ok((from_after, to_after))
    }

    /// Commits a pre-validated balance movement.
    fn commit_movement(&mut self, asset: &str, from: &str, to: &str, from_after: u64, to_after: u64) {
        let balances = self.balances.entry(asset.to_string()).or_default();
        balances.insert(from.to_string(), from_after);
        balances.insert(to.to_string(), to_after);
    }
}

impl TokenLedger for Ledger {
    fn transfer(
        &mut self,
        asset: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let (from_after, to_after) = self.check_movement(asset, from, to, amount)?;
        self.commit_movement(asset, from, to, from_after, to_after);

        debug!(asset, from, to, amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: &str,
        owner: &str,
        spender: &str,
        to: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let approved = self.allowance(asset, owner, spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
                approved,
                requested: amount,
            });
        }

        let (owner_after, to_after) = self.check_movement(asset, owner, to, amount)?;

        // All checks passed: spend the allowance and move the balance.
        self.allowances
            .entry(asset.to_string())
            .or_default()
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), approved - amount);
        self.commit_movement(asset, owner, to, owner_after, to_after);

        debug!(asset, owner, spender, to, amount, "transfer_from");
        Ok(())
    }

    fn balance_of(&self, asset: &str, account: &str) -> u64 {
        self.balances
            .get(asset)
            .and_then(|per_account| per_account.get(account))
            .copied()
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
