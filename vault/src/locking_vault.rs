//! # Locking Vault
//!
//! A fixed-term, fixed-rate deposit vault. Holders lock a fungible value
//! unit during an open window; after the unlock time an administrator
//! finalizes the vault, pulling the entire interest obligation from a
//! pre-authorized reward source in one atomic step; each holder then
//! withdraws principal plus interest exactly once.
//!
//! ## State Machine
//!
//! ```text
//!        lock_tokens (now < deposit_deadline)
//!      ┌───────────────────────────────┐
//!      │                               │
//!  ┌───▼────┐                          │
//!  │  Open   │──────────────────────────┘
//!  └───┬────┘
//!      │ finalize_vault (now > unlock_time, reward pull succeeds)
//!  ┌───▼──────┐
//!  │ Finalized │  withdraw_tokens / force_withdraw, once per holder
//!  └──────────┘
//! ```
//!
//! The transition is one-way: a finalized vault never reopens, and a
//! holder's withdrawal can never be repeated. `reclaim_asset` is the single
//! exception to the lifecycle: an explicit administrative drain that works
//! in any state (see its documentation for the trust implication).
//!
//! ## Accounting Invariants
//!
//! - `total_deposited` equals the sum of all holder principals and never
//!   decreases; it is frozen once the vault finalizes.
//! - Interest truncates once for the aggregate (at finalization) and once
//!   per holder (at withdrawal), so the sum of payouts never exceeds
//!   principal plus secured interest. Truncation residue stays in the vault.
//! - State is committed only after the ledger transfer succeeds; a failed
//!   transfer leaves every counter untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use tenor_ledger::{LedgerError, TokenLedger};

use crate::config::{ConfigError, VaultConfig};
use crate::interest::{entitlement, simple_interest};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Deposits are rejected at and after the configured deadline.
    #[error("deposit window closed at {deadline} (attempted at {now})")]
    DepositWindowClosed {
        /// End of the deposit window.
        deadline: DateTime<Utc>,
        /// The clock value the deposit was attempted with.
        now: DateTime<Utc>,
    },

    /// The deposit is smaller than the configured minimum.
    #[error("deposit of {amount} is below the minimum of {minimum}")]
    BelowMinimumDeposit {
        /// The rejected deposit amount.
        amount: u64,
        /// Configured minimum single deposit.
        minimum: u64,
    },

    /// Accepting the deposit would push aggregate deposits past the cap.
    #[error("deposit of {amount} exceeds cap: {deposited} of {cap} already locked")]
    CapExceeded {
        /// The rejected deposit amount.
        amount: u64,
        /// Aggregate deposits before the attempt.
        deposited: u64,
        /// Configured aggregate cap.
        cap: u64,
    },

    /// The token ledger refused a transfer (insufficient balance or
    /// allowance). The vault's state is unchanged.
    #[error("ledger transfer failed: {0}")]
    Transfer(#[from] LedgerError),

    /// Finalization is only permitted strictly after the unlock time.
    #[error("too early to finalize: vault unlocks at {unlock_time} (attempted at {now})")]
    TooEarlyToFinalize {
        /// Configured maturity time.
        unlock_time: DateTime<Utc>,
        /// The clock value finalization was attempted with.
        now: DateTime<Utc>,
    },

    /// The vault has already been finalized; the transition is one-way.
    #[error("vault is already finalized")]
    AlreadyFinalized,

    /// The reward source has not authorized (or does not hold) the full
    /// interest obligation. The vault remains open.
    #[error("reward source has not funded the {required} interest due")]
    InsufficientRewardFunding {
        /// The aggregate interest the pull attempted to secure.
        required: u64,
        /// The underlying ledger failure.
        #[source]
        source: LedgerError,
    },

    /// Withdrawals are only available once the vault is finalized.
    #[error("vault is not finalized yet")]
    NotFinalizedYet,

    /// The account never deposited into this vault.
    #[error("account {account} has no locked deposit")]
    NoDeposit {
        /// The account the withdrawal was attempted for.
        account: String,
    },

    /// The account's entitlement has already been paid out.
    #[error("account {account} has already withdrawn")]
    AlreadyWithdrawn {
        /// The account the withdrawal was attempted for.
        account: String,
    },

    /// The caller is not the vault administrator.
    #[error("account {account} is not the vault administrator")]
    NotAuthorized {
        /// The rejected caller.
        account: String,
    },

    /// An interest computation exceeded `u64`. Nothing was transferred.
    #[error("interest arithmetic overflowed")]
    ArithmeticOverflow,
}

// ---------------------------------------------------------------------------
// Holder records
// ---------------------------------------------------------------------------

/// Per-holder deposit record.
///
/// Records are write-once-per-field: `principal` only grows (additively,
/// across repeated deposits) while the vault is open, and `withdrawn` flips
/// to `true` exactly once. Records are never deleted, so the vault remains
/// a complete audit trail after all payouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderRecord {
    /// Accumulated principal deposited by this holder.
    pub principal: u64,
    /// Whether the holder's entitlement has been paid out.
    pub withdrawn: bool,
}

// ---------------------------------------------------------------------------
// LockingVault
// ---------------------------------------------------------------------------

/// The locking vault: ledger-of-record for deposits, lifecycle state, and
/// the two money movements it orchestrates (pulling deposits and reward
/// funding in, paying entitlements out).
///
/// The vault holds funds under its own ledger account (`vault:<uuid>`,
/// minted at construction). Time is an external input: operations that
/// compare against the schedule take `now` as a parameter and trust the
/// caller to supply a non-decreasing clock. The vault never reads wall
/// time itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockingVault {
    /// Immutable terms the vault was opened with.
    config: VaultConfig,

    /// The administrative account: may finalize on schedule, withdraw on
    /// behalf of holders, and drain the vault.
    admin: String,

    /// The vault's own account on the token ledger.
    vault_account: String,

    /// Sum of all accepted deposits. Frozen once `finalized`.
    total_deposited: u64,

    /// Aggregate interest pulled from the reward source at finalization.
    total_interest_secured: u64,

    /// One-way lifecycle flag.
    finalized: bool,

    /// Per-holder records, keyed by account.
    holders: HashMap<String, HolderRecord>,
}

impl LockingVault {
    /// Opens a new vault with the given terms.
    ///
    /// Validates the configuration and mints a fresh ledger account for the
    /// vault. All counters start at zero and the vault is not finalized.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the violated constraint; the vault
    /// is not created.
    pub fn open(config: VaultConfig, admin: &str) -> Result<Self, ConfigError> {
        config.validate()?;

        let vault_account = format!("vault:{}", Uuid::new_v4());
        info!(
            vault = %vault_account,
            asset = %config.asset,
            cap = config.cap,
            min_deposit = config.min_deposit,
            rate_percent = config.interest_rate_percent,
            lock_days = config.lock_days,
            "locking vault opened"
        );

        Ok(Self {
            config,
            admin: admin.to_string(),
            vault_account,
            total_deposited: 0,
            total_interest_secured: 0,
            finalized: false,
            holders: HashMap::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Deposit path
    // -----------------------------------------------------------------------

    /// Locks `amount` of the configured asset for `holder`.
    ///
    /// Pulls the funds from the holder's ledger account into the vault's;
    /// the holder must have approved the vault account for at least `amount`
    /// beforehand. Repeated deposits by the same holder accumulate into one
    /// running principal. No interest is computed or reserved at deposit
    /// time.
    ///
    /// Preconditions are checked in order and the first failure is reported:
    /// deposit window open, minimum met, cap respected, ledger pull succeeds.
    /// State is only mutated after the pull succeeds.
    ///
    /// # Returns
    ///
    /// The holder's new accumulated principal.
    pub fn lock_tokens<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        holder: &str,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<u64, VaultError> {
        if now >= self.config.deposit_deadline {
            return Err(VaultError::DepositWindowClosed {
                deadline: self.config.deposit_deadline,
                now,
            });
        }
        if amount < self.config.min_deposit {
            return Err(VaultError::BelowMinimumDeposit {
                amount,
                minimum: self.config.min_deposit,
            });
        }
        let new_total = self
            .total_deposited
            .checked_add(amount)
            .filter(|total| *total <= self.config.cap)
            .ok_or(VaultError::CapExceeded {
                amount,
                deposited: self.total_deposited,
                cap: self.config.cap,
            })?;
        // A holder's principal is bounded by the capped total, so this add
        // cannot fail once the cap check has passed.
        let current = self
            .holders
            .get(holder)
            .map(|record| record.principal)
            .unwrap_or(0);
        let principal = current
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;

        ledger.transfer_from(
            &self.config.asset,
            holder,
            &self.vault_account,
            &self.vault_account,
            amount,
        )?;

        self.total_deposited = new_total;
        self.holders.entry(holder.to_string()).or_default().principal = principal;

        info!(
            vault = %self.vault_account,
            holder,
            amount,
            principal,
            total_deposited = self.total_deposited,
            "deposit locked"
        );
        Ok(principal)
    }

    // -----------------------------------------------------------------------
    // Finalize path
    // -----------------------------------------------------------------------

    /// Finalizes the vault, securing the aggregate interest obligation.
    ///
    /// Computes `total_deposited * rate% * lock_days / 36500` (truncating,
    /// multiplication first) and pulls that amount from the reward source
    /// into the vault via the ledger's authorized-transfer capability. The
    /// reward source must have approved the vault account for at least the
    /// obligation; an insufficient authorization or balance fails the whole
    /// operation and leaves the vault open, so the reward source can top up
    /// its approval and finalization can be retried.
    ///
    /// The unlock-time check is unconditional: there is no bypass.
    ///
    /// # Returns
    ///
    /// The interest amount secured.
    pub fn finalize_vault<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        now: DateTime<Utc>,
    ) -> Result<u64, VaultError> {
        if self.finalized {
            return Err(VaultError::AlreadyFinalized);
        }
        if now <= self.config.unlock_time {
            return Err(VaultError::TooEarlyToFinalize {
                unlock_time: self.config.unlock_time,
                now,
            });
        }

        let interest_due = simple_interest(
            self.total_deposited,
            self.config.interest_rate_percent,
            self.config.lock_days,
        )
        .ok_or(VaultError::ArithmeticOverflow)?;

        if interest_due > 0 {
            ledger
                .transfer_from(
                    &self.config.asset,
                    &self.config.reward_source,
                    &self.vault_account,
                    &self.vault_account,
                    interest_due,
                )
                .map_err(|source| VaultError::InsufficientRewardFunding {
                    required: interest_due,
                    source,
                })?;
        }

        self.total_interest_secured = interest_due;
        self.finalized = true;

        info!(
            vault = %self.vault_account,
            total_deposited = self.total_deposited,
            interest_secured = interest_due,
            "vault finalized"
        );
        Ok(interest_due)
    }

    // -----------------------------------------------------------------------
    // Withdrawal paths
    // -----------------------------------------------------------------------

    /// Withdraws `holder`'s principal plus interest.
    ///
    /// Pays out `principal + principal * rate% * lock_days / 36500`
    /// (truncated independently per holder) from the vault's account and
    /// marks the holder withdrawn. A second call for the same holder always
    /// fails with [`VaultError::AlreadyWithdrawn`].
    ///
    /// # Returns
    ///
    /// The amount paid.
    pub fn withdraw_tokens<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        holder: &str,
    ) -> Result<u64, VaultError> {
        self.pay_entitlement(ledger, holder, false)
    }

    /// Withdraws on behalf of `holder`. Administrator only.
    ///
    /// Performs the identical computation and transfer as
    /// [`withdraw_tokens`](Self::withdraw_tokens): the funds go to the
    /// holder, not to the caller.
    pub fn force_withdraw<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        caller: &str,
        holder: &str,
    ) -> Result<u64, VaultError> {
        if caller != self.admin {
            return Err(VaultError::NotAuthorized {
                account: caller.to_string(),
            });
        }
        self.pay_entitlement(ledger, holder, true)
    }

    fn pay_entitlement<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        holder: &str,
        forced: bool,
    ) -> Result<u64, VaultError> {
        if !self.finalized {
            return Err(VaultError::NotFinalizedYet);
        }
        let record = match self.holders.get(holder) {
            Some(record) => *record,
            None => {
                return Err(VaultError::NoDeposit {
                    account: holder.to_string(),
                })
            }
        };
        if record.withdrawn {
            return Err(VaultError::AlreadyWithdrawn {
                account: holder.to_string(),
            });
        }

        let due = entitlement(
            record.principal,
            self.config.interest_rate_percent,
            self.config.lock_days,
        )
        .ok_or(VaultError::ArithmeticOverflow)?;

        ledger.transfer(&self.config.asset, &self.vault_account, holder, due)?;

        if let Some(record) = self.holders.get_mut(holder) {
            record.withdrawn = true;
        }

        info!(
            vault = %self.vault_account,
            holder,
            amount = due,
            forced,
            "entitlement paid"
        );
        Ok(due)
    }

    // -----------------------------------------------------------------------
    // Emergency drain
    // -----------------------------------------------------------------------

    /// Transfers the vault's entire balance of `asset` to the administrator.
    ///
    /// This is an unconditional administrative override: it works in any
    /// lifecycle state, before or after finalization, and is not tied to
    /// depositor claims in any way. It exists to recover funds (including
    /// assets other than the configured value unit that were sent to the
    /// vault's account by mistake), and it necessarily means depositors
    /// trust the administrator completely. Deployments that cannot accept
    /// that trust should place the admin key behind external controls.
    ///
    /// # Returns
    ///
    /// The amount drained (zero if the vault held none of `asset`).
    pub fn reclaim_asset<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        caller: &str,
        asset: &str,
    ) -> Result<u64, VaultError> {
        if caller != self.admin {
            return Err(VaultError::NotAuthorized {
                account: caller.to_string(),
            });
        }

        let balance = ledger.balance_of(asset, &self.vault_account);
        if balance > 0 {
            ledger.transfer(asset, &self.vault_account, &self.admin, balance)?;
        }

        warn!(
            vault = %self.vault_account,
            caller,
            asset,
            amount = balance,
            "emergency drain"
        );
        Ok(balance)
    }

    // -----------------------------------------------------------------------
    // Read-only surface
    // -----------------------------------------------------------------------

    /// Sum of all accepted deposits.
    pub fn tokens_deposited(&self) -> u64 {
        self.total_deposited
    }

    /// Whether the vault has finalized.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Aggregate interest secured at finalization (zero before).
    pub fn total_interest_secured(&self) -> u64 {
        self.total_interest_secured
    }

    /// The holder's open principal claim: their accumulated deposits, or
    /// zero once they have withdrawn (or never deposited).
    pub fn hold_of(&self, holder: &str) -> u64 {
        match self.holders.get(holder) {
            Some(record) if !record.withdrawn => record.principal,
            _ => 0,
        }
    }

    /// Whether the holder's entitlement has been paid out.
    pub fn has_withdrawn(&self, holder: &str) -> bool {
        self.holders
            .get(holder)
            .map(|record| record.withdrawn)
            .unwrap_or(false)
    }

    /// The holder's open entitlement (principal plus interest), or `None`
    /// if they never deposited, already withdrew, or the computation would
    /// overflow.
    pub fn entitlement_of(&self, holder: &str) -> Option<u64> {
        let record = self.holders.get(holder)?;
        if record.withdrawn {
            return None;
        }
        entitlement(
            record.principal,
            self.config.interest_rate_percent,
            self.config.lock_days,
        )
    }

    /// The vault's own account on the token ledger.
    pub fn vault_account(&self) -> &str {
        &self.vault_account
    }

    /// The administrative account.
    pub fn admin(&self) -> &str {
        &self.admin
    }

    /// The immutable terms the vault was opened with.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Number of holders with a deposit record (withdrawn or not).
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
