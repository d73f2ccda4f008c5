//! # Vault Configuration
//!
//! The immutable parameters a locking vault is opened with. Everything here
//! is fixed for the vault's lifetime — there is no reconfiguration operation,
//! by design: depositors commit funds against these exact terms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenor_ledger::AssetId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Construction-time configuration failures.
///
/// Any of these is fatal: the vault never comes into existence.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The deposit window must close no later than the unlock time.
    #[error("deposit deadline {deposit_deadline} is after unlock time {unlock_time}")]
    DeadlineAfterUnlock {
        /// Configured end of the deposit window.
        deposit_deadline: DateTime<Utc>,
        /// Configured maturity time.
        unlock_time: DateTime<Utc>,
    },

    /// A vault that can hold nothing is a configuration mistake.
    #[error("cap must be positive")]
    ZeroCap,

    /// A zero minimum would admit zero-amount deposits.
    #[error("minimum deposit must be positive")]
    ZeroMinDeposit,

    /// No single deposit could ever be accepted.
    #[error("minimum deposit {min_deposit} exceeds cap {cap}")]
    MinDepositAboveCap {
        /// Configured minimum single deposit.
        min_deposit: u64,
        /// Configured aggregate cap.
        cap: u64,
    },

    /// A zero rate would make the vault pointless and the reward pull a no-op.
    #[error("interest rate must be positive")]
    ZeroInterestRate,

    /// The accrual basis needs at least one day.
    #[error("lock period must be at least one day")]
    ZeroLockDays,
}

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// The agreed-upon terms of a locking vault.
///
/// All amounts are in the smallest unit of `asset`. The interest rate is an
/// integer annual percent (`15` = 15%/year) and accrues over the configured
/// `lock_days` regardless of when within the window a holder deposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// The value unit this vault locks, as registered on the token ledger.
    pub asset: AssetId,

    /// Maximum aggregate deposits across all holders (smallest units).
    pub cap: u64,

    /// Minimum single deposit (smallest units).
    pub min_deposit: u64,

    /// Annual interest rate as an integer percent. E.g., 15 = 15%/year.
    pub interest_rate_percent: u32,

    /// Deposits are rejected at and after this time.
    pub deposit_deadline: DateTime<Utc>,

    /// Finalization is permitted strictly after this time.
    pub unlock_time: DateTime<Utc>,

    /// Day count used in interest computation.
    ///
    /// This is a contractual constant, independent of each deposit's actual
    /// holding time: a holder who deposits one minute before the deadline
    /// accrues the same `lock_days` of interest as one who deposited on
    /// day one.
    pub lock_days: u32,

    /// The ledger account expected to fund the interest obligation at
    /// finalization, via a pre-authorized allowance to the vault.
    pub reward_source: String,
}

impl VaultConfig {
    /// Validates the configuration invariants.
    ///
    /// Checked once, at [`LockingVault::open`](crate::locking_vault::LockingVault::open);
    /// a config that fails here is rejected outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deposit_deadline > self.unlock_time {
            return Err(ConfigError::DeadlineAfterUnlock {
                deposit_deadline: self.deposit_deadline,
                unlock_time: self.unlock_time,
            });
        }
        if self.cap == 0 {
            return Err(ConfigError::ZeroCap);
        }
        if self.min_deposit == 0 {
            return Err(ConfigError::ZeroMinDeposit);
        }
        if self.min_deposit > self.cap {
            return Err(ConfigError::MinDepositAboveCap {
                min_deposit: self.min_deposit,
                cap: self.cap,
            });
        }
        if self.interest_rate_percent == 0 {
            return Err(ConfigError::ZeroInterestRate);
        }
        if self.lock_days == 0 {
            return Err(ConfigError::ZeroLockDays);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
