//! Integration tests for the locking vault lifecycle.
//!
//! These tests exercise the full deposit -> finalize -> withdraw flow across
//! crate boundaries against the in-memory ledger, including the exact payout
//! amounts for several rate / lock-period combinations and the solvency of
//! the vault after every entitlement has been paid.

use chrono::{DateTime, Duration, TimeZone, Utc};

use tenor_ledger::{AssetId, Ledger, LedgerError, TokenLedger};
use tenor_vault::config::VaultConfig;
use tenor_vault::interest::simple_interest;
use tenor_vault::locking_vault::{LockingVault, VaultError};

const ADMIN: &str = "admin_wallet";
const REWARD: &str = "reward_wallet";
const ISSUER: &str = "treasury";
const WALLET_1: &str = "holder_wallet_1";
const WALLET_2: &str = "holder_wallet_2";
const WALLET_3: &str = "holder_wallet_3";

/// One whole token in smallest units (8 decimals).
const E8: u64 = 100_000_000;

/// Ledger supply minted to the reward wallet.
const REWARD_SUPPLY: u64 = 100_000_000 * E8;

struct Fixture {
    ledger: Ledger,
    asset: AssetId,
    vault: LockingVault,
}

impl Fixture {
    /// A vault whose deposit window opens now and runs for a week, with the
    /// unlock 60 days after the window closes. Cap 50M tokens, minimum 100.
    fn new(rate_percent: u32, lock_days: u32) -> Self {
        let mut ledger = Ledger::new();
        let asset = ledger
            .register_asset("Tenor Demo Token", "TDT", 8, ISSUER)
            .unwrap();

        let deposit_deadline = t0() + Duration::weeks(1);
        let config = VaultConfig {
            asset: asset.clone(),
            cap: 50_000_000 * E8,
            min_deposit: 100 * E8,
            interest_rate_percent: rate_percent,
            deposit_deadline,
            unlock_time: deposit_deadline + Duration::days(60),
            lock_days,
            reward_source: REWARD.to_string(),
        };
        let vault = LockingVault::open(config, ADMIN).unwrap();

        ledger.mint(&asset, ISSUER, REWARD, REWARD_SUPPLY).unwrap();
        // The reward wallet pre-authorizes the interest on the full cap; the
        // vault only pulls the realized obligation at finalization.
        let worst_case = simple_interest(50_000_000 * E8, rate_percent, lock_days).unwrap();
        ledger
            .approve(&asset, REWARD, vault.vault_account(), worst_case)
            .unwrap();

        Self {
            ledger,
            asset,
            vault,
        }
    }

    fn fund(&mut self, wallet: &str, amount: u64) {
        self.ledger.mint(&self.asset, ISSUER, wallet, amount).unwrap();
    }

    fn lock(&mut self, wallet: &str, amount: u64) -> Result<u64, VaultError> {
        self.ledger
            .approve(&self.asset, wallet, self.vault.vault_account(), amount)
            .unwrap();
        self.vault.lock_tokens(&mut self.ledger, wallet, amount, t0())
    }

    fn finalize(&mut self) -> Result<u64, VaultError> {
        let now = self.vault.config().unlock_time + Duration::seconds(1);
        self.vault.finalize_vault(&mut self.ledger, now)
    }

    fn withdraw(&mut self, wallet: &str) -> Result<u64, VaultError> {
        self.vault.withdraw_tokens(&mut self.ledger, wallet)
    }

    fn balance(&self, wallet: &str) -> u64 {
        self.ledger.balance_of(&self.asset, wallet)
    }

    fn vault_balance(&self) -> u64 {
        self.ledger.balance_of(&self.asset, self.vault.vault_account())
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Deposit Flow
// ---------------------------------------------------------------------------

#[test]
fn accepts_lock_when_balance_available() {
    let mut fix = Fixture::new(15, 60);
    fix.fund(WALLET_1, 100_000_000 * E8);

    let principal = fix.lock(WALLET_1, 1_000_000 * E8).unwrap();
    assert_eq!(principal, 1_000_000 * E8);
    assert_eq!(fix.vault.tokens_deposited(), 1_000_000 * E8);
    assert_eq!(fix.vault_balance(), 1_000_000 * E8);
}

#[test]
fn rejects_locking_more_than_balance() {
    let mut fix = Fixture::new(15, 60);
    fix.fund(WALLET_2, 10_000_000 * E8);

    let result = fix.lock(WALLET_2, 10_000_001 * E8);
    assert!(matches!(
        result,
        Err(VaultError::Transfer(LedgerError::InsufficientBalance { .. }))
    ));
    assert_eq!(fix.vault.tokens_deposited(), 0);
    assert_eq!(fix.balance(WALLET_2), 10_000_000 * E8);
}

#[test]
fn rejects_lock_after_deposit_window() {
    let mut fix = Fixture::new(15, 60);
    fix.fund(WALLET_1, 100_000_000 * E8);

    let deadline = fix.vault.config().deposit_deadline;
    fix.ledger
        .approve(&fix.asset, WALLET_1, fix.vault.vault_account(), 1_000_000 * E8)
        .unwrap();
    let result = fix
        .vault
        .lock_tokens(&mut fix.ledger, WALLET_1, 1_000_000 * E8, deadline);
    assert!(matches!(result, Err(VaultError::DepositWindowClosed { .. })));
}

#[test]
fn rejects_lock_over_cap() {
    let mut fix = Fixture::new(15, 60);
    fix.fund(WALLET_1, 100_000_000 * E8);

    let result = fix.lock(WALLET_1, 60_000_000 * E8);
    assert!(matches!(result, Err(VaultError::CapExceeded { .. })));
    assert_eq!(fix.vault.tokens_deposited(), 0);
}

#[test]
fn rejects_lock_below_minimum() {
    let mut fix = Fixture::new(15, 60);
    fix.fund(WALLET_1, 100_000_000 * E8);

    let result = fix.lock(WALLET_1, 99 * E8);
    assert!(matches!(result, Err(VaultError::BelowMinimumDeposit { .. })));
}

// ---------------------------------------------------------------------------
// Finalize / Withdraw Flow
// ---------------------------------------------------------------------------

/// Seeds the standard two-holder position used by the payout scenarios.
fn seed_standard_deposits(fix: &mut Fixture) {
    fix.fund(WALLET_1, 1_178_569 * E8);
    fix.fund(WALLET_2, 1_000_000 * E8);
    fix.lock(WALLET_1, 1_178_569 * E8).unwrap();
    fix.lock(WALLET_2, 1_000_000 * E8).unwrap();
}

#[test]
fn cannot_finalize_before_unlock_time() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);

    let before = fix.vault.config().unlock_time - Duration::seconds(1);
    let result = fix.vault.finalize_vault(&mut fix.ledger, before);
    assert!(matches!(result, Err(VaultError::TooEarlyToFinalize { .. })));
    assert!(!fix.vault.is_finalized());
}

#[test]
fn finalizes_after_unlock_time() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);

    fix.finalize().unwrap();
    assert!(fix.vault.is_finalized());
}

#[test]
fn cannot_withdraw_before_finalize() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);

    let result = fix.withdraw(WALLET_1);
    assert!(matches!(result, Err(VaultError::NotFinalizedYet)));
}

#[test]
fn withdraws_after_finalize() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);

    fix.finalize().unwrap();
    assert!(fix.withdraw(WALLET_1).is_ok());
    assert!(fix.withdraw(WALLET_2).is_ok());
}

#[test]
fn force_withdraw_requires_admin() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.finalize().unwrap();

    let denied = fix
        .vault
        .force_withdraw(&mut fix.ledger, WALLET_1, WALLET_1);
    assert!(matches!(denied, Err(VaultError::NotAuthorized { .. })));

    fix.vault
        .force_withdraw(&mut fix.ledger, ADMIN, WALLET_1)
        .unwrap();
    fix.vault
        .force_withdraw(&mut fix.ledger, ADMIN, WALLET_2)
        .unwrap();
    assert!(fix.vault.has_withdrawn(WALLET_1));
    assert!(fix.vault.has_withdrawn(WALLET_2));
}

#[test]
fn withdrawing_twice_fails() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.finalize().unwrap();

    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    assert!(matches!(
        fix.withdraw(WALLET_1),
        Err(VaultError::AlreadyWithdrawn { .. })
    ));
    assert!(matches!(
        fix.withdraw(WALLET_2),
        Err(VaultError::AlreadyWithdrawn { .. })
    ));
}

// ---------------------------------------------------------------------------
// Exact Payout Amounts
// ---------------------------------------------------------------------------

#[test]
fn payout_amounts_fifteen_percent_sixty_days() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.finalize().unwrap();

    // Holders deposited their entire balance, so the post-withdrawal balance
    // is exactly principal + floor(principal * 15 * 60 / 36500).
    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    assert_eq!(fix.balance(WALLET_1), 120_762_960_547_945);
    assert_eq!(fix.balance(WALLET_2), 102_465_753_424_657);
}

#[test]
fn payout_amounts_with_minimum_size_holder() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.fund(WALLET_3, 100 * E8);
    fix.lock(WALLET_3, 100 * E8).unwrap();

    fix.finalize().unwrap();
    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    fix.withdraw(WALLET_3).unwrap();

    assert_eq!(fix.balance(WALLET_1), 120_762_960_547_945);
    assert_eq!(fix.balance(WALLET_2), 102_465_753_424_657);
    assert_eq!(fix.balance(WALLET_3), 10_246_575_342);
}

#[test]
fn payout_amounts_with_repeat_deposits() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.fund(WALLET_1, 90_000 * E8);
    fix.fund(WALLET_2, 13_421 * E8);
    fix.lock(WALLET_1, 90_000 * E8).unwrap();
    fix.lock(WALLET_2, 13_421 * E8).unwrap();

    // The second deposit accumulates into the same principal.
    assert_eq!(fix.vault.hold_of(WALLET_1), 1_268_569 * E8);
    assert_eq!(fix.vault.hold_of(WALLET_2), 1_013_421 * E8);

    fix.finalize().unwrap();
    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    assert_eq!(fix.balance(WALLET_1), 129_984_878_356_164);
    assert_eq!(fix.balance(WALLET_2), 103_840_946_301_369);
}

#[test]
fn payout_amounts_nine_percent_sixty_days() {
    let mut fix = Fixture::new(9, 60);
    seed_standard_deposits(&mut fix);
    fix.finalize().unwrap();

    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    assert_eq!(fix.balance(WALLET_1), 119_600_536_328_767);
    assert_eq!(fix.balance(WALLET_2), 101_479_452_054_794);
}

#[test]
fn payout_amounts_twenty_percent_year_lock() {
    let mut fix = Fixture::new(20, 360);
    seed_standard_deposits(&mut fix);
    fix.finalize().unwrap();

    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    assert_eq!(fix.balance(WALLET_1), 141_105_384_383_561);
    assert_eq!(fix.balance(WALLET_2), 119_726_027_397_260);
}

// ---------------------------------------------------------------------------
// Reward Funding
// ---------------------------------------------------------------------------

#[test]
fn underfunded_finalize_fails_until_topped_up() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.fund(WALLET_1, 90_000 * E8);
    fix.fund(WALLET_2, 13_421 * E8);
    fix.lock(WALLET_1, 90_000 * E8).unwrap();
    fix.lock(WALLET_2, 13_421 * E8).unwrap();

    let total = fix.vault.tokens_deposited();
    let obligation = simple_interest(total, 15, 60).unwrap();

    // Approval one unit short of the obligation: the pull must fail and the
    // vault must remain open.
    fix.ledger
        .approve(&fix.asset, REWARD, fix.vault.vault_account(), obligation - 1)
        .unwrap();
    let result = fix.finalize();
    assert!(matches!(
        result,
        Err(VaultError::InsufficientRewardFunding { .. })
    ));
    assert!(!fix.vault.is_finalized());

    fix.ledger
        .approve(&fix.asset, REWARD, fix.vault.vault_account(), obligation)
        .unwrap();
    let secured = fix.finalize().unwrap();
    assert_eq!(secured, obligation);
    assert!(fix.vault.is_finalized());
}

#[test]
fn reward_source_balance_shortfall_also_fails_finalize() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);

    // Drain the reward wallet: the allowance alone is not enough.
    fix.ledger
        .transfer(&fix.asset, REWARD, ISSUER, REWARD_SUPPLY)
        .unwrap();
    let result = fix.finalize();
    assert!(matches!(
        result,
        Err(VaultError::InsufficientRewardFunding { .. })
    ));
    assert!(!fix.vault.is_finalized());
}

// ---------------------------------------------------------------------------
// Solvency
// ---------------------------------------------------------------------------

#[test]
fn vault_retains_only_truncation_dust_after_all_withdrawals() {
    let mut fix = Fixture::new(15, 60);
    seed_standard_deposits(&mut fix);
    fix.fund(WALLET_3, 100 * E8);
    fix.lock(WALLET_3, 100 * E8).unwrap();

    let secured = fix.finalize().unwrap();
    let principal_plus_interest = fix.vault.tokens_deposited() + secured;
    assert_eq!(fix.vault_balance(), principal_plus_interest);

    fix.withdraw(WALLET_1).unwrap();
    fix.withdraw(WALLET_2).unwrap();
    fix.withdraw(WALLET_3).unwrap();

    // Aggregate truncation happens once, per-holder truncation three times;
    // the difference stays in the vault. For this position it is one unit.
    assert_eq!(fix.vault_balance(), 1);
}

#[test]
fn vault_never_pays_out_more_than_it_secured() {
    let mut fix = Fixture::new(15, 60);

    // A deterministic spread of odd-sized principals.
    let mut state: u64 = 0x243F_6A88_85A3_08D3;
    let mut holders = Vec::new();
    for index in 0..25 {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let principal = (100 * E8) + state % 1_000_000_000_000;
        let wallet = format!("holder_{index}");
        fix.fund(&wallet, principal);
        fix.lock(&wallet, principal).unwrap();
        holders.push(wallet);
    }

    let secured = fix.finalize().unwrap();
    let funded = fix.vault.tokens_deposited() + secured;

    let mut paid_out = 0u64;
    for wallet in &holders {
        paid_out += fix.withdraw(wallet).unwrap();
    }

    assert!(paid_out <= funded);
    assert_eq!(fix.vault_balance(), funded - paid_out);
}
