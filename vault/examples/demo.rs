//! Interactive CLI demo of the full locking-vault lifecycle.
//!
//! Walks through asset registration, holder funding, deposit locking, an
//! underfunded finalization attempt, the successful finalize, withdrawals,
//! and the dust left behind by truncation. ANSI escape codes render a
//! storytelling-style terminal walkthrough.
//!
//! Run with:
//!   cargo run --example demo
//!
//! Set `RUST_LOG=debug` to watch the ledger's transfer log interleave with
//! the narration.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

use tenor_ledger::{Ledger, TokenLedger};
use tenor_vault::config::VaultConfig;
use tenor_vault::interest::simple_interest;
use tenor_vault::locking_vault::LockingVault;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const RED: &str = "\x1b[31m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{RED}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn balance_row(name: &str, balance: u64) {
    println!("  {BOLD}{name:<10}{RESET}  {WHITE}{balance:>20}{RESET} {DIM}units{RESET}");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

const E8: u64 = 100_000_000;

const ADMIN: &str = "admin";
const REWARD: &str = "reward";
const TREASURY: &str = "treasury";
const ALICE: &str = "alice";
const BOB: &str = "bob";
const CAROL: &str = "carol";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    // -----------------------------------------------------------------------
    // Step 1: Ledger and asset setup
    // -----------------------------------------------------------------------

    section(1, "Ledger Bootstrap and Asset Registration");

    let mut ledger = Ledger::new();
    let asset = ledger.register_asset("Tenor Demo Token", "TDT", 8, TREASURY)?;
    info("Asset id", &asset);

    ledger.mint(&asset, TREASURY, ALICE, 1_178_569 * E8)?;
    ledger.mint(&asset, TREASURY, BOB, 1_000_000 * E8)?;
    ledger.mint(&asset, TREASURY, CAROL, 100 * E8)?;
    ledger.mint(&asset, TREASURY, REWARD, 10_000_000 * E8)?;
    balance_row("Alice", ledger.balance_of(&asset, ALICE));
    balance_row("Bob", ledger.balance_of(&asset, BOB));
    balance_row("Carol", ledger.balance_of(&asset, CAROL));
    balance_row("Reward", ledger.balance_of(&asset, REWARD));
    success("Holders and reward wallet funded");

    // -----------------------------------------------------------------------
    // Step 2: Open the vault
    // -----------------------------------------------------------------------

    section(2, "Opening the Locking Vault (15%/year, 60-day lock)");

    let deposit_deadline = t0() + Duration::weeks(1);
    let config = VaultConfig {
        asset: asset.clone(),
        cap: 50_000_000 * E8,
        min_deposit: 100 * E8,
        interest_rate_percent: 15,
        deposit_deadline,
        unlock_time: deposit_deadline + Duration::days(60),
        lock_days: 60,
        reward_source: REWARD.to_string(),
    };
    let mut vault = LockingVault::open(config, ADMIN)?;
    info("Vault account", vault.vault_account());
    info("Deposit deadline", &deposit_deadline.to_rfc3339());
    info(
        "Unlock time",
        &vault.config().unlock_time.to_rfc3339(),
    );
    success("Vault open for deposits");

    // -----------------------------------------------------------------------
    // Step 3: Lock deposits
    // -----------------------------------------------------------------------

    section(3, "Locking Deposits");

    ledger.approve(&asset, ALICE, vault.vault_account(), 1_178_569 * E8)?;
    let principal = vault.lock_tokens(&mut ledger, ALICE, 1_178_569 * E8, t0())?;
    success(&format!("Alice locked {principal} units"));

    ledger.approve(&asset, BOB, vault.vault_account(), 1_000_000 * E8)?;
    let principal = vault.lock_tokens(&mut ledger, BOB, 1_000_000 * E8, t0())?;
    success(&format!("Bob locked {principal} units"));

    ledger.approve(&asset, CAROL, vault.vault_account(), 100 * E8)?;
    let principal = vault.lock_tokens(&mut ledger, CAROL, 100 * E8, t0())?;
    success(&format!("Carol locked {principal} units (the minimum)"));

    info(
        "Total deposited",
        &vault.tokens_deposited().to_string(),
    );

    // A deposit after the deadline bounces.
    let too_late = deposit_deadline + Duration::days(1);
    match vault.lock_tokens(&mut ledger, BOB, 100 * E8, too_late) {
        Err(err) => rejected(&format!("late deposit: {err}")),
        Ok(_) => unreachable!("deposit window is closed"),
    }

    // -----------------------------------------------------------------------
    // Step 4: Finalize at maturity
    // -----------------------------------------------------------------------

    section(4, "Finalizing at Maturity");

    let obligation = simple_interest(vault.tokens_deposited(), 15, 60).expect("fits u64");
    info("Interest obligation", &obligation.to_string());

    let at_maturity = vault.config().unlock_time + Duration::seconds(1);

    // First attempt: the reward wallet authorized one unit too little.
    ledger.approve(&asset, REWARD, vault.vault_account(), obligation - 1)?;
    match vault.finalize_vault(&mut ledger, at_maturity) {
        Err(err) => rejected(&format!("underfunded finalize: {err}")),
        Ok(_) => unreachable!("approval is short by one unit"),
    }

    // Top up the approval and retry.
    ledger.approve(&asset, REWARD, vault.vault_account(), obligation)?;
    let secured = vault.finalize_vault(&mut ledger, at_maturity)?;
    success(&format!("Vault finalized, {secured} units of interest secured"));
    balance_row("Vault", ledger.balance_of(&asset, vault.vault_account()));

    // -----------------------------------------------------------------------
    // Step 5: Withdrawals
    // -----------------------------------------------------------------------

    section(5, "Withdrawing Principal + Interest");

    let paid = vault.withdraw_tokens(&mut ledger, ALICE)?;
    success(&format!("Alice withdrew {paid} units"));
    let paid = vault.force_withdraw(&mut ledger, ADMIN, BOB)?;
    success(&format!("Bob paid out by admin force-withdrawal: {paid} units"));
    let paid = vault.withdraw_tokens(&mut ledger, CAROL)?;
    success(&format!("Carol withdrew {paid} units"));

    match vault.withdraw_tokens(&mut ledger, ALICE) {
        Err(err) => rejected(&format!("double withdrawal: {err}")),
        Ok(_) => unreachable!("withdrawals are one-shot"),
    }

    // -----------------------------------------------------------------------
    // Final Summary
    // -----------------------------------------------------------------------

    section(6, "Final Balances");

    balance_row("Alice", ledger.balance_of(&asset, ALICE));
    balance_row("Bob", ledger.balance_of(&asset, BOB));
    balance_row("Carol", ledger.balance_of(&asset, CAROL));
    balance_row("Reward", ledger.balance_of(&asset, REWARD));
    balance_row("Vault", ledger.balance_of(&asset, vault.vault_account()));
    println!();
    println!(
        "  {DIM}The vault's remaining balance is truncation dust: the aggregate\n  obligation rounds down once, each holder's share rounds down again.{RESET}"
    );

    Ok(())
}
