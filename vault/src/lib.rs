//! # TENOR Vault — Fixed-Term Token Locking
//!
//! A fixed-term, fixed-rate locking vault for a fungible value unit. Holders
//! deposit during an open window; after maturity an administrator finalizes
//! the vault, which pulls the full interest obligation from a designated
//! reward source in one atomic step; each holder then withdraws principal
//! plus interest exactly once.
//!
//! - **Locking Vault** — the lifecycle state machine: cap and minimum
//!   enforcement on deposits, the one-way finalize transition that secures
//!   reward funding, idempotent-guarded withdrawals, and an explicit
//!   administrative drain.
//! - **Interest** — truncating simple-interest arithmetic over a fixed
//!   365-day-year basis, widened to `u128` so it can never silently wrap.
//! - **Config** — the immutable parameters a vault is opened with, validated
//!   up front so a misconfigured vault never comes into existence.
//!
//! ## Design Principles
//!
//! 1. All monetary operations check for overflow — `checked_add` /
//!    `checked_sub` everywhere, because wrapping arithmetic and money do
//!    not mix.
//! 2. State transitions are explicit and one-way: a vault finalizes once,
//!    an account withdraws once.
//! 3. Money moves only through the [`TokenLedger`](tenor_ledger::TokenLedger)
//!    seam, and state is committed only after the ledger call succeeds —
//!    a failed transfer leaves the vault's books untouched.
//! 4. Every public type is serializable (serde) for wire transport and
//!    persistent storage.

pub mod config;
pub mod interest;
pub mod locking_vault;
