// Copyright (c) 2026 Tenor Labs. MIT License.
// See LICENSE for details.

//! # TENOR Ledger — Token Ledger Collaborator
//!
//! The value-transfer system the TENOR locking vault relies on for all money
//! movement. The vault itself never touches balances directly — it only
//! invokes the transfer capability exposed here, which keeps the vault's
//! accounting logic cleanly separated from custody of the underlying asset.
//!
//! ## Architecture
//!
//! ```text
//! asset.rs   — Asset metadata: identifiers, supply, issuer
//! ledger.rs  — Balances, allowances, and the TokenLedger trait
//! ```
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` in smallest-unit denomination.** No floating
//!    point, no decimals in arithmetic. The `decimals` field on an asset is
//!    for display only.
//!
//! 2. **Pull payments over push.** A contract that needs to collect funds is
//!    granted an allowance by the account owner and pulls via
//!    `transfer_from`. The owner never hands funds to code blindly.
//!
//! 3. **No ambient identity.** Every operation names its acting account
//!    explicitly. Authorization is data (allowances, issuer records), not
//!    call-site magic.
//!
//! 4. **Serializable state.** Every public type derives `Serialize` and
//!    `Deserialize` so ledger snapshots can be persisted or shipped over
//!    the wire.

pub mod asset;
pub mod ledger;

pub use asset::{AssetId, AssetInfo};
pub use ledger::{Ledger, LedgerError, TokenLedger};
