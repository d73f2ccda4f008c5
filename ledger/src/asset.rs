//! # Asset Metadata
//!
//! Every fungible value unit tracked by the ledger is described by an
//! [`AssetInfo`] record and referenced everywhere else by its [`AssetId`].
//! Asset ids are factory-assigned UUIDs: two registrations never collide,
//! and an id carries no meaning beyond identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a registered asset, assigned at registration time.
pub type AssetId = String;

/// Metadata and supply information for a registered asset.
///
/// This is the canonical record for a value unit on the ledger. Balances and
/// allowances for the asset live in the [`Ledger`](crate::ledger::Ledger)
/// itself, keyed by this record's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Unique asset identifier.
    pub id: AssetId,

    /// Human-readable asset name (e.g., "Tenor Demo Token").
    pub name: String,

    /// Ticker symbol (e.g., "TDT"). Unique across the ledger.
    pub symbol: String,

    /// Number of decimal places for display purposes.
    ///
    /// An asset with `decimals = 8` and raw amount `12345678` displays as
    /// `0.12345678`. The ledger never performs division — this is purely
    /// for UI rendering.
    pub decimals: u8,

    /// The account authorized to mint additional supply.
    pub issuer: String,

    /// Current total supply in smallest units. Updated on mint.
    pub total_supply: u64,

    /// Timestamp when the asset was registered.
    pub created_at: DateTime<Utc>,
}

impl AssetInfo {
    /// Converts a whole-unit amount into smallest units for this asset.
    ///
    /// Returns `None` if the scaled amount would not fit in `u64`.
    pub fn whole_units(&self, amount: u64) -> Option<u64> {
        let scale = 10u64.checked_pow(u32::from(self.decimals))?;
        amount.checked_mul(scale)
    }
}
