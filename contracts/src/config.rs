//! # Constants & Defaults
//!
//! Sizes, units, and deployment defaults used across the crate. Anything
//! numeric that more than one module cares about lives here.

use crate::types::Amount;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Length of an [`Address`](crate::types::Address) in bytes.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Decimal places of the collateral token the ledger accounts for.
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units (`10^18`).
pub const UNIT: Amount = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Deployment Defaults
// ---------------------------------------------------------------------------

/// Default ceiling on the sum of every account's net deposit, in whole tokens.
pub const DEFAULT_GLOBAL_DEPOSIT_CAP_UNITS: u64 = 50_000;

/// Default ceiling on a single account's net deposit, in whole tokens.
pub const DEFAULT_ACCOUNT_DEPOSIT_CAP_UNITS: u64 = 50;

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Version tag written into every persisted state file. Bump when the
/// serialized layout changes incompatibly.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Converts a whole-token quantity to base units.
///
/// Saturates at `Amount::MAX` rather than wrapping; no realistic cap gets
/// anywhere near it.
pub fn units(whole: u64) -> Amount {
    Amount::from(whole).saturating_mul(UNIT)
}

/// Default global deposit cap in base units.
pub fn default_global_deposit_cap() -> Amount {
    units(DEFAULT_GLOBAL_DEPOSIT_CAP_UNITS)
}

/// Default per-account deposit cap in base units.
pub fn default_account_deposit_cap() -> Amount {
    units(DEFAULT_ACCOUNT_DEPOSIT_CAP_UNITS)
}
