//! System-wide constants for dynhook.

/// Fee charged after the host price rose between blocks (pips).
pub const DEFAULT_HIGH_FEE: u32 = 30;

/// Fee charged after the host price fell or held between blocks (pips).
pub const DEFAULT_LOW_FEE: u32 = 5;

/// Fee reported before the first recompute (pips).
pub const DEFAULT_INITIAL_FEE: u32 = 0;

/// Pips per whole (1,000,000 pips = 100%).
pub const PIPS_DENOMINATOR: u32 = 1_000_000;

/// Receipts the gateway keeps before dropping the oldest.
pub const DEFAULT_RECEIPT_HISTORY: usize = 1_024;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
