//! Hook permission flags and LP-fee encoding used by the host.
//!
//! A pool created with [`DYNAMIC_FEE_FLAG`] as its fee asks its hook for
//! the fee on every swap. The hook answers from `before_swap` with
//! [`OVERRIDE_FEE_FLAG`] set so the host uses the returned value instead
//! of the stored one.

use serde::{Deserialize, Serialize};

/// Maximum LP fee in pips (1,000,000 = 100%).
pub const MAX_LP_FEE: u32 = 1_000_000;

/// Bit 23: the pool's fee is supplied by its hook.
pub const DYNAMIC_FEE_FLAG: u32 = 0x80_0000;

/// Bit 22: the fee returned by `before_swap` overrides the stored LP fee.
pub const OVERRIDE_FEE_FLAG: u32 = 0x40_0000;

/// Mask clearing [`OVERRIDE_FEE_FLAG`].
pub const REMOVE_OVERRIDE_MASK: u32 = 0xBF_FFFF;

#[must_use]
pub fn is_dynamic_fee(fee: u32) -> bool {
    fee == DYNAMIC_FEE_FLAG
}

#[must_use]
pub fn is_valid_fee(fee: u32) -> bool {
    fee <= MAX_LP_FEE
}

#[must_use]
pub fn with_override_flag(fee: u32) -> u32 {
    fee | OVERRIDE_FEE_FLAG
}

#[must_use]
pub fn remove_override_flag(fee: u32) -> u32 {
    fee & REMOVE_OVERRIDE_MASK
}

/// Which host callbacks a hook wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct HookPermissions {
    pub before_initialize: bool,
    pub after_initialize: bool,
    pub before_add_liquidity: bool,
    pub after_add_liquidity: bool,
    pub before_remove_liquidity: bool,
    pub after_remove_liquidity: bool,
    pub before_swap: bool,
    pub after_swap: bool,
    pub before_donate: bool,
    pub after_donate: bool,
}

impl HookPermissions {
    /// Number of callbacks enabled.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        [
            self.before_initialize,
            self.after_initialize,
            self.before_add_liquidity,
            self.after_add_liquidity,
            self.before_remove_liquidity,
            self.after_remove_liquidity,
            self.before_swap,
            self.after_swap,
            self.before_donate,
            self.after_donate,
        ]
        .into_iter()
        .filter(|enabled| *enabled)
        .count()
    }
}
