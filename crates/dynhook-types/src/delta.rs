//! Signed per-currency balance deltas.
//!
//! Sign convention, from the caller's point of view:
//! - positive: the host owes the caller (caller takes)
//! - negative: the caller owes the host (caller pays)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DynhookError, Result};

/// A pair of signed amounts, one per pool currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BalanceDelta {
    amount0: i128,
    amount1: i128,
}

impl BalanceDelta {
    pub const ZERO: Self = Self {
        amount0: 0,
        amount1: 0,
    };

    #[must_use]
    pub const fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    #[must_use]
    pub fn amount0(&self) -> i128 {
        self.amount0
    }

    #[must_use]
    pub fn amount1(&self) -> i128 {
        self.amount1
    }

    /// Amount for pool currency `index` (0 or 1).
    #[must_use]
    pub fn amount(&self, index: usize) -> i128 {
        if index == 0 { self.amount0 } else { self.amount1 }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount0 == 0 && self.amount1 == 0
    }

    /// Component-wise addition that fails instead of wrapping.
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        Ok(Self {
            amount0: self
                .amount0
                .checked_add(rhs.amount0)
                .ok_or(DynhookError::DeltaOverflow)?,
            amount1: self
                .amount1
                .checked_add(rhs.amount1)
                .ok_or(DynhookError::DeltaOverflow)?,
        })
    }
}

impl fmt::Display for BalanceDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.amount0, self.amount1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let d = BalanceDelta::new(-100, 50);
        assert_eq!(d.amount0(), -100);
        assert_eq!(d.amount1(), 50);
        assert_eq!(d.amount(0), -100);
        assert_eq!(d.amount(1), 50);
        assert!(!d.is_zero());
        assert!(BalanceDelta::ZERO.is_zero());
    }

    #[test]
    fn checked_add_detects_underflow_on_either_leg() {
        let owed = BalanceDelta::new(0, i128::MIN);
        let err = owed.checked_add(BalanceDelta::new(0, -1)).unwrap_err();
        assert_eq!(err, DynhookError::DeltaOverflow);

        let sum = BalanceDelta::new(2, 0)
            .checked_add(BalanceDelta::new(3, -7))
            .unwrap();
        assert_eq!(sum, BalanceDelta::new(5, -7));
    }

    #[test]
    fn checked_add_detects_overflow() {
        let near_max = BalanceDelta::new(i128::MAX, 0);
        let err = near_max.checked_add(BalanceDelta::new(1, 0)).unwrap_err();
        assert_eq!(err, DynhookError::DeltaOverflow);

        let ok = BalanceDelta::new(1, 1).checked_add(BalanceDelta::new(1, -1)).unwrap();
        assert_eq!(ok, BalanceDelta::new(2, 0));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", BalanceDelta::new(-1, 2)), "(-1, 2)");
    }
}
