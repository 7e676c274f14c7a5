//! Pending reward ledger.
//!
//! Liquidity operations report the fees accrued to the position alongside
//! the caller delta. Those fee deltas are accumulated here per caller
//! instead of being settled. Entries only ever grow: the ledger has no
//! payout path.

use std::collections::HashMap;

use dynhook_types::{Address, BalanceDelta, Result};

/// Accumulated fee deltas per address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardLedger {
    pending: HashMap<Address, BalanceDelta>,
}

impl RewardLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `fees` to `owner`'s entry. Returns the new entry.
    ///
    /// # Errors
    /// [`DeltaOverflow`](dynhook_types::DynhookError::DeltaOverflow) if the
    /// entry would leave the signed range; the entry is unchanged.
    pub fn credit(&mut self, owner: Address, fees: BalanceDelta) -> Result<BalanceDelta> {
        let entry = self.pending.entry(owner).or_default();
        *entry = entry.checked_add(fees)?;
        Ok(*entry)
    }

    /// Pending entry of `owner` (zero if none).
    #[must_use]
    pub fn pending(&self, owner: Address) -> BalanceDelta {
        self.pending.get(&owner).copied().unwrap_or_default()
    }

    /// Raw entry of `owner`, distinguishing "no entry" from a zero one.
    #[must_use]
    pub fn entry(&self, owner: Address) -> Option<BalanceDelta> {
        self.pending.get(&owner).copied()
    }

    /// Put `owner`'s entry back to a value read with [`entry`](Self::entry).
    pub(crate) fn restore(&mut self, owner: Address, entry: Option<BalanceDelta>) {
        match entry {
            Some(delta) => {
                self.pending.insert(owner, delta);
            }
            None => {
                self.pending.remove(&owner);
            }
        }
    }

    /// Number of addresses with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sum of all entries.
    pub fn total(&self) -> Result<BalanceDelta> {
        self.pending
            .values()
            .try_fold(BalanceDelta::ZERO, |acc, delta| acc.checked_add(*delta))
    }
}

#[cfg(test)]
mod tests {
    use dynhook_types::DynhookError;

    use super::*;

    #[test]
    fn credits_accumulate() {
        let mut ledger = RewardLedger::new();
        let lp = Address::from_low_u8(1);
        ledger.credit(lp, BalanceDelta::new(2, 0)).unwrap();
        let after = ledger.credit(lp, BalanceDelta::new(3, 7)).unwrap();
        assert_eq!(after, BalanceDelta::new(5, 7));
        assert_eq!(ledger.pending(lp), BalanceDelta::new(5, 7));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn unknown_address_is_zero() {
        let ledger = RewardLedger::new();
        assert!(ledger.pending(Address::from_low_u8(9)).is_zero());
        assert!(ledger.is_empty());
    }

    #[test]
    fn overflow_leaves_entry_unchanged() {
        let mut ledger = RewardLedger::new();
        let lp = Address::from_low_u8(1);
        ledger.credit(lp, BalanceDelta::new(i128::MAX, 0)).unwrap();
        let err = ledger.credit(lp, BalanceDelta::new(1, 0)).unwrap_err();
        assert_eq!(err, DynhookError::DeltaOverflow);
        assert_eq!(ledger.pending(lp), BalanceDelta::new(i128::MAX, 0));
    }

    #[test]
    fn restore_puts_back_one_entry() {
        let mut ledger = RewardLedger::new();
        let (a, b) = (Address::from_low_u8(1), Address::from_low_u8(2));
        ledger.credit(a, BalanceDelta::new(4, 4)).unwrap();
        let before_a = ledger.entry(a);
        let before_b = ledger.entry(b);
        assert_eq!(before_b, None);

        ledger.credit(a, BalanceDelta::new(1, 0)).unwrap();
        ledger.credit(b, BalanceDelta::new(0, 9)).unwrap();
        ledger.restore(a, before_a);
        ledger.restore(b, before_b);

        assert_eq!(ledger.pending(a), BalanceDelta::new(4, 4));
        assert_eq!(ledger.entry(b), None);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn total_across_addresses() {
        let mut ledger = RewardLedger::new();
        ledger.credit(Address::from_low_u8(1), BalanceDelta::new(2, 0)).unwrap();
        ledger.credit(Address::from_low_u8(2), BalanceDelta::new(1, 4)).unwrap();
        assert_eq!(ledger.total().unwrap(), BalanceDelta::new(3, 4));
    }
}
