//! Per-currency settlement of a signed delta against the host.
//!
//! - positive: the host owes the caller → `take` pays it out
//! - negative: the caller owes the host
//!   - native: one direct transfer caller → host, then `settle(value)`
//!   - token: pull caller → gateway, `sync`, forward gateway → host, `settle(0)`
//! - zero: nothing

use std::cmp::Ordering;

use dynhook_types::{Address, Currency, PoolManager, Result, TokenBank};

/// What a settlement leg did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementLeg {
    /// Host paid the caller.
    PaidOut(u128),
    /// Caller paid the host.
    PulledIn(u128),
    /// Delta was zero.
    Nothing,
}

/// Resolve `amount` of `currency` between `caller` and the host.
///
/// `gateway` is the address that holds the unlock; token pulls pass
/// through it on their way to the host.
pub fn settle_currency<H>(
    host: &mut H,
    gateway: Address,
    caller: Address,
    currency: Currency,
    amount: i128,
) -> Result<SettlementLeg>
where
    H: PoolManager + TokenBank,
{
    let leg = match amount.cmp(&0) {
        Ordering::Greater => {
            let owed = amount.unsigned_abs();
            host.take(currency, caller, owed)?;
            SettlementLeg::PaidOut(owed)
        }
        Ordering::Less => {
            let due = amount.unsigned_abs();
            let manager = host.address();
            if currency.is_native() {
                host.transfer(currency, caller, manager, due)?;
                host.settle(due)?;
            } else {
                host.transfer_from(currency, gateway, caller, gateway, due)?;
                host.sync(currency)?;
                host.transfer(currency, gateway, manager, due)?;
                host.settle(0)?;
            }
            SettlementLeg::PulledIn(due)
        }
        Ordering::Equal => SettlementLeg::Nothing,
    };

    tracing::debug!(
        currency = %currency,
        caller = %caller,
        amount,
        leg = ?leg,
        "Currency settled"
    );
    Ok(leg)
}
