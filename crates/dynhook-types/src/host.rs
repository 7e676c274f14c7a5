//! Interfaces of the external collaborators: the pool manager that owns
//! the AMM, the token contracts, and the execution environment.
//!
//! ## Unlock protocol
//!
//! ```text
//! gateway ──unlock(locker, payload)──▶ host
//!                                       │ callback (exactly once)
//! gateway ◀──unlock_callback(payload)───┘
//!    │ swap / modify_liquidity / donate, then take / sync / settle
//!    └──────────── empty ack ──────────▶ host  (all deltas must be zero)
//! ```
//!
//! In-process the re-entrancy is a plain nested call: the host passes
//! itself mutably into the callback, which never outlives the `unlock`.

use crate::{
    Address, BalanceDelta, BlockNumber, Currency, ModifyLiquidityParams, PoolId, PoolKey,
    Result, Slot0, SwapParams,
};

/// Read-only view of the chain the call executes on.
pub trait Environment {
    /// Height of the block currently executing.
    fn block_number(&self) -> BlockNumber;
}

/// Balance movements of the native asset and token contracts.
///
/// The native asset supports [`transfer`](Self::transfer) only: it has no
/// allowances, so it is never pulled.
pub trait TokenBank {
    fn balance_of(&self, currency: Currency, owner: Address) -> u128;

    /// Move `amount` from `from` to `to`. The call is made by `from`.
    fn transfer(&mut self, currency: Currency, from: Address, to: Address, amount: u128)
    -> Result<()>;

    /// Move `amount` from `from` to `to` on `spender`'s allowance.
    fn transfer_from(
        &mut self,
        currency: Currency,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()>;

    /// Let `spender` pull up to `amount` of `owner`'s tokens.
    fn approve(
        &mut self,
        currency: Currency,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<()>;
}

/// Receiver of the host's unlock callback.
pub trait UnlockCallback<H: ?Sized> {
    /// Called by the host once per `unlock`, with the payload given to it.
    /// Returns the acknowledgement handed back through `unlock`.
    fn unlock_callback(&mut self, host: &mut H, data: &[u8]) -> Result<Vec<u8>>;
}

/// The pool manager: owns reserves, ticks and the price curve.
///
/// Operations that move balances are only valid inside an unlock. They
/// accrue signed deltas against the locker; the unlock fails unless every
/// delta is back to zero when the callback returns.
pub trait PoolManager {
    /// Address holding the host's custody of every currency.
    fn address(&self) -> Address;

    /// Live price and fee settings of a pool.
    fn slot0(&self, pool: PoolId) -> Result<Slot0>;

    /// Open an unlock context for `locker` and invoke `callback` with `data`.
    fn unlock<C: UnlockCallback<Self>>(
        &mut self,
        locker: Address,
        data: &[u8],
        callback: &mut C,
    ) -> Result<Vec<u8>>;

    /// Returns `(caller_delta, fees_accrued)`.
    fn modify_liquidity(
        &mut self,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        hook_data: &[u8],
    ) -> Result<(BalanceDelta, BalanceDelta)>;

    fn swap(&mut self, key: &PoolKey, params: &SwapParams, hook_data: &[u8])
    -> Result<BalanceDelta>;

    fn donate(
        &mut self,
        key: &PoolKey,
        amount0: u128,
        amount1: u128,
        hook_data: &[u8],
    ) -> Result<BalanceDelta>;

    /// Pay `amount` of `currency` out of custody to `to`.
    fn take(&mut self, currency: Currency, to: Address, amount: u128) -> Result<()>;

    /// Snapshot custody of `currency` before a token is transferred in.
    fn sync(&mut self, currency: Currency) -> Result<()>;

    /// Credit the locker with what arrived since the last `sync`, or with
    /// `value` of the native asset when nothing is synced. Returns the
    /// amount credited.
    fn settle(&mut self, value: u128) -> Result<u128>;
}
