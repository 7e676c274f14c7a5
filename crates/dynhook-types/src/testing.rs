//! Scripted in-memory host for tests and simulations.
//!
//! [`MockPoolManager`] implements the full host surface ([`PoolManager`],
//! [`TokenBank`], [`Environment`]) with real delta accounting, custody
//! tracking and unlock rollback, but no AMM math: the deltas returned by
//! `modify_liquidity` and `swap` are queued up front by the test.

use std::collections::{HashMap, VecDeque};

use crate::{
    Address, BalanceDelta, BlockNumber, Currency, DynhookError, Environment,
    ModifyLiquidityParams, PoolId, PoolKey, PoolManager, Result, Slot0, SqrtPriceX96,
    SwapParams, TokenBank, UnlockCallback, hooks,
};

/// One observable balance movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRecord {
    pub currency: Currency,
    pub from: Address,
    pub to: Address,
    pub amount: u128,
}

#[derive(Debug, Clone, Copy)]
struct ScriptedSwap {
    delta: BalanceDelta,
    price_after: Option<SqrtPriceX96>,
}

/// In-memory pool manager with scripted outcomes.
#[derive(Debug, Clone)]
pub struct MockPoolManager {
    address: Address,
    block: BlockNumber,
    pools: HashMap<PoolId, Slot0>,
    balances: HashMap<(Currency, Address), u128>,
    allowances: HashMap<(Currency, Address, Address), u128>,
    /// Custody the host has accounted for, per currency.
    reserves: HashMap<Currency, u128>,
    synced: Option<Currency>,
    locker: Option<Address>,
    deltas: HashMap<Currency, i128>,
    scripted_liquidity: VecDeque<(BalanceDelta, BalanceDelta)>,
    scripted_swaps: VecDeque<ScriptedSwap>,
    fail_next: Option<DynhookError>,
    transfers: Vec<TransferRecord>,
}

impl MockPoolManager {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            block: BlockNumber(1),
            pools: HashMap::new(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            reserves: HashMap::new(),
            synced: None,
            locker: None,
            deltas: HashMap::new(),
            scripted_liquidity: VecDeque::new(),
            scripted_swaps: VecDeque::new(),
            fail_next: None,
            transfers: Vec::new(),
        }
    }

    // -- environment -------------------------------------------------------

    pub fn set_block(&mut self, block: BlockNumber) {
        self.block = block;
    }

    pub fn advance_block(&mut self) -> BlockNumber {
        self.block = self.block.next();
        self.block
    }

    // -- pools -------------------------------------------------------------

    /// Create a pool at `sqrt_price`. Returns the initial tick (always 0:
    /// the mock does no tick math).
    pub fn initialize(&mut self, key: PoolKey, sqrt_price: SqrtPriceX96) -> Result<i32> {
        if key.currency0 >= key.currency1 {
            return Err(DynhookError::CurrenciesOutOfOrder(key.currency0, key.currency1));
        }
        let id = key.id();
        if self.pools.contains_key(&id) {
            return Err(DynhookError::PoolAlreadyInitialized(id));
        }
        let lp_fee = if hooks::is_dynamic_fee(key.fee) { 0 } else { key.fee };
        self.pools.insert(
            id,
            Slot0 {
                sqrt_price_x96: sqrt_price,
                tick: 0,
                protocol_fee: 0,
                lp_fee,
            },
        );
        Ok(0)
    }

    /// Move a pool's live price, as a trade by someone else would.
    pub fn set_sqrt_price(&mut self, key: &PoolKey, sqrt_price: SqrtPriceX96) -> Result<()> {
        let id = key.id();
        let pool = self
            .pools
            .get_mut(&id)
            .ok_or(DynhookError::PoolNotInitialized(id))?;
        pool.sqrt_price_x96 = sqrt_price;
        Ok(())
    }

    /// Record the LP fee the hook asked for on the last swap.
    pub fn set_lp_fee(&mut self, key: &PoolKey, fee: u32) -> Result<()> {
        let id = key.id();
        let pool = self
            .pools
            .get_mut(&id)
            .ok_or(DynhookError::PoolNotInitialized(id))?;
        pool.lp_fee = hooks::remove_override_flag(fee);
        Ok(())
    }

    // -- scripting ---------------------------------------------------------

    /// Queue the `(caller_delta, fees_accrued)` of the next modify-liquidity.
    pub fn script_modify_liquidity(&mut self, delta: BalanceDelta, fees: BalanceDelta) {
        self.scripted_liquidity.push_back((delta, fees));
    }

    /// Queue the delta of the next swap and optionally the price it leaves behind.
    pub fn script_swap(&mut self, delta: BalanceDelta, price_after: Option<SqrtPriceX96>) {
        self.scripted_swaps.push_back(ScriptedSwap { delta, price_after });
    }

    /// Make the next pool operation fail with `err`.
    pub fn fail_next(&mut self, err: DynhookError) {
        self.fail_next = Some(err);
    }

    // -- balances ----------------------------------------------------------

    /// Create `amount` of `currency` out of thin air for `to`.
    pub fn mint(&mut self, currency: Currency, to: Address, amount: u128) {
        *self.balances.entry((currency, to)).or_default() += amount;
    }

    /// Host custody of `currency`.
    #[must_use]
    pub fn custody(&self, currency: Currency) -> u128 {
        self.balance_of(currency, self.address)
    }

    /// Custody the host has accounted for via settle/take.
    #[must_use]
    pub fn reserves(&self, currency: Currency) -> u128 {
        self.reserves.get(&currency).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn allowance(&self, currency: Currency, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&(currency, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    /// Every transfer that happened, in order.
    #[must_use]
    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.locker.is_some()
    }

    // -- internals ---------------------------------------------------------

    fn require_unlocked(&self) -> Result<Address> {
        self.locker.ok_or(DynhookError::ManagerLocked)
    }

    fn pool(&self, key: &PoolKey) -> Result<Slot0> {
        let id = key.id();
        self.pools
            .get(&id)
            .copied()
            .ok_or(DynhookError::PoolNotInitialized(id))
    }

    fn check_fail(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn account(&mut self, key: &PoolKey, delta: BalanceDelta) -> Result<()> {
        self.account_currency(key.currency0, delta.amount0())?;
        self.account_currency(key.currency1, delta.amount1())
    }

    fn account_currency(&mut self, currency: Currency, amount: i128) -> Result<()> {
        let slot = self.deltas.entry(currency).or_insert(0);
        *slot = slot.checked_add(amount).ok_or(DynhookError::DeltaOverflow)?;
        Ok(())
    }

    fn move_balance(
        &mut self,
        currency: Currency,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        let available = self.balance_of(currency, from);
        if available < amount {
            return Err(DynhookError::InsufficientBalance {
                currency,
                owner: from,
                needed: amount,
                available,
            });
        }
        self.balances.insert((currency, from), available - amount);
        *self.balances.entry((currency, to)).or_default() += amount;
        self.transfers.push(TransferRecord {
            currency,
            from,
            to,
            amount,
        });
        Ok(())
    }
}

impl Environment for MockPoolManager {
    fn block_number(&self) -> BlockNumber {
        self.block
    }
}

impl TokenBank for MockPoolManager {
    fn balance_of(&self, currency: Currency, owner: Address) -> u128 {
        self.balances.get(&(currency, owner)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        currency: Currency,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        self.move_balance(currency, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        currency: Currency,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        if currency.is_native() {
            return Err(DynhookError::NativeTransferFailed {
                reason: "native asset cannot be pulled".into(),
            });
        }
        let allowed = self.allowance(currency, from, spender);
        if allowed < amount {
            return Err(DynhookError::InsufficientAllowance {
                currency,
                needed: amount,
                available: allowed,
            });
        }
        self.move_balance(currency, from, to, amount)?;
        self.allowances
            .insert((currency, from, spender), allowed - amount);
        Ok(())
    }

    fn approve(
        &mut self,
        currency: Currency,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<()> {
        if currency.is_native() {
            return Err(DynhookError::NativeTransferFailed {
                reason: "native asset has no allowances".into(),
            });
        }
        self.allowances.insert((currency, owner, spender), amount);
        Ok(())
    }
}

impl PoolManager for MockPoolManager {
    fn address(&self) -> Address {
        self.address
    }

    fn slot0(&self, pool: PoolId) -> Result<Slot0> {
        self.pools
            .get(&pool)
            .copied()
            .ok_or(DynhookError::PoolNotInitialized(pool))
    }

    fn unlock<C: UnlockCallback<Self>>(
        &mut self,
        locker: Address,
        data: &[u8],
        callback: &mut C,
    ) -> Result<Vec<u8>> {
        if self.locker.is_some() {
            return Err(DynhookError::AlreadyUnlocked);
        }
        let snapshot = self.clone();
        self.locker = Some(locker);

        let outcome = callback
            .unlock_callback(self, data)
            .and_then(|ack| {
                let mut open: Vec<(Currency, i128)> = self
                    .deltas
                    .iter()
                    .filter(|(_, delta)| **delta != 0)
                    .map(|(currency, delta)| (*currency, *delta))
                    .collect();
                open.sort();
                match open.first() {
                    Some(&(currency, delta)) => {
                        Err(DynhookError::CurrencyNotSettled { currency, delta })
                    }
                    None => Ok(ack),
                }
            });

        match outcome {
            Ok(ack) => {
                self.locker = None;
                self.deltas.clear();
                self.synced = None;
                Ok(ack)
            }
            Err(err) => {
                tracing::debug!(locker = %locker, error = %err, "Mock unlock rolled back");
                let pending_fail = self.fail_next.take();
                *self = snapshot;
                self.fail_next = pending_fail;
                Err(err)
            }
        }
    }

    fn modify_liquidity(
        &mut self,
        key: &PoolKey,
        params: &ModifyLiquidityParams,
        _hook_data: &[u8],
    ) -> Result<(BalanceDelta, BalanceDelta)> {
        self.require_unlocked()?;
        self.check_fail()?;
        self.pool(key)?;
        if params.tick_lower >= params.tick_upper {
            return Err(DynhookError::InvalidTickRange {
                lower: params.tick_lower,
                upper: params.tick_upper,
            });
        }
        let (delta, fees) = self
            .scripted_liquidity
            .pop_front()
            .unwrap_or((BalanceDelta::ZERO, BalanceDelta::ZERO));
        self.account(key, delta)?;
        Ok((delta, fees))
    }

    fn swap(
        &mut self,
        key: &PoolKey,
        params: &SwapParams,
        _hook_data: &[u8],
    ) -> Result<BalanceDelta> {
        self.require_unlocked()?;
        self.check_fail()?;
        self.pool(key)?;
        if params.amount_specified == 0 {
            return Err(DynhookError::Host("swap amount cannot be zero".into()));
        }
        let scripted = self.scripted_swaps.pop_front().ok_or_else(|| {
            DynhookError::InsufficientLiquidity {
                reason: "no liquidity for swap".into(),
            }
        })?;
        if let Some(price) = scripted.price_after {
            self.set_sqrt_price(key, price)?;
        }
        self.account(key, scripted.delta)?;
        Ok(scripted.delta)
    }

    fn donate(
        &mut self,
        key: &PoolKey,
        amount0: u128,
        amount1: u128,
        _hook_data: &[u8],
    ) -> Result<BalanceDelta> {
        self.require_unlocked()?;
        self.check_fail()?;
        self.pool(key)?;
        let owed0 = i128::try_from(amount0).map_err(|_| DynhookError::DeltaOverflow)?;
        let owed1 = i128::try_from(amount1).map_err(|_| DynhookError::DeltaOverflow)?;
        let delta = BalanceDelta::new(-owed0, -owed1);
        self.account(key, delta)?;
        Ok(delta)
    }

    fn take(&mut self, currency: Currency, to: Address, amount: u128) -> Result<()> {
        self.require_unlocked()?;
        let signed = i128::try_from(amount).map_err(|_| DynhookError::DeltaOverflow)?;
        let reserves = self.reserves(currency);
        let remaining = reserves
            .checked_sub(amount)
            .ok_or(DynhookError::InsufficientBalance {
                currency,
                owner: self.address,
                needed: amount,
                available: reserves,
            })?;
        self.move_balance(currency, self.address, to, amount)?;
        self.reserves.insert(currency, remaining);
        self.account_currency(currency, -signed)
    }

    fn sync(&mut self, currency: Currency) -> Result<()> {
        if currency.is_native() {
            self.synced = None;
            return Ok(());
        }
        let held = self.custody(currency);
        self.reserves.insert(currency, held);
        self.synced = Some(currency);
        Ok(())
    }

    fn settle(&mut self, value: u128) -> Result<u128> {
        self.require_unlocked()?;
        let (currency, paid) = match self.synced.take() {
            Some(currency) => {
                if value != 0 {
                    return Err(DynhookError::Host(
                        "native value sent while settling a token".into(),
                    ));
                }
                let paid = self.custody(currency).saturating_sub(self.reserves(currency));
                (currency, paid)
            }
            None => {
                let unaccounted = self
                    .custody(Currency::NATIVE)
                    .saturating_sub(self.reserves(Currency::NATIVE));
                if unaccounted < value {
                    return Err(DynhookError::NativeTransferFailed {
                        reason: format!("settle value {value} not received ({unaccounted} pending)"),
                    });
                }
                (Currency::NATIVE, value)
            }
        };
        let signed = i128::try_from(paid).map_err(|_| DynhookError::DeltaOverflow)?;
        *self.reserves.entry(currency).or_default() += paid;
        self.account_currency(currency, signed)?;
        Ok(paid)
    }
}
