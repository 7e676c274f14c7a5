//! Host-facing callbacks of the dynamic fee hook.
//!
//! The host calls these around pool lifecycle events:
//! - `before_initialize` / `after_initialize` once, when the pool is created
//! - `before_swap` / `after_swap` around every swap
//!
//! `get_fee` is the plain fee query; `before_swap` returns the same fee
//! with the override flag set so the host applies it to the swap.

use dynhook_types::{
    Address, BalanceDelta, DynhookError, Environment, FeePolicyConfig, HookPermissions,
    PoolKey, PoolManager, Result, SqrtPriceX96, SwapParams, hooks,
};

use crate::policy::DynamicFeePolicy;

/// The dynamic fee hook: a [`DynamicFeePolicy`] wired to host callbacks.
#[derive(Debug, Clone)]
pub struct DynamicFeeHook {
    address: Address,
    policy: DynamicFeePolicy,
    require_dynamic_fee: bool,
}

impl DynamicFeeHook {
    pub fn new(address: Address, config: &FeePolicyConfig) -> Result<Self> {
        Ok(Self {
            address,
            policy: DynamicFeePolicy::new(config)?,
            require_dynamic_fee: config.require_dynamic_fee,
        })
    }

    /// Callbacks this hook wants from the host.
    #[must_use]
    pub fn permissions() -> HookPermissions {
        HookPermissions {
            before_initialize: true,
            after_initialize: true,
            before_swap: true,
            after_swap: true,
            ..HookPermissions::default()
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn policy(&self) -> &DynamicFeePolicy {
        &self.policy
    }

    /// Reject pools whose fee is not supplied by a hook.
    pub fn before_initialize(
        &self,
        _sender: Address,
        key: &PoolKey,
        _sqrt_price: SqrtPriceX96,
    ) -> Result<()> {
        if self.require_dynamic_fee && !hooks::is_dynamic_fee(key.fee) {
            return Err(DynhookError::MustUseDynamicFee { fee: key.fee });
        }
        Ok(())
    }

    /// Seed the starting price and block of a freshly created pool.
    pub fn after_initialize<E: Environment>(
        &mut self,
        env: &E,
        sender: Address,
        key: &PoolKey,
        sqrt_price: SqrtPriceX96,
        tick: i32,
    ) -> Result<()> {
        let block = env.block_number();
        self.policy.seed(sqrt_price, block);
        tracing::info!(
            pool = %key.id(),
            sender = %sender,
            sqrt_price = %sqrt_price,
            tick,
            block = block.0,
            "Dynamic fee hook seeded"
        );
        Ok(())
    }

    /// Fee for the next swap on `key`'s pool, recomputed once per block.
    pub fn get_fee<H>(&mut self, host: &H, _sender: Address, key: &PoolKey) -> Result<u32>
    where
        H: PoolManager + Environment,
    {
        let pool = key.id();
        self.policy
            .fee_at(host.block_number(), || Ok(host.slot0(pool)?.sqrt_price_x96))
    }

    /// Fee to charge on this swap, flagged to override the stored LP fee.
    pub fn before_swap<H>(
        &mut self,
        host: &H,
        sender: Address,
        key: &PoolKey,
        _params: &SwapParams,
        _hook_data: &[u8],
    ) -> Result<u32>
    where
        H: PoolManager + Environment,
    {
        let fee = self.get_fee(host, sender, key)?;
        Ok(hooks::with_override_flag(fee))
    }

    /// Stamp the swap's block. Returns the hook's own delta, always zero.
    pub fn after_swap<E: Environment>(
        &mut self,
        env: &E,
        _sender: Address,
        key: &PoolKey,
        _params: &SwapParams,
        delta: BalanceDelta,
        _hook_data: &[u8],
    ) -> Result<i128> {
        let block = env.block_number();
        self.policy.stamp(block);
        tracing::debug!(pool = %key.id(), block = block.0, delta = %delta, "Swap stamped");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use dynhook_types::{Currency, testing::MockPoolManager};

    use super::*;

    fn key(fee: u32) -> PoolKey {
        PoolKey::new(
            Currency::NATIVE,
            Currency::token(Address::from_low_u8(2)),
            fee,
            60,
            Address::from_low_u8(0x40),
        )
        .unwrap()
    }

    fn hook() -> DynamicFeeHook {
        DynamicFeeHook::new(Address::from_low_u8(0x40), &FeePolicyConfig::default()).unwrap()
    }

    #[test]
    fn permissions_cover_init_and_swap() {
        let perms = DynamicFeeHook::permissions();
        assert!(perms.after_initialize);
        assert!(perms.before_swap);
        assert!(perms.after_swap);
        assert!(!perms.before_add_liquidity);
        assert_eq!(perms.enabled_count(), 4);
    }

    #[test]
    fn static_fee_pool_rejected() {
        let err = hook()
            .before_initialize(Address::ZERO, &key(3000), SqrtPriceX96::ONE)
            .unwrap_err();
        assert_eq!(err, DynhookError::MustUseDynamicFee { fee: 3000 });
    }

    #[test]
    fn static_fee_allowed_when_not_required() {
        let cfg = FeePolicyConfig {
            require_dynamic_fee: false,
            ..FeePolicyConfig::default()
        };
        let hook = DynamicFeeHook::new(Address::from_low_u8(0x40), &cfg).unwrap();
        hook.before_initialize(Address::ZERO, &key(3000), SqrtPriceX96::ONE)
            .unwrap();
    }

    #[test]
    fn before_swap_sets_override_flag() {
        let key = key(hooks::DYNAMIC_FEE_FLAG);
        let mut host = MockPoolManager::new(Address::from_low_u8(0xff));
        host.initialize(key, SqrtPriceX96(100)).unwrap();

        let mut hook = hook();
        hook.after_initialize(&host, Address::ZERO, &key, SqrtPriceX96(100), 0)
            .unwrap();
        host.advance_block();
        host.set_sqrt_price(&key, SqrtPriceX96(150)).unwrap();

        let params = SwapParams {
            zero_for_one: false,
            amount_specified: -10,
            sqrt_price_limit_x96: SqrtPriceX96(u128::MAX),
        };
        let flagged = hook
            .before_swap(&host, Address::ZERO, &key, &params, &[])
            .unwrap();
        assert_eq!(hooks::remove_override_flag(flagged), 30);
        assert_ne!(flagged & hooks::OVERRIDE_FEE_FLAG, 0);
    }

    #[test]
    fn get_fee_on_unknown_pool_fails_after_new_block() {
        let key = key(hooks::DYNAMIC_FEE_FLAG);
        let mut host = MockPoolManager::new(Address::from_low_u8(0xff));
        let mut hook = hook();
        host.advance_block();
        let err = hook.get_fee(&host, Address::ZERO, &key).unwrap_err();
        assert!(matches!(err, DynhookError::PoolNotInitialized(_)));
        assert_eq!(hook.policy().fee(), 0);
    }
}
