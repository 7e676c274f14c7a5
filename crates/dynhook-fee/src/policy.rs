//! Block-gated dynamic fee policy.
//!
//! The fee is recomputed at most once per block. On the first query in a
//! new block the previous "current" price becomes the "last" price, the
//! live price is read from the host, and the fee is set to the high tier
//! if the price strictly rose, otherwise the low tier.
//!
//! ```text
//!   block N   : seed(P0, N)          fee = initial
//!   block N   : fee_at(N, ..)        fee = initial      (no recompute)
//!   block N+1 : fee_at(N+1, P1>P0)   fee = high
//!   block N+2 : fee_at(N+2, P2==P1)  fee = low
//! ```

use dynhook_types::{
    BlockNumber, FeePolicyConfig, Result, SqrtPriceX96, constants::PIPS_DENOMINATOR,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Observable state of the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeState {
    /// Price observed at the recompute before the latest one.
    pub last_price: SqrtPriceX96,
    /// Price observed at the latest recompute (or at seeding).
    pub now_price: SqrtPriceX96,
    /// Block of the latest recompute, seed or swap stamp.
    pub last_block: BlockNumber,
    /// Fee in pips returned until the next recompute.
    pub fee: u32,
}

/// Price-trend fee policy with two tiers.
#[derive(Debug, Clone)]
pub struct DynamicFeePolicy {
    state: FeeState,
    high_fee: u32,
    low_fee: u32,
}

impl DynamicFeePolicy {
    /// Create a policy from validated fee tiers.
    pub fn new(config: &FeePolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: FeeState {
                fee: config.initial_fee,
                ..FeeState::default()
            },
            high_fee: config.high_fee,
            low_fee: config.low_fee,
        })
    }

    #[must_use]
    pub fn state(&self) -> FeeState {
        self.state
    }

    /// Fee currently in force, without recomputing.
    #[must_use]
    pub fn fee(&self) -> u32 {
        self.state.fee
    }

    /// Current fee as a fraction (30 pips → 0.00003).
    #[must_use]
    pub fn fee_rate(&self) -> Decimal {
        Decimal::from(self.state.fee) / Decimal::from(PIPS_DENOMINATOR)
    }

    /// Record the pool's starting price and block. The fee is untouched.
    pub fn seed(&mut self, price: SqrtPriceX96, block: BlockNumber) {
        self.state.now_price = price;
        self.state.last_block = block;
    }

    /// Re-stamp the block so no recompute happens until the next one.
    pub fn stamp(&mut self, block: BlockNumber) {
        self.state.last_block = block;
    }

    /// Whether a query at `block` would recompute.
    #[must_use]
    pub fn is_stale(&self, block: BlockNumber) -> bool {
        block > self.state.last_block
    }

    /// Fee for a swap executing at `block`.
    ///
    /// `live_price` is only invoked when a recompute is due; if it fails the
    /// state is left untouched.
    pub fn fee_at<F>(&mut self, block: BlockNumber, live_price: F) -> Result<u32>
    where
        F: FnOnce() -> Result<SqrtPriceX96>,
    {
        if !self.is_stale(block) {
            return Ok(self.state.fee);
        }

        let price = live_price()?;
        self.state.last_price = self.state.now_price;
        self.state.now_price = price;
        self.state.fee = if self.state.now_price > self.state.last_price {
            self.high_fee
        } else {
            self.low_fee
        };
        self.state.last_block = block;

        tracing::debug!(
            block = block.0,
            last_price = %self.state.last_price,
            now_price = %self.state.now_price,
            fee = self.state.fee,
            "Dynamic fee recomputed"
        );
        Ok(self.state.fee)
    }
}

#[cfg(test)]
mod tests {
    use dynhook_types::DynhookError;

    use super::*;

    fn policy() -> DynamicFeePolicy {
        DynamicFeePolicy::new(&FeePolicyConfig::default()).unwrap()
    }

    fn price(p: u128) -> Result<SqrtPriceX96> {
        Ok(SqrtPriceX96(p))
    }

    #[test]
    fn starts_at_initial_fee() {
        let p = policy();
        assert_eq!(p.fee(), 0);
        assert_eq!(p.state(), FeeState::default());
    }

    #[test]
    fn same_block_does_not_recompute() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(10));
        let fee = p
            .fee_at(BlockNumber(10), || panic!("price must not be read"))
            .unwrap();
        assert_eq!(fee, 0);
    }

    #[test]
    fn rising_price_charges_high_tier() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(10));
        assert_eq!(p.fee_at(BlockNumber(11), || price(101)).unwrap(), 30);
        let s = p.state();
        assert_eq!(s.last_price, SqrtPriceX96(100));
        assert_eq!(s.now_price, SqrtPriceX96(101));
        assert_eq!(s.last_block, BlockNumber(11));
    }

    #[test]
    fn equal_price_charges_low_tier() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(10));
        assert_eq!(p.fee_at(BlockNumber(11), || price(100)).unwrap(), 5);
    }

    #[test]
    fn falling_price_charges_low_tier() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(10));
        assert_eq!(p.fee_at(BlockNumber(12), || price(99)).unwrap(), 5);
    }

    #[test]
    fn fee_constant_within_block() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(1));
        let first = p.fee_at(BlockNumber(2), || price(200)).unwrap();
        for later in [50, 300, 200] {
            assert_eq!(p.fee_at(BlockNumber(2), || price(later)).unwrap(), first);
        }
    }

    #[test]
    fn stamp_suppresses_recompute() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(1));
        p.stamp(BlockNumber(5));
        assert!(!p.is_stale(BlockNumber(5)));
        assert!(p.is_stale(BlockNumber(6)));
    }

    #[test]
    fn failed_price_read_leaves_state() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(1));
        let before = p.state();
        let err = p
            .fee_at(BlockNumber(2), || Err(DynhookError::Host("down".into())))
            .unwrap_err();
        assert!(matches!(err, DynhookError::Host(_)));
        assert_eq!(p.state(), before);
    }

    #[test]
    fn fee_rate_in_pips() {
        let mut p = policy();
        p.seed(SqrtPriceX96(1), BlockNumber(1));
        p.fee_at(BlockNumber(2), || price(2)).unwrap();
        assert_eq!(p.fee_rate(), Decimal::new(3, 5));
    }

    #[test]
    fn fee_state_json_snapshot() {
        let mut p = policy();
        p.seed(SqrtPriceX96(100), BlockNumber(7));
        p.fee_at(BlockNumber(8), || price(150)).unwrap();

        let json = serde_json::to_string(&p.state()).unwrap();
        assert!(json.contains("\"last_block\":8"));
        let back: FeeState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p.state());
        assert_eq!(back.fee, 30);
    }

    #[test]
    fn invalid_tiers_rejected() {
        let cfg = FeePolicyConfig {
            high_fee: 1,
            low_fee: 10,
            ..FeePolicyConfig::default()
        };
        assert!(matches!(
            DynamicFeePolicy::new(&cfg).unwrap_err(),
            DynhookError::InvalidFeeTier { .. }
        ));
    }
}
