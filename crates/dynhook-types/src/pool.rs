//! Pool descriptors and the parameter shapes of host operations.
//!
//! These mirror the host's published interface. The host owns the price
//! curve and tick accounting; nothing here interprets ticks or prices
//! beyond comparing and hashing them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, Currency, DynhookError, PoolId, Result};

/// Square-root price as reported by the host, a Q64.96 fixed-point word.
///
/// Values are taken verbatim from the host and only ever compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize, Default)]
pub struct SqrtPriceX96(pub u128);

impl SqrtPriceX96 {
    pub const ZERO: Self = Self(0);

    /// `1.0` in Q64.96.
    pub const ONE: Self = Self(1 << 96);
}

impl fmt::Display for SqrtPriceX96 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PoolKey
// ---------------------------------------------------------------------------

/// Everything that identifies a pool on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    /// The lower currency of the pair, by address.
    pub currency0: Currency,
    /// The higher currency of the pair, by address.
    pub currency1: Currency,
    /// LP fee in pips, or the dynamic-fee flag.
    pub fee: u32,
    /// Tick spacing of initialised ticks.
    pub tick_spacing: i32,
    /// Hook contract attached to the pool.
    pub hooks: Address,
}

impl PoolKey {
    /// Build a key, rejecting pairs that are not strictly ordered.
    pub fn new(
        currency0: Currency,
        currency1: Currency,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
    ) -> Result<Self> {
        if currency0 >= currency1 {
            return Err(DynhookError::CurrenciesOutOfOrder(currency0, currency1));
        }
        Ok(Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        })
    }

    /// Deterministic pool identifier.
    ///
    /// `SHA-256("dynhook:pool_id:v1:" || currency0 || currency1 || fee || tick_spacing || hooks)`
    #[must_use]
    pub fn id(&self) -> PoolId {
        let mut hasher = Sha256::new();
        hasher.update(b"dynhook:pool_id:v1:");
        hasher.update(self.currency0.0.as_bytes());
        hasher.update(self.currency1.0.as_bytes());
        hasher.update(self.fee.to_be_bytes());
        hasher.update(self.tick_spacing.to_be_bytes());
        hasher.update(self.hooks.as_bytes());
        PoolId(hasher.finalize().into())
    }

    /// Pool currency at index 0 or 1.
    #[must_use]
    pub fn currencies(&self) -> [Currency; 2] {
        [self.currency0, self.currency1]
    }
}

// ---------------------------------------------------------------------------
// Slot0
// ---------------------------------------------------------------------------

/// The host's packed "slot 0" of a pool: live price and fee settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Slot0 {
    pub sqrt_price_x96: SqrtPriceX96,
    pub tick: i32,
    pub protocol_fee: u32,
    pub lp_fee: u32,
}

// ---------------------------------------------------------------------------
// Operation parameters
// ---------------------------------------------------------------------------

/// Parameters of a modify-liquidity call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyLiquidityParams {
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Positive adds liquidity, negative removes it.
    pub liquidity_delta: i128,
    /// Distinguishes positions of the same owner over the same range.
    pub salt: [u8; 32],
}

impl ModifyLiquidityParams {
    #[must_use]
    pub fn new(tick_lower: i32, tick_upper: i32, liquidity_delta: i128) -> Self {
        Self {
            tick_lower,
            tick_upper,
            liquidity_delta,
            salt: [0u8; 32],
        }
    }
}

/// Parameters of a swap call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    /// Direction: currency0 in, currency1 out.
    pub zero_for_one: bool,
    /// Negative for exact-input, positive for exact-output.
    pub amount_specified: i128,
    /// Price the swap may not cross.
    pub sqrt_price_limit_x96: SqrtPriceX96,
}

/// Parameters of a donate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonateParams {
    pub amount0: u128,
    pub amount1: u128,
}
