//! Configuration for the fee hook and the liquidity gateway.

use serde::{Deserialize, Serialize};

use crate::{Address, DynhookError, Result, constants, hooks};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    pub fee: FeePolicyConfig,
    pub gateway: GatewayConfig,
}

impl HookConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)
            .map_err(|err| DynhookError::Configuration(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.fee.validate()?;
        self.gateway.validate()
    }
}

/// Fee tiers of the dynamic fee policy, in pips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicyConfig {
    /// Applied when the price rose since the previous block.
    pub high_fee: u32,
    /// Applied when the price fell or did not move.
    pub low_fee: u32,
    /// Reported until the first recompute.
    pub initial_fee: u32,
    /// Refuse to attach to pools that were not created with the dynamic-fee flag.
    pub require_dynamic_fee: bool,
}

impl Default for FeePolicyConfig {
    fn default() -> Self {
        Self {
            high_fee: constants::DEFAULT_HIGH_FEE,
            low_fee: constants::DEFAULT_LOW_FEE,
            initial_fee: constants::DEFAULT_INITIAL_FEE,
            require_dynamic_fee: true,
        }
    }
}

impl FeePolicyConfig {
    /// # Errors
    /// [`DynhookError::InvalidFeeTier`] if a tier exceeds the host maximum
    /// or the low tier is above the high tier.
    pub fn validate(&self) -> Result<()> {
        for (name, fee) in [
            ("high_fee", self.high_fee),
            ("low_fee", self.low_fee),
            ("initial_fee", self.initial_fee),
        ] {
            if !hooks::is_valid_fee(fee) {
                return Err(DynhookError::InvalidFeeTier {
                    reason: format!("{name} {fee} exceeds {}", hooks::MAX_LP_FEE),
                });
            }
        }
        if self.low_fee > self.high_fee {
            return Err(DynhookError::InvalidFeeTier {
                reason: format!(
                    "low_fee {} is above high_fee {}",
                    self.low_fee, self.high_fee
                ),
            });
        }
        Ok(())
    }
}

/// Liquidity gateway settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// The gateway's own address: it holds the unlock and forwards token pulls.
    pub address: Address,
    /// How many receipts to keep.
    pub receipt_history: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: Address::from_low_u8(0xa1),
            receipt_history: constants::DEFAULT_RECEIPT_HISTORY,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.address.is_zero() {
            return Err(DynhookError::Configuration(
                "gateway address must not be zero".into(),
            ));
        }
        if self.receipt_history == 0 {
            return Err(DynhookError::Configuration(
                "receipt_history must be > 0".into(),
            ));
        }
        Ok(())
    }
}
