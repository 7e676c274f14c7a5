//! # dynhook-gateway
//!
//! Liquidity gateway for hook-fee pools.
//!
//! Every entry call ([`LiquidityGateway::add_liquidity`],
//! [`LiquidityGateway::execute_swap`], [`LiquidityGateway::donate`]) is
//! packaged into a tagged payload, handed to the host's `unlock`, decoded
//! again in the callback, executed and settled with the caller before the
//! host regains control. Either the whole request commits or none of it
//! does.

pub mod gateway;
pub mod rewards;
pub mod settle;

pub use gateway::LiquidityGateway;
pub use rewards::RewardLedger;
pub use settle::{SettlementLeg, settle_currency};
