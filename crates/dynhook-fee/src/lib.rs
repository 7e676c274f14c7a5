//! # dynhook-fee
//!
//! Dynamic fee policy for hook-fee pools.
//!
//! - [`DynamicFeePolicy`]: the stateful policy. Raises the fee to the high
//!   tier when the pool price rose since the previous block, drops it to the
//!   low tier otherwise, and recomputes at most once per block.
//! - [`DynamicFeeHook`]: the host callbacks (`after_initialize` seeds the
//!   price, `after_swap` re-stamps the block, `get_fee` / `before_swap`
//!   answer fee queries).

pub mod hook;
pub mod policy;

pub use hook::DynamicFeeHook;
pub use policy::{DynamicFeePolicy, FeeState};
