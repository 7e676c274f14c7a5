//! # dynhook-types
//!
//! Shared types, host interfaces, errors and configuration for **dynhook**,
//! a dynamic-fee pool hook paired with an unlock/settle liquidity gateway.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`Currency`], [`PoolId`], [`RequestId`], [`BlockNumber`]
//! - **Pool model**: [`PoolKey`], [`Slot0`], [`SqrtPriceX96`], [`ModifyLiquidityParams`], [`SwapParams`], [`DonateParams`]
//! - **Deltas**: [`BalanceDelta`]
//! - **Requests**: [`UnlockRequest`], [`UnlockAction`], [`OperationKind`], [`RequestState`]
//! - **Receipts**: [`OperationReceipt`]
//! - **Host interfaces**: [`PoolManager`], [`TokenBank`], [`Environment`], [`UnlockCallback`]
//! - **Hook flags**: [`HookPermissions`] and the LP-fee flag helpers in [`hooks`]
//! - **Configuration**: [`HookConfig`], [`FeePolicyConfig`], [`GatewayConfig`]
//! - **Errors**: [`DynhookError`] with `DH_ERR_` prefix codes
//! - **Constants**: fee tier defaults and limits
//!
//! With the `test-helpers` feature, [`testing::MockPoolManager`] provides a
//! scripted in-memory host.

pub mod config;
pub mod constants;
pub mod delta;
pub mod error;
pub mod hooks;
pub mod host;
pub mod ids;
pub mod pool;
pub mod receipt;
pub mod request;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use config::*;
pub use delta::*;
pub use error::*;
pub use hooks::HookPermissions;
pub use host::*;
pub use ids::*;
pub use pool::*;
pub use receipt::*;
pub use request::*;

// Constants and LP-fee flag helpers are accessed via their modules
// (`dynhook_types::constants::FOO`, `dynhook_types::hooks::DYNAMIC_FEE_FLAG`).
