//! Error types for the dynhook pool extension.
//!
//! All errors use the `DH_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Request / dispatch errors
//! - 2xx: Settlement errors
//! - 3xx: Fee policy errors
//! - 4xx: Host (pool manager / token) errors
//! - 9xx: General / internal errors
//!
//! Every error is fatal for the call that produced it: the surrounding
//! unlock is aborted and all state changes made during it are unwound.

use thiserror::Error;

use crate::{Address, Currency, PoolId, RequestId};

/// Central error enum for all dynhook operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DynhookError {
    // =================================================================
    // Request / Dispatch Errors (1xx)
    // =================================================================
    /// The unlock payload carried an unknown tag or could not be decoded.
    #[error("DH_ERR_100: Invalid parameters: {reason}")]
    InvalidParams { reason: String },

    /// The host invoked the callback with a request this gateway did not issue.
    #[error("DH_ERR_101: Unexpected unlock callback for request {0}")]
    UnexpectedCallback(RequestId),

    /// A request tried to move backwards or skip a lifecycle state.
    #[error("DH_ERR_102: Invalid request transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // =================================================================
    // Settlement Errors (2xx)
    // =================================================================
    /// A balance delta or ledger entry overflowed its signed width.
    #[error("DH_ERR_200: Delta overflow")]
    DeltaOverflow,

    /// The unlock finished with a currency still carrying a non-zero delta.
    #[error("DH_ERR_201: Currency not settled: {currency} (delta {delta})")]
    CurrencyNotSettled { currency: Currency, delta: i128 },

    /// Not enough balance to complete a transfer.
    #[error("DH_ERR_202: Insufficient balance of {currency} for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        currency: Currency,
        owner: Address,
        needed: u128,
        available: u128,
    },

    /// Not enough allowance for a pull transfer.
    #[error("DH_ERR_203: Insufficient allowance of {currency}: need {needed}, have {available}")]
    InsufficientAllowance {
        currency: Currency,
        needed: u128,
        available: u128,
    },

    /// The native asset cannot be moved through a pull transfer.
    #[error("DH_ERR_204: Native transfer failed: {reason}")]
    NativeTransferFailed { reason: String },

    // =================================================================
    // Fee Policy Errors (3xx)
    // =================================================================
    /// The pool was not created with the dynamic-fee flag.
    #[error("DH_ERR_300: Pool must use the dynamic fee flag, got fee {fee}")]
    MustUseDynamicFee { fee: u32 },

    /// A configured fee tier exceeds the host's maximum LP fee.
    #[error("DH_ERR_301: Invalid fee tier: {reason}")]
    InvalidFeeTier { reason: String },

    // =================================================================
    // Host Errors (4xx)
    // =================================================================
    /// An operation that requires an unlock context was called outside one.
    #[error("DH_ERR_400: Pool manager is locked")]
    ManagerLocked,

    /// A second unlock was requested while one was already active.
    #[error("DH_ERR_401: Pool manager already unlocked")]
    AlreadyUnlocked,

    /// The pool has not been initialised.
    #[error("DH_ERR_402: Pool not initialized: {0}")]
    PoolNotInitialized(PoolId),

    /// The pool was already initialised.
    #[error("DH_ERR_403: Pool already initialized: {0}")]
    PoolAlreadyInitialized(PoolId),

    /// Lower tick is not strictly below upper tick.
    #[error("DH_ERR_404: Invalid tick range: [{lower}, {upper})")]
    InvalidTickRange { lower: i32, upper: i32 },

    /// The pool cannot fill the requested amount.
    #[error("DH_ERR_405: Insufficient liquidity: {reason}")]
    InsufficientLiquidity { reason: String },

    /// Pool currencies are not strictly ordered.
    #[error("DH_ERR_406: Currencies out of order: {0} >= {1}")]
    CurrenciesOutOfOrder(Currency, Currency),

    /// Any other failure raised by the host, passed through unchanged.
    #[error("DH_ERR_407: Host failure: {0}")]
    Host(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("DH_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("DH_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, bad values, etc.).
    #[error("DH_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DynhookError>;

impl From<serde_json::Error> for DynhookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
