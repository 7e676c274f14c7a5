//! Receipts for completed gateway operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, BalanceDelta, OperationKind, PoolId, RequestId, RequestState};

/// Record of one request that went through the unlock/settle cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReceipt {
    pub request_id: RequestId,
    pub kind: OperationKind,
    pub caller: Address,
    pub pool_id: PoolId,
    /// Delta settled against the caller.
    pub delta: BalanceDelta,
    /// Fees accrued to the caller's reward ledger entry (liquidity only).
    pub fee_delta: Option<BalanceDelta>,
    pub state: RequestState,
    pub completed_at: DateTime<Utc>,
}

impl OperationReceipt {
    /// Whether the caller paid anything in either currency.
    #[must_use]
    pub fn caller_paid(&self) -> bool {
        self.delta.amount0() < 0 || self.delta.amount1() < 0
    }

    /// Whether the caller received anything in either currency.
    #[must_use]
    pub fn caller_received(&self) -> bool {
        self.delta.amount0() > 0 || self.delta.amount1() > 0
    }
}
