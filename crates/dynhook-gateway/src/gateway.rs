//! The liquidity gateway: entry points, the unlock callback dispatcher and
//! per-request settlement.
//!
//! ## Request Flow
//!
//! ```text
//! add_liquidity / execute_swap / donate
//!     → UnlockRequest::encode            (ISSUED)
//!     → host.unlock(gateway, payload)
//!         → unlock_callback: decode tag  (DISPATCHED, or REVERTED on bad tag)
//!         → host operation               (EXECUTED)
//!         → settle currency0, currency1  (SETTLED)
//!         → empty ack                    (ACKNOWLEDGED)
//!     → OperationReceipt
//! ```
//!
//! Any failure aborts the whole request: the host rolls back its own state
//! and the gateway restores its reward ledger.

use std::collections::VecDeque;

use chrono::Utc;
use dynhook_types::{
    Address, BalanceDelta, DonateCall, DonateParams, DynhookError, GatewayConfig, LiquidityCall,
    ModifyLiquidityParams, OperationReceipt, PoolKey, PoolManager, RequestId, RequestState,
    Result, SwapCall, SwapParams, TokenBank, UnlockAction, UnlockCallback, UnlockRequest,
};

use crate::rewards::RewardLedger;
use crate::settle::settle_currency;

/// The request currently inside an unlock.
#[derive(Debug)]
struct InFlight {
    id: RequestId,
    state: RequestState,
    receipt: Option<OperationReceipt>,
}

/// Routes liquidity, swap and donate calls through the host's unlock and
/// settles the resulting deltas with the caller.
#[derive(Debug)]
pub struct LiquidityGateway {
    address: Address,
    rewards: RewardLedger,
    in_flight: Option<InFlight>,
    receipts: VecDeque<OperationReceipt>,
    receipt_history: usize,
}

impl LiquidityGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            address: config.address,
            rewards: RewardLedger::new(),
            in_flight: None,
            receipts: VecDeque::with_capacity(config.receipt_history.min(64)),
            receipt_history: config.receipt_history,
        })
    }

    /// The gateway's own address (the unlock holder).
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Fees accrued to `owner` by liquidity operations.
    #[must_use]
    pub fn pending_rewards(&self, owner: Address) -> BalanceDelta {
        self.rewards.pending(owner)
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardLedger {
        &self.rewards
    }

    /// Receipts of completed requests, oldest first.
    pub fn receipts(&self) -> impl Iterator<Item = &OperationReceipt> {
        self.receipts.iter()
    }

    // -----------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------

    /// Modify `caller`'s liquidity in `key`'s pool.
    ///
    /// The caller pays or receives the position delta; the fees accrued to
    /// the position are credited to the caller's reward ledger entry.
    pub fn add_liquidity<H>(
        &mut self,
        host: &mut H,
        caller: Address,
        key: PoolKey,
        params: ModifyLiquidityParams,
        hook_data: Vec<u8>,
    ) -> Result<OperationReceipt>
    where
        H: PoolManager + TokenBank,
    {
        let action = UnlockAction::AddLiquidity(LiquidityCall {
            key,
            params,
            hook_data,
        });
        self.issue(host, UnlockRequest::new(caller, action))
    }

    /// Swap in `key`'s pool on behalf of `caller`.
    pub fn execute_swap<H>(
        &mut self,
        host: &mut H,
        caller: Address,
        key: PoolKey,
        params: SwapParams,
        hook_data: Vec<u8>,
    ) -> Result<OperationReceipt>
    where
        H: PoolManager + TokenBank,
    {
        let action = UnlockAction::Swap(SwapCall {
            key,
            params,
            hook_data,
        });
        self.issue(host, UnlockRequest::new(caller, action))
    }

    /// Donate `amount0` / `amount1` from `caller` to `key`'s in-range LPs.
    pub fn donate<H>(
        &mut self,
        host: &mut H,
        caller: Address,
        key: PoolKey,
        amount0: u128,
        amount1: u128,
        hook_data: Vec<u8>,
    ) -> Result<OperationReceipt>
    where
        H: PoolManager + TokenBank,
    {
        let action = UnlockAction::Donate(DonateCall {
            key,
            params: DonateParams { amount0, amount1 },
            hook_data,
        });
        self.issue(host, UnlockRequest::new(caller, action))
    }

    // -----------------------------------------------------------------
    // Unlock round trip
    // -----------------------------------------------------------------

    fn issue<H>(&mut self, host: &mut H, request: UnlockRequest) -> Result<OperationReceipt>
    where
        H: PoolManager + TokenBank,
    {
        let payload = request.encode()?;
        // Only the caller's entry is credited inside the unlock.
        let entry_before = self.rewards.entry(request.caller);
        self.in_flight = Some(InFlight {
            id: request.id,
            state: RequestState::Issued,
            receipt: None,
        });

        tracing::info!(
            request = %request.id,
            kind = %request.kind(),
            caller = %request.caller,
            pool = %request.action.key().id(),
            "Unlock requested"
        );

        let outcome = host
            .unlock(self.address, &payload, self)
            .and_then(|ack| {
                if !ack.is_empty() {
                    return Err(DynhookError::Internal(format!(
                        "unexpected {}-byte acknowledgement",
                        ack.len()
                    )));
                }
                self.in_flight
                    .take()
                    .and_then(|flight| flight.receipt)
                    .ok_or_else(|| {
                        DynhookError::Internal("unlock returned without a callback".into())
                    })
            });

        match outcome {
            Ok(receipt) => {
                self.record(receipt.clone());
                Ok(receipt)
            }
            Err(err) => {
                self.in_flight = None;
                self.rewards.restore(request.caller, entry_before);
                tracing::warn!(request = %request.id, error = %err, "Request reverted");
                Err(err)
            }
        }
    }

    fn record(&mut self, receipt: OperationReceipt) {
        if self.receipts.len() >= self.receipt_history {
            self.receipts.pop_front();
        }
        self.receipts.push_back(receipt);
    }

    /// Decode, run and settle one request. Advances `state` as it goes.
    fn dispatch<H>(
        &mut self,
        host: &mut H,
        data: &[u8],
        state: &mut RequestState,
    ) -> Result<OperationReceipt>
    where
        H: PoolManager + TokenBank,
    {
        let request = UnlockRequest::decode(data)?;
        match self.in_flight.as_ref() {
            Some(flight) if flight.id == request.id && flight.state == RequestState::Issued => {}
            _ => return Err(DynhookError::UnexpectedCallback(request.id)),
        }
        state.advance(RequestState::Dispatched)?;

        let caller = request.caller;
        let key = *request.action.key();
        let (delta, fee_delta) = match &request.action {
            UnlockAction::AddLiquidity(call) => {
                let (delta, fees) =
                    host.modify_liquidity(&call.key, &call.params, &call.hook_data)?;
                let pending = self.rewards.credit(caller, fees)?;
                tracing::debug!(caller = %caller, fees = %fees, pending = %pending, "Fees accrued");
                (delta, Some(fees))
            }
            UnlockAction::Swap(call) => (host.swap(&call.key, &call.params, &call.hook_data)?, None),
            UnlockAction::Donate(call) => (
                host.donate(
                    &call.key,
                    call.params.amount0,
                    call.params.amount1,
                    &call.hook_data,
                )?,
                None,
            ),
        };
        state.advance(RequestState::Executed)?;

        for (index, currency) in key.currencies().into_iter().enumerate() {
            settle_currency(host, self.address, caller, currency, delta.amount(index))?;
        }
        state.advance(RequestState::Settled)?;
        state.advance(RequestState::Acknowledged)?;

        tracing::info!(
            request = %request.id,
            kind = %request.kind(),
            caller = %caller,
            delta = %delta,
            "Request settled"
        );

        Ok(OperationReceipt {
            request_id: request.id,
            kind: request.kind(),
            caller,
            pool_id: key.id(),
            delta,
            fee_delta,
            state: *state,
            completed_at: Utc::now(),
        })
    }
}

impl<H> UnlockCallback<H> for LiquidityGateway
where
    H: PoolManager + TokenBank,
{
    /// Host re-entry point. Returns an empty acknowledgement.
    ///
    /// # Errors
    /// [`DynhookError::InvalidParams`] for an unknown tag or malformed
    /// payload; [`DynhookError::UnexpectedCallback`] for a request this
    /// gateway is not waiting on; host failures unchanged.
    fn unlock_callback(&mut self, host: &mut H, data: &[u8]) -> Result<Vec<u8>> {
        let mut state = RequestState::Issued;
        let outcome = self.dispatch(host, data, &mut state);

        match outcome {
            Ok(receipt) => {
                if let Some(flight) = self.in_flight.as_mut() {
                    flight.state = state;
                    flight.receipt = Some(receipt);
                }
                Ok(Vec::new())
            }
            Err(err) => {
                state = RequestState::Reverted;
                if let Some(flight) = self.in_flight.as_mut() {
                    flight.state = state;
                }
                tracing::warn!(error = %err, "Unlock callback aborted");
                Err(err)
            }
        }
    }
}
