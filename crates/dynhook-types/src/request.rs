//! Unlock requests: the tagged operations the gateway routes through the
//! host's unlock callback.
//!
//! ## Wire format
//!
//! ```text
//! byte 0      operation tag (1 = add-liquidity, 2 = swap, 3 = donate)
//! bytes 1..   JSON envelope { "id", "caller", "params" }
//! ```
//!
//! The shape of `params` depends on the tag. Anything that does not decode
//! (empty payload, unknown tag, malformed envelope) is rejected with
//! [`DynhookError::InvalidParams`].
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐ unlock  ┌────────────┐ host op ┌──────────┐ settle ┌─────────┐ ack ┌──────────────┐
//!   │ ISSUED ├────────▶│ DISPATCHED ├────────▶│ EXECUTED ├───────▶│ SETTLED ├────▶│ ACKNOWLEDGED │
//!   └────────┘         └─────┬──────┘         └────┬─────┘        └────┬────┘     └──────────────┘
//!                            │ bad tag / failure   │                   │
//!                            ▼                     ▼                   ▼
//!                       ┌──────────┐
//!                       │ REVERTED │
//!                       └──────────┘
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    Address, DonateParams, DynhookError, ModifyLiquidityParams, PoolKey, RequestId, Result,
    SwapParams,
};

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// The three operations the gateway can route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    AddLiquidity,
    Swap,
    Donate,
}

impl OperationKind {
    /// Wire tag of this kind.
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::AddLiquidity => 1,
            Self::Swap => 2,
            Self::Donate => 3,
        }
    }
}

impl TryFrom<u8> for OperationKind {
    type Error = DynhookError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::AddLiquidity),
            2 => Ok(Self::Swap),
            3 => Ok(Self::Donate),
            other => Err(DynhookError::InvalidParams {
                reason: format!("unknown operation tag {other}"),
            }),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddLiquidity => write!(f, "ADD_LIQUIDITY"),
            Self::Swap => write!(f, "SWAP"),
            Self::Donate => write!(f, "DONATE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind call parameters
// ---------------------------------------------------------------------------

/// Arguments of an add-liquidity entry call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityCall {
    pub key: PoolKey,
    pub params: ModifyLiquidityParams,
    pub hook_data: Vec<u8>,
}

/// Arguments of an execute-swap entry call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCall {
    pub key: PoolKey,
    pub params: SwapParams,
    pub hook_data: Vec<u8>,
}

/// Arguments of a donate entry call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonateCall {
    pub key: PoolKey,
    pub params: DonateParams,
    pub hook_data: Vec<u8>,
}

/// One operation, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockAction {
    AddLiquidity(LiquidityCall),
    Swap(SwapCall),
    Donate(DonateCall),
}

impl UnlockAction {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::AddLiquidity(_) => OperationKind::AddLiquidity,
            Self::Swap(_) => OperationKind::Swap,
            Self::Donate(_) => OperationKind::Donate,
        }
    }

    #[must_use]
    pub fn key(&self) -> &PoolKey {
        match self {
            Self::AddLiquidity(call) => &call.key,
            Self::Swap(call) => &call.key,
            Self::Donate(call) => &call.key,
        }
    }
}

// ---------------------------------------------------------------------------
// UnlockRequest
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct Envelope<P> {
    id: RequestId,
    caller: Address,
    params: P,
}

/// A request packaged by an entry point and handed to the host's unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockRequest {
    pub id: RequestId,
    /// The account that called the entry point. Settles every delta.
    pub caller: Address,
    pub action: UnlockAction,
}

impl UnlockRequest {
    #[must_use]
    pub fn new(caller: Address, action: UnlockAction) -> Self {
        Self {
            id: RequestId::new(),
            caller,
            action,
        }
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.action.kind()
    }

    /// Encode as `tag || json(envelope)`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = vec![self.kind().tag()];
        let body = match &self.action {
            UnlockAction::AddLiquidity(call) => self.envelope_bytes(call)?,
            UnlockAction::Swap(call) => self.envelope_bytes(call)?,
            UnlockAction::Donate(call) => self.envelope_bytes(call)?,
        };
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn envelope_bytes<P: Serialize>(&self, params: &P) -> Result<Vec<u8>> {
        let envelope = Envelope {
            id: self.id,
            caller: self.caller,
            params,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Decode a payload produced by [`encode`](Self::encode).
    ///
    /// # Errors
    /// [`DynhookError::InvalidParams`] for an empty payload, an unknown tag,
    /// or a body that does not match the tag's parameter shape.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let (&tag, body) = payload.split_first().ok_or_else(|| DynhookError::InvalidParams {
            reason: "empty unlock payload".into(),
        })?;
        let kind = OperationKind::try_from(tag)?;

        let (id, caller, action) = match kind {
            OperationKind::AddLiquidity => {
                let env: Envelope<LiquidityCall> = decode_envelope(kind, body)?;
                (env.id, env.caller, UnlockAction::AddLiquidity(env.params))
            }
            OperationKind::Swap => {
                let env: Envelope<SwapCall> = decode_envelope(kind, body)?;
                (env.id, env.caller, UnlockAction::Swap(env.params))
            }
            OperationKind::Donate => {
                let env: Envelope<DonateCall> = decode_envelope(kind, body)?;
                (env.id, env.caller, UnlockAction::Donate(env.params))
            }
        };

        Ok(Self { id, caller, action })
    }
}

fn decode_envelope<P: DeserializeOwned>(kind: OperationKind, body: &[u8]) -> Result<Envelope<P>> {
    serde_json::from_slice(body).map_err(|err| DynhookError::InvalidParams {
        reason: format!("malformed {kind} payload: {err}"),
    })
}

// ---------------------------------------------------------------------------
// RequestState
// ---------------------------------------------------------------------------

/// Lifecycle state of an unlock request.
///
/// Transitions are **monotonic**: the happy path moves strictly forward and
/// `Reverted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    /// Entry point called, unlock requested.
    Issued,
    /// Host invoked the callback.
    Dispatched,
    /// Host operation performed, deltas obtained.
    Executed,
    /// Both currency deltas resolved.
    Settled,
    /// Empty acknowledgement returned to the host.
    Acknowledged,
    /// Aborted; nothing the request did survives.
    Reverted,
}

impl RequestState {
    /// Can a request in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Issued, Self::Dispatched)
                | (Self::Dispatched, Self::Executed)
                | (Self::Executed, Self::Settled)
                | (Self::Settled, Self::Acknowledged)
                | (
                    Self::Issued | Self::Dispatched | Self::Executed | Self::Settled,
                    Self::Reverted
                )
        )
    }

    /// Move to `target`, refusing transitions the lifecycle does not allow.
    pub fn advance(&mut self, target: Self) -> Result<()> {
        if !self.can_transition_to(target) {
            return Err(DynhookError::InvalidTransition {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        *self = target;
        Ok(())
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::Reverted)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issued => write!(f, "ISSUED"),
            Self::Dispatched => write!(f, "DISPATCHED"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Acknowledged => write!(f, "ACKNOWLEDGED"),
            Self::Reverted => write!(f, "REVERTED"),
        }
    }
}
