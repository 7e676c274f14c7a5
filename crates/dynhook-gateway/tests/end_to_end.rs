//! End-to-end tests: fee hook, gateway and host together.
//!
//! The mock host does not invoke hooks itself, so the harness plays the
//! host's part: `before_swap` / `after_swap` wrap each gateway swap and the
//! flagged fee is written into the pool's slot0.

use dynhook_fee::DynamicFeeHook;
use dynhook_gateway::LiquidityGateway;
use dynhook_types::testing::MockPoolManager;
use dynhook_types::*;

const P0: SqrtPriceX96 = SqrtPriceX96(79_228_162_514_264_337_593_543_950_336);
const P1: SqrtPriceX96 = SqrtPriceX96(79_228_162_514_264_337_593_543_990_000);

const HOOK: Address = Address::from_low_u8(0x40);
const TOKEN: Currency = Currency::token(Address::from_low_u8(0x20));
const LP: Address = Address::from_low_u8(0x10);
const TRADER: Address = Address::from_low_u8(0x11);
const DONOR: Address = Address::from_low_u8(0x12);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Harness {
    host: MockPoolManager,
    hook: DynamicFeeHook,
    gateway: LiquidityGateway,
    key: PoolKey,
}

impl Harness {
    fn new() -> Self {
        init_tracing();
        let config = HookConfig::default();
        config.validate().unwrap();

        let key = PoolKey::new(Currency::NATIVE, TOKEN, hooks::DYNAMIC_FEE_FLAG, 60, HOOK).unwrap();
        let mut host = MockPoolManager::new(Address::from_low_u8(0xff));
        host.set_block(BlockNumber(500));

        let mut hook = DynamicFeeHook::new(HOOK, &config.fee).unwrap();
        hook.before_initialize(Address::ZERO, &key, P0).unwrap();
        let tick = host.initialize(key, P0).unwrap();
        hook.after_initialize(&host, Address::ZERO, &key, P0, tick)
            .unwrap();

        let gateway = LiquidityGateway::new(&config.gateway).unwrap();
        for user in [LP, TRADER, DONOR] {
            host.mint(Currency::NATIVE, user, 1_000_000);
            host.mint(TOKEN, user, 1_000_000);
            host.approve(TOKEN, user, gateway.address(), u128::MAX)
                .unwrap();
        }

        Self {
            host,
            hook,
            gateway,
            key,
        }
    }

    /// Put `amount` of each currency into host custody via a donation.
    fn seed_custody(&mut self, amount: u128) {
        self.gateway
            .donate(&mut self.host, DONOR, self.key, amount, amount, Vec::new())
            .unwrap();
    }

    fn swap(
        &mut self,
        delta: BalanceDelta,
        price_after: SqrtPriceX96,
    ) -> Result<(u32, OperationReceipt)> {
        let params = SwapParams {
            zero_for_one: true,
            amount_specified: -1_000,
            sqrt_price_limit_x96: SqrtPriceX96(1),
        };
        let flagged = self
            .hook
            .before_swap(&self.host, TRADER, &self.key, &params, &[])?;
        self.host.set_lp_fee(&self.key, flagged)?;
        self.host.script_swap(delta, Some(price_after));
        let receipt =
            self.gateway
                .execute_swap(&mut self.host, TRADER, self.key, params, Vec::new())?;
        self.hook
            .after_swap(&self.host, TRADER, &self.key, &params, receipt.delta, &[])?;
        Ok((hooks::remove_override_flag(flagged), receipt))
    }
}

#[test]
fn liquidity_add_pulls_pays_and_credits_fees() {
    let mut h = Harness::new();
    h.seed_custody(1_000);
    let native_before = h.host.balance_of(Currency::NATIVE, LP);
    let token_before = h.host.balance_of(TOKEN, LP);

    h.host
        .script_modify_liquidity(BalanceDelta::new(-100, 50), BalanceDelta::new(2, 0));
    let receipt = h
        .gateway
        .add_liquidity(
            &mut h.host,
            LP,
            h.key,
            ModifyLiquidityParams::new(-120, 120, 10_000),
            Vec::new(),
        )
        .unwrap();

    assert_eq!(receipt.kind, OperationKind::AddLiquidity);
    assert_eq!(receipt.state, RequestState::Acknowledged);
    assert!(receipt.caller_paid());
    assert!(receipt.caller_received());
    assert_eq!(h.host.balance_of(Currency::NATIVE, LP), native_before - 100);
    assert_eq!(h.host.balance_of(TOKEN, LP), token_before + 50);
    assert_eq!(h.gateway.pending_rewards(LP), BalanceDelta::new(2, 0));
    assert!(!h.host.is_unlocked());
}

#[test]
fn custody_moves_exactly_by_the_delta() {
    let mut h = Harness::new();
    h.seed_custody(500);
    let native = h.host.custody(Currency::NATIVE);
    let token = h.host.custody(TOKEN);

    let (_, receipt) = h.swap(BalanceDelta::new(-300, 290), P1).unwrap();

    assert_eq!(receipt.delta, BalanceDelta::new(-300, 290));
    assert_eq!(h.host.custody(Currency::NATIVE), native + 300);
    assert_eq!(h.host.custody(TOKEN), token - 290);
    assert_eq!(h.host.balance_of(TOKEN, h.gateway.address()), 0);
    assert_eq!(h.host.balance_of(Currency::NATIVE, h.gateway.address()), 0);
}

#[test]
fn swaps_across_blocks_follow_the_price() {
    let mut h = Harness::new();
    h.seed_custody(10_000);

    // Block N: seeded fee, swap moves price to P1.
    let (fee, _) = h.swap(BalanceDelta::new(-100, 99), P1).unwrap();
    assert_eq!(fee, 0);

    // Block N+1: P1 > P0 → high tier, and the host sees it.
    h.host.advance_block();
    let (fee, _) = h.swap(BalanceDelta::new(-100, 99), P1).unwrap();
    assert_eq!(fee, 30);
    assert_eq!(h.host.slot0(h.key.id()).unwrap().lp_fee, 30);

    // Block N+2: price unchanged → low tier.
    h.host.advance_block();
    let (fee, _) = h.swap(BalanceDelta::new(-100, 99), P0).unwrap();
    assert_eq!(fee, 5);
    assert_eq!(h.gateway.receipts().count(), 4);
}

#[test]
fn host_failure_rolls_back_everything() {
    let mut h = Harness::new();
    h.seed_custody(1_000);
    h.host
        .script_modify_liquidity(BalanceDelta::new(-10, -10), BalanceDelta::new(3, 3));
    h.gateway
        .add_liquidity(
            &mut h.host,
            LP,
            h.key,
            ModifyLiquidityParams::new(-60, 60, 100),
            Vec::new(),
        )
        .unwrap();

    let host_before = h.host.clone();
    let ledger_before = h.gateway.rewards().clone();

    h.host.fail_next(DynhookError::Host("pool paused".into()));
    let err = h
        .gateway
        .donate(&mut h.host, DONOR, h.key, 5, 5, Vec::new())
        .unwrap_err();
    assert_eq!(err, DynhookError::Host("pool paused".into()));

    let err = h
        .gateway
        .add_liquidity(
            &mut h.host,
            LP,
            h.key,
            ModifyLiquidityParams::new(60, -60, 100),
            Vec::new(),
        )
        .unwrap_err();
    assert!(matches!(err, DynhookError::InvalidTickRange { .. }));

    assert_eq!(h.gateway.rewards(), &ledger_before);
    assert_eq!(h.host.custody(TOKEN), host_before.custody(TOKEN));
    assert_eq!(
        h.host.balance_of(Currency::NATIVE, DONOR),
        host_before.balance_of(Currency::NATIVE, DONOR)
    );
    assert_eq!(h.gateway.receipts().count(), 2);
}

#[test]
fn unknown_tag_mutates_neither_ledger_nor_fee_state() {
    let mut h = Harness::new();
    h.seed_custody(1_000);
    h.host
        .script_modify_liquidity(BalanceDelta::new(-1, -1), BalanceDelta::new(1, 0));
    h.gateway
        .add_liquidity(
            &mut h.host,
            LP,
            h.key,
            ModifyLiquidityParams::new(-60, 60, 1),
            Vec::new(),
        )
        .unwrap();

    let ledger_before = h.gateway.rewards().clone();
    let fee_before = h.hook.policy().state();

    for payload in [&[0u8, b'{', b'}'][..], &[4u8][..], &[][..], &[1u8, 0xff][..]] {
        let err = h
            .host
            .unlock(h.gateway.address(), payload, &mut h.gateway)
            .unwrap_err();
        assert!(
            matches!(err, DynhookError::InvalidParams { .. }),
            "payload {payload:?} gave {err}"
        );
    }

    assert_eq!(h.gateway.rewards(), &ledger_before);
    assert_eq!(h.hook.policy().state(), fee_before);
    assert!(!h.host.is_unlocked());
}

#[test]
fn receipt_serializes_for_audit() {
    let mut h = Harness::new();
    let receipt = h
        .gateway
        .donate(&mut h.host, DONOR, h.key, 3, 4, Vec::new())
        .unwrap();

    let json = serde_json::to_string(&receipt).unwrap();
    let back: OperationReceipt = serde_json::from_str(&json).unwrap();
    assert_eq!(back.request_id, receipt.request_id);
    assert_eq!(back.delta, BalanceDelta::new(-3, -4));
    assert_eq!(back.pool_id, h.key.id());
}
