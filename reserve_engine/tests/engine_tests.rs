// Reserve state-machine scenarios, driven through the deployed contract with
// whitebox transactions.

use multiversx_sc::types::{
    BigUint, EgldOrEsdtTokenIdentifier, ManagedDecimal, TestAddress, TestSCAddress,
};
use multiversx_sc_scenario::{imports::MxscPath, ScenarioTxWhitebox, ScenarioWorld};

use common_constants::{RAY, RAY_PRECISION, SECONDS_PER_YEAR, WAD};
use reserve_engine::accrual::AccrualModule;
use reserve_engine::cache::Cache;
use reserve_engine::storage::Storage;
use reserve_engine::utils::UtilsModule;
use reserve_engine::ReserveEngine;

pub const OWNER_ADDRESS: TestAddress = TestAddress::new("owner");
pub const ENGINE_ADDRESS: TestSCAddress = TestSCAddress::new("reserve-engine");
pub const ENGINE_PATH: MxscPath = MxscPath::new("output/reserve_engine.mxsc.json");

pub const GENESIS: u64 = 1_700_000_000;

pub const OPTIMAL_USAGE_RATIO: u128 = 800_000_000_000_000_000_000_000_000; // 80%
pub const OPTIMAL_STABLE_RATIO: u128 = 200_000_000_000_000_000_000_000_000; // 20%
pub const VARIABLE_SLOPE1: u128 = 40_000_000_000_000_000_000_000_000; // 4%
pub const VARIABLE_SLOPE2: u128 = 750_000_000_000_000_000_000_000_000; // 75%
pub const STABLE_SLOPE1: u128 = 20_000_000_000_000_000_000_000_000; // 2%
pub const STABLE_SLOPE2: u128 = 600_000_000_000_000_000_000_000_000; // 60%
pub const BASE_STABLE_OFFSET: u128 = 10_000_000_000_000_000_000_000_000; // 1%
pub const STABLE_EXCESS_OFFSET: u128 = 80_000_000_000_000_000_000_000_000; // 8%

// An annualized rate whose one-second linear slice is exactly 10^9 raw ray
// units: seconds-per-year * 10^9.
pub const ONE_TICK_RATE: u128 = 31_536_000_000_000_000;

fn world() -> ScenarioWorld {
    let mut blockchain = ScenarioWorld::new();
    blockchain.register_contract(ENGINE_PATH, reserve_engine::ContractBuilder);
    blockchain
}

fn setup(reserve_factor: u64) -> ScenarioWorld {
    let mut world = world();

    world.account(OWNER_ADDRESS).nonce(1);
    world.current_block().block_timestamp(GENESIS);

    world
        .tx()
        .from(OWNER_ADDRESS)
        .raw_deploy()
        .code(ENGINE_PATH)
        .new_address(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.init(
                &EgldOrEsdtTokenIdentifier::egld(),
                BigUint::from(OPTIMAL_USAGE_RATIO),
                BigUint::from(OPTIMAL_STABLE_RATIO),
                BigUint::zero(),
                BigUint::from(VARIABLE_SLOPE1),
                BigUint::from(VARIABLE_SLOPE2),
                BigUint::from(STABLE_SLOPE1),
                BigUint::from(STABLE_SLOPE2),
                BigUint::from(BASE_STABLE_OFFSET),
                BigUint::from(STABLE_EXCESS_OFFSET),
                BigUint::from(reserve_factor),
                18usize,
            );
        });

    world
}

fn roll_state(world: &mut ScenarioWorld, timestamp: u64) {
    world.current_block().block_timestamp(timestamp);
    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            let mut cache = Cache::new(&sc);
            sc.update_state(&mut cache);
        });
}

fn set_liquidity_rate(world: &mut ScenarioWorld, rate: u128) {
    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.current_liquidity_rate()
                .set(ManagedDecimal::from_raw_units(
                    BigUint::from(rate),
                    RAY_PRECISION,
                ));
        });
}

fn set_variable_debt(world: &mut ScenarioWorld, rate: u128, scaled_tokens: u64) {
    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.current_variable_borrow_rate()
                .set(ManagedDecimal::from_raw_units(
                    BigUint::from(rate),
                    RAY_PRECISION,
                ));
            sc.scaled_variable_debt().set(ManagedDecimal::from_raw_units(
                BigUint::from(scaled_tokens) * BigUint::from(RAY),
                RAY_PRECISION,
            ));
        });
}

// ============== INITIALIZATION ==============

#[test]
fn test_init_seeds_market() {
    let mut world = setup(1_000);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.liquidity_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
            assert_eq!(
                sc.variable_borrow_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
            assert_eq!(
                sc.current_liquidity_rate().get().into_raw_units(),
                &BigUint::zero()
            );
            assert_eq!(sc.last_timestamp().get(), GENESIS);
            assert_eq!(
                sc.accrued_to_treasury().get().into_raw_units(),
                &BigUint::zero()
            );
            assert_eq!(sc.stable_debt().get().last_update, GENESIS);
        });
}

#[test]
#[should_panic]
fn test_reinit_rejected() {
    let mut world = setup(1_000);

    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.init(
                &EgldOrEsdtTokenIdentifier::egld(),
                BigUint::from(OPTIMAL_USAGE_RATIO),
                BigUint::from(OPTIMAL_STABLE_RATIO),
                BigUint::zero(),
                BigUint::from(VARIABLE_SLOPE1),
                BigUint::from(VARIABLE_SLOPE2),
                BigUint::from(STABLE_SLOPE1),
                BigUint::from(STABLE_SLOPE2),
                BigUint::from(BASE_STABLE_OFFSET),
                BigUint::from(STABLE_EXCESS_OFFSET),
                BigUint::from(1_000u64),
                18usize,
            );
        });
}

#[test]
#[should_panic]
fn test_optimal_usage_above_ray_rejected() {
    let mut world = world();

    world.account(OWNER_ADDRESS).nonce(1);
    world.current_block().block_timestamp(GENESIS);

    world
        .tx()
        .from(OWNER_ADDRESS)
        .raw_deploy()
        .code(ENGINE_PATH)
        .new_address(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.init(
                &EgldOrEsdtTokenIdentifier::egld(),
                BigUint::from(RAY + 1),
                BigUint::from(OPTIMAL_STABLE_RATIO),
                BigUint::zero(),
                BigUint::from(VARIABLE_SLOPE1),
                BigUint::from(VARIABLE_SLOPE2),
                BigUint::from(STABLE_SLOPE1),
                BigUint::from(STABLE_SLOPE2),
                BigUint::from(BASE_STABLE_OFFSET),
                BigUint::from(STABLE_EXCESS_OFFSET),
                BigUint::from(1_000u64),
                18usize,
            );
        });
}

#[test]
#[should_panic]
fn test_optimal_stable_ratio_above_ray_rejected() {
    let mut world = world();

    world.account(OWNER_ADDRESS).nonce(1);
    world.current_block().block_timestamp(GENESIS);

    world
        .tx()
        .from(OWNER_ADDRESS)
        .raw_deploy()
        .code(ENGINE_PATH)
        .new_address(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.init(
                &EgldOrEsdtTokenIdentifier::egld(),
                BigUint::from(OPTIMAL_USAGE_RATIO),
                BigUint::from(RAY + 1),
                BigUint::zero(),
                BigUint::from(VARIABLE_SLOPE1),
                BigUint::from(VARIABLE_SLOPE2),
                BigUint::from(STABLE_SLOPE1),
                BigUint::from(STABLE_SLOPE2),
                BigUint::from(BASE_STABLE_OFFSET),
                BigUint::from(STABLE_EXCESS_OFFSET),
                BigUint::from(1_000u64),
                18usize,
            );
        });
}

#[test]
#[should_panic]
fn test_reserve_factor_above_bps_rejected() {
    let mut world = world();

    world.account(OWNER_ADDRESS).nonce(1);
    world.current_block().block_timestamp(GENESIS);

    world
        .tx()
        .from(OWNER_ADDRESS)
        .raw_deploy()
        .code(ENGINE_PATH)
        .new_address(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.init(
                &EgldOrEsdtTokenIdentifier::egld(),
                BigUint::from(OPTIMAL_USAGE_RATIO),
                BigUint::from(OPTIMAL_STABLE_RATIO),
                BigUint::zero(),
                BigUint::from(VARIABLE_SLOPE1),
                BigUint::from(VARIABLE_SLOPE2),
                BigUint::from(STABLE_SLOPE1),
                BigUint::from(STABLE_SLOPE2),
                BigUint::from(BASE_STABLE_OFFSET),
                BigUint::from(STABLE_EXCESS_OFFSET),
                BigUint::from(10_001u64),
                18usize,
            );
        });
}

#[test]
#[should_panic]
fn test_upgrade_rejects_reserve_factor_above_bps() {
    let mut world = setup(1_000);

    // The upgrade path re-validates through the same guard as init.
    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            sc.upgrade(
                BigUint::from(OPTIMAL_USAGE_RATIO),
                BigUint::from(OPTIMAL_STABLE_RATIO),
                BigUint::zero(),
                BigUint::from(VARIABLE_SLOPE1),
                BigUint::from(VARIABLE_SLOPE2),
                BigUint::from(STABLE_SLOPE1),
                BigUint::from(STABLE_SLOPE2),
                BigUint::from(BASE_STABLE_OFFSET),
                BigUint::from(STABLE_EXCESS_OFFSET),
                BigUint::from(10_001u64),
            );
        });
}

// ============== STATE ROLL-FORWARD ==============

#[test]
fn test_same_block_tick_is_noop() {
    let mut world = setup(1_000);

    // Nothing elapsed; the tick settles without touching any field.
    roll_state(&mut world, GENESIS);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.liquidity_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
            assert_eq!(
                sc.variable_borrow_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
            assert_eq!(sc.last_timestamp().get(), GENESIS);
        });
}

#[test]
fn test_pure_supply_accrual_one_year() {
    let mut world = setup(1_000);

    // 5% APR on the supply side, one year elapsed, no debt.
    set_liquidity_rate(&mut world, RAY / 20);
    roll_state(&mut world, GENESIS + SECONDS_PER_YEAR);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.liquidity_index().get().into_raw_units(),
                &BigUint::from(RAY + RAY / 20)
            );
            // No variable debt, so its index is frozen.
            assert_eq!(
                sc.variable_borrow_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
            assert_eq!(sc.last_timestamp().get(), GENESIS + SECONDS_PER_YEAR);
        });
}

#[test]
fn test_compounding_borrow_index_one_year() {
    let mut world = setup(0);

    // 10% APR on 1000 scaled variable debt over one year.
    set_variable_debt(&mut world, RAY / 10, 1_000);
    roll_state(&mut world, GENESIS + SECONDS_PER_YEAR);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            let index = sc.variable_borrow_index().get();
            // Third-order binomial: 1 + 0.1 + ~0.005 + ~0.00016.
            assert!(
                index.into_raw_units()
                    > &BigUint::from(1_105_100_000_000_000_000_000_000_000u128)
            );
            assert!(
                index.into_raw_units()
                    < &BigUint::from(1_105_200_000_000_000_000_000_000_000u128)
            );
            // The supply rate is zero, so the liquidity index is frozen.
            assert_eq!(
                sc.liquidity_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
        });
}

#[test]
fn test_zero_rate_freezes_liquidity_index_across_ticks() {
    let mut world = setup(0);

    set_variable_debt(&mut world, RAY / 10, 1_000);
    roll_state(&mut world, GENESIS + 86_400);
    roll_state(&mut world, GENESIS + 2 * 86_400);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.liquidity_index().get().into_raw_units(),
                &BigUint::from(RAY)
            );
            assert!(sc.variable_borrow_index().get().into_raw_units() > &BigUint::from(RAY));
        });
}

#[test]
fn test_update_state_idempotent_within_tick() {
    let mut world = setup(1_000);

    set_liquidity_rate(&mut world, RAY / 20);
    set_variable_debt(&mut world, RAY / 10, 1_000);

    world.current_block().block_timestamp(GENESIS + 3_600);
    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            let mut cache = Cache::new(&sc);
            sc.update_state(&mut cache);

            let liquidity_index = cache.next_liquidity_index.clone();
            let variable_index = cache.next_variable_borrow_index.clone();
            let treasury = cache.accrued_to_treasury.clone();

            // Same logical tick: the second pass must change nothing.
            sc.update_state(&mut cache);
            assert_eq!(
                cache.next_liquidity_index.into_raw_units(),
                liquidity_index.into_raw_units()
            );
            assert_eq!(
                cache.next_variable_borrow_index.into_raw_units(),
                variable_index.into_raw_units()
            );
            assert_eq!(
                cache.accrued_to_treasury.into_raw_units(),
                treasury.into_raw_units()
            );
            assert_eq!(cache.last_timestamp, cache.timestamp);
        });
}

#[test]
#[should_panic]
fn test_time_regression_aborts() {
    let mut world = setup(1_000);

    world.current_block().block_timestamp(GENESIS - 3_600);
    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            let mut cache = Cache::new(&sc);
            sc.update_state(&mut cache);
        });
}

// ============== TREASURY ==============

#[test]
fn test_treasury_accrues_reserve_factor_share() {
    let mut world = setup(1_000);

    // One second at a rate whose tick is exactly 10^9 raw ray units, on 1000
    // scaled debt: the book grows by 10^12 raw units and the treasury claim
    // by 10% of that.
    set_variable_debt(&mut world, ONE_TICK_RATE, 1_000);
    roll_state(&mut world, GENESIS + 1);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.variable_borrow_index().get().into_raw_units(),
                &BigUint::from(RAY + 1_000_000_000u128)
            );
            assert_eq!(
                sc.accrued_to_treasury().get().into_raw_units(),
                &BigUint::from(100_000_000_000u128)
            );
        });
}

#[test]
fn test_treasury_untouched_with_zero_reserve_factor() {
    let mut world = setup(0);

    set_variable_debt(&mut world, RAY / 10, 1_000);
    roll_state(&mut world, GENESIS + SECONDS_PER_YEAR);

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.accrued_to_treasury().get().into_raw_units(),
                &BigUint::zero()
            );
        });
}

// ============== RATE UPDATES ==============

#[test]
fn test_rate_update_reprices_and_stores() {
    let mut world = setup(1_000);

    world
        .tx()
        .from(OWNER_ADDRESS)
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            let mut cache = Cache::new(&sc);
            sc.update_state(&mut cache);

            // 400 drawn against 600 idle liquidity: 40% usage.
            cache.asset_balance =
                ManagedDecimal::from_raw_units(BigUint::from(600u64) * BigUint::from(WAD), 18);
            let amount =
                ManagedDecimal::from_raw_units(BigUint::from(400u64) * BigUint::from(WAD), 18);
            sc.mint_variable_debt(&mut cache, &amount);

            let zero = cache.zero.clone();
            sc.update_interest_rates(&mut cache, &zero, &zero);

            // variable = 0.04 * 0.4 / 0.8 = 0.02; supply = 0.02 * 0.4 * 0.9.
            assert_eq!(
                cache.curr_variable_borrow_rate.into_raw_units(),
                &BigUint::from(20_000_000_000_000_000_000_000_000u128)
            );
            assert_eq!(
                cache.curr_liquidity_rate.into_raw_units(),
                &BigUint::from(7_200_000_000_000_000_000_000_000u128)
            );
            // stable = 0.04 + 0.01 + 0.02 * 0.5 = 0.06
            assert_eq!(
                cache.curr_stable_borrow_rate.into_raw_units(),
                &BigUint::from(60_000_000_000_000_000_000_000_000u128)
            );
        });

    // The repriced rates survive the cache commit.
    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            assert_eq!(
                sc.current_variable_borrow_rate().get().into_raw_units(),
                &BigUint::from(20_000_000_000_000_000_000_000_000u128)
            );
            assert_eq!(
                sc.current_liquidity_rate().get().into_raw_units(),
                &BigUint::from(7_200_000_000_000_000_000_000_000u128)
            );
        });
}

#[test]
fn test_indexes_monotonic_over_action_sequence() {
    let mut world = setup(1_000);

    for step in 1u64..=5 {
        world
            .current_block()
            .block_timestamp(GENESIS + step * 30 * 86_400);
        world
            .tx()
            .from(OWNER_ADDRESS)
            .to(ENGINE_ADDRESS)
            .whitebox(reserve_engine::contract_obj, |sc| {
                let mut cache = Cache::new(&sc);
                sc.update_state(&mut cache);

                assert!(cache.next_liquidity_index >= cache.curr_liquidity_index);
                assert!(cache.next_variable_borrow_index >= cache.curr_variable_borrow_index);

                let amount = ManagedDecimal::from_raw_units(
                    BigUint::from(100u64) * BigUint::from(WAD),
                    18,
                );
                sc.mint_variable_debt(&mut cache, &amount);

                let zero = cache.zero.clone();
                sc.update_interest_rates(&mut cache, &zero, &zero);
            });
    }

    world
        .query()
        .to(ENGINE_ADDRESS)
        .whitebox(reserve_engine::contract_obj, |sc| {
            // Debt at full usage reprices both rates above zero, so both
            // indexes have moved past one by now.
            assert!(sc.variable_borrow_index().get().into_raw_units() > &BigUint::from(RAY));
            assert!(sc.liquidity_index().get().into_raw_units() > &BigUint::from(RAY));
        });
}
