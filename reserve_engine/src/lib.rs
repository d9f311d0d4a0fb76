#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

pub mod accrual;
pub mod cache;
pub mod liquidity;
pub mod storage;
pub mod utils;
pub mod view;

use common_constants::BPS;
use common_errors::{
    ERROR_ALREADY_INITIALIZED, ERROR_INVALID_OPTIMAL_STABLE_RATIO,
    ERROR_INVALID_OPTIMAL_USAGE_RATIO, ERROR_INVALID_RESERVE_FACTOR,
};
use common_structs::{MarketParams, StableDebtState};

/// Single-asset reserve engine of a pooled lending market.
///
/// Maintains the cumulative supply and variable-borrow indexes that map
/// scaled balances to nominal ones, capitalizes the protocol's share of
/// borrow interest into a treasury claim, and reprices the three forward
/// rates from utilization after every action. The owning controller drives
/// all endpoints; this contract performs no solvency or collateral logic.
#[multiversx_sc::contract]
pub trait ReserveEngine:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + accrual::AccrualModule
    + utils::UtilsModule
    + liquidity::LiquidityModule
    + view::ViewModule
{
    /// Seeds the market: validates and stores the rate parameters, sets both
    /// indexes to RAY, zeroes rates, debt books and the treasury claim, and
    /// stamps the deploy timestamp.
    #[init]
    fn init(
        &self,
        asset: &EgldOrEsdtTokenIdentifier,
        optimal_usage_ratio: BigUint,
        optimal_stable_to_total_debt_ratio: BigUint,
        base_variable_borrow_rate: BigUint,
        variable_rate_slope1: BigUint,
        variable_rate_slope2: BigUint,
        stable_rate_slope1: BigUint,
        stable_rate_slope2: BigUint,
        base_stable_rate_offset: BigUint,
        stable_rate_excess_offset: BigUint,
        reserve_factor: BigUint,
        decimals: usize,
    ) {
        require!(self.params().is_empty(), ERROR_ALREADY_INITIALIZED);

        self.create_market_params_event(
            asset,
            &optimal_usage_ratio,
            &optimal_stable_to_total_debt_ratio,
            &base_variable_borrow_rate,
            &variable_rate_slope1,
            &variable_rate_slope2,
            &stable_rate_slope1,
            &stable_rate_slope2,
            &reserve_factor,
        );

        let params = self.build_market_params(
            asset,
            optimal_usage_ratio,
            optimal_stable_to_total_debt_ratio,
            base_variable_borrow_rate,
            variable_rate_slope1,
            variable_rate_slope2,
            stable_rate_slope1,
            stable_rate_slope2,
            base_stable_rate_offset,
            stable_rate_excess_offset,
            reserve_factor,
            decimals,
        );
        self.params().set(&params);

        self.liquidity_index().set(self.ray());
        self.variable_borrow_index().set(self.ray());
        self.current_liquidity_rate().set(self.ray_zero());
        self.current_stable_borrow_rate().set(self.ray_zero());
        self.current_variable_borrow_rate().set(self.ray_zero());
        self.accrued_to_treasury().set(self.ray_zero());
        self.scaled_variable_debt().set(self.ray_zero());
        self.unbacked()
            .set(ManagedDecimal::from_raw_units(BigUint::zero(), decimals));

        let timestamp = self.blockchain().get_block_timestamp();
        self.stable_debt().set(&StableDebtState {
            principal: self.ray_zero(),
            average_rate: self.ray_zero(),
            last_update: timestamp,
        });
        self.last_timestamp().set(timestamp);
    }

    /// Governance parameter replacement. The asset and its decimals are
    /// immutable; everything else is re-validated and swapped.
    #[upgrade]
    fn upgrade(
        &self,
        optimal_usage_ratio: BigUint,
        optimal_stable_to_total_debt_ratio: BigUint,
        base_variable_borrow_rate: BigUint,
        variable_rate_slope1: BigUint,
        variable_rate_slope2: BigUint,
        stable_rate_slope1: BigUint,
        stable_rate_slope2: BigUint,
        base_stable_rate_offset: BigUint,
        stable_rate_excess_offset: BigUint,
        reserve_factor: BigUint,
    ) {
        let current = self.params().get();

        self.market_params_event(
            &current.asset_id,
            &optimal_usage_ratio,
            &optimal_stable_to_total_debt_ratio,
            &base_variable_borrow_rate,
            &variable_rate_slope1,
            &variable_rate_slope2,
            &stable_rate_slope1,
            &stable_rate_slope2,
            &reserve_factor,
        );

        let asset = current.asset_id.clone();
        let params = self.build_market_params(
            &asset,
            optimal_usage_ratio,
            optimal_stable_to_total_debt_ratio,
            base_variable_borrow_rate,
            variable_rate_slope1,
            variable_rate_slope2,
            stable_rate_slope1,
            stable_rate_slope2,
            base_stable_rate_offset,
            stable_rate_excess_offset,
            reserve_factor,
            current.asset_decimals,
        );
        self.params().set(&params);
    }

    fn build_market_params(
        &self,
        asset: &EgldOrEsdtTokenIdentifier,
        optimal_usage_ratio: BigUint,
        optimal_stable_to_total_debt_ratio: BigUint,
        base_variable_borrow_rate: BigUint,
        variable_rate_slope1: BigUint,
        variable_rate_slope2: BigUint,
        stable_rate_slope1: BigUint,
        stable_rate_slope2: BigUint,
        base_stable_rate_offset: BigUint,
        stable_rate_excess_offset: BigUint,
        reserve_factor: BigUint,
        decimals: usize,
    ) -> MarketParams<Self::Api> {
        let optimal_usage = self.to_decimal_ray(optimal_usage_ratio);
        require!(optimal_usage <= self.ray(), ERROR_INVALID_OPTIMAL_USAGE_RATIO);

        let optimal_stable = self.to_decimal_ray(optimal_stable_to_total_debt_ratio);
        require!(optimal_stable <= self.ray(), ERROR_INVALID_OPTIMAL_STABLE_RATIO);

        require!(
            reserve_factor <= BigUint::from(BPS),
            ERROR_INVALID_RESERVE_FACTOR
        );

        MarketParams {
            asset_id: asset.clone(),
            asset_decimals: decimals,
            max_excess_usage_ratio: self.ray() - optimal_usage.clone(),
            optimal_usage_ratio: optimal_usage,
            max_excess_stable_to_total_debt_ratio: self.ray() - optimal_stable.clone(),
            optimal_stable_to_total_debt_ratio: optimal_stable,
            base_variable_borrow_rate: self.to_decimal_ray(base_variable_borrow_rate),
            variable_rate_slope1: self.to_decimal_ray(variable_rate_slope1),
            variable_rate_slope2: self.to_decimal_ray(variable_rate_slope2),
            stable_rate_slope1: self.to_decimal_ray(stable_rate_slope1),
            stable_rate_slope2: self.to_decimal_ray(stable_rate_slope2),
            base_stable_rate_offset: self.to_decimal_ray(base_stable_rate_offset),
            stable_rate_excess_offset: self.to_decimal_ray(stable_rate_excess_offset),
            reserve_factor: self.to_decimal_bps(reserve_factor),
        }
    }
}
