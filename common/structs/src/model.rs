#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

/// Rate-strategy parameters of a single market, fixed at deploy time and
/// replaceable through the governance upgrade path.
///
/// All ratios and rates are RAY-scaled; `reserve_factor` is a BPS decimal
/// (10_000 raw units = 100%). The two `max_excess_*` fields are derived at
/// construction as the RAY complement of their optimal counterparts.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct MarketParams<M: ManagedTypeApi> {
    pub asset_id: EgldOrEsdtTokenIdentifier<M>,
    pub asset_decimals: usize,
    pub optimal_usage_ratio: ManagedDecimal<M, NumDecimals>,
    pub max_excess_usage_ratio: ManagedDecimal<M, NumDecimals>,
    pub optimal_stable_to_total_debt_ratio: ManagedDecimal<M, NumDecimals>,
    pub max_excess_stable_to_total_debt_ratio: ManagedDecimal<M, NumDecimals>,
    pub base_variable_borrow_rate: ManagedDecimal<M, NumDecimals>,
    pub variable_rate_slope1: ManagedDecimal<M, NumDecimals>,
    pub variable_rate_slope2: ManagedDecimal<M, NumDecimals>,
    pub stable_rate_slope1: ManagedDecimal<M, NumDecimals>,
    pub stable_rate_slope2: ManagedDecimal<M, NumDecimals>,
    pub base_stable_rate_offset: ManagedDecimal<M, NumDecimals>,
    pub stable_rate_excess_offset: ManagedDecimal<M, NumDecimals>,
    pub reserve_factor: ManagedDecimal<M, NumDecimals>,
}

/// The cumulative index pair of a market, as returned by `updateIndexes`.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct MarketIndex<M: ManagedTypeApi> {
    pub liquidity_index: ManagedDecimal<M, NumDecimals>,
    pub variable_borrow_index: ManagedDecimal<M, NumDecimals>,
}

/// The stable-debt book. `principal` is the RAY-scaled nominal debt at the
/// last book mutation; the current total is `principal` compounded at
/// `average_rate` since `last_update`.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct StableDebtState<M: ManagedTypeApi> {
    pub principal: ManagedDecimal<M, NumDecimals>,
    pub average_rate: ManagedDecimal<M, NumDecimals>,
    pub last_update: u64,
}

/// Snapshot handed to the rate strategy. Every monetary field is RAY-scaled
/// so the strategy never touches asset decimals; `reserve_factor` stays a BPS
/// decimal. The strategy is a pure function of this value and the params.
pub struct RateRequest<M: ManagedTypeApi> {
    pub unbacked: ManagedDecimal<M, NumDecimals>,
    pub liquidity_added: ManagedDecimal<M, NumDecimals>,
    pub liquidity_taken: ManagedDecimal<M, NumDecimals>,
    pub total_stable_debt: ManagedDecimal<M, NumDecimals>,
    pub total_variable_debt: ManagedDecimal<M, NumDecimals>,
    pub average_stable_borrow_rate: ManagedDecimal<M, NumDecimals>,
    pub reserve_factor: ManagedDecimal<M, NumDecimals>,
    pub available_liquidity: ManagedDecimal<M, NumDecimals>,
}
