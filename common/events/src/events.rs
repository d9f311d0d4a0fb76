#![no_std]

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait EventsModule {
    #[event("create_market_params")]
    fn create_market_params_event(
        &self,
        #[indexed] asset: &EgldOrEsdtTokenIdentifier,
        #[indexed] optimal_usage_ratio: &BigUint,
        #[indexed] optimal_stable_to_total_debt_ratio: &BigUint,
        #[indexed] base_variable_borrow_rate: &BigUint,
        #[indexed] variable_rate_slope1: &BigUint,
        #[indexed] variable_rate_slope2: &BigUint,
        #[indexed] stable_rate_slope1: &BigUint,
        #[indexed] stable_rate_slope2: &BigUint,
        #[indexed] reserve_factor: &BigUint,
    );

    #[event("update_market_params")]
    fn market_params_event(
        &self,
        #[indexed] asset: &EgldOrEsdtTokenIdentifier,
        #[indexed] optimal_usage_ratio: &BigUint,
        #[indexed] optimal_stable_to_total_debt_ratio: &BigUint,
        #[indexed] base_variable_borrow_rate: &BigUint,
        #[indexed] variable_rate_slope1: &BigUint,
        #[indexed] variable_rate_slope2: &BigUint,
        #[indexed] stable_rate_slope1: &BigUint,
        #[indexed] stable_rate_slope2: &BigUint,
        #[indexed] reserve_factor: &BigUint,
    );

    /// The downstream-indexer observation. Emitted exactly once per rate
    /// recomputation, even when the rates come out unchanged.
    #[event("reserve_data_updated")]
    fn reserve_data_updated_event(
        &self,
        #[indexed] asset: &EgldOrEsdtTokenIdentifier,
        #[indexed] liquidity_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] stable_borrow_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] variable_borrow_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] liquidity_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] variable_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
    );
}
