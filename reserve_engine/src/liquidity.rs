multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use common_constants::RAY_PRECISION;
use common_errors::{ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO, ERROR_INSUFFICIENT_LIQUIDITY};
use common_structs::MarketIndex;

use crate::{accrual, cache::Cache, storage, utils};

/// Thin, controller-driven action entrypoints. Each one performs the
/// mandated sequence — cache, state roll, debt/liquidity mutation, rate
/// update — and nothing else; solvency and collateral checks live upstream.
#[multiversx_sc::module]
pub trait LiquidityModule:
    storage::Storage
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + common_events::EventsModule
    + accrual::AccrualModule
    + utils::UtilsModule
{
    /// Rolls the indexes to the current block without repricing. Emits no
    /// observation; only rate updates do.
    #[only_owner]
    #[endpoint(updateIndexes)]
    fn update_indexes(&self) -> MarketIndex<Self::Api> {
        let mut cache = Cache::new(self);

        self.update_state(&mut cache);

        MarketIndex {
            liquidity_index: cache.next_liquidity_index.clone(),
            variable_borrow_index: cache.next_variable_borrow_index.clone(),
        }
    }

    /// Accepts a deposit. The payment is credited to the contract before
    /// execution, so the balance snapshot already contains it and the rate
    /// update runs with zero deltas.
    #[payable]
    #[only_owner]
    #[endpoint(supply)]
    fn supply(&self) {
        let mut cache = Cache::new(self);
        self.received_payment(&cache);

        self.update_state(&mut cache);

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &zero);
    }

    /// Releases `amount` of deposited assets to `to`.
    #[only_owner]
    #[endpoint(withdraw)]
    fn withdraw(&self, to: &ManagedAddress, amount: &BigUint) {
        let mut cache = Cache::new(self);
        let amount = cache.get_decimal_value(amount);
        require!(amount > cache.zero, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);

        self.update_state(&mut cache);

        require!(cache.has_reserves(&amount), ERROR_INSUFFICIENT_LIQUIDITY);

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &amount);

        self.pay_out(&cache, &amount, to);
    }

    /// Draws a variable-rate loan: books the scaled debt, reprices with the
    /// outgoing liquidity, transfers the assets.
    #[only_owner]
    #[endpoint(borrow)]
    fn borrow(&self, to: &ManagedAddress, amount: &BigUint) {
        let mut cache = Cache::new(self);
        let amount = cache.get_decimal_value(amount);
        require!(amount > cache.zero, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);

        self.update_state(&mut cache);

        require!(cache.has_reserves(&amount), ERROR_INSUFFICIENT_LIQUIDITY);

        self.mint_variable_debt(&mut cache, &amount);

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &amount);

        self.pay_out(&cache, &amount, to);
    }

    /// Draws a stable-rate loan at the currently offered stable rate.
    #[only_owner]
    #[endpoint(borrowStable)]
    fn borrow_stable(&self, to: &ManagedAddress, amount: &BigUint) {
        let mut cache = Cache::new(self);
        let amount = cache.get_decimal_value(amount);
        require!(amount > cache.zero, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);

        self.update_state(&mut cache);

        require!(cache.has_reserves(&amount), ERROR_INSUFFICIENT_LIQUIDITY);

        self.mint_stable_debt(&mut cache, &amount);

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &amount);

        self.pay_out(&cache, &amount, to);
    }

    /// Repays variable debt with the attached payment; any overpayment goes
    /// back to `refund_to`.
    #[payable]
    #[only_owner]
    #[endpoint(repay)]
    fn repay(&self, refund_to: &ManagedAddress) {
        let mut cache = Cache::new(self);
        let payment = self.received_payment(&cache);

        self.update_state(&mut cache);

        let (_, overpaid) = self.burn_variable_debt(&mut cache, &payment);

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &zero);

        self.pay_out(&cache, &overpaid, refund_to);
    }

    /// Repays stable debt with the attached payment.
    #[payable]
    #[only_owner]
    #[endpoint(repayStable)]
    fn repay_stable(&self, refund_to: &ManagedAddress) {
        let mut cache = Cache::new(self);
        let payment = self.received_payment(&cache);

        self.update_state(&mut cache);

        let overpaid = self.burn_stable_debt(&mut cache, &payment);

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &zero);

        self.pay_out(&cache, &overpaid, refund_to);
    }

    /// Capitalizes an instant fee into the liquidity index (flash-loan
    /// premium settlement). Does not touch rates or the update timestamp;
    /// `total_liquidity` is the supply-side total the fee is spread over.
    #[only_owner]
    #[endpoint(cumulateToLiquidityIndex)]
    fn capitalize_fee(
        &self,
        total_liquidity: &BigUint,
        amount: &BigUint,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let mut cache = Cache::new(self);
        let total_liquidity = cache.get_decimal_value(total_liquidity);
        let amount = cache.get_decimal_value(amount);
        require!(amount > cache.zero, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);

        self.cumulate_to_liquidity_index(&mut cache, &total_liquidity, &amount)
    }

    /// Governance hook for the bridged-supply figure. The engine only reads
    /// it when widening the supply-usage denominator.
    #[only_owner]
    #[endpoint(setUnbacked)]
    fn set_unbacked(&self, amount: BigUint) {
        let params = self.params().get();
        self.unbacked()
            .set(ManagedDecimal::from_raw_units(amount, params.asset_decimals));
    }

    /// Pays out the treasury's claim at the current liquidity index, bounded
    /// by the available balance; partial payouts burn a proportional share of
    /// the scaled claim.
    #[only_owner]
    #[endpoint(claimTreasury)]
    fn claim_treasury(&self, to: &ManagedAddress) -> EgldOrEsdtTokenPayment<Self::Api> {
        let mut cache = Cache::new(self);

        self.update_state(&mut cache);

        if cache.accrued_to_treasury == self.ray_zero() {
            return EgldOrEsdtTokenPayment::new(cache.params.asset_id.clone(), 0, BigUint::zero());
        }

        let treasury_value = self.rescale_half_up(
            &self.mul_half_up(
                &cache.accrued_to_treasury,
                &cache.next_liquidity_index,
                RAY_PRECISION,
            ),
            cache.params.asset_decimals,
        );
        let amount = self.get_min(treasury_value.clone(), cache.asset_balance.clone());
        if amount == cache.zero {
            return EgldOrEsdtTokenPayment::new(cache.params.asset_id.clone(), 0, BigUint::zero());
        }

        if amount == treasury_value {
            cache.accrued_to_treasury = self.ray_zero();
        } else {
            let scaled_out =
                self.div_half_up(&amount, &cache.next_liquidity_index, RAY_PRECISION);
            cache.accrued_to_treasury -= &scaled_out;
        }

        let zero = cache.zero.clone();
        self.update_interest_rates(&mut cache, &zero, &amount);

        self.pay_out(&cache, &amount, to)
    }
}
