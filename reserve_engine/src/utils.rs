multiversx_sc::imports!();

use common_constants::RAY_PRECISION;
use common_errors::{ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO, ERROR_INVALID_ASSET};

use crate::{cache::Cache, storage};

/// Helpers standing in for the external debt-token collaborators: they patch
/// the cache's `next_*` slots between `update_state` and
/// `update_interest_rates`, plus payment plumbing.
#[multiversx_sc::module]
pub trait UtilsModule:
    storage::Storage + common_math::SharedMathModule + common_rates::InterestRates
{
    /// Books `amount` (asset decimals) of new variable debt. Returns the
    /// scaled amount minted at the rolled-forward borrow index.
    fn mint_variable_debt(
        &self,
        cache: &mut Cache<Self>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_amount = cache.scaled_variable_debt_amount(amount);
        let next_total = cache.next_scaled_variable_debt.clone() + scaled_amount.clone();
        self.require_fits_u128(&next_total);
        cache.next_scaled_variable_debt = next_total;

        scaled_amount
    }

    /// Burns variable debt against a payment. Overpayment is returned in
    /// asset decimals so the caller can refund it.
    fn burn_variable_debt(
        &self,
        cache: &mut Cache<Self>,
        payment: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>, // scaled amount burned
        ManagedDecimal<Self::Api, NumDecimals>, // overpaid, asset decimals
    ) {
        let current_debt = self.rescale_half_up(
            &cache.nominal_variable_debt(&cache.next_scaled_variable_debt),
            cache.params.asset_decimals,
        );

        if *payment >= current_debt {
            let burned = cache.next_scaled_variable_debt.clone();
            cache.next_scaled_variable_debt = self.ray_zero();
            (burned, payment.clone() - current_debt)
        } else {
            let burned = cache.scaled_variable_debt_amount(payment);
            cache.next_scaled_variable_debt -= &burned;
            (burned, cache.zero.clone())
        }
    }

    /// Books `amount` (asset decimals) of new stable debt at the currently
    /// offered stable rate, folding it into the book's weighted-average rate.
    fn mint_stable_debt(&self, cache: &mut Cache<Self>, amount: &ManagedDecimal<Self::Api, NumDecimals>) {
        let amount_ray = self.rescale_half_up(amount, RAY_PRECISION);
        let new_total = cache.next_total_stable_debt.clone() + amount_ray.clone();

        let weighted_book = self.mul_half_up(
            &cache.next_total_stable_debt,
            &cache.next_avg_stable_borrow_rate,
            RAY_PRECISION,
        );
        let weighted_minted =
            self.mul_half_up(&amount_ray, &cache.curr_stable_borrow_rate, RAY_PRECISION);
        cache.next_avg_stable_borrow_rate =
            self.div_half_up(&(weighted_book + weighted_minted), &new_total, RAY_PRECISION);

        cache.next_total_stable_debt = new_total.clone();
        cache.next_principal_stable_debt = new_total;
        cache.next_stable_debt_last_update = cache.timestamp;
    }

    /// Burns stable debt against a payment; clears the average rate when the
    /// book empties. Overpayment is returned in asset decimals.
    fn burn_stable_debt(
        &self,
        cache: &mut Cache<Self>,
        payment: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let current_total = self.rescale_half_up(
            &cache.next_total_stable_debt,
            cache.params.asset_decimals,
        );

        let overpaid = if *payment >= current_total {
            cache.next_total_stable_debt = self.ray_zero();
            cache.next_principal_stable_debt = self.ray_zero();
            cache.next_avg_stable_borrow_rate = self.ray_zero();
            payment.clone() - current_total
        } else {
            let payment_ray = self.rescale_half_up(payment, RAY_PRECISION);
            cache.next_total_stable_debt -= &payment_ray;
            cache.next_principal_stable_debt = cache.next_total_stable_debt.clone();
            cache.zero.clone()
        };
        cache.next_stable_debt_last_update = cache.timestamp;

        overpaid
    }

    /// Pays `amount` of the market asset out to `to`. Empty payouts skip the
    /// wire transfer but are still reported back to the caller.
    fn pay_out(
        &self,
        cache: &Cache<Self>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        to: &ManagedAddress,
    ) -> EgldOrEsdtTokenPayment<Self::Api> {
        let raw_amount = amount.into_raw_units().clone();
        if raw_amount > BigUint::zero() {
            self.tx()
                .to(to)
                .egld_or_single_esdt(&cache.params.asset_id, 0, &raw_amount)
                .transfer();
        }

        EgldOrEsdtTokenPayment::new(cache.params.asset_id.clone(), 0, raw_amount)
    }

    /// Takes the attached payment, requires a nonzero amount of the market
    /// asset, and hands it back in asset decimals.
    fn received_payment(&self, cache: &Cache<Self>) -> ManagedDecimal<Self::Api, NumDecimals> {
        let (asset, amount) = self.call_value().egld_or_single_fungible_esdt();

        require!(cache.is_same_asset(&asset), ERROR_INVALID_ASSET);
        require!(
            amount > BigUint::zero(),
            ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO
        );

        cache.get_decimal_value(&amount)
    }
}
