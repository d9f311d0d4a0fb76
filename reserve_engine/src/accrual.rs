multiversx_sc::imports!();

use common_constants::RAY_PRECISION;
use common_errors::{ERROR_NEGATIVE_TREASURY_ACCRUAL, ERROR_TIME_WENT_BACKWARDS};
use common_structs::RateRequest;

use crate::{cache::Cache, storage};

/// The reserve state machine: index roll-forward, treasury capitalization and
/// rate recomputation. Every caller action runs `update_state` first, mutates
/// the debt books or liquidity, then runs `update_interest_rates` with the
/// liquidity deltas of the action.
#[multiversx_sc::module]
pub trait AccrualModule:
    storage::Storage
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + common_events::EventsModule
{
    /// Rolls both indexes from the last update to the current block time,
    /// capitalizes the treasury share of the borrow interest accrued over the
    /// gap, and stamps the update timestamp.
    ///
    /// Calling it twice in the same block is a no-op on the second call; a
    /// block timestamp older than the last update aborts the action.
    fn update_state(&self, cache: &mut Cache<Self>) {
        require!(
            cache.timestamp >= cache.last_timestamp,
            ERROR_TIME_WENT_BACKWARDS
        );
        if cache.timestamp == cache.last_timestamp {
            return;
        }

        self.sync_indexes(cache);
        self.accrue_to_treasury(cache);

        cache.last_timestamp = cache.timestamp;
    }

    /// Advances the `next_*` index slots.
    ///
    /// The liquidity index only moves while the supply rate is nonzero, and
    /// the variable borrow index only while scaled variable debt exists; both
    /// factors are at least one, so the indexes never decrease.
    fn sync_indexes(&self, cache: &mut Cache<Self>) {
        let delta = cache.timestamp - cache.last_timestamp;

        if cache.curr_liquidity_rate != self.ray_zero() {
            let linear_factor = self.calculate_linear_interest(&cache.curr_liquidity_rate, delta);
            let next_index =
                self.mul_half_up(&linear_factor, &cache.curr_liquidity_index, RAY_PRECISION);
            self.require_fits_u128(&next_index);
            cache.next_liquidity_index = next_index;
        }

        if cache.curr_scaled_variable_debt != self.ray_zero() {
            let compounded_factor =
                self.calculate_compounded_interest(&cache.curr_variable_borrow_rate, delta);
            let next_index = self.mul_half_up(
                &compounded_factor,
                &cache.curr_variable_borrow_index,
                RAY_PRECISION,
            );
            self.require_fits_u128(&next_index);
            cache.next_variable_borrow_index = next_index;
        }
    }

    /// Mints the reserve-factor share of the interest accrued across the tick
    /// into the treasury's scaled claim.
    ///
    /// Debt totals never shrink between the snapshot and this point, so a
    /// negative accrual means upstream bookkeeping is broken and the action
    /// is aborted.
    fn accrue_to_treasury(&self, cache: &mut Cache<Self>) {
        if cache.params.reserve_factor == self.bps_zero() {
            return;
        }

        let prev_variable_debt = self.mul_half_up(
            &cache.curr_scaled_variable_debt,
            &cache.curr_variable_borrow_index,
            RAY_PRECISION,
        );
        let curr_variable_debt = self.mul_half_up(
            &cache.curr_scaled_variable_debt,
            &cache.next_variable_borrow_index,
            RAY_PRECISION,
        );

        // Stable interest already settled at the last reserve update does not
        // belong to this tick.
        let stable_delta = if cache.last_timestamp > cache.stable_debt_last_update {
            cache.last_timestamp - cache.stable_debt_last_update
        } else {
            0
        };
        let cumulated_stable_interest =
            self.calculate_compounded_interest(&cache.curr_avg_stable_borrow_rate, stable_delta);
        let prev_stable_debt = self.mul_half_up(
            &cache.curr_principal_stable_debt,
            &cumulated_stable_interest,
            RAY_PRECISION,
        );

        let current_total = curr_variable_debt + cache.curr_total_stable_debt.clone();
        let previous_total = prev_variable_debt + prev_stable_debt;
        require!(
            current_total >= previous_total,
            ERROR_NEGATIVE_TREASURY_ACCRUAL
        );
        let accrued = current_total - previous_total;

        let mint_amount =
            self.mul_half_up(&accrued, &cache.params.reserve_factor, RAY_PRECISION);
        if mint_amount != self.ray_zero() {
            let mint_scaled =
                self.div_half_up(&mint_amount, &cache.next_liquidity_index, RAY_PRECISION);
            self.require_fits_u128(&mint_scaled);
            cache.accrued_to_treasury += mint_scaled;
            self.require_fits_u128(&cache.accrued_to_treasury);
        }
    }

    /// Reprices the three forward rates from the post-mutation snapshot and
    /// emits the `reserve_data_updated` observation.
    ///
    /// `liquidity_added`/`liquidity_taken` are the action's deltas against the
    /// balance snapshot (asset decimals). Incoming payments are credited
    /// before execution on this chain, so payable endpoints pass zero added.
    fn update_interest_rates(
        &self,
        cache: &mut Cache<Self>,
        liquidity_added: &ManagedDecimal<Self::Api, NumDecimals>,
        liquidity_taken: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let total_variable_debt = self.mul_half_up(
            &cache.next_scaled_variable_debt,
            &cache.next_variable_borrow_index,
            RAY_PRECISION,
        );

        let request = RateRequest {
            unbacked: self.rescale_half_up(&cache.unbacked, RAY_PRECISION),
            liquidity_added: self.rescale_half_up(liquidity_added, RAY_PRECISION),
            liquidity_taken: self.rescale_half_up(liquidity_taken, RAY_PRECISION),
            total_stable_debt: cache.next_total_stable_debt.clone(),
            total_variable_debt,
            average_stable_borrow_rate: cache.next_avg_stable_borrow_rate.clone(),
            reserve_factor: cache.params.reserve_factor.clone(),
            available_liquidity: self.rescale_half_up(&cache.asset_balance, RAY_PRECISION),
        };

        let (liquidity_rate, stable_borrow_rate, variable_borrow_rate) =
            self.calculate_interest_rates(request, &cache.params);

        self.require_fits_u128(&liquidity_rate);
        self.require_fits_u128(&stable_borrow_rate);
        self.require_fits_u128(&variable_borrow_rate);

        cache.curr_liquidity_rate = liquidity_rate;
        cache.curr_stable_borrow_rate = stable_borrow_rate;
        cache.curr_variable_borrow_rate = variable_borrow_rate;

        self.reserve_data_updated_event(
            &cache.params.asset_id,
            &cache.curr_liquidity_rate,
            &cache.curr_stable_borrow_rate,
            &cache.curr_variable_borrow_rate,
            &cache.next_liquidity_index,
            &cache.next_variable_borrow_index,
        );
    }

    /// Capitalizes a one-shot fee (e.g. a flash premium) into the liquidity
    /// index without touching rates: every supplier's claim grows by
    /// `amount / total_liquidity` immediately.
    ///
    /// Returns the new index untruncated; the width guard bounds the stored
    /// value. An empty market cannot absorb a fee.
    fn cumulate_to_liquidity_index(
        &self,
        cache: &mut Cache<Self>,
        total_liquidity: &ManagedDecimal<Self::Api, NumDecimals>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let ratio = self.div_half_up(amount, total_liquidity, RAY_PRECISION);
        let factor = ratio + self.ray();
        let next_index = self.mul_half_up(&factor, &cache.next_liquidity_index, RAY_PRECISION);
        self.require_fits_u128(&next_index);
        cache.next_liquidity_index = next_index.clone();

        next_index
    }
}
