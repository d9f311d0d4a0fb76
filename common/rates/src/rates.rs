#![no_std]

use common_constants::{HALF_RAY, RAY, RAY_PRECISION, SECONDS_PER_YEAR};
use common_errors::ERROR_INSUFFICIENT_LIQUIDITY;
use common_structs::{MarketParams, RateRequest};

multiversx_sc::imports!();

/// The InterestRates module holds the interest factor math and the two-slope
/// rate strategy. Everything here is a pure function of its inputs: the
/// strategy never reads market storage, so the same request always prices the
/// same way.
#[multiversx_sc::module]
pub trait InterestRates: common_math::SharedMathModule {
    /// Linear interest factor for the supply side.
    ///
    /// **Formula**: `factor = 1 + (rate * delta) / seconds_per_year`, in RAY.
    ///
    /// # Arguments
    /// - `rate`: Annualized rate (RAY-based).
    /// - `delta`: Elapsed time in seconds.
    fn calculate_linear_interest(
        &self,
        rate: &ManagedDecimal<Self::Api, NumDecimals>,
        delta: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let accumulated =
            rate.into_raw_units() * &BigUint::from(delta) / BigUint::from(SECONDS_PER_YEAR);

        self.to_decimal_ray(BigUint::from(RAY) + accumulated)
    }

    /// Compounded interest factor for the borrow side: third-order binomial
    /// expansion of `(1 + rate/year)^delta`.
    ///
    /// **Formula**:
    /// ```text
    /// base_pow_two   = ray_mul(rate, rate) / year^2
    /// base_pow_three = ray_mul(base_pow_two, rate) / year
    /// factor = 1 + rate*d/year
    ///            + d*(d-1)*base_pow_two / 2
    ///            + d*(d-1)*(d-2)*base_pow_three / 6
    /// ```
    ///
    /// The truncation slightly under-compensates lenders and under-charges
    /// borrowers on long gaps; downstream accounting depends on these exact
    /// terms, so the expansion must not be swapped for `e^x`.
    ///
    /// Returns RAY exactly when `delta == 0`.
    fn calculate_compounded_interest(
        &self,
        rate: &ManagedDecimal<Self::Api, NumDecimals>,
        delta: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if delta == 0 {
            return self.ray();
        }

        let exp_minus_one = delta - 1;
        let exp_minus_two = if delta > 2 { delta - 2 } else { 0 };

        let year = BigUint::from(SECONDS_PER_YEAR);
        let rate_raw = rate.into_raw_units();

        let base_pow_two = self.ray_mul_raw(rate_raw, rate_raw) / (&year * &year);
        let base_pow_three = self.ray_mul_raw(&base_pow_two, rate_raw) / &year;

        let first_term = rate_raw * &BigUint::from(delta) / &year;
        let second_term =
            BigUint::from(delta) * BigUint::from(exp_minus_one) * base_pow_two
                / BigUint::from(2u64);
        let third_term = BigUint::from(delta)
            * BigUint::from(exp_minus_one)
            * BigUint::from(exp_minus_two)
            * base_pow_three
            / BigUint::from(6u64);

        self.to_decimal_ray(BigUint::from(RAY) + first_term + second_term + third_term)
    }

    /// Half-up RAY multiplication on raw units.
    fn ray_mul_raw(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b + BigUint::from(HALF_RAY)) / BigUint::from(RAY)
    }

    /// The two-slope rate strategy. Prices the three forward rates from a
    /// utilization snapshot.
    ///
    /// **Process**:
    /// 1. With no debt the market idles at the curve intercepts:
    ///    `(0, variable_rate_slope1 + base_stable_rate_offset, base_variable_borrow_rate)`.
    /// 2. Otherwise, borrow usage is `total_debt / (available_liquidity +
    ///    liquidity_added - liquidity_taken + total_debt)`; supply usage uses
    ///    the same denominator widened by `unbacked`.
    /// 3. Below the optimal usage ratio both borrow rates climb along slope 1
    ///    proportionally to usage; above it they jump by slope 1 and climb
    ///    along slope 2 proportionally to the excess.
    /// 4. A stable-share premium is added when stable debt exceeds its optimal
    ///    share of total debt.
    /// 5. The supply rate is the debt-weighted average borrow rate, scaled by
    ///    supply usage and by the reserve-factor complement.
    ///
    /// # Returns
    /// - `(liquidity_rate, stable_borrow_rate, variable_borrow_rate)`, RAY-based.
    fn calculate_interest_rates(
        &self,
        request: RateRequest<Self::Api>,
        params: &MarketParams<Self::Api>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let total_debt = request.total_stable_debt.clone() + request.total_variable_debt.clone();

        let mut variable_rate = params.base_variable_borrow_rate.clone();
        let mut stable_rate =
            params.variable_rate_slope1.clone() + params.base_stable_rate_offset.clone();
        let mut supply_rate = self.ray_zero();

        if total_debt > self.ray_zero() {
            let stable_to_total_debt_ratio =
                self.div_half_up(&request.total_stable_debt, &total_debt, RAY_PRECISION);

            let available_with_added =
                request.available_liquidity.clone() + request.liquidity_added.clone();
            require!(
                available_with_added >= request.liquidity_taken,
                ERROR_INSUFFICIENT_LIQUIDITY
            );
            let available_liquidity = available_with_added - request.liquidity_taken.clone();
            let available_liquidity_plus_debt = available_liquidity + total_debt.clone();

            let borrow_usage =
                self.div_half_up(&total_debt, &available_liquidity_plus_debt, RAY_PRECISION);
            let supply_usage = self.div_half_up(
                &total_debt,
                &(available_liquidity_plus_debt.clone() + request.unbacked.clone()),
                RAY_PRECISION,
            );

            if borrow_usage > params.optimal_usage_ratio {
                let excess_usage = self.div_half_up(
                    &(borrow_usage - params.optimal_usage_ratio.clone()),
                    &params.max_excess_usage_ratio,
                    RAY_PRECISION,
                );

                variable_rate += params.variable_rate_slope1.clone()
                    + self.mul_half_up(&params.variable_rate_slope2, &excess_usage, RAY_PRECISION);
                stable_rate += params.stable_rate_slope1.clone()
                    + self.mul_half_up(&params.stable_rate_slope2, &excess_usage, RAY_PRECISION);
            } else {
                variable_rate += self.div_half_up(
                    &self.mul_half_up(&params.variable_rate_slope1, &borrow_usage, RAY_PRECISION),
                    &params.optimal_usage_ratio,
                    RAY_PRECISION,
                );
                stable_rate += self.div_half_up(
                    &self.mul_half_up(&params.stable_rate_slope1, &borrow_usage, RAY_PRECISION),
                    &params.optimal_usage_ratio,
                    RAY_PRECISION,
                );
            }

            if stable_to_total_debt_ratio > params.optimal_stable_to_total_debt_ratio {
                let excess_stable_ratio = self.div_half_up(
                    &(stable_to_total_debt_ratio
                        - params.optimal_stable_to_total_debt_ratio.clone()),
                    &params.max_excess_stable_to_total_debt_ratio,
                    RAY_PRECISION,
                );
                stable_rate += self.mul_half_up(
                    &params.stable_rate_excess_offset,
                    &excess_stable_ratio,
                    RAY_PRECISION,
                );
            }

            let overall_borrow_rate =
                self.overall_borrow_rate(&request, &variable_rate, &total_debt);
            supply_rate = self.mul_half_up(
                &self.mul_half_up(&overall_borrow_rate, &supply_usage, RAY_PRECISION),
                &(self.bps() - request.reserve_factor.clone()),
                RAY_PRECISION,
            );
        }

        (supply_rate, stable_rate, variable_rate)
    }

    /// Debt-weighted average of the variable rate being priced and the stable
    /// book's average rate.
    fn overall_borrow_rate(
        &self,
        request: &RateRequest<Self::Api>,
        variable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        total_debt: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let weighted_variable =
            self.mul_half_up(&request.total_variable_debt, variable_rate, RAY_PRECISION);
        let weighted_stable = self.mul_half_up(
            &request.total_stable_debt,
            &request.average_stable_borrow_rate,
            RAY_PRECISION,
        );

        self.div_half_up(&(weighted_variable + weighted_stable), total_debt, RAY_PRECISION)
    }
}
