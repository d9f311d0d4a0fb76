multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use common_constants::RAY_PRECISION;
use common_structs::MarketIndex;

use crate::storage;

/// Read-only market metrics.
#[multiversx_sc::module]
pub trait ViewModule:
    storage::Storage + common_math::SharedMathModule + common_rates::InterestRates
{
    /// Liquidity index rolled forward to the current block: what one scaled
    /// supply unit is worth right now.
    #[view(getNormalizedIncome)]
    fn get_normalized_income(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let index = self.liquidity_index().get();
        let last_timestamp = self.last_timestamp().get();
        let timestamp = self.blockchain().get_block_timestamp();

        if timestamp == last_timestamp {
            return index;
        }

        let factor = self.calculate_linear_interest(
            &self.current_liquidity_rate().get(),
            timestamp - last_timestamp,
        );
        self.mul_half_up(&factor, &index, RAY_PRECISION)
    }

    /// Variable borrow index rolled forward to the current block.
    #[view(getNormalizedVariableDebt)]
    fn get_normalized_variable_debt(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let index = self.variable_borrow_index().get();
        let last_timestamp = self.last_timestamp().get();
        let timestamp = self.blockchain().get_block_timestamp();

        if timestamp == last_timestamp {
            return index;
        }

        let factor = self.calculate_compounded_interest(
            &self.current_variable_borrow_rate().get(),
            timestamp - last_timestamp,
        );
        self.mul_half_up(&factor, &index, RAY_PRECISION)
    }

    /// Nominal variable debt, asset decimals.
    #[view(getTotalVariableDebt)]
    fn get_total_variable_debt(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let nominal = self.mul_half_up(
            &self.scaled_variable_debt().get(),
            &self.get_normalized_variable_debt(),
            RAY_PRECISION,
        );
        self.rescale_half_up(&nominal, self.params().get().asset_decimals)
    }

    /// Nominal stable debt — the book's principal compounded at its average
    /// rate — in asset decimals.
    #[view(getTotalStableDebt)]
    fn get_total_stable_debt(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let stable_debt = self.stable_debt().get();
        let timestamp = self.blockchain().get_block_timestamp();
        let delta = if timestamp > stable_debt.last_update {
            timestamp - stable_debt.last_update
        } else {
            0
        };

        let factor = self.calculate_compounded_interest(&stable_debt.average_rate, delta);
        let nominal = self.mul_half_up(&stable_debt.principal, &factor, RAY_PRECISION);
        self.rescale_half_up(&nominal, self.params().get().asset_decimals)
    }

    /// Current borrow usage: `total_debt / (available_liquidity + total_debt)`.
    #[view(getBorrowUsage)]
    fn get_borrow_usage(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let total_debt = self.rescale_half_up(
            &(self.get_total_variable_debt() + self.get_total_stable_debt()),
            RAY_PRECISION,
        );
        if total_debt == self.ray_zero() {
            return self.ray_zero();
        }

        let available = self.rescale_half_up(&self.get_reserves(), RAY_PRECISION);
        self.div_half_up(&total_debt, &(available + total_debt.clone()), RAY_PRECISION)
    }

    /// Contract asset balance, asset decimals.
    #[view(getReserves)]
    fn get_reserves(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let params = self.params().get();
        let balance = self.blockchain().get_sc_balance(&params.asset_id, 0);
        self.to_decimal(balance, params.asset_decimals)
    }

    /// Nominal value of the treasury's scaled claim, asset decimals.
    #[view(getTreasuryValue)]
    fn get_treasury_value(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        let nominal = self.mul_half_up(
            &self.accrued_to_treasury().get(),
            &self.get_normalized_income(),
            RAY_PRECISION,
        );
        self.rescale_half_up(&nominal, self.params().get().asset_decimals)
    }

    #[view(getMarketIndex)]
    fn get_market_index(&self) -> MarketIndex<Self::Api> {
        MarketIndex {
            liquidity_index: self.liquidity_index().get(),
            variable_borrow_index: self.variable_borrow_index().get(),
        }
    }

    /// Seconds since the last index roll-forward.
    #[view(getDeltaTime)]
    fn get_delta_time(&self) -> u64 {
        self.blockchain().get_block_timestamp() - self.last_timestamp().get()
    }
}
