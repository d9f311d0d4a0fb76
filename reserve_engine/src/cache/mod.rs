use common_constants::RAY_PRECISION;
use common_structs::{MarketParams, StableDebtState};

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

/// A snapshot of the reserve record, taken once at the start of a caller
/// action and committed back to storage when dropped.
///
/// Storage and the contract asset balance are read exactly once, in `new`.
/// Fields come in `curr_*`/`next_*` pairs: `curr_*` is the state as read,
/// `next_*` starts equal to it and is advanced by `update_state` and the
/// debt-book helpers. Only `next_*` values (plus rates, timestamp and the
/// treasury claim) are written back.
pub struct Cache<'a, C>
where
    C: crate::storage::Storage,
{
    sc_ref: &'a C,
    /// Market parameters, read once.
    pub params: MarketParams<C::Api>,
    /// Block timestamp of the current action (seconds).
    pub timestamp: u64,
    /// Timestamp of the last index roll-forward; stamped by `update_state`.
    pub last_timestamp: u64,
    pub curr_liquidity_index: ManagedDecimal<C::Api, NumDecimals>,
    pub next_liquidity_index: ManagedDecimal<C::Api, NumDecimals>,
    pub curr_variable_borrow_index: ManagedDecimal<C::Api, NumDecimals>,
    pub next_variable_borrow_index: ManagedDecimal<C::Api, NumDecimals>,
    /// Forward rates; replaced by `update_interest_rates`.
    pub curr_liquidity_rate: ManagedDecimal<C::Api, NumDecimals>,
    pub curr_stable_borrow_rate: ManagedDecimal<C::Api, NumDecimals>,
    pub curr_variable_borrow_rate: ManagedDecimal<C::Api, NumDecimals>,
    pub curr_scaled_variable_debt: ManagedDecimal<C::Api, NumDecimals>,
    pub next_scaled_variable_debt: ManagedDecimal<C::Api, NumDecimals>,
    /// Stable-debt book snapshot, as the book reported it at cache time.
    pub curr_principal_stable_debt: ManagedDecimal<C::Api, NumDecimals>,
    pub curr_total_stable_debt: ManagedDecimal<C::Api, NumDecimals>,
    pub curr_avg_stable_borrow_rate: ManagedDecimal<C::Api, NumDecimals>,
    pub stable_debt_last_update: u64,
    pub next_principal_stable_debt: ManagedDecimal<C::Api, NumDecimals>,
    pub next_total_stable_debt: ManagedDecimal<C::Api, NumDecimals>,
    pub next_avg_stable_borrow_rate: ManagedDecimal<C::Api, NumDecimals>,
    pub next_stable_debt_last_update: u64,
    /// Scaled treasury claim; grown by the accrual step.
    pub accrued_to_treasury: ManagedDecimal<C::Api, NumDecimals>,
    /// Bridged supply, asset decimals. Carried through unchanged.
    pub unbacked: ManagedDecimal<C::Api, NumDecimals>,
    /// Contract asset balance at cache time, asset decimals.
    pub asset_balance: ManagedDecimal<C::Api, NumDecimals>,
    /// Zero at asset decimals, for comparisons.
    pub zero: ManagedDecimal<C::Api, NumDecimals>,
}

impl<'a, C> Cache<'a, C>
where
    C: crate::storage::Storage + common_math::SharedMathModule + common_rates::InterestRates,
{
    pub fn new(sc_ref: &'a C) -> Self {
        let params = sc_ref.params().get();
        let timestamp = sc_ref.blockchain().get_block_timestamp();
        let balance = sc_ref.blockchain().get_sc_balance(&params.asset_id, 0);

        let liquidity_index = sc_ref.liquidity_index().get();
        let variable_borrow_index = sc_ref.variable_borrow_index().get();
        let scaled_variable_debt = sc_ref.scaled_variable_debt().get();
        let stable_debt = sc_ref.stable_debt().get();

        // What the stable book reports as its total right now: the principal
        // compounded at the average rate since the last book mutation.
        let stable_delta = if timestamp > stable_debt.last_update {
            timestamp - stable_debt.last_update
        } else {
            0
        };
        let cumulated_stable_interest =
            sc_ref.calculate_compounded_interest(&stable_debt.average_rate, stable_delta);
        let curr_total_stable_debt = sc_ref.mul_half_up(
            &stable_debt.principal,
            &cumulated_stable_interest,
            RAY_PRECISION,
        );

        Cache {
            zero: sc_ref.to_decimal(BigUint::zero(), params.asset_decimals),
            asset_balance: sc_ref.to_decimal(balance, params.asset_decimals),
            timestamp,
            last_timestamp: sc_ref.last_timestamp().get(),
            curr_liquidity_index: liquidity_index.clone(),
            next_liquidity_index: liquidity_index,
            curr_variable_borrow_index: variable_borrow_index.clone(),
            next_variable_borrow_index: variable_borrow_index,
            curr_liquidity_rate: sc_ref.current_liquidity_rate().get(),
            curr_stable_borrow_rate: sc_ref.current_stable_borrow_rate().get(),
            curr_variable_borrow_rate: sc_ref.current_variable_borrow_rate().get(),
            curr_scaled_variable_debt: scaled_variable_debt.clone(),
            next_scaled_variable_debt: scaled_variable_debt,
            curr_principal_stable_debt: stable_debt.principal.clone(),
            curr_total_stable_debt: curr_total_stable_debt.clone(),
            curr_avg_stable_borrow_rate: stable_debt.average_rate.clone(),
            stable_debt_last_update: stable_debt.last_update,
            next_principal_stable_debt: stable_debt.principal,
            next_total_stable_debt: curr_total_stable_debt,
            next_avg_stable_borrow_rate: stable_debt.average_rate,
            next_stable_debt_last_update: stable_debt.last_update,
            accrued_to_treasury: sc_ref.accrued_to_treasury().get(),
            unbacked: sc_ref.unbacked().get(),
            params,
            sc_ref,
        }
    }
}

impl<C> Drop for Cache<'_, C>
where
    C: crate::storage::Storage,
{
    /// Commits the action's outcome. A raised error skips this entirely and
    /// the transaction leaves storage untouched.
    fn drop(&mut self) {
        self.sc_ref.liquidity_index().set(&self.next_liquidity_index);
        self.sc_ref
            .variable_borrow_index()
            .set(&self.next_variable_borrow_index);
        self.sc_ref
            .current_liquidity_rate()
            .set(&self.curr_liquidity_rate);
        self.sc_ref
            .current_stable_borrow_rate()
            .set(&self.curr_stable_borrow_rate);
        self.sc_ref
            .current_variable_borrow_rate()
            .set(&self.curr_variable_borrow_rate);
        self.sc_ref.last_timestamp().set(self.last_timestamp);
        self.sc_ref
            .accrued_to_treasury()
            .set(&self.accrued_to_treasury);
        self.sc_ref
            .scaled_variable_debt()
            .set(&self.next_scaled_variable_debt);
        self.sc_ref.stable_debt().set(&StableDebtState {
            principal: self.next_principal_stable_debt.clone(),
            average_rate: self.next_avg_stable_borrow_rate.clone(),
            last_update: self.next_stable_debt_last_update,
        });
    }
}

impl<C> Cache<'_, C>
where
    C: crate::storage::Storage + common_math::SharedMathModule,
{
    pub fn get_decimal_value(
        &self,
        value: &BigUint<C::Api>,
    ) -> ManagedDecimal<C::Api, NumDecimals> {
        self.sc_ref
            .to_decimal(value.clone(), self.params.asset_decimals)
    }

    pub fn is_same_asset(&self, asset: &EgldOrEsdtTokenIdentifier<C::Api>) -> bool {
        self.params.asset_id == *asset
    }

    /// True when the balance snapshot covers `amount` (asset decimals).
    pub fn has_reserves(&self, amount: &ManagedDecimal<C::Api, NumDecimals>) -> bool {
        self.asset_balance >= *amount
    }

    /// Nominal variable debt of a scaled amount, at the rolled-forward index.
    pub fn nominal_variable_debt(
        &self,
        scaled_amount: &ManagedDecimal<C::Api, NumDecimals>,
    ) -> ManagedDecimal<C::Api, NumDecimals> {
        self.sc_ref.mul_half_up(
            scaled_amount,
            &self.next_variable_borrow_index,
            RAY_PRECISION,
        )
    }

    /// Scaled representation of a nominal amount, at the rolled-forward index.
    pub fn scaled_variable_debt_amount(
        &self,
        amount: &ManagedDecimal<C::Api, NumDecimals>,
    ) -> ManagedDecimal<C::Api, NumDecimals> {
        self.sc_ref.div_half_up(
            amount,
            &self.next_variable_borrow_index,
            RAY_PRECISION,
        )
    }
}
