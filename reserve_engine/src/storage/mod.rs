multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use common_structs::{MarketParams, StableDebtState};

/// Storage mappers for the per-market reserve record.
///
/// Indexes, rates and scaled amounts are RAY decimals; `unbacked` lives in
/// asset decimals. All of them are bounded to 128 bits by the width guards at
/// their write sites so the record round-trips the canonical packed layout.
#[multiversx_sc::module]
pub trait Storage {
    /// Market parameters: rate strategy configuration plus the reserve factor.
    #[view(getParams)]
    #[storage_mapper("params")]
    fn params(&self) -> SingleValueMapper<MarketParams<Self::Api>>;

    /// Cumulative supply index. Starts at RAY and never decreases.
    #[view(getLiquidityIndex)]
    #[storage_mapper("liquidity_index")]
    fn liquidity_index(&self) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Cumulative variable-debt index. Starts at RAY and never decreases.
    #[view(getVariableBorrowIndex)]
    #[storage_mapper("variable_borrow_index")]
    fn variable_borrow_index(&self) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Annualized supply rate applied until the next rate update.
    #[view(getCurrentLiquidityRate)]
    #[storage_mapper("current_liquidity_rate")]
    fn current_liquidity_rate(&self) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Annualized rate offered to new stable borrows.
    #[view(getCurrentStableBorrowRate)]
    #[storage_mapper("current_stable_borrow_rate")]
    fn current_stable_borrow_rate(
        &self,
    ) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Annualized rate currently applied to variable debt.
    #[view(getCurrentVariableBorrowRate)]
    #[storage_mapper("current_variable_borrow_rate")]
    fn current_variable_borrow_rate(
        &self,
    ) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Timestamp of the last index roll-forward, in seconds.
    #[view(getLastTimestamp)]
    #[storage_mapper("last_timestamp")]
    fn last_timestamp(&self) -> SingleValueMapper<u64>;

    /// The treasury's scaled claim on the supply side. Nominal value is
    /// `accrued_to_treasury * liquidity_index`.
    #[view(getAccruedToTreasury)]
    #[storage_mapper("accrued_to_treasury")]
    fn accrued_to_treasury(&self) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Supply minted without a matching deposit (bridging hook). Zero in the
    /// baseline; only governance writes it.
    #[view(getUnbacked)]
    #[storage_mapper("unbacked")]
    fn unbacked(&self) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// Total scaled variable debt of the market.
    #[view(getScaledVariableDebt)]
    #[storage_mapper("scaled_variable_debt")]
    fn scaled_variable_debt(&self) -> SingleValueMapper<ManagedDecimal<Self::Api, NumDecimals>>;

    /// The stable-debt book: principal, weighted-average rate, last mutation.
    #[view(getStableDebt)]
    #[storage_mapper("stable_debt")]
    fn stable_debt(&self) -> SingleValueMapper<StableDebtState<Self::Api>>;
}
