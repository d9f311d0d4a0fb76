#![no_std]

pub static ERROR_ALREADY_INITIALIZED: &[u8] = b"Market already initialized.";

pub static ERROR_INVALID_OPTIMAL_USAGE_RATIO: &[u8] = b"Optimal usage ratio above ray.";

pub static ERROR_INVALID_OPTIMAL_STABLE_RATIO: &[u8] =
    b"Optimal stable to total debt ratio above ray.";

pub static ERROR_INVALID_RESERVE_FACTOR: &[u8] = b"Reserve factor above 100%.";

pub static ERROR_MATH_OVERFLOW: &[u8] = b"Value does not fit in 128 bits.";

pub static ERROR_DIVISION_BY_ZERO: &[u8] = b"Division by zero.";

pub static ERROR_TIME_WENT_BACKWARDS: &[u8] = b"Block timestamp older than last market update.";

pub static ERROR_NEGATIVE_TREASURY_ACCRUAL: &[u8] = b"Treasury accrual can not be negative.";

pub static ERROR_INVALID_ASSET: &[u8] = b"Invalid asset provided.";

pub static ERROR_INSUFFICIENT_LIQUIDITY: &[u8] = b"Insufficient liquidity.";

pub static ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO: &[u8] = b"Amount must be greater than zero.";
