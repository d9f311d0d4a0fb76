#![no_std]

pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;
pub const HALF_RAY: u128 = 500_000_000_000_000_000_000_000_000;
pub const RAY_PRECISION: usize = 27;

pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const WAD_PRECISION: usize = 18;

pub const BPS: u64 = 10_000; // 100%
pub const BPS_PRECISION: usize = 4;

/// 365 days of 86_400 seconds. Annualized rates are divided by this inside the
/// interest factors, never converted to per-second rates up front.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
