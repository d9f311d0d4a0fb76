#![no_std]

use common_constants::{BPS, BPS_PRECISION, RAY, RAY_PRECISION, WAD, WAD_PRECISION};
use common_errors::{ERROR_DIVISION_BY_ZERO, ERROR_MATH_OVERFLOW};

multiversx_sc::imports!();

/// Shared fixed-point arithmetic. Every operation rounds half-up; this is an
/// observable protocol property, not an implementation detail.
#[multiversx_sc::module]
pub trait SharedMathModule {
    fn mul_half_up(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_a = a.rescale(precision);
        let scaled_b = b.rescale(precision);

        // Product carries 2x precision, rounded back down in one step.
        let product = scaled_a.into_raw_units() * scaled_b.into_raw_units();

        let scale = BigUint::from(10u64).pow(precision as u32);
        let half_scale = &scale / &BigUint::from(2u64);

        let rounded_product = (product + half_scale) / scale;

        self.to_decimal(rounded_product, precision)
    }

    fn div_half_up(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_a = a.rescale(precision);
        let scaled_b = b.rescale(precision);

        let scale = BigUint::from(10u64).pow(precision as u32);
        let numerator = scaled_a.into_raw_units() * &scale;
        let denominator = scaled_b.into_raw_units();
        require!(denominator != &BigUint::zero(), ERROR_DIVISION_BY_ZERO);

        let half_denominator = denominator / &BigUint::from(2u64);
        let rounded_quotient = (numerator + half_denominator) / denominator;

        self.to_decimal(rounded_quotient, precision)
    }

    /// Exact on upscale; half-up on downscale. Upscaling 18 to 27 decimals is
    /// the wad-to-ray conversion and round-trips losslessly.
    fn rescale_half_up(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let from_precision = value.scale();
        if from_precision <= precision {
            value.rescale(precision)
        } else {
            let factor = BigUint::from(10u64).pow((from_precision - precision) as u32);
            let half_factor = &factor / &BigUint::from(2u64);
            self.to_decimal((value.into_raw_units() + &half_factor) / factor, precision)
        }
    }

    /// Canonical packed-form guard: indexes, rates and treasury claims must
    /// round-trip through 128-bit storage words.
    fn require_fits_u128(&self, value: &ManagedDecimal<Self::Api, NumDecimals>) {
        let max = BigUint::from(u128::MAX);
        require!(value.into_raw_units() <= &max, ERROR_MATH_OVERFLOW);
    }

    #[inline]
    fn to_decimal(
        &self,
        value: BigUint,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        ManagedDecimal::from_raw_units(value, precision)
    }

    #[inline]
    fn to_decimal_ray(&self, value: BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value, RAY_PRECISION)
    }

    #[inline]
    fn to_decimal_wad(&self, value: BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value, WAD_PRECISION)
    }

    #[inline]
    fn to_decimal_bps(&self, value: BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value, BPS_PRECISION)
    }

    #[inline]
    fn ray(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(RAY), RAY_PRECISION)
    }

    #[inline]
    fn wad(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(WAD), WAD_PRECISION)
    }

    #[inline]
    fn bps(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(BPS), BPS_PRECISION)
    }

    #[inline]
    fn ray_zero(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal_ray(BigUint::zero())
    }

    #[inline]
    fn wad_zero(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal_wad(BigUint::zero())
    }

    #[inline]
    fn bps_zero(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal_bps(BigUint::zero())
    }

    fn get_min(
        &self,
        a: ManagedDecimal<Self::Api, NumDecimals>,
        b: ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if a < b {
            a
        } else {
            b
        }
    }
}
