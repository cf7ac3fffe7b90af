// A lot of this code is taken from the cosmwasm-std crate, which is licensed under the Apache
// License 2.0 - https://github.com/CosmWasm/cosmwasm.

use soroban_sdk::{Env, U256};

use crate::Decimal;

/// 18-place fixed-point decimal on a host `U256`.
///
/// Used where the product of two 18-place `i128` values would overflow 128
/// bits before the rescaling division, e.g. `quantity * price`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd)]
pub struct Decimal256(U256);

impl Decimal256 {
    pub fn new(env: &Env, value: u128) -> Self {
        Decimal256(U256::from_u128(env, value))
    }

    pub fn decimal_fractional(env: &Env) -> U256 {
        U256::from_u128(env, 1_000_000_000_000_000_000u128) // 1*10**18
    }

    /// Widens a non-negative [`Decimal`]. Negative values have no `U256`
    /// representation and yield `None`.
    pub fn from_decimal(env: &Env, value: Decimal) -> Option<Self> {
        u128::try_from(value.atomics())
            .ok()
            .map(|atomics| Decimal256::new(env, atomics))
    }

    /// Narrows back to a [`Decimal`], `None` if the value does not fit in `i128`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        narrow(&self.0).map(Decimal::raw)
    }

    /// Truncating fixed-point product.
    pub fn mul(&self, env: &Env, other: &Self) -> Self {
        let result = self.0.mul(&other.0).div(&Self::decimal_fractional(env));
        Decimal256(result)
    }

    /// `floor(amount * rate)` for non-negative operands, with a 256-bit
    /// intermediate product. `None` on negative input or when the result does
    /// not fit back into an `i128`.
    pub fn mul_int(env: &Env, amount: i128, rate: Decimal) -> Option<i128> {
        let amount = Decimal256::from_decimal(env, Decimal::raw(amount))?;
        let rate = Decimal256::from_decimal(env, rate)?;
        // amount is an integer, so reading the product back as atomics
        // yields floor(amount * rate)
        amount.mul(env, &rate).to_decimal().map(|d| d.atomics())
    }

    /// `floor(value * numerator / denominator)` on plain integers with a
    /// 256-bit intermediate product. `None` on negative input, a zero
    /// denominator, or a quotient above `i128::MAX`.
    pub fn mul_div(env: &Env, value: i128, numerator: i128, denominator: i128) -> Option<i128> {
        let widen = |v: i128| u128::try_from(v).ok().map(|v| U256::from_u128(env, v));
        let denominator = widen(denominator)?;
        if denominator == U256::from_u32(env, 0) {
            return None;
        }
        let product = widen(value)?.mul(&widen(numerator)?);
        narrow(&product.div(&denominator))
    }
}

fn narrow(value: &U256) -> Option<i128> {
    value.to_u128().and_then(|v| i128::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: i128 = 1_000_000_000_000_000_000;

    #[test]
    fn decimal256_mul_truncates() {
        let env = Env::default();
        let half = Decimal256::new(&env, 500_000_000_000_000_000);
        let three = Decimal256::new(&env, 3);
        // 3 atomics * 0.5 = 1.5 atomics -> 1
        assert_eq!(three.mul(&env, &half).to_decimal(), Some(Decimal::raw(1)));

        let one = Decimal256::from_decimal(&env, Decimal::one());
        assert_eq!(one.and_then(|one| one.to_decimal()), Some(Decimal::one()));
    }

    #[test]
    fn mul_int_survives_products_wider_than_i128() {
        let env = Env::default();
        // 4000 tokens at 64.64 per token, both with 18 places
        let quantity = 4_000 * ONE;
        let ask = Decimal::raw(64_640_000_000_000_000_000);
        assert_eq!(quantity.checked_mul(ask.atomics()), None);
        assert_eq!(
            Decimal256::mul_int(&env, quantity, ask),
            Some(258_560 * ONE)
        );
    }

    #[test]
    fn mul_int_rejects_negative_operands() {
        let env = Env::default();
        assert_eq!(Decimal256::mul_int(&env, -1, Decimal::one()), None);
        assert_eq!(Decimal256::mul_int(&env, 1, Decimal::raw(-1)), None);
    }

    #[test]
    fn mul_div_keeps_full_precision_of_wide_products() {
        let env = Env::default();
        // 1.2e36 * 86_400 does not fit in an i128
        let annual = 1_200_000_000_000_000_000 * ONE;
        assert_eq!(annual.checked_mul(86_400), None);
        assert_eq!(
            Decimal256::mul_div(&env, annual, 86_400, 31_557_600),
            Some(3_285_420_944_558_521_560_574_948_665_297_741)
        );
        assert_eq!(Decimal256::mul_div(&env, 7, 3, 2), Some(10));
    }

    #[test]
    fn mul_div_rejects_invalid_operands() {
        let env = Env::default();
        assert_eq!(Decimal256::mul_div(&env, 1, 1, 0), None);
        assert_eq!(Decimal256::mul_div(&env, -1, 1, 1), None);
        assert_eq!(Decimal256::mul_div(&env, 1, -1, 1), None);
        assert_eq!(Decimal256::mul_div(&env, i128::MAX, 2, 1), None);
    }

    #[test]
    fn to_decimal_rejects_values_above_i128() {
        let env = Env::default();
        let big = Decimal256::new(&env, u128::MAX);
        assert_eq!(big.to_decimal(), None);
    }
}
