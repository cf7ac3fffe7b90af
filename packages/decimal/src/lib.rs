// A lot of this code is taken from the cosmwasm-std crate, which is licensed under the Apache
// License 2.0 - https://github.com/CosmWasm/cosmwasm.

#![no_std]

mod decimal256;

pub use decimal256::Decimal256;

use core::ops::Sub;

use num_integer::Integer;

/// Fixed-point decimal with 18 fractional digits, backed by an `i128`.
///
/// Every operation rounds toward negative infinity. Amounts handled by the
/// contracts are never negative, so in practice this is plain truncation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(i128);

impl Decimal {
    const DECIMAL_FRACTIONAL: i128 = 1_000_000_000_000_000_000i128; // 1*10**18

    pub const fn raw(value: i128) -> Self {
        Self(value)
    }

    /// Create a 1.0 Decimal
    #[inline]
    pub const fn one() -> Self {
        Self(Self::DECIMAL_FRACTIONAL)
    }

    /// A decimal is an integer of atomic units plus a number that specifies the
    /// position of the decimal dot. So any decimal can be expressed as two numbers.
    ///
    /// ## Examples
    ///
    /// ```
    /// use decimal::Decimal;
    /// // Value with whole and fractional part
    /// let a = Decimal::raw(1_230_000_000_000_000_000);
    /// assert_eq!(a.atomics(), 1230000000000000000);
    ///
    /// // Smallest possible value
    /// assert_eq!(Decimal::raw(1).atomics(), 1);
    /// ```
    #[must_use]
    #[inline]
    pub const fn atomics(&self) -> i128 {
        self.0
    }

    /// `self * other`, `None` when the 128-bit intermediate product overflows.
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        self.0
            .checked_mul(other.0)
            .map(|product| Decimal(product.div_floor(&Self::DECIMAL_FRACTIONAL)))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Decimal)
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }
}

impl Sub for Decimal {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Decimal(self.0 - other.0)
    }
}
