use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use approx::{AbsDiffEq, RelativeEq};
use num_traits::{One, ToPrimitive, Zero};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Anything with an absolute value below this is treated as zero when
/// searching for a pivot or comparing line constants.
pub const NEAR_ZERO_EPSILON: Dec = Dec(dec!(1e-10));

/// Default bound on `|a · b|` for orthogonality checks.
pub const DEFAULT_TOLERANCE: Dec = Dec(dec!(1e-10));

/// How far a normalized dot product may overshoot `[-1, 1]` and still be
/// treated as rounding noise rather than a domain error.
pub const ACOS_CLAMP_TOLERANCE: Dec = Dec(dec!(1e-5));

/// Places kept when a line is rendered in its canonical form.
pub const DISPLAY_DECIMAL_PLACES: u32 = 3;

/// Fixed-precision decimal scalar.
///
/// Wraps [`rust_decimal::Decimal`]: a 96-bit mantissa with a base-10 scale,
/// which gives 28 significant digits for every intermediate result. The
/// precision is a property of the type, so nothing has to be configured
/// before the first computation.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(Decimal);

impl Dec {
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn inner(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Square root in decimal arithmetic. `None` for negative input.
    pub fn sqrt(self) -> Option<Self> {
        self.0.sqrt().map(Self)
    }

    /// Rounds half to even.
    pub fn round_dp(self, dp: u32) -> Self {
        Self(self.0.round_dp(dp))
    }

    /// Drops trailing zeros of the scale, so `2.000` prints as `2`.
    pub fn normalize(self) -> Self {
        Self(self.0.normalize())
    }

    /// Sets the scale exactly, padding with trailing zeros: `2.5` at scale 3
    /// is `2.500`.
    pub fn rescale(self, scale: u32) -> Self {
        let mut value = self.0;
        value.rescale(scale);
        Self(value)
    }

    pub fn is_integer(self) -> bool {
        self.0.fract().is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_mul(self, other: Self) -> Option<Self> {
        self.0.checked_mul(other.0).map(Self)
    }

    pub fn checked_div(self, other: Self) -> Option<Self> {
        self.0.checked_div(other.0).map(Self)
    }

    pub fn is_sign_negative(self) -> bool {
        !self.0.is_zero() && self.0.is_sign_negative()
    }

    pub fn is_sign_positive(self) -> bool {
        !self.0.is_zero() && self.0.is_sign_positive()
    }

    pub fn to_f64(self) -> Option<f64> {
        self.0.to_f64()
    }
}

/// `|value| < epsilon`.
pub fn is_near_zero(value: Dec, epsilon: Dec) -> bool {
    value.abs() < epsilon
}

/// Position of the first component whose magnitude reaches `epsilon`.
pub fn first_nonzero_index<'a>(
    components: impl IntoIterator<Item = &'a Dec>,
    epsilon: Dec,
) -> Option<usize> {
    components
        .into_iter()
        .position(|c| !is_near_zero(*c, epsilon))
}

/// `a·b − c·d`, or `None` when an intermediate leaves the decimal range.
pub fn difference_of_products(a: Dec, b: Dec, c: Dec, d: Dec) -> Option<Dec> {
    a.checked_mul(b)?.checked_sub(c.checked_mul(d)?)
}

macro_rules! forward_binop {
    ($op:ident, $method:ident, $op_assign:ident, $method_assign:ident) => {
        impl $op for Dec {
            type Output = Dec;

            fn $method(self, rhs: Dec) -> Dec {
                Dec(self.0.$method(rhs.0))
            }
        }

        impl<'a> $op<&'a Dec> for Dec {
            type Output = Dec;

            fn $method(self, rhs: &'a Dec) -> Dec {
                Dec(self.0.$method(rhs.0))
            }
        }

        impl $op_assign for Dec {
            fn $method_assign(&mut self, rhs: Dec) {
                self.0.$method_assign(rhs.0)
            }
        }
    };
}

forward_binop!(Add, add, AddAssign, add_assign);
forward_binop!(Sub, sub, SubAssign, sub_assign);
forward_binop!(Mul, mul, MulAssign, mul_assign);
forward_binop!(Div, div, DivAssign, div_assign);

impl Neg for Dec {
    type Output = Dec;

    fn neg(self) -> Dec {
        Dec(-self.0)
    }
}

impl Zero for Dec {
    fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Dec {
    fn one() -> Self {
        Self(Decimal::ONE)
    }
}

impl Sum for Dec {
    fn sum<I: Iterator<Item = Dec>>(iter: I) -> Self {
        iter.fold(Dec::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Dec> for Dec {
    fn sum<I: Iterator<Item = &'a Dec>>(iter: I) -> Self {
        iter.fold(Dec::zero(), |acc, x| acc + x)
    }
}

impl From<Decimal> for Dec {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Dec> for Decimal {
    fn from(value: Dec) -> Self {
        value.0
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Dec {
                fn from(value: $t) -> Self {
                    Self(Decimal::from(value))
                }
            }
        )*
    };
}

from_integer!(i32, i64, u32, u64, usize);

impl FromStr for Dec {
    type Err = rust_decimal::Error;

    /// Accepts plain (`-8.187`) and scientific (`1e-5`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AbsDiffEq for Dec {
    type Epsilon = Dec;

    fn default_epsilon() -> Self::Epsilon {
        NEAR_ZERO_EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        (*self - *other).abs() <= epsilon
    }
}

impl RelativeEq for Dec {
    fn default_max_relative() -> Self::Epsilon {
        NEAR_ZERO_EPSILON
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        if self.abs_diff_eq(other, epsilon) {
            return true;
        }
        let largest = self.abs().max(other.abs());
        (*self - *other).abs() <= largest * max_relative
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use num_traits::Zero;
    use rust_decimal_macros::dec;

    use super::{difference_of_products, first_nonzero_index, is_near_zero, Dec, NEAR_ZERO_EPSILON};

    #[test]
    fn near_zero() {
        assert!(is_near_zero(Dec::from(dec!(1e-11)), NEAR_ZERO_EPSILON));
        assert!(is_near_zero(-Dec::from(dec!(1e-11)), NEAR_ZERO_EPSILON));
        assert!(!is_near_zero(Dec::from(dec!(1e-10)), NEAR_ZERO_EPSILON));
        assert!(!is_near_zero(Dec::from(dec!(0.5)), dec!(0.1).into()));
    }

    #[test]
    fn first_nonzero() {
        let components: Vec<Dec> = vec![dec!(0).into(), dec!(1e-12).into(), dec!(2.5).into()];
        assert_eq!(first_nonzero_index(&components, NEAR_ZERO_EPSILON), Some(2));

        let components: Vec<Dec> = vec![Dec::zero(), Dec::zero()];
        assert_eq!(first_nonzero_index(&components, NEAR_ZERO_EPSILON), None);
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(Dec::from(dec!(2.0005)).round_dp(3), Dec::from(dec!(2.000)));
        assert_eq!(Dec::from(dec!(2.0015)).round_dp(3), Dec::from(dec!(2.002)));
        assert_eq!(
            Dec::from(dec!(2.000)).round_dp(3).normalize().to_string(),
            "2"
        );
    }

    #[test]
    fn parse() {
        assert_eq!("-8.187".parse::<Dec>().unwrap(), Dec::from(dec!(-8.187)));
        assert_eq!(" 1e-5 ".parse::<Dec>().unwrap(), Dec::from(dec!(0.00001)));
        assert!("eight".parse::<Dec>().is_err());
    }

    #[test]
    fn sqrt() {
        assert_abs_diff_eq!(Dec::from(16).sqrt().unwrap(), Dec::from(4));
        assert_eq!(Dec::zero().sqrt(), Some(Dec::zero()));
        assert_eq!(Dec::from(-1).sqrt(), None);
        let two = Dec::from(2).sqrt().unwrap();
        assert_abs_diff_eq!(two * two, Dec::from(2), epsilon = Dec::from(dec!(1e-25)));
    }

    #[test]
    fn rescale_pads_and_integers_are_detected() {
        assert_eq!(Dec::from(dec!(2.5)).rescale(3).to_string(), "2.500");
        assert_eq!(Dec::from(dec!(-3.0004)).round_dp(3).rescale(3).to_string(), "-3.000");
        assert!(Dec::from(dec!(2.000)).is_integer());
        assert!(!Dec::from(dec!(2.001)).is_integer());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let big = Dec::from(dec!(1e15));
        assert_eq!(big.checked_mul(big), None);
        assert_eq!(
            big.checked_mul(Dec::from(1000)),
            Some(Dec::from(dec!(1e18)))
        );
        assert_eq!(Dec::new(rust_decimal::Decimal::MAX).checked_add(Dec::from(1)), None);
        assert_eq!(Dec::from(1).checked_div(Dec::zero()), None);

        let three = Dec::from(3);
        assert_eq!(
            difference_of_products(three, Dec::from(4), Dec::from(2), Dec::from(5)),
            Some(Dec::from(2))
        );
        assert_eq!(difference_of_products(big, big, three, three), None);
    }

    #[test]
    fn sign_of_zero() {
        assert!(!Dec::zero().is_sign_negative());
        assert!(!Dec::zero().is_sign_positive());
        assert!(Dec::from(-3).is_sign_negative());
    }
}
