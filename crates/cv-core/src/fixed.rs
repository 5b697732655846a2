//! Deterministic fixed-point arithmetic.
//!
//! # Design
//!
//! `Fixed` is a signed 64-bit integer carrying [`Fixed::FRAC_BITS`] (20)
//! fractional bits, so the resolution is 2⁻²⁰ ≈ 0.95 × 10⁻⁶ and the integer
//! range is ±8.8 × 10¹².  That covers forces in N for the heaviest trains
//! (≈ 10⁷), products such as `mass · v²` (≈ 10¹¹), and coefficients down to
//! the 0.0015 rolling resistance of a maglev.
//!
//! Multiplication and division go through `i128` intermediates.  Every
//! rounding step is **round half up** (ties toward +∞), and every overflow
//! saturates at [`Fixed::MAX`] / [`Fixed::MIN`].  Only integer operations
//! are involved, so every host produces the same bit pattern for the same
//! inputs.  That is the whole point of the type: `f32`/`f64` must never
//! appear in physics arithmetic shared between simulation participants.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

const FRAC_BITS: u32 = 20;
const ONE_RAW: i64 = 1 << FRAC_BITS;
const HALF_RAW: i64 = ONE_RAW >> 1;
const MAX_RAW: i64 = i64::MAX;
// Symmetric range: `-MAX` is representable, so `abs` and `neg` never overflow.
const MIN_RAW: i64 = -i64::MAX;

/// A fixed-point number with 20 fractional bits.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fixed(i64);

impl Fixed {
    pub const FRAC_BITS: u32 = FRAC_BITS;

    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(ONE_RAW);
    pub const HALF: Fixed = Fixed(HALF_RAW);
    pub const MAX: Fixed = Fixed(MAX_RAW);
    pub const MIN: Fixed = Fixed(MIN_RAW);

    /// Wrap a raw bit pattern (value × 2²⁰).
    #[inline]
    pub const fn from_raw(raw: i64) -> Fixed {
        Fixed(if raw < MIN_RAW { MIN_RAW } else { raw })
    }

    /// The raw bit pattern (value × 2²⁰).
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Exact conversion from an integer, saturating outside ±8.8 × 10¹².
    #[inline]
    pub const fn from_int(n: i64) -> Fixed {
        saturate((n as i128) << FRAC_BITS)
    }

    /// `num / den`, rounded half up to the nearest representable value.
    ///
    /// This is the canonical way to write a non-integer constant: `0.0015`
    /// is `Fixed::ratio(15, 10_000)`.
    #[inline]
    pub const fn ratio(num: i64, den: i64) -> Fixed {
        saturate(div_round((num as i128) << FRAC_BITS, den as i128))
    }

    /// Multiply by an integer without rounding.
    #[inline]
    pub const fn mul_int(self, n: i64) -> Fixed {
        saturate(self.0 as i128 * n as i128)
    }

    /// Divide by an integer, rounding half up.
    #[inline]
    pub const fn div_int(self, n: i64) -> Fixed {
        saturate(div_round(self.0 as i128, n as i128))
    }

    /// Nearest integer, ties rounded up (`2.5 → 3`, `-2.5 → -2`).
    #[inline]
    pub const fn round(self) -> i64 {
        ((self.0 as i128 + HALF_RAW as i128) >> FRAC_BITS) as i64
    }

    /// Integer part, rounded toward zero.
    #[inline]
    pub const fn trunc(self) -> i64 {
        self.0 / ONE_RAW
    }

    /// Largest integer `<= self`.
    #[inline]
    pub const fn floor(self) -> i64 {
        self.0 >> FRAC_BITS
    }

    /// Smallest integer `>= self`.
    #[inline]
    pub const fn ceil(self) -> i64 {
        -((-self.0) >> FRAC_BITS)
    }

    /// [`round`][Self::round] clamped into `i32`.
    #[inline]
    pub fn round_i32(self) -> i32 {
        self.round().clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    #[inline]
    pub const fn abs(self) -> Fixed {
        Fixed(self.0.abs())
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Square root, rounded half up.  Returns zero for non-positive input.
    pub fn sqrt(self) -> Fixed {
        if self.0 <= 0 {
            return Fixed::ZERO;
        }
        // sqrt(raw / 2^F) * 2^F == sqrt(raw * 2^F)
        let scaled = (self.0 as u128) << FRAC_BITS;
        let root = scaled.isqrt();
        // (r + 0.5)² = r² + r + 0.25, so round up once the remainder exceeds r.
        let root = if scaled - root * root > root { root + 1 } else { root };
        Fixed(root as i64)
    }
}

// ── Integer helpers ───────────────────────────────────────────────────────────

#[inline]
const fn saturate(v: i128) -> Fixed {
    if v > MAX_RAW as i128 {
        Fixed::MAX
    } else if v < MIN_RAW as i128 {
        Fixed::MIN
    } else {
        Fixed(v as i64)
    }
}

/// `num / den` rounded half up.
///
/// Division by zero is a programming error; release builds saturate with the
/// sign of the dividend instead of trapping.
#[inline]
const fn div_round(num: i128, den: i128) -> i128 {
    debug_assert!(den != 0, "Fixed: division by zero");
    if den == 0 {
        return if num < 0 { i128::MIN } else if num > 0 { i128::MAX } else { 0 };
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    // floor((2·num + den) / (2·den)) == floor(num/den + 1/2)
    (2 * num + den).div_euclid(2 * den)
}

// ── Operators ─────────────────────────────────────────────────────────────────

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        saturate(self.0 as i128 + rhs.0 as i128)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        saturate(self.0 as i128 - rhs.0 as i128)
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, rhs: Fixed) -> Fixed {
        saturate((self.0 as i128 * rhs.0 as i128 + HALF_RAW as i128) >> FRAC_BITS)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    #[inline]
    fn div(self, rhs: Fixed) -> Fixed {
        saturate(div_round((self.0 as i128) << FRAC_BITS, rhs.0 as i128))
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fixed {
    #[inline]
    fn mul_assign(&mut self, rhs: Fixed) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fixed {
    #[inline]
    fn div_assign(&mut self, rhs: Fixed) {
        *self = *self / rhs;
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Fixed {
        iter.fold(Fixed::ZERO, Add::add)
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

macro_rules! from_int_type {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Fixed {
                #[inline]
                fn from(n: $t) -> Fixed {
                    Fixed::from_int(n as i64)
                }
            }
        )*
    };
}

from_int_type!(i16, u16, i32, u32, i64);

impl fmt::Display for Fixed {
    /// Exact decimal rendering using integer arithmetic only.  Honours the
    /// `{:.N}` precision (capped at 6 digits, default 6).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(6).min(6) as u32;
        let scale = 10u128.pow(digits);
        let magnitude = self.0.unsigned_abs() as u128;
        let scaled = (magnitude * scale + (HALF_RAW as u128)) >> FRAC_BITS;
        let (int, frac) = (scaled / scale, scaled % scale);
        let sign = if self.0 < 0 && scaled != 0 { "-" } else { "" };
        if digits == 0 {
            write!(f, "{sign}{int}")
        } else {
            write!(f, "{sign}{int}.{frac:0width$}", width = digits as usize)
        }
    }
}
