//! S32.32 fixed-point arithmetic.
//!
//! LUT indexing and interpolation run entirely in integer arithmetic so the
//! result of evaluating a curve is bit-exact across platforms. A [`Fixed`]
//! holds a signed 64-bit value with 32 integer and 32 fractional bits, wide
//! enough to represent any index into a LUT of up to 2^31 entries together
//! with its fractional position.
//!
//! # Example
//!
//! ```rust
//! use colorop_lut::Fixed;
//!
//! let half = Fixed::from_raw(0x8000_0000);
//! assert_eq!(half.round(), 1);
//! assert_eq!(half.floor(), 0);
//! assert_eq!(Fixed::from_int(3).raw(), 3 << 32);
//! ```

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 32;

const FRAC_MASK: i64 = (1 << FRAC_BITS) - 1;
const HALF: i64 = 1 << (FRAC_BITS - 1);

/// Signed fixed-point number with 32 integer and 32 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i64);

impl Fixed {
    /// 0.0
    pub const ZERO: Self = Self(0);
    /// 1.0
    pub const ONE: Self = Self(1 << FRAC_BITS);

    /// Wraps a raw S32.32 value.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Converts an integer to fixed point.
    #[inline]
    pub const fn from_int(v: i64) -> Self {
        Self(v << FRAC_BITS)
    }

    /// Returns the raw S32.32 value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Integer part, rounded towards negative infinity.
    #[inline]
    pub const fn floor(self) -> i64 {
        self.0 >> FRAC_BITS
    }

    /// Integer part, rounded towards positive infinity.
    #[inline]
    pub const fn ceil(self) -> i64 {
        (self.0 + FRAC_MASK) >> FRAC_BITS
    }

    /// Nearest integer, ties rounded up.
    #[inline]
    pub const fn round(self) -> i64 {
        (self.0 + HALF) >> FRAC_BITS
    }

    /// Fractional part as a fixed-point value in `[0, 1)`.
    #[inline]
    pub const fn frac(self) -> Self {
        Self(self.0 & FRAC_MASK)
    }

    /// Clamps into `[lo, hi]`.
    #[inline]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }

    /// Ratio `num / den` in fixed point, truncated.
    ///
    /// Returns `None` when `den` is zero or the quotient does not fit.
    pub fn ratio(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let q = ((num as i128) << FRAC_BITS) / den as i128;
        i64::try_from(q).ok().map(Self)
    }

    /// Approximate `f64` value, for diagnostics.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u64 << FRAC_BITS) as f64
    }
}

/// Converts an S31.32 sign-magnitude value into two's complement fixed point.
///
/// This is the coefficient encoding used by color matrix blobs: bit 63 holds
/// the sign, the remaining bits the magnitude.
#[inline]
pub fn from_sign_magnitude(v: u64) -> Fixed {
    let magnitude = (v & !(1u64 << 63)) as i64;
    if v & (1u64 << 63) != 0 {
        Fixed(-magnitude)
    } else {
        Fixed(magnitude)
    }
}

/// Converts a fixed-point value into S31.32 sign-magnitude.
#[inline]
pub fn to_sign_magnitude(v: Fixed) -> u64 {
    if v.0 < 0 {
        v.0.unsigned_abs() | (1u64 << 63)
    } else {
        v.0 as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_modes() {
        let v = Fixed::from_raw((2 << 32) + 1);
        assert_eq!(v.floor(), 2);
        assert_eq!(v.ceil(), 3);
        assert_eq!(v.round(), 2);

        let exact = Fixed::from_int(5);
        assert_eq!(exact.floor(), 5);
        assert_eq!(exact.ceil(), 5);
        assert_eq!(exact.round(), 5);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(Fixed::from_raw(HALF).round(), 1);
        assert_eq!(Fixed::from_raw(HALF - 1).round(), 0);
        // Negative ties round towards positive infinity too.
        assert_eq!(Fixed::from_raw(-HALF).round(), 0);
    }

    #[test]
    fn test_frac() {
        let v = Fixed::from_raw((7 << 32) | 0x4000_0000);
        assert_eq!(v.frac().raw(), 0x4000_0000);
        assert!((v.to_f64() - 7.25).abs() < 1e-9);
    }

    #[test]
    fn test_ratio() {
        // 15 / 0xffff is the index ratio of a 16-entry LUT.
        assert_eq!(Fixed::ratio(15, 0xffff), Some(Fixed::from_raw(0xf000f)));
        assert_eq!(Fixed::ratio(1, 0), None);
    }

    #[test]
    fn test_sign_magnitude() {
        let minus_half = (1u64 << 63) | 0x8000_0000;
        assert_eq!(from_sign_magnitude(minus_half).raw(), -0x8000_0000);
        assert_eq!(to_sign_magnitude(Fixed::from_raw(-0x8000_0000)), minus_half);
        assert_eq!(from_sign_magnitude(1 << 32), Fixed::ONE);
    }
}
