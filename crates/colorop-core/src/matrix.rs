//! Fixed-point color matrices and gain.
//!
//! Matrix blobs hold row-major S31.32 sign-magnitude coefficients, 12 for a
//! 3x4 matrix and 9 for a 3x3 one. The fourth column of a 3x4 matrix is an
//! offset in normalized units, so `1.0` adds full scale. Evaluation runs on
//! 16-bit channel codes with `i128` accumulation and rounds ties up.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::ColorMatrix;
//!
//! let m = ColorMatrix::identity();
//! assert_eq!(m.apply([1, 2, 3]), [1, 2, 3]);
//! assert_eq!(ColorMatrix::from_blob_3x3(&m.to_blob_3x3()).unwrap(), m);
//! ```

use colorop_lut::{from_sign_magnitude, to_sign_magnitude, Fixed, CHANNEL_MAX, FRAC_BITS};

use crate::state::{MATRIX_3X3_COEFFS, MATRIX_3X4_COEFFS, MATRIX_COEFF_SIZE};
use crate::{ColorOpError, ColorOpResult};

const HALF: i128 = 1 << (FRAC_BITS - 1);

/// A 3x4 fixed-point color matrix; 3x3 matrices carry a zero offset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMatrix {
    rows: [[Fixed; 4]; 3],
}

fn decode(blob: &[u8], coeffs: usize) -> ColorOpResult<Vec<Fixed>> {
    if blob.len() != coeffs * MATRIX_COEFF_SIZE {
        return Err(ColorOpError::invalid(format!(
            "matrix blob must be {} bytes, got {}",
            coeffs * MATRIX_COEFF_SIZE,
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(MATRIX_COEFF_SIZE)
        .map(|c| {
            let mut b = [0u8; MATRIX_COEFF_SIZE];
            b.copy_from_slice(c);
            from_sign_magnitude(u64::from_le_bytes(b))
        })
        .collect())
}

impl ColorMatrix {
    /// Builds a matrix from rows of `[r, g, b, offset]`.
    pub const fn new(rows: [[Fixed; 4]; 3]) -> Self {
        Self { rows }
    }

    /// The identity transform.
    pub const fn identity() -> Self {
        let (o, z) = (Fixed::ONE, Fixed::ZERO);
        Self::new([[o, z, z, z], [z, o, z, z], [z, z, o, z]])
    }

    /// Builds a matrix from `f64` coefficients, rounding to the nearest
    /// representable value.
    pub fn from_f64(rows: [[f64; 4]; 3]) -> Self {
        let scale = (1u64 << FRAC_BITS) as f64;
        Self::new(rows.map(|row| row.map(|c| Fixed::from_raw((c * scale).round() as i64))))
    }

    /// Decodes a 12-coefficient blob.
    pub fn from_blob_3x4(blob: &[u8]) -> ColorOpResult<Self> {
        let c = decode(blob, MATRIX_3X4_COEFFS)?;
        let mut rows = [[Fixed::ZERO; 4]; 3];
        for (row, chunk) in rows.iter_mut().zip(c.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Ok(Self::new(rows))
    }

    /// Decodes a 9-coefficient blob.
    pub fn from_blob_3x3(blob: &[u8]) -> ColorOpResult<Self> {
        let c = decode(blob, MATRIX_3X3_COEFFS)?;
        let mut rows = [[Fixed::ZERO; 4]; 3];
        for (row, chunk) in rows.iter_mut().zip(c.chunks_exact(3)) {
            row[..3].copy_from_slice(chunk);
        }
        Ok(Self::new(rows))
    }

    /// Encodes all 12 coefficients.
    pub fn to_blob_3x4(&self) -> Vec<u8> {
        self.rows
            .iter()
            .flatten()
            .flat_map(|c| to_sign_magnitude(*c).to_le_bytes())
            .collect()
    }

    /// Encodes the 3x3 part, dropping the offset column.
    pub fn to_blob_3x3(&self) -> Vec<u8> {
        self.rows
            .iter()
            .flat_map(|row| &row[..3])
            .flat_map(|c| to_sign_magnitude(*c).to_le_bytes())
            .collect()
    }

    /// Rows of `[r, g, b, offset]`.
    #[inline]
    pub fn rows(&self) -> &[[Fixed; 4]; 3] {
        &self.rows
    }

    /// Transforms one RGB triple of 16-bit codes.
    pub fn apply(&self, rgb: [u16; 3]) -> [u16; 3] {
        let input = [
            rgb[0] as i128,
            rgb[1] as i128,
            rgb[2] as i128,
            CHANNEL_MAX as i128,
        ];
        self.rows.map(|row| {
            let acc: i128 = row
                .iter()
                .zip(input)
                .map(|(c, v)| c.raw() as i128 * v)
                .sum();
            ((acc + HALF) >> FRAC_BITS).clamp(0, CHANNEL_MAX as i128) as u16
        })
    }
}

/// Scales one 16-bit code by an unsigned U32.32 gain, rounding ties up.
#[inline]
pub fn apply_multiplier(value: u16, multiplier: u64) -> u16 {
    let scaled = (value as u128 * multiplier as u128 + HALF as u128) >> FRAC_BITS;
    scaled.min(CHANNEL_MAX as u128) as u16
}
