//! Equal-spaced 1-dimensional lookup table with 16-bit samples.
//!
//! The full 16-bit input domain `[0, 0xffff]` is mapped onto the index range
//! `[0, N-1]` through a precomputed fixed-point ratio. Evaluation splits the
//! fractional index into a floor index and a weight and interpolates between
//! the two neighbouring samples in integer arithmetic.
//!
//! # Example
//!
//! ```rust
//! use colorop_lut::{ColorLut, Channel, LutEntry};
//!
//! let lut = ColorLut::identity(256).unwrap();
//! assert_eq!(lut.apply_channel(0x8080, Channel::Red), 0x8080);
//!
//! let inverted = ColorLut::new(vec![LutEntry::gray(0xffff), LutEntry::gray(0)]).unwrap();
//! assert_eq!(inverted.apply_channel(0, Channel::Green), 0xffff);
//! ```

use crate::fixed::Fixed;
use crate::interp::LutInterpolation;
use crate::{LutError, LutResult};

/// Largest 16-bit channel value.
pub const CHANNEL_MAX: u16 = u16::MAX;

/// Color channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red
    Red,
    /// Green
    Green,
    /// Blue
    Blue,
}

impl Channel {
    /// All channels in RGB order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// One LUT sample: a red/green/blue triple of 16-bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LutEntry {
    /// Red sample
    pub red: u16,
    /// Green sample
    pub green: u16,
    /// Blue sample
    pub blue: u16,
}

impl LutEntry {
    /// Size of one entry in a sample blob: three channels and a reserved word.
    pub const BLOB_SIZE: usize = 8;

    /// Creates an entry.
    #[inline]
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Creates an entry with the same value in every channel.
    #[inline]
    pub const fn gray(v: u16) -> Self {
        Self::new(v, v, v)
    }

    /// Returns the sample for `channel`.
    #[inline]
    pub fn channel(&self, channel: Channel) -> u16 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    /// Decodes one little-endian blob entry.
    pub fn from_le_bytes(b: [u8; 8]) -> Self {
        Self {
            red: u16::from_le_bytes([b[0], b[1]]),
            green: u16::from_le_bytes([b[2], b[3]]),
            blue: u16::from_le_bytes([b[4], b[5]]),
        }
    }

    /// Encodes as one little-endian blob entry; the reserved word is zero.
    pub fn to_le_bytes(self) -> [u8; 8] {
        let [r0, r1] = self.red.to_le_bytes();
        let [g0, g1] = self.green.to_le_bytes();
        let [b0, b1] = self.blue.to_le_bytes();
        [r0, r1, g0, g1, b0, b1, 0, 0]
    }
}

fn sample(size: usize, f: impl Fn(f64) -> f64) -> Vec<LutEntry> {
    let last = (size.max(2) - 1) as f64;
    (0..size)
        .map(|i| {
            let y = f(i as f64 / last).clamp(0.0, 1.0);
            LutEntry::gray((y * CHANNEL_MAX as f64).round() as u16)
        })
        .collect()
}

/// Decodes a sample blob into entries.
///
/// The blob length must be a nonzero multiple of [`LutEntry::BLOB_SIZE`].
pub fn entries_from_blob(blob: &[u8]) -> LutResult<Vec<LutEntry>> {
    if blob.is_empty() || blob.len() % LutEntry::BLOB_SIZE != 0 {
        return Err(LutError::InvalidBlobLength {
            len: blob.len(),
            record: LutEntry::BLOB_SIZE,
        });
    }
    Ok(blob
        .chunks_exact(LutEntry::BLOB_SIZE)
        .map(|c| {
            let mut b = [0u8; 8];
            b.copy_from_slice(c);
            LutEntry::from_le_bytes(b)
        })
        .collect())
}

/// Encodes entries as a sample blob.
pub fn entries_to_blob(entries: &[LutEntry]) -> Vec<u8> {
    entries.iter().flat_map(|e| e.to_le_bytes()).collect()
}

/// A 1D LUT with `N` RGB entries over the 16-bit input domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLut {
    entries: Vec<LutEntry>,
    ratio: Fixed,
}

impl ColorLut {
    /// Builds a LUT from its entries and precomputes the index ratio.
    ///
    /// The ratio is `floor(((N-1) << 32) / 0xffff)` so that the largest
    /// input lands just below (and rounds up to) index `N-1`.
    pub fn new(entries: Vec<LutEntry>) -> LutResult<Self> {
        if entries.is_empty() {
            return Err(LutError::InvalidSize("LUT size must be > 0".into()));
        }
        let last = (entries.len() - 1) as i64;
        let ratio = Fixed::ratio(last, CHANNEL_MAX as i64)
            .ok_or_else(|| LutError::InvalidSize(format!("LUT size {} too large", entries.len())))?;
        Ok(Self { entries, ratio })
    }

    /// Builds a LUT from a little-endian sample blob.
    pub fn from_blob(blob: &[u8]) -> LutResult<Self> {
        Self::new(entries_from_blob(blob)?)
    }

    /// Creates an identity LUT of `size` entries.
    pub fn identity(size: usize) -> LutResult<Self> {
        Self::from_fn(size, |x| x)
    }

    /// Samples `f` over `[0, 1]` at `size` equal steps.
    ///
    /// Outputs are clamped to `[0, 1]` and rounded to the nearest 16-bit code.
    pub fn from_fn(size: usize, f: impl Fn(f64) -> f64) -> LutResult<Self> {
        if size == 0 {
            return Err(LutError::InvalidSize("LUT size must be > 0".into()));
        }
        Self::new(sample(size, f))
    }

    /// Infallible [`ColorLut::from_fn`] for small nonzero built-in sizes.
    pub(crate) fn sampled(size: usize, f: impl Fn(f64) -> f64) -> Self {
        debug_assert!(size > 0 && size <= u16::MAX as usize + 1);
        let entries = sample(size, f);
        let ratio = Fixed::from_raw(((entries.len() as i64 - 1) << 32) / CHANNEL_MAX as i64);
        Self { entries, ratio }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a LUT holds at least one entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries.
    #[inline]
    pub fn entries(&self) -> &[LutEntry] {
        &self.entries
    }

    /// Fixed-point ratio mapping a channel value to a fractional index.
    #[inline]
    pub fn ratio(&self) -> Fixed {
        self.ratio
    }

    /// Encodes the entries as a sample blob.
    pub fn to_blob(&self) -> Vec<u8> {
        entries_to_blob(&self.entries)
    }

    /// See [`apply_lut_to_channel`].
    #[inline]
    pub fn apply_channel(&self, value: u16, channel: Channel) -> u16 {
        apply_lut_to_channel(self, value, channel)
    }

    /// Applies the LUT to each channel of an RGB triple.
    pub fn apply(&self, rgb: [u16; 3]) -> [u16; 3] {
        [
            self.apply_channel(rgb[0], Channel::Red),
            self.apply_channel(rgb[1], Channel::Green),
            self.apply_channel(rgb[2], Channel::Blue),
        ]
    }

    /// Applies the LUT with the given interpolation mode.
    pub fn apply_with(&self, rgb: [u16; 3], interpolation: LutInterpolation) -> [u16; 3] {
        match interpolation {
            LutInterpolation::Linear => self.apply(rgb),
            LutInterpolation::Nearest => {
                let mut out = [0u16; 3];
                for (o, (&v, ch)) in out.iter_mut().zip(rgb.iter().zip(Channel::ALL)) {
                    let i = (get_lut_index(self, v).round() as usize).min(self.len() - 1);
                    *o = self.entries[i].channel(ch);
                }
                out
            }
        }
    }
}

/// Maps a 16-bit channel value to a fractional index into `lut`.
///
/// The result lies in `[0, N-1]`; `0xffff` maps to a value whose ceiling is
/// exactly `N-1`.
#[inline]
pub fn get_lut_index(lut: &ColorLut, channel_value: u16) -> Fixed {
    Fixed::from_raw(channel_value as i64 * lut.ratio.raw())
}

/// Linear interpolation between two 16-bit samples.
///
/// `t` is the weight of `b` in S32.32: `0` yields `a`, `1.0` (`2^32`)
/// yields `b`. Values outside `[0, 1.0]` are clamped. The product
/// `(b - a) * t` is rounded half up, so `t = 0.5` between neighbouring codes
/// yields the upper one.
#[inline]
pub fn lerp_u16(a: u16, b: u16, t: Fixed) -> u16 {
    let t = t.clamp(Fixed::ZERO, Fixed::ONE).raw();
    let delta = (b as i64 - a as i64) * t;
    let rounded = Fixed::from_raw(delta).round();
    (a as i64 + rounded).clamp(0, CHANNEL_MAX as i64) as u16
}

/// Evaluates `lut` on one channel with linear interpolation.
pub fn apply_lut_to_channel(lut: &ColorLut, value: u16, channel: Channel) -> u16 {
    let index = get_lut_index(lut, value);
    let last = lut.entries.len() - 1;
    let floor = (index.floor() as usize).min(last);
    let next = (floor + 1).min(last);

    let a = lut.entries[floor].channel(channel);
    let b = lut.entries[next].channel(channel);
    lerp_u16(a, b, index.frac())
}

/// Evaluates `lut` on every channel of an RGB triple.
#[inline]
pub fn apply_lut(lut: &ColorLut, rgb: [u16; 3]) -> [u16; 3] {
    lut.apply(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear16() -> ColorLut {
        let entries = (0..16u16).map(|i| LutEntry::gray(i * 0x1111)).collect();
        ColorLut::new(entries).unwrap()
    }

    #[test]
    fn test_ratio_matches_reference() {
        assert_eq!(linear16().ratio().raw(), 0xf000f);
    }

    #[test]
    fn test_get_lut_index() {
        let lut = linear16();
        assert_eq!(get_lut_index(&lut, 0).floor(), 0);
        for i in 0..16u16 {
            assert_eq!(get_lut_index(&lut, i * 0x1111).ceil(), i as i64);
        }
    }

    #[test]
    fn test_get_lut_index_monotonic() {
        let lut = ColorLut::identity(33).unwrap();
        let mut prev = Fixed::ZERO;
        for v in (0..=u16::MAX).step_by(7) {
            let idx = get_lut_index(&lut, v);
            assert!(idx >= prev);
            prev = idx;
        }
        assert_eq!(get_lut_index(&lut, u16::MAX).ceil(), 32);
    }

    #[test]
    fn test_lerp_half_way_round_down() {
        let t = Fixed::from_raw(0x8000_0000 - 1);
        assert_eq!(lerp_u16(0x0, 0x10, t), 0x8);
        assert_eq!(lerp_u16(0x1, 0x10, t), 0x8);
        assert_eq!(lerp_u16(0x1, 0xf, t), 0x8);
        assert_eq!(lerp_u16(0x10, 0x10, t), 0x10);
        assert_eq!(lerp_u16(0x10, 0x11, t), 0x10);
    }

    #[test]
    fn test_lerp_half_way_round_up() {
        let t = Fixed::from_raw(0x8000_0000);
        assert_eq!(lerp_u16(0x0, 0x10, t), 0x8);
        assert_eq!(lerp_u16(0x1, 0x10, t), 0x9);
        assert_eq!(lerp_u16(0x1, 0xf, t), 0x8);
        assert_eq!(lerp_u16(0x10, 0x10, t), 0x10);
        assert_eq!(lerp_u16(0x10, 0x11, t), 0x11);
    }

    #[test]
    fn test_lerp_endpoints() {
        for (a, b) in [(0x0, 0x10), (0x1, 0x10), (0x1, 0xf), (0x10, 0x10), (0x10, 0x11)] {
            assert_eq!(lerp_u16(a, b, Fixed::ZERO), a);
            assert_eq!(lerp_u16(a, b, Fixed::ONE), b);
            assert_eq!(lerp_u16(a, b, Fixed::from_raw(1)), a);
            assert_eq!(lerp_u16(a, b, Fixed::from_raw(Fixed::ONE.raw() - 1)), b);
        }
    }

    #[test]
    fn test_lerp_flipping_point() {
        assert_eq!(lerp_u16(0x0, 0x1, Fixed::from_raw(0x8000_0000 - 1)), 0x0);
        assert_eq!(lerp_u16(0x0, 0x1, Fixed::from_raw(0x8000_0000)), 0x1);
    }

    #[test]
    fn test_lerp_decreasing() {
        assert_eq!(lerp_u16(0x11, 0x10, Fixed::from_raw(0x8000_0000)), 0x11);
        assert_eq!(lerp_u16(0x11, 0x10, Fixed::from_raw(0x8000_0001)), 0x10);
        assert_eq!(lerp_u16(0xffff, 0, Fixed::ONE), 0);
    }

    #[test]
    fn test_lerp_equal_samples() {
        for t in (0..=Fixed::ONE.raw()).step_by(0x0fff_ffff) {
            assert_eq!(lerp_u16(0x1234, 0x1234, Fixed::from_raw(t)), 0x1234);
        }
    }

    #[test]
    fn test_identity_lut() {
        let lut = ColorLut::identity(256).unwrap();
        for i in 0..=255u16 {
            let v = i * 0x101;
            let out = lut.apply_channel(v, Channel::Red);
            assert!((out as i32 - v as i32).abs() <= 1, "v={v:#x} out={out:#x}");
        }
    }

    #[test]
    fn test_single_entry_lut() {
        let lut = ColorLut::new(vec![LutEntry::new(1, 2, 3)]).unwrap();
        assert_eq!(lut.apply([0, 0x8000, 0xffff]), [1, 2, 3]);
    }

    #[test]
    fn test_per_channel() {
        let lut = ColorLut::new(vec![
            LutEntry::new(0, 0xffff, 0x1000),
            LutEntry::new(0xffff, 0, 0x1000),
        ])
        .unwrap();
        assert_eq!(lut.apply([0xffff, 0xffff, 0xffff]), [0xffff, 0, 0x1000]);
    }

    #[test]
    fn test_nearest() {
        let lut = linear16();
        let out = lut.apply_with([0x0888, 0x1110, 0xffff], LutInterpolation::Nearest);
        assert_eq!(out, [0, 0x1111, 0xffff]);
    }

    #[test]
    fn test_blob() {
        let lut = linear16();
        let blob = lut.to_blob();
        assert_eq!(blob.len(), 16 * LutEntry::BLOB_SIZE);
        assert_eq!(ColorLut::from_blob(&blob).unwrap(), lut);
        assert!(ColorLut::from_blob(&blob[..7]).is_err());
        assert!(ColorLut::from_blob(&[]).is_err());
    }

    #[test]
    fn test_empty() {
        assert!(ColorLut::new(Vec::new()).is_err());
        assert!(ColorLut::identity(0).is_err());
    }
}
