//! Multi-segment 1D LUTs.
//!
//! Hardware with variable LUT density describes its LUT as a table of input
//! ranges, each with its own sample count and precision. The table is
//! exchanged as a blob of fixed-size little-endian [`LutRange`] records; the
//! samples for all segments are stored back to back in range order.
//!
//! # Record layout (24 bytes)
//!
//! | Offset | Type  | Field        |
//! |--------|-------|--------------|
//! | 0      | `u32` | `flags`      |
//! | 4      | `u16` | `count`      |
//! | 6      | `u8`  | `input_bpc`  |
//! | 7      | `u8`  | `output_bpc` |
//! | 8      | `u32` | `start`      |
//! | 12     | `u32` | `end`        |
//! | 16     | `i32` | `min`        |
//! | 20     | `i32` | `max`        |

use crate::fixed::{Fixed, FRAC_BITS};
use crate::lut1d::{lerp_u16, Channel, LutEntry, CHANNEL_MAX};
use crate::{LutError, LutResult};

/// Samples inside the range are linearly interpolated.
pub const RANGE_INTERPOLATE: u32 = 1 << 0;
/// Samples inside the range must not decrease.
pub const RANGE_NON_DECREASING: u32 = 1 << 1;

/// One segment of a multi-segment LUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LutRange {
    /// `RANGE_*` flags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: u32,
    /// Number of samples in the segment.
    pub count: u16,
    /// Input precision in bits.
    pub input_bpc: u8,
    /// Output precision in bits.
    pub output_bpc: u8,
    /// First input covered, in the 16-bit input domain.
    pub start: u32,
    /// Last input covered, in the 16-bit input domain.
    pub end: u32,
    /// Smallest output, in the 16-bit output domain.
    pub min: i32,
    /// Largest output, in the 16-bit output domain.
    pub max: i32,
}

impl LutRange {
    /// Size of one encoded record in bytes.
    pub const SIZE: usize = 24;

    /// Whether samples inside this range are interpolated.
    #[inline]
    pub fn interpolated(&self) -> bool {
        self.flags & RANGE_INTERPOLATE != 0
    }

    /// Whether samples inside this range must not decrease.
    #[inline]
    pub fn non_decreasing(&self) -> bool {
        self.flags & RANGE_NON_DECREASING != 0
    }

    /// Decodes one record.
    pub fn from_le_bytes(b: &[u8; Self::SIZE]) -> Self {
        let u32_at = |o: usize| u32::from_le_bytes([b[o], b[o + 1], b[o + 2], b[o + 3]]);
        Self {
            flags: u32_at(0),
            count: u16::from_le_bytes([b[4], b[5]]),
            input_bpc: b[6],
            output_bpc: b[7],
            start: u32_at(8),
            end: u32_at(12),
            min: u32_at(16) as i32,
            max: u32_at(20) as i32,
        }
    }

    /// Encodes one record.
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut b = [0u8; Self::SIZE];
        b[0..4].copy_from_slice(&self.flags.to_le_bytes());
        b[4..6].copy_from_slice(&self.count.to_le_bytes());
        b[6] = self.input_bpc;
        b[7] = self.output_bpc;
        b[8..12].copy_from_slice(&self.start.to_le_bytes());
        b[12..16].copy_from_slice(&self.end.to_le_bytes());
        b[16..20].copy_from_slice(&self.min.to_le_bytes());
        b[20..24].copy_from_slice(&self.max.to_le_bytes());
        b
    }

    fn validate(&self, index: usize) -> LutResult<()> {
        let fail = |reason: &str| {
            Err(LutError::InvalidRange {
                index,
                reason: reason.to_string(),
            })
        };
        if self.count == 0 {
            return fail("sample count must be > 0");
        }
        if !(1..=32).contains(&self.input_bpc) || !(1..=32).contains(&self.output_bpc) {
            return fail("bit depth must be within 1..=32");
        }
        if self.start > self.end || self.end > CHANNEL_MAX as u32 {
            return fail("input domain must satisfy start <= end <= 0xffff");
        }
        if self.min > self.max {
            return fail("output codomain must satisfy min <= max");
        }
        Ok(())
    }
}

/// Decodes and validates a range table blob.
///
/// The blob length must be a nonzero multiple of [`LutRange::SIZE`]; every
/// record must be well formed and ranges must be ordered without overlap.
pub fn ranges_from_blob(blob: &[u8]) -> LutResult<Vec<LutRange>> {
    if blob.is_empty() || blob.len() % LutRange::SIZE != 0 {
        return Err(LutError::InvalidBlobLength {
            len: blob.len(),
            record: LutRange::SIZE,
        });
    }
    let ranges: Vec<LutRange> = blob
        .chunks_exact(LutRange::SIZE)
        .map(|c| {
            let mut b = [0u8; LutRange::SIZE];
            b.copy_from_slice(c);
            LutRange::from_le_bytes(&b)
        })
        .collect();
    validate_ranges(&ranges)?;
    Ok(ranges)
}

/// Encodes a range table.
pub fn ranges_to_blob(ranges: &[LutRange]) -> Vec<u8> {
    ranges.iter().flat_map(|r| r.to_le_bytes()).collect()
}

/// Validates every record and their ordering.
pub fn validate_ranges(ranges: &[LutRange]) -> LutResult<()> {
    if ranges.is_empty() {
        return Err(LutError::InvalidSize("range table must not be empty".into()));
    }
    for (i, r) in ranges.iter().enumerate() {
        r.validate(i)?;
    }
    for (i, w) in ranges.windows(2).enumerate() {
        if w[1].start <= w[0].end {
            return Err(LutError::InvalidRange {
                index: i + 1,
                reason: "ranges must be ordered and must not overlap".into(),
            });
        }
    }
    Ok(())
}

/// Total number of samples described by a range table.
pub fn total_samples(ranges: &[LutRange]) -> usize {
    ranges.iter().map(|r| r.count as usize).sum()
}

/// A multi-segment LUT ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedLut {
    ranges: Vec<LutRange>,
    samples: Vec<LutEntry>,
}

impl SegmentedLut {
    /// Pairs a validated range table with its samples.
    pub fn new(ranges: Vec<LutRange>, samples: Vec<LutEntry>) -> LutResult<Self> {
        validate_ranges(&ranges)?;
        let expected = total_samples(&ranges);
        if samples.len() != expected {
            return Err(LutError::InvalidSize(format!(
                "expected {} samples, got {}",
                expected,
                samples.len()
            )));
        }
        for (i, (r, seg)) in ranges.iter().zip(segments(&ranges, &samples)).enumerate() {
            if r.non_decreasing() {
                for ch in Channel::ALL {
                    if seg.windows(2).any(|w| w[0].channel(ch) > w[1].channel(ch)) {
                        return Err(LutError::InvalidRange {
                            index: i,
                            reason: "samples decrease in a non-decreasing range".into(),
                        });
                    }
                }
            }
        }
        Ok(Self { ranges, samples })
    }

    /// The range table.
    pub fn ranges(&self) -> &[LutRange] {
        &self.ranges
    }

    /// Evaluates one channel.
    ///
    /// The input is evaluated in the last range starting at or below it (the
    /// first range for inputs below every start) and clamped into that
    /// range's input domain.
    pub fn apply_channel(&self, value: u16, channel: Channel) -> u16 {
        let v = value as u32;
        let mut pick = 0;
        for (i, r) in self.ranges.iter().enumerate() {
            if v >= r.start {
                pick = i;
            }
        }
        let range = &self.ranges[pick];
        let seg = segments(&self.ranges, &self.samples)
            .nth(pick)
            .unwrap_or(&[]);
        if seg.is_empty() {
            return value;
        }

        let v = v.clamp(range.start, range.end);
        let span = (range.end - range.start) as i128;
        let last = seg.len() - 1;
        let out = if span == 0 || last == 0 {
            seg[0].channel(channel)
        } else {
            // The shifted product needs up to 64 unsigned bits; the quotient
            // is at most `last` and fits S32.32.
            let scaled = ((v - range.start) as i128 * last as i128) << FRAC_BITS;
            let index = Fixed::from_raw((scaled / span) as i64);
            let floor = (index.floor() as usize).min(last);
            if range.interpolated() {
                let next = (floor + 1).min(last);
                lerp_u16(seg[floor].channel(channel), seg[next].channel(channel), index.frac())
            } else {
                seg[(index.round() as usize).min(last)].channel(channel)
            }
        };
        let lo = range.min.clamp(0, CHANNEL_MAX as i32);
        let hi = range.max.clamp(0, CHANNEL_MAX as i32);
        (out as i32).clamp(lo, hi) as u16
    }

    /// Evaluates all three channels.
    pub fn apply(&self, rgb: [u16; 3]) -> [u16; 3] {
        [
            self.apply_channel(rgb[0], Channel::Red),
            self.apply_channel(rgb[1], Channel::Green),
            self.apply_channel(rgb[2], Channel::Blue),
        ]
    }
}

fn segments<'a>(ranges: &'a [LutRange], samples: &'a [LutEntry]) -> impl Iterator<Item = &'a [LutEntry]> {
    let mut offset = 0;
    ranges.iter().map(move |r| {
        let end = (offset + r.count as usize).min(samples.len());
        let seg = &samples[offset.min(end)..end];
        offset = end;
        seg
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32, count: u16) -> LutRange {
        LutRange {
            flags: RANGE_INTERPOLATE | RANGE_NON_DECREASING,
            count,
            input_bpc: 16,
            output_bpc: 16,
            start,
            end,
            min: 0,
            max: 0xffff,
        }
    }

    #[test]
    fn test_record_layout() {
        let r = LutRange { min: -5, ..range(0x10, 0x2000, 33) };
        let b = r.to_le_bytes();
        assert_eq!(&b[4..6], &33u16.to_le_bytes());
        assert_eq!(&b[16..20], &(-5i32).to_le_bytes());
        assert_eq!(LutRange::from_le_bytes(&b), r);
    }

    #[test]
    fn test_blob_length() {
        let blob = ranges_to_blob(&[range(0, 0xffff, 2)]);
        assert_eq!(blob.len(), LutRange::SIZE);
        assert_eq!(ranges_from_blob(&blob).unwrap().len(), 1);
        assert!(matches!(
            ranges_from_blob(&blob[..LutRange::SIZE - 1]),
            Err(LutError::InvalidBlobLength { .. })
        ));
        assert!(ranges_from_blob(&[]).is_err());
    }

    #[test]
    fn test_overlap_rejected() {
        let blob = ranges_to_blob(&[range(0, 0x8000, 2), range(0x8000, 0xffff, 2)]);
        assert!(matches!(
            ranges_from_blob(&blob),
            Err(LutError::InvalidRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(validate_ranges(&[range(0, 0xffff, 0)]).is_err());
    }

    #[test]
    fn test_two_segment_identity() {
        // Dense segment over the dark half, sparse over the bright half.
        let ranges = vec![range(0, 0x7fff, 0x801), range(0x8000, 0xffff, 3)];
        let mut samples: Vec<LutEntry> = (0..0x801u32)
            .map(|i| LutEntry::gray(((i * 0x7fff + 0x400) / 0x800) as u16))
            .collect();
        samples.extend([0x8000u16, 0xbfff, 0xffff].map(LutEntry::gray));
        let lut = SegmentedLut::new(ranges, samples).unwrap();

        for v in [0u16, 0x10, 0x1234, 0x7fff, 0x8000, 0xc000, 0xffff] {
            let out = lut.apply_channel(v, Channel::Red);
            assert!((out as i32 - v as i32).abs() <= 1, "v={v:#x} out={out:#x}");
        }
    }

    #[test]
    fn test_dense_full_domain_range() {
        let count = 0xffffu16;
        let last = count as u32 - 1;
        let samples: Vec<LutEntry> = (0..count as u32)
            .map(|i| LutEntry::gray(((i * 0xffff + last / 2) / last) as u16))
            .collect();
        let lut = SegmentedLut::new(vec![range(0, 0xffff, count)], samples).unwrap();

        for v in [0u16, 1, 0x4000, 0x8000, 0xc000, 0xfffe, 0xffff] {
            let out = lut.apply_channel(v, Channel::Blue);
            assert!((out as i32 - v as i32).abs() <= 1, "v={v:#x} out={out:#x}");
        }
    }

    #[test]
    fn test_clamp_below_first_range() {
        let lut = SegmentedLut::new(
            vec![range(0x1000, 0xffff, 2)],
            vec![LutEntry::gray(0x100), LutEntry::gray(0xffff)],
        )
        .unwrap();
        assert_eq!(lut.apply([0, 0, 0]), [0x100; 3]);
    }

    #[test]
    fn test_output_codomain_clamp() {
        let r = LutRange { max: 0x8000, ..range(0, 0xffff, 2) };
        let lut = SegmentedLut::new(vec![r], vec![LutEntry::gray(0), LutEntry::gray(0xffff)]).unwrap();
        assert_eq!(lut.apply_channel(0xffff, Channel::Green), 0x8000);
    }

    #[test]
    fn test_decreasing_samples_rejected() {
        let err = SegmentedLut::new(
            vec![range(0, 0xffff, 2)],
            vec![LutEntry::gray(10), LutEntry::gray(5)],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_sample_count_mismatch() {
        assert!(SegmentedLut::new(vec![range(0, 0xffff, 3)], vec![LutEntry::gray(0)]).is_err());
    }
}
