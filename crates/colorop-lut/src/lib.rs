//! # colorop-lut
//!
//! Fixed-point evaluation of 1D curves and LUTs for display color pipelines.
//!
//! Every stage of a color pipeline that applies a per-channel curve, whether a
//! named transfer function or a custom table, ends up here. Inputs and
//! samples are 16-bit; indexing and interpolation use S32.32 [`Fixed`]
//! arithmetic so results are exact and reproducible.
//!
//! # Components
//!
//! - [`ColorLut`] - equal-spaced RGB LUT with a precomputed index ratio
//! - [`get_lut_index`], [`lerp_u16`], [`apply_lut_to_channel`] - the evaluation primitives
//! - [`CurveType`] and [`curve_lut`] - named transfer curves as shared tables
//! - [`LutRange`] and [`SegmentedLut`] - multi-segment LUT descriptors
//!
//! # Usage
//!
//! ```rust
//! use colorop_lut::{apply_lut_to_channel, Channel, ColorLut, Fixed, lerp_u16};
//!
//! let lut = ColorLut::identity(1024).unwrap();
//! let v = apply_lut_to_channel(&lut, 0x4000, Channel::Blue);
//! assert!((v as i32 - 0x4000).abs() <= 1);
//!
//! // Ties round up.
//! assert_eq!(lerp_u16(0x10, 0x11, Fixed::from_raw(0x8000_0000)), 0x11);
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - Error handling
//! - `serde` (optional) - Deserialization of curve and range descriptors
//!
//! # Used By
//!
//! - `colorop-core` - Pipeline node model and software evaluation

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod fixed;
mod interp;
mod lut1d;
pub mod curves;
pub mod segmented;
pub mod transfer;

pub use curves::{curve_lut, CurveType, CURVE_LUT_SIZE};
pub use error::{LutError, LutResult};
pub use fixed::{from_sign_magnitude, to_sign_magnitude, Fixed, FRAC_BITS};
pub use interp::LutInterpolation;
pub use lut1d::{
    apply_lut, apply_lut_to_channel, entries_from_blob, entries_to_blob, get_lut_index, lerp_u16, Channel,
    ColorLut, LutEntry, CHANNEL_MAX,
};
pub use segmented::{
    ranges_from_blob, ranges_to_blob, total_samples, validate_ranges, LutRange, SegmentedLut,
    RANGE_INTERPOLATE, RANGE_NON_DECREASING,
};
