//! Named 1D curves and their precomputed sample tables.
//!
//! A curve stage selects one of a closed list of transfer functions. Each
//! one is evaluated through a [`ColorLut`] of [`CURVE_LUT_SIZE`] entries
//! generated from the formulas in [`crate::transfer`], so named curves and
//! custom LUTs share the same fixed-point evaluation path.
//!
//! # Example
//!
//! ```rust
//! use colorop_lut::{curve_lut, CurveType};
//!
//! let eotf = curve_lut(CurveType::SrgbEotf);
//! let inv = curve_lut(CurveType::SrgbInvEotf);
//! let v = 0x8080;
//! let back = inv.apply(eotf.apply([v; 3]))[0];
//! assert!((back as i32 - v as i32).abs() < 0x101);
//! ```

use std::fmt;
use std::sync::OnceLock;

use crate::lut1d::ColorLut;
use crate::transfer;
use crate::LutError;

/// Number of entries in every named curve table.
pub const CURVE_LUT_SIZE: usize = 4096;

/// Named transfer functions a curve stage can apply.
///
/// The numeric ids are stable and ordered; a curve stage defaults to the
/// lowest id it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u32)]
pub enum CurveType {
    /// sRGB piecewise EOTF.
    SrgbEotf = 0,
    /// Inverse of the sRGB EOTF.
    SrgbInvEotf = 1,
    /// SMPTE ST 2084 (PQ) EOTF.
    #[cfg_attr(feature = "serde", serde(rename = "pq_125_eotf"))]
    Pq125Eotf = 2,
    /// Inverse PQ EOTF.
    #[cfg_attr(feature = "serde", serde(rename = "pq_125_inv_eotf"))]
    Pq125InvEotf = 3,
    /// Inverse BT.2020 OETF.
    Bt2020InvOetf = 4,
    /// BT.2020 OETF.
    Bt2020Oetf = 5,
    /// Pure power 2.2 decode.
    Gamma22 = 6,
    /// Pure power 2.2 encode.
    Gamma22Inv = 7,
}

impl CurveType {
    /// Number of curve types.
    pub const COUNT: usize = 8;

    /// All curve types in ascending id order.
    pub const ALL: [CurveType; Self::COUNT] = [
        CurveType::SrgbEotf,
        CurveType::SrgbInvEotf,
        CurveType::Pq125Eotf,
        CurveType::Pq125InvEotf,
        CurveType::Bt2020InvOetf,
        CurveType::Bt2020Oetf,
        CurveType::Gamma22,
        CurveType::Gamma22Inv,
    ];

    /// Numeric id.
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Looks up a curve by numeric id.
    pub fn from_id(id: u32) -> Result<Self, LutError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(LutError::UnknownCurve(id))
    }

    /// Human-readable name, as listed in the curve type property.
    pub fn name(self) -> &'static str {
        match self {
            Self::SrgbEotf => "sRGB EOTF",
            Self::SrgbInvEotf => "sRGB Inverse EOTF",
            Self::Pq125Eotf => "PQ 125 EOTF",
            Self::Pq125InvEotf => "PQ 125 Inverse EOTF",
            Self::Bt2020InvOetf => "BT.2020 Inverse OETF",
            Self::Bt2020Oetf => "BT.2020 OETF",
            Self::Gamma22 => "Gamma 2.2",
            Self::Gamma22Inv => "Gamma 2.2 Inverse",
        }
    }

    /// The curve undoing this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::SrgbEotf => Self::SrgbInvEotf,
            Self::SrgbInvEotf => Self::SrgbEotf,
            Self::Pq125Eotf => Self::Pq125InvEotf,
            Self::Pq125InvEotf => Self::Pq125Eotf,
            Self::Bt2020InvOetf => Self::Bt2020Oetf,
            Self::Bt2020Oetf => Self::Bt2020InvOetf,
            Self::Gamma22 => Self::Gamma22Inv,
            Self::Gamma22Inv => Self::Gamma22,
        }
    }

    /// Reference formula for this curve on normalized values.
    pub fn function(self) -> fn(f64) -> f64 {
        match self {
            Self::SrgbEotf => transfer::srgb_eotf,
            Self::SrgbInvEotf => transfer::srgb_inv_eotf,
            Self::Pq125Eotf => transfer::pq_eotf,
            Self::Pq125InvEotf => transfer::pq_inv_eotf,
            Self::Bt2020InvOetf => transfer::bt2020_inv_oetf,
            Self::Bt2020Oetf => transfer::bt2020_oetf,
            Self::Gamma22 => transfer::gamma22,
            Self::Gamma22Inv => transfer::gamma22_inv,
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for CurveType {
    type Error = LutError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

static TABLES: [OnceLock<ColorLut>; CurveType::COUNT] = [const { OnceLock::new() }; CurveType::COUNT];

/// Returns the precomputed sample table for `curve`.
///
/// Tables are generated on first use and shared afterwards.
pub fn curve_lut(curve: CurveType) -> &'static ColorLut {
    TABLES[curve.id() as usize].get_or_init(|| ColorLut::sampled(CURVE_LUT_SIZE, curve.function()))
}
