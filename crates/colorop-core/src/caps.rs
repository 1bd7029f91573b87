//! Validated capability sets for curve stages.
//!
//! A curve stage advertises which named transfer functions it can apply.
//! [`CurveTypeSet`] only ever holds known [`CurveType`]s and is never empty,
//! so a stage built from one always has a well-defined default: the member
//! with the lowest id.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::{CurveType, CurveTypeSet};
//!
//! let set = CurveTypeSet::new([CurveType::Bt2020InvOetf, CurveType::SrgbEotf]).unwrap();
//! assert_eq!(set.first(), CurveType::SrgbEotf);
//! assert!(CurveTypeSet::from_bits(0).is_err());
//! assert!(CurveTypeSet::from_bits(1 << 40).is_err());
//! ```

use std::fmt;

use colorop_lut::CurveType;

use crate::{ColorOpError, ColorOpResult};

const ALL_BITS: u64 = (1u64 << CurveType::COUNT) - 1;

/// Non-empty set of supported curve types.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveTypeSet(u64);

impl CurveTypeSet {
    /// Builds a set from a raw bitmask (bit `n` = curve id `n`).
    ///
    /// Fails if the mask is empty or names an unknown curve.
    pub fn from_bits(bits: u64) -> ColorOpResult<Self> {
        if bits == 0 {
            return Err(ColorOpError::invalid("curve capability set is empty"));
        }
        if bits & !ALL_BITS != 0 {
            return Err(ColorOpError::invalid(format!(
                "curve capability set {bits:#x} contains unknown curve types"
            )));
        }
        Ok(Self(bits))
    }

    /// Builds a set from curve types.
    pub fn new(curves: impl IntoIterator<Item = CurveType>) -> ColorOpResult<Self> {
        let bits = curves.into_iter().fold(0u64, |acc, c| acc | (1 << c.id()));
        Self::from_bits(bits)
    }

    /// Every known curve type.
    pub fn all() -> Self {
        Self(ALL_BITS)
    }

    /// Raw bitmask.
    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Whether `curve` is in the set.
    #[inline]
    pub fn contains(self, curve: CurveType) -> bool {
        self.0 & (1 << curve.id()) != 0
    }

    /// Number of members.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Always false.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in ascending id order.
    pub fn iter(self) -> impl Iterator<Item = CurveType> {
        CurveType::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Member with the lowest id; the default selection of a curve stage.
    pub fn first(self) -> CurveType {
        // Non-empty and within ALL_BITS by construction.
        CurveType::ALL[self.0.trailing_zeros() as usize]
    }
}

impl fmt::Debug for CurveTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl TryFrom<u64> for CurveTypeSet {
    type Error = ColorOpError;

    fn try_from(bits: u64) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}
