//! Transactional per-node parameter snapshots.
//!
//! Each [`ColorOp`] owns exactly one committed [`ColorOpState`]. A
//! transaction never edits it in place: it duplicates the state, edits the
//! copy, and swaps the copy in on commit. Duplicates and fresh defaults are
//! always bypassed (when the node supports bypass) so a proposed
//! configuration never enables a stage with stale parameters.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::{ColorOpRegistry, CurveTypeSet, SurfaceId};
//!
//! let mut reg = ColorOpRegistry::new();
//! let id = reg.init_curve(SurfaceId(1), CurveTypeSet::all(), true).unwrap();
//! let state = reg.duplicate_state(id).unwrap();
//! assert_eq!(state.bypass(), Some(true));
//! ```

use colorop_lut::{entries_from_blob, total_samples, CurveType, LutEntry, LutInterpolation, SegmentedLut};

use crate::colorop::{ColorOp, ColorOpId, ColorOpKind};
use crate::{ColorOpError, ColorOpResult};

/// Number of coefficients in a 3x4 matrix blob.
pub const MATRIX_3X4_COEFFS: usize = 12;
/// Number of coefficients in a 3x3 matrix blob.
pub const MATRIX_3X3_COEFFS: usize = 9;
/// Size of one encoded matrix coefficient.
pub const MATRIX_COEFF_SIZE: usize = 8;

/// Mutable parameters of a stage, one variant per node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageParams {
    /// Curve stage.
    Curve {
        /// Selected curve.
        curve: CurveType,
    },
    /// Custom LUT stage.
    Lut {
        /// Sample blob, `size` entries of [`LutEntry::BLOB_SIZE`] bytes.
        data: Option<Vec<u8>>,
        /// LUT length.
        size: u32,
        /// Interpolation between entries.
        interpolation: LutInterpolation,
    },
    /// Multi-segment LUT stage.
    LutMultiSegment {
        /// Sample blob covering every segment.
        data: Option<Vec<u8>>,
    },
    /// 3x4 matrix stage.
    Matrix3x4 {
        /// S31.32 sign-magnitude coefficients, row major.
        data: Option<Vec<u8>>,
    },
    /// 3x3 matrix stage.
    Matrix3x3 {
        /// S31.32 sign-magnitude coefficients, row major.
        data: Option<Vec<u8>>,
    },
    /// Multiplier stage.
    Multiplier {
        /// Unsigned U32.32 gain.
        multiplier: u64,
    },
}

impl StageParams {
    fn default_for(kind: &ColorOpKind) -> Self {
        match kind {
            ColorOpKind::Curve { default, .. } => Self::Curve { curve: *default },
            ColorOpKind::Lut { size, interpolation } => Self::Lut {
                data: None,
                size: *size,
                interpolation: *interpolation,
            },
            ColorOpKind::LutMultiSegment { .. } => Self::LutMultiSegment { data: None },
            ColorOpKind::Matrix3x4 => Self::Matrix3x4 { data: None },
            ColorOpKind::Matrix3x3 => Self::Matrix3x3 { data: None },
            ColorOpKind::Multiplier => Self::Multiplier { multiplier: 0 },
        }
    }

    fn matches(&self, kind: &ColorOpKind) -> bool {
        matches!(
            (self, kind),
            (Self::Curve { .. }, ColorOpKind::Curve { .. })
                | (Self::Lut { .. }, ColorOpKind::Lut { .. })
                | (Self::LutMultiSegment { .. }, ColorOpKind::LutMultiSegment { .. })
                | (Self::Matrix3x4 { .. }, ColorOpKind::Matrix3x4)
                | (Self::Matrix3x3 { .. }, ColorOpKind::Matrix3x3)
                | (Self::Multiplier { .. }, ColorOpKind::Multiplier)
        )
    }

    pub(crate) fn data_slot(&mut self) -> Option<&mut Option<Vec<u8>>> {
        match self {
            Self::Lut { data, .. }
            | Self::LutMultiSegment { data }
            | Self::Matrix3x4 { data }
            | Self::Matrix3x3 { data } => Some(data),
            Self::Curve { .. } | Self::Multiplier { .. } => None,
        }
    }
}

/// Expected length of the data blob of `kind`, `None` if it takes none.
pub fn expected_data_len(kind: &ColorOpKind) -> Option<usize> {
    match kind {
        ColorOpKind::Lut { size, .. } => Some(*size as usize * LutEntry::BLOB_SIZE),
        ColorOpKind::LutMultiSegment { ranges } => Some(total_samples(ranges) * LutEntry::BLOB_SIZE),
        ColorOpKind::Matrix3x4 => Some(MATRIX_3X4_COEFFS * MATRIX_COEFF_SIZE),
        ColorOpKind::Matrix3x3 => Some(MATRIX_3X3_COEFFS * MATRIX_COEFF_SIZE),
        ColorOpKind::Curve { .. } | ColorOpKind::Multiplier => None,
    }
}

/// Parameter snapshot of one color operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorOpState {
    pub(crate) colorop: ColorOpId,
    pub(crate) bypass: Option<bool>,
    pub(crate) params: StageParams,
}

impl ColorOpState {
    /// Fresh default state for `op`: bypassed if possible, default curve,
    /// no data, zero multiplier.
    pub(crate) fn default_for(op: &ColorOp) -> Self {
        Self {
            colorop: op.id,
            bypass: op.allow_bypass.then_some(true),
            params: StageParams::default_for(&op.kind),
        }
    }

    /// Independent copy with bypass forced on where supported.
    pub(crate) fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        if copy.bypass.is_some() {
            copy.bypass = Some(true);
        }
        copy
    }

    /// Checks that this state can be committed into `op`.
    pub(crate) fn validate_for(&self, op: &ColorOp) -> ColorOpResult<()> {
        if self.colorop != op.id {
            return Err(ColorOpError::invalid(format!(
                "state of color operation {} cannot be committed to {}",
                self.colorop, op.id
            )));
        }
        if self.bypass.is_some() != op.allow_bypass {
            return Err(ColorOpError::invalid("bypass presence does not match the node"));
        }
        if !self.params.matches(&op.kind) {
            return Err(ColorOpError::invalid(format!(
                "parameters do not match a {} node",
                op.op_type()
            )));
        }
        if let (StageParams::Curve { curve }, ColorOpKind::Curve { supported, .. }) =
            (&self.params, &op.kind)
        {
            if !supported.contains(*curve) {
                return Err(ColorOpError::invalid(format!("curve {curve} is not supported")));
            }
        }
        if let (StageParams::LutMultiSegment { data: Some(data) }, ColorOpKind::LutMultiSegment { ranges }) =
            (&self.params, &op.kind)
        {
            SegmentedLut::new(ranges.clone(), entries_from_blob(data)?)?;
        }
        Ok(())
    }

    /// Owning color operation.
    #[inline]
    pub fn colorop(&self) -> ColorOpId {
        self.colorop
    }

    /// Bypass flag, `None` when the node has no bypass control.
    #[inline]
    pub fn bypass(&self) -> Option<bool> {
        self.bypass
    }

    /// Whether the stage currently acts as a pass-through.
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypass.unwrap_or(false)
    }

    /// Stage parameters.
    #[inline]
    pub fn params(&self) -> &StageParams {
        &self.params
    }

    /// Selected curve of a curve stage.
    pub fn curve(&self) -> Option<CurveType> {
        match self.params {
            StageParams::Curve { curve } => Some(curve),
            _ => None,
        }
    }

    /// Parameter blob of a LUT or matrix stage.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.params {
            StageParams::Lut { data, .. }
            | StageParams::LutMultiSegment { data }
            | StageParams::Matrix3x4 { data }
            | StageParams::Matrix3x3 { data } => data.as_deref(),
            StageParams::Curve { .. } | StageParams::Multiplier { .. } => None,
        }
    }

    /// Gain of a multiplier stage.
    pub fn multiplier(&self) -> Option<u64> {
        match self.params {
            StageParams::Multiplier { multiplier } => Some(multiplier),
            _ => None,
        }
    }

    /// Length of a LUT stage.
    pub fn lut_size(&self) -> Option<u32> {
        match self.params {
            StageParams::Lut { size, .. } => Some(size),
            _ => None,
        }
    }

    /// Interpolation of a LUT stage.
    pub fn interpolation(&self) -> Option<LutInterpolation> {
        match self.params {
            StageParams::Lut { interpolation, .. } => Some(interpolation),
            _ => None,
        }
    }
}
