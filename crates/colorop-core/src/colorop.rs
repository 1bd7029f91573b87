//! Color operation nodes.
//!
//! A [`ColorOp`] is one stage of a surface's color pipeline. Its identity,
//! type and capabilities are fixed at construction; the only thing that
//! changes afterwards is its committed [`ColorOpState`], which is replaced
//! wholesale by transactions.
//!
//! Per-type capabilities live in [`ColorOpKind`], so a matrix node simply
//! has no curve fields and a curve node no LUT size.

use std::fmt;
use std::num::NonZeroU32;

use colorop_lut::{CurveType, LutInterpolation, LutRange};

use crate::caps::CurveTypeSet;
use crate::property::ColorOpProperty;
use crate::state::ColorOpState;

/// Stable identity of a color operation.
///
/// Ids are never zero; "no next stage" is `None`, which the property
/// interface reports as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorOpId(NonZeroU32);

impl ColorOpId {
    /// Wraps a raw id, `None` for zero.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Raw id.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ColorOpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the surface a color operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of stage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOpType {
    /// Named transfer function.
    OneDCurve,
    /// Custom equal-spaced 1D LUT.
    OneDCurveLut,
    /// 1D LUT described by a multi-segment range table.
    OneDCurveLutMultiSegment,
    /// 3x4 color transform matrix (3x3 plus offset column).
    Matrix3x4,
    /// 3x3 color transform matrix.
    Matrix3x3,
    /// Scalar gain.
    Multiplier,
}

impl ColorOpType {
    /// All types in enumeration order.
    pub const ALL: [ColorOpType; 6] = [
        ColorOpType::OneDCurve,
        ColorOpType::OneDCurveLut,
        ColorOpType::OneDCurveLutMultiSegment,
        ColorOpType::Matrix3x4,
        ColorOpType::Matrix3x3,
        ColorOpType::Multiplier,
    ];

    /// Human-readable name, as listed in the type property.
    pub fn name(self) -> &'static str {
        match self {
            Self::OneDCurve => "1D Curve",
            Self::OneDCurveLut => "1D Curve Custom LUT",
            Self::OneDCurveLutMultiSegment => "1D Curve Multi-Segment LUT",
            Self::Matrix3x4 => "3x4 Matrix",
            Self::Matrix3x3 => "3x3 Matrix",
            Self::Multiplier => "Multiplier",
        }
    }
}

impl fmt::Display for ColorOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Construction-time capabilities of a node, one variant per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorOpKind {
    /// Curve stage.
    Curve {
        /// Curves the stage can apply.
        supported: CurveTypeSet,
        /// Lowest supported curve, recorded at construction.
        default: CurveType,
    },
    /// Custom LUT stage.
    Lut {
        /// Number of LUT entries the stage expects.
        size: u32,
        /// Interpolation between entries.
        interpolation: LutInterpolation,
    },
    /// Multi-segment LUT stage.
    LutMultiSegment {
        /// Read-only range table.
        ranges: Vec<LutRange>,
    },
    /// 3x4 matrix stage.
    Matrix3x4,
    /// 3x3 matrix stage.
    Matrix3x3,
    /// Multiplier stage.
    Multiplier,
}

impl ColorOpKind {
    /// Stage type.
    pub fn op_type(&self) -> ColorOpType {
        match self {
            Self::Curve { .. } => ColorOpType::OneDCurve,
            Self::Lut { .. } => ColorOpType::OneDCurveLut,
            Self::LutMultiSegment { .. } => ColorOpType::OneDCurveLutMultiSegment,
            Self::Matrix3x4 => ColorOpType::Matrix3x4,
            Self::Matrix3x3 => ColorOpType::Matrix3x3,
            Self::Multiplier => ColorOpType::Multiplier,
        }
    }
}

/// One stage of a color pipeline.
#[derive(Debug)]
pub struct ColorOp {
    pub(crate) id: ColorOpId,
    pub(crate) surface: SurfaceId,
    pub(crate) index: u32,
    pub(crate) kind: ColorOpKind,
    pub(crate) allow_bypass: bool,
    pub(crate) next: Option<ColorOpId>,
    pub(crate) state: Option<ColorOpState>,
}

impl ColorOp {
    pub(crate) fn new(
        id: ColorOpId,
        surface: SurfaceId,
        index: u32,
        kind: ColorOpKind,
        allow_bypass: bool,
    ) -> Self {
        let mut op = Self {
            id,
            surface,
            index,
            kind,
            allow_bypass,
            next: None,
            state: None,
        };
        op.state = Some(ColorOpState::default_for(&op));
        op
    }

    /// Identity.
    #[inline]
    pub fn id(&self) -> ColorOpId {
        self.id
    }

    /// Owning surface.
    #[inline]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Registration order within the registry.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Stage type.
    #[inline]
    pub fn op_type(&self) -> ColorOpType {
        self.kind.op_type()
    }

    /// Construction-time capabilities.
    #[inline]
    pub fn kind(&self) -> &ColorOpKind {
        &self.kind
    }

    /// Whether the stage exposes a bypass control.
    #[inline]
    pub fn allow_bypass(&self) -> bool {
        self.allow_bypass
    }

    /// Following stage, `None` for the last one.
    #[inline]
    pub fn next(&self) -> Option<ColorOpId> {
        self.next
    }

    /// Committed state.
    #[inline]
    pub fn state(&self) -> Option<&ColorOpState> {
        self.state.as_ref()
    }

    /// Curve selected when nothing has been configured yet.
    pub fn default_curve(&self) -> Option<CurveType> {
        match &self.kind {
            ColorOpKind::Curve { default, .. } => Some(*default),
            _ => None,
        }
    }

    /// Properties this node exposes, in attachment order.
    pub fn properties(&self) -> Vec<ColorOpProperty> {
        let mut props = vec![ColorOpProperty::Type];
        if self.allow_bypass {
            props.push(ColorOpProperty::Bypass);
        }
        match &self.kind {
            ColorOpKind::Curve { .. } => props.push(ColorOpProperty::CurveType),
            ColorOpKind::Lut { .. } => props.extend([
                ColorOpProperty::Size,
                ColorOpProperty::Interpolation,
                ColorOpProperty::Data,
            ]),
            ColorOpKind::LutMultiSegment { .. } => {
                props.extend([ColorOpProperty::Capabilities, ColorOpProperty::Data])
            }
            ColorOpKind::Matrix3x4 | ColorOpKind::Matrix3x3 => props.push(ColorOpProperty::Data),
            ColorOpKind::Multiplier => props.push(ColorOpProperty::Multiplier),
        }
        props.push(ColorOpProperty::Next);
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(kind: ColorOpKind, allow_bypass: bool) -> ColorOp {
        ColorOp::new(ColorOpId::new(1).unwrap(), SurfaceId(1), 0, kind, allow_bypass)
    }

    #[test]
    fn test_id_zero_is_none() {
        assert!(ColorOpId::new(0).is_none());
        let id = ColorOpId::new(5).unwrap();
        assert_eq!(id.get(), 5);
        assert_eq!(id.to_string(), "5");
    }

    #[test]
    fn test_new_has_state() {
        let o = op(ColorOpKind::Multiplier, false);
        assert!(o.state().is_some());
        assert_eq!(o.next(), None);
    }

    #[test]
    fn test_properties_per_type() {
        let curve = op(
            ColorOpKind::Curve {
                supported: CurveTypeSet::all(),
                default: CurveType::SrgbEotf,
            },
            true,
        );
        assert_eq!(
            curve.properties(),
            vec![
                ColorOpProperty::Type,
                ColorOpProperty::Bypass,
                ColorOpProperty::CurveType,
                ColorOpProperty::Next
            ]
        );

        let matrix = op(ColorOpKind::Matrix3x3, false);
        assert!(!matrix.properties().contains(&ColorOpProperty::Bypass));
        assert!(matrix.properties().contains(&ColorOpProperty::Data));
    }

    #[test]
    fn test_type_names() {
        for t in ColorOpType::ALL {
            assert!(!t.name().is_empty());
        }
        assert_eq!(ColorOpKind::Matrix3x4.op_type(), ColorOpType::Matrix3x4);
    }
}
