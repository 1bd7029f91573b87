//! Property interface of color operations.
//!
//! Surfaces and downstream consumers see a color operation as a set of named
//! properties. Immutable ones (type, size, capabilities, interpolation, next)
//! describe the node; mutable ones are backed by its state and can only be
//! changed through a transaction.

use std::fmt;

use colorop_lut::{entries_from_blob, ranges_to_blob, CurveType, LutInterpolation, SegmentedLut};

use crate::colorop::{ColorOp, ColorOpId, ColorOpKind, ColorOpType};
use crate::state::{expected_data_len, ColorOpState, StageParams};
use crate::{ColorOpError, ColorOpResult};

/// Properties a color operation may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOpProperty {
    /// Stage type (immutable).
    Type,
    /// Pass-through flag.
    Bypass,
    /// Selected named curve of a curve stage.
    CurveType,
    /// Parameter blob: LUT samples or matrix coefficients.
    Data,
    /// LUT length (immutable).
    Size,
    /// Multi-segment range table (immutable).
    Capabilities,
    /// Gain of a multiplier stage.
    Multiplier,
    /// LUT interpolation (immutable).
    Interpolation,
    /// Following stage (immutable).
    Next,
}

impl ColorOpProperty {
    /// Property name as exposed to clients.
    pub fn name(self) -> &'static str {
        match self {
            Self::Type => "TYPE",
            Self::Bypass => "BYPASS",
            Self::CurveType => "CURVE_1D_TYPE",
            Self::Data => "DATA",
            Self::Size => "SIZE",
            Self::Capabilities => "CAPABILITIES",
            Self::Multiplier => "MULTIPLIER",
            Self::Interpolation => "LUT1D_INTERPOLATION",
            Self::Next => "NEXT",
        }
    }

    /// Whether the property is fixed at construction.
    pub fn is_immutable(self) -> bool {
        matches!(
            self,
            Self::Type | Self::Size | Self::Capabilities | Self::Interpolation | Self::Next
        )
    }
}

impl fmt::Display for ColorOpProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Stage type.
    Type(ColorOpType),
    /// Boolean flag.
    Bool(bool),
    /// Named curve.
    Curve(CurveType),
    /// Optional blob.
    Blob(Option<Vec<u8>>),
    /// Unsigned integer.
    U32(u32),
    /// Unsigned 64-bit integer (fixed-point gain).
    U64(u64),
    /// Interpolation mode.
    Interpolation(LutInterpolation),
    /// Reference to another color operation.
    Object(Option<ColorOpId>),
}

impl PropertyValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Bool(_) => "bool",
            Self::Curve(_) => "curve",
            Self::Blob(_) => "blob",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::Interpolation(_) => "interpolation",
            Self::Object(_) => "object",
        }
    }
}

fn not_attached(op: &ColorOp, prop: ColorOpProperty) -> ColorOpError {
    ColorOpError::invalid(format!(
        "{} node {} has no {} property",
        op.op_type(),
        op.id(),
        prop
    ))
}

/// Reads `prop` from `op` and its committed state.
pub(crate) fn get(op: &ColorOp, prop: ColorOpProperty) -> ColorOpResult<PropertyValue> {
    if !op.properties().contains(&prop) {
        return Err(not_attached(op, prop));
    }
    if !prop.is_immutable() {
        let state = op.state().ok_or_else(|| {
            ColorOpError::InvalidState(format!("color operation {} has no state", op.id()))
        })?;
        return state.get_property(prop).ok_or_else(|| not_attached(op, prop));
    }
    Ok(match (&op.kind, prop) {
        (_, ColorOpProperty::Type) => PropertyValue::Type(op.op_type()),
        (_, ColorOpProperty::Next) => PropertyValue::Object(op.next()),
        (ColorOpKind::Lut { size, .. }, ColorOpProperty::Size) => PropertyValue::U32(*size),
        (ColorOpKind::Lut { interpolation, .. }, ColorOpProperty::Interpolation) => {
            PropertyValue::Interpolation(*interpolation)
        }
        (ColorOpKind::LutMultiSegment { ranges }, ColorOpProperty::Capabilities) => {
            PropertyValue::Blob(Some(ranges_to_blob(ranges)))
        }
        _ => return Err(not_attached(op, prop)),
    })
}

impl ColorOpState {
    /// Reads a state-backed property.
    pub fn get_property(&self, prop: ColorOpProperty) -> Option<PropertyValue> {
        match (prop, &self.params) {
            (ColorOpProperty::Bypass, _) => self.bypass.map(PropertyValue::Bool),
            (ColorOpProperty::CurveType, StageParams::Curve { curve }) => {
                Some(PropertyValue::Curve(*curve))
            }
            (ColorOpProperty::Multiplier, StageParams::Multiplier { multiplier }) => {
                Some(PropertyValue::U64(*multiplier))
            }
            (
                ColorOpProperty::Data,
                StageParams::Lut { data, .. }
                | StageParams::LutMultiSegment { data }
                | StageParams::Matrix3x4 { data }
                | StageParams::Matrix3x3 { data },
            ) => Some(PropertyValue::Blob(data.clone())),
            _ => None,
        }
    }

    /// Writes a state-backed property after validating it against `op`.
    ///
    /// Immutable properties, properties the node does not expose, values of
    /// the wrong kind, unsupported curves, data blobs of the wrong length and
    /// multi-segment samples that break their range's ordering flag are
    /// rejected and leave the state untouched.
    pub fn set_property(
        &mut self,
        op: &ColorOp,
        prop: ColorOpProperty,
        value: PropertyValue,
    ) -> ColorOpResult<()> {
        if self.colorop != op.id() {
            return Err(ColorOpError::invalid(format!(
                "state of color operation {} used with {}",
                self.colorop,
                op.id()
            )));
        }
        if prop.is_immutable() {
            return Err(ColorOpError::invalid(format!("{prop} is immutable")));
        }
        if !op.properties().contains(&prop) {
            return Err(not_attached(op, prop));
        }
        let mismatch = |v: &PropertyValue| {
            ColorOpError::invalid(format!("{prop} does not accept a {} value", v.kind_name()))
        };

        match (prop, value) {
            (ColorOpProperty::Bypass, PropertyValue::Bool(b)) => {
                self.bypass = Some(b);
            }
            (ColorOpProperty::CurveType, PropertyValue::Curve(curve)) => {
                let supported = match &op.kind {
                    ColorOpKind::Curve { supported, .. } => *supported,
                    _ => return Err(not_attached(op, prop)),
                };
                if !supported.contains(curve) {
                    return Err(ColorOpError::invalid(format!(
                        "curve {curve} is not supported by color operation {}",
                        op.id()
                    )));
                }
                self.params = StageParams::Curve { curve };
            }
            (ColorOpProperty::Multiplier, PropertyValue::U64(m)) => {
                self.params = StageParams::Multiplier { multiplier: m };
            }
            (ColorOpProperty::Data, PropertyValue::Blob(blob)) => {
                if let (Some(b), Some(expected)) = (&blob, expected_data_len(&op.kind)) {
                    if b.len() != expected {
                        return Err(ColorOpError::invalid(format!(
                            "{} data must be {expected} bytes, got {}",
                            op.op_type(),
                            b.len()
                        )));
                    }
                }
                if let (Some(b), ColorOpKind::LutMultiSegment { ranges }) = (&blob, &op.kind) {
                    SegmentedLut::new(ranges.clone(), entries_from_blob(b)?)?;
                }
                let slot = self.params.data_slot().ok_or_else(|| not_attached(op, prop))?;
                *slot = blob;
            }
            (_, v) => return Err(mismatch(&v)),
        }
        Ok(())
    }
}
