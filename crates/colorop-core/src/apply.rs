//! Software evaluation of committed pipelines.
//!
//! Runs one RGB triple of 16-bit codes through a chain using each node's
//! committed state, exactly as a display engine programmed from that state
//! would. Useful for previews and for checking a configuration before it is
//! handed to hardware.

use colorop_lut::{apply_lut, curve_lut, entries_from_blob, ColorLut, LutInterpolation, SegmentedLut};

use crate::colorop::{ColorOp, ColorOpId, ColorOpKind};
use crate::matrix::{apply_multiplier, ColorMatrix};
use crate::registry::ColorOpRegistry;
use crate::state::StageParams;
use crate::{ColorOpError, ColorOpResult};

/// One stage with its parameter blob decoded.
#[derive(Debug, Clone)]
enum Stage {
    PassThrough,
    Curve(&'static ColorLut),
    Lut(ColorLut, LutInterpolation),
    Segmented(SegmentedLut),
    Matrix(ColorMatrix),
    Multiplier(u64),
}

impl Stage {
    fn decode(op: &ColorOp) -> ColorOpResult<Self> {
        let state = op.state().ok_or_else(|| {
            ColorOpError::InvalidState(format!("color operation {} has no state", op.id()))
        })?;
        if state.is_bypassed() {
            return Ok(Self::PassThrough);
        }

        Ok(match (state.params(), op.kind()) {
            (StageParams::Curve { curve }, _) => Self::Curve(curve_lut(*curve)),
            (
                StageParams::Lut {
                    data: Some(data),
                    interpolation,
                    ..
                },
                _,
            ) => Self::Lut(ColorLut::from_blob(data)?, *interpolation),
            (StageParams::LutMultiSegment { data: Some(data) }, ColorOpKind::LutMultiSegment { ranges }) => {
                Self::Segmented(SegmentedLut::new(ranges.clone(), entries_from_blob(data)?)?)
            }
            (StageParams::Matrix3x4 { data: Some(data) }, _) => Self::Matrix(ColorMatrix::from_blob_3x4(data)?),
            (StageParams::Matrix3x3 { data: Some(data) }, _) => Self::Matrix(ColorMatrix::from_blob_3x3(data)?),
            (StageParams::Multiplier { multiplier }, _) => Self::Multiplier(*multiplier),
            _ => Self::PassThrough,
        })
    }

    fn apply(&self, rgb: [u16; 3]) -> [u16; 3] {
        match self {
            Self::PassThrough => rgb,
            Self::Curve(lut) => apply_lut(lut, rgb),
            Self::Lut(lut, interpolation) => lut.apply_with(rgb, *interpolation),
            Self::Segmented(lut) => lut.apply(rgb),
            Self::Matrix(m) => m.apply(rgb),
            Self::Multiplier(gain) => rgb.map(|v| apply_multiplier(v, *gain)),
        }
    }
}

/// A committed chain with every stage decoded, ready to evaluate many pixels.
///
/// The snapshot does not follow later commits; compile again after a
/// transaction changes the chain.
#[derive(Debug, Clone)]
pub struct CompiledPipeline {
    stages: Vec<Stage>,
}

impl CompiledPipeline {
    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; a chain has at least its head.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs one RGB triple through every stage.
    pub fn apply(&self, rgb: [u16; 3]) -> [u16; 3] {
        self.stages.iter().fold(rgb, |px, stage| stage.apply(px))
    }

    /// Runs every pixel of `pixels` through the chain in place.
    pub fn apply_all(&self, pixels: &mut [[u16; 3]]) {
        for px in pixels {
            *px = self.apply(*px);
        }
    }
}

/// Applies one node's committed state to `rgb`.
///
/// Bypassed stages and LUT or matrix stages without data pass the input
/// through unchanged. Decodes the node's blob on every call; use
/// [`ColorOpRegistry::compile_pipeline`] to evaluate many pixels.
pub fn apply_stage(op: &ColorOp, rgb: [u16; 3]) -> ColorOpResult<[u16; 3]> {
    Ok(Stage::decode(op)?.apply(rgb))
}

impl ColorOpRegistry {
    /// Decodes the committed chain starting at `head`.
    pub fn compile_pipeline(&self, head: ColorOpId) -> ColorOpResult<CompiledPipeline> {
        let stages = self
            .chain_from(head)?
            .into_iter()
            .map(|id| Stage::decode(self.try_get(id)?))
            .collect::<ColorOpResult<Vec<_>>>()?;
        Ok(CompiledPipeline { stages })
    }

    /// Runs `rgb` through the chain starting at `head`.
    pub fn apply_pipeline(&self, head: ColorOpId, rgb: [u16; 3]) -> ColorOpResult<[u16; 3]> {
        Ok(self.compile_pipeline(head)?.apply(rgb))
    }
}
