//! All-or-nothing pipeline assembly.
//!
//! A pipeline is described as an ordered list of [`StageDesc`]s. Building it
//! registers one node per stage and links each to the next. If any stage
//! fails, every node registered by that build is released again before the
//! error is returned, so a failed build leaves the registry exactly as it
//! found it.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::{build_pipeline, hdr_plane_pipeline, ColorOpRegistry, SurfaceId};
//!
//! let mut reg = ColorOpRegistry::new();
//! let entry = build_pipeline(&mut reg, SurfaceId(1), &hdr_plane_pipeline()).unwrap();
//! assert_eq!(entry.name, format!("Color Pipeline {}", entry.head));
//! assert_eq!(reg.chain_from(entry.head).unwrap().len(), 7);
//! ```

use colorop_lut::{ranges_to_blob, CurveType, LutInterpolation, LutRange};
use tracing::{debug, error};

use crate::caps::CurveTypeSet;
use crate::colorop::{ColorOpId, ColorOpType, SurfaceId};
use crate::registry::{ColorOpRegistry, MAX_COLOR_LUT_ENTRIES};
use crate::{ColorOpError, ColorOpResult};

/// Maximum number of stages in one pipeline.
pub const MAX_COLOR_PIPELINE_OPS: usize = 10;

/// Description of one stage to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDesc {
    /// Named curve stage.
    Curve {
        /// Raw capability bitmask, validated at build time.
        supported: u64,
        /// Whether the stage exposes bypass.
        allow_bypass: bool,
    },
    /// Custom LUT stage.
    Lut {
        /// Number of entries.
        size: u32,
        /// Interpolation between entries.
        interpolation: LutInterpolation,
        /// Whether the stage exposes bypass.
        allow_bypass: bool,
    },
    /// Multi-segment LUT stage.
    LutMultiSegment {
        /// Range table.
        ranges: Vec<LutRange>,
        /// Whether the stage exposes bypass.
        allow_bypass: bool,
    },
    /// 3x4 matrix stage.
    Matrix3x4 {
        /// Whether the stage exposes bypass.
        allow_bypass: bool,
    },
    /// 3x3 matrix stage.
    Matrix3x3 {
        /// Whether the stage exposes bypass.
        allow_bypass: bool,
    },
    /// Multiplier stage.
    Multiplier {
        /// Whether the stage exposes bypass.
        allow_bypass: bool,
    },
}

impl StageDesc {
    /// Bypassable curve stage supporting `curves`.
    pub fn curve(curves: CurveTypeSet) -> Self {
        Self::Curve {
            supported: curves.bits(),
            allow_bypass: true,
        }
    }

    /// Bypassable linear LUT stage of `size` entries.
    pub fn lut(size: u32) -> Self {
        Self::Lut {
            size,
            interpolation: LutInterpolation::Linear,
            allow_bypass: true,
        }
    }

    /// Type of the node this stage builds.
    pub fn op_type(&self) -> ColorOpType {
        match self {
            Self::Curve { .. } => ColorOpType::OneDCurve,
            Self::Lut { .. } => ColorOpType::OneDCurveLut,
            Self::LutMultiSegment { .. } => ColorOpType::OneDCurveLutMultiSegment,
            Self::Matrix3x4 { .. } => ColorOpType::Matrix3x4,
            Self::Matrix3x3 { .. } => ColorOpType::Matrix3x3,
            Self::Multiplier { .. } => ColorOpType::Multiplier,
        }
    }

    fn register(&self, registry: &mut ColorOpRegistry, surface: SurfaceId) -> ColorOpResult<ColorOpId> {
        match self {
            Self::Curve {
                supported,
                allow_bypass,
            } => registry.init_curve_bits(surface, *supported, *allow_bypass),
            Self::Lut {
                size,
                interpolation,
                allow_bypass,
            } => registry.init_lut(surface, *size, *interpolation, *allow_bypass),
            Self::LutMultiSegment {
                ranges,
                allow_bypass,
            } => registry.init_lut_multi_segment(surface, &ranges_to_blob(ranges), *allow_bypass),
            Self::Matrix3x4 { allow_bypass } => registry.init_matrix_3x4(surface, *allow_bypass),
            Self::Matrix3x3 { allow_bypass } => registry.init_matrix_3x3(surface, *allow_bypass),
            Self::Multiplier { allow_bypass } => registry.init_multiplier(surface, *allow_bypass),
        }
    }
}

/// A built pipeline as listed in a surface's pipeline selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEntry {
    /// First stage.
    pub head: ColorOpId,
    /// Display name, `"Color Pipeline <head>"`.
    pub name: String,
}

impl PipelineEntry {
    pub(crate) fn new(head: ColorOpId) -> Self {
        Self {
            head,
            name: format!("Color Pipeline {head}"),
        }
    }
}

/// Releases everything registered through it unless disarmed.
struct RollbackGuard<'a> {
    registry: &'a mut ColorOpRegistry,
    created: Vec<ColorOpId>,
    armed: bool,
}

impl<'a> RollbackGuard<'a> {
    fn new(registry: &'a mut ColorOpRegistry) -> Self {
        Self {
            registry,
            created: Vec::new(),
            armed: true,
        }
    }

    fn into_created(mut self) -> Vec<ColorOpId> {
        self.armed = false;
        std::mem::take(&mut self.created)
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for id in self.created.iter().rev() {
            self.registry.remove(*id);
        }
        if !self.created.is_empty() {
            debug!(released = self.created.len(), "rolled back partial pipeline");
        }
    }
}

fn check_stage_count(len: usize) -> ColorOpResult<()> {
    if len == 0 {
        return Err(ColorOpError::invalid("pipeline has no stages"));
    }
    if len > MAX_COLOR_PIPELINE_OPS {
        return Err(ColorOpError::invalid(format!(
            "pipeline has {len} stages, at most {MAX_COLOR_PIPELINE_OPS} allowed"
        )));
    }
    Ok(())
}

/// Builds every stage in order and links them into one chain.
///
/// On failure nothing built by this call survives.
pub fn build_pipeline(
    registry: &mut ColorOpRegistry,
    surface: SurfaceId,
    stages: &[StageDesc],
) -> ColorOpResult<PipelineEntry> {
    check_stage_count(stages.len())?;

    let mut guard = RollbackGuard::new(registry);
    for (i, stage) in stages.iter().enumerate() {
        let result = stage.register(&mut *guard.registry, surface).and_then(|id| {
            guard.created.push(id);
            match guard.created.len() {
                0 | 1 => Ok(()),
                n => guard.registry.chain(guard.created[n - 2], id),
            }
        });
        if let Err(e) = result {
            error!(surface = surface.0, stage = i, op_type = %stage.op_type(), error = %e, "failed to build color pipeline");
            return Err(e);
        }
    }

    let created = guard.into_created();
    let head = *created
        .first()
        .ok_or_else(|| ColorOpError::invalid("pipeline has no stages"))?;
    debug!(surface = surface.0, head = head.get(), stages = created.len(), "built color pipeline");
    Ok(PipelineEntry::new(head))
}

/// Curves a degamma or blend stage linearizes with.
pub const HDR_DEGAMMA_CURVES: [CurveType; 3] = [
    CurveType::SrgbEotf,
    CurveType::Pq125Eotf,
    CurveType::Bt2020InvOetf,
];

/// Curves a shaper stage re-encodes with.
pub const HDR_SHAPER_CURVES: [CurveType; 3] = [
    CurveType::SrgbInvEotf,
    CurveType::Pq125InvEotf,
    CurveType::Bt2020Oetf,
];

fn curve_bits(curves: &[CurveType]) -> u64 {
    curves.iter().fold(0, |acc, c| acc | (1 << c.id()))
}

/// Seven-stage plane pipeline of an HDR-capable display engine.
///
/// Degamma curve, 3x4 matrix, multiplier, shaper curve, shaper LUT, blend
/// curve, blend LUT. Every stage supports bypass.
pub fn hdr_plane_pipeline() -> Vec<StageDesc> {
    let degamma = curve_bits(&HDR_DEGAMMA_CURVES);
    let shaper = curve_bits(&HDR_SHAPER_CURVES);
    vec![
        StageDesc::Curve {
            supported: degamma,
            allow_bypass: true,
        },
        StageDesc::Matrix3x4 { allow_bypass: true },
        StageDesc::Multiplier { allow_bypass: true },
        StageDesc::Curve {
            supported: shaper,
            allow_bypass: true,
        },
        StageDesc::lut(MAX_COLOR_LUT_ENTRIES),
        StageDesc::Curve {
            supported: degamma,
            allow_bypass: true,
        },
        StageDesc::lut(MAX_COLOR_LUT_ENTRIES),
    ]
}

/// Two curve stages that can decode and re-encode sRGB.
pub fn srgb_round_trip_pipeline() -> Vec<StageDesc> {
    let supported = curve_bits(&[CurveType::SrgbEotf, CurveType::SrgbInvEotf]);
    vec![
        StageDesc::Curve {
            supported,
            allow_bypass: true,
        };
        2
    ]
}
