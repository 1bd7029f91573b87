//! YAML pipeline configuration.
//!
//! Describes the pipelines a surface should offer without writing code:
//!
//! ```yaml
//! pipelines:
//!   - stages:
//!       - { type: curve, curves: [srgb_eotf, pq_125_eotf] }
//!       - { type: matrix3x4 }
//!       - { type: multiplier, bypass: false }
//!       - { type: lut, size: 4096, interpolation: linear }
//! ```
//!
//! Every stage supports bypass unless `bypass: false` is given.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::{ColorOpRegistry, PipelineConfig, Surface, SurfaceId};
//!
//! let yaml = r#"
//! pipelines:
//!   - stages:
//!       - { type: curve, curves: [srgb_eotf, srgb_inv_eotf] }
//!       - { type: curve, curves: [srgb_eotf, srgb_inv_eotf] }
//! "#;
//! let config = PipelineConfig::from_yaml_str(yaml).unwrap();
//!
//! let mut reg = ColorOpRegistry::new();
//! let mut surface = Surface::new(SurfaceId(1), "plane-0");
//! config.install(&mut reg, &mut surface).unwrap();
//! assert_eq!(surface.pipeline_enum().len(), 2);
//! ```

use std::path::Path;

use colorop_lut::{validate_ranges, CurveType, LutInterpolation, LutRange};
use serde::Deserialize;

use crate::caps::CurveTypeSet;
use crate::pipeline::{StageDesc, MAX_COLOR_PIPELINE_OPS};
use crate::registry::{ColorOpRegistry, MAX_COLOR_LUT_ENTRIES};
use crate::surface::{initialize_color_pipelines, Surface, MAX_COLOR_PIPELINES};
use crate::{ColorOpError, ColorOpResult};

fn default_bypass() -> bool {
    true
}

/// Pipelines to build for one surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// Pipelines in selector order.
    #[serde(default)]
    pub pipelines: Vec<PipelineSpec>,
}

/// One pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineSpec {
    /// Stages from first to last.
    pub stages: Vec<StageConfig>,
}

/// One stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageConfig {
    /// Named curve stage.
    Curve {
        /// Supported curves.
        curves: Vec<CurveType>,
        /// Whether the stage exposes bypass.
        #[serde(default = "default_bypass")]
        bypass: bool,
    },
    /// Custom LUT stage.
    Lut {
        /// Number of entries.
        size: u32,
        /// Interpolation, linear by default.
        #[serde(default)]
        interpolation: LutInterpolation,
        /// Whether the stage exposes bypass.
        #[serde(default = "default_bypass")]
        bypass: bool,
    },
    /// Multi-segment LUT stage.
    LutMultiSegment {
        /// Range table.
        ranges: Vec<LutRange>,
        /// Whether the stage exposes bypass.
        #[serde(default = "default_bypass")]
        bypass: bool,
    },
    /// 3x4 matrix stage.
    #[serde(rename = "matrix3x4")]
    Matrix3x4 {
        /// Whether the stage exposes bypass.
        #[serde(default = "default_bypass")]
        bypass: bool,
    },
    /// 3x3 matrix stage.
    #[serde(rename = "matrix3x3")]
    Matrix3x3 {
        /// Whether the stage exposes bypass.
        #[serde(default = "default_bypass")]
        bypass: bool,
    },
    /// Multiplier stage.
    Multiplier {
        /// Whether the stage exposes bypass.
        #[serde(default = "default_bypass")]
        bypass: bool,
    },
}

impl StageConfig {
    fn to_stage(&self) -> ColorOpResult<StageDesc> {
        Ok(match self {
            Self::Curve { curves, bypass } => StageDesc::Curve {
                supported: CurveTypeSet::new(curves.iter().copied())?.bits(),
                allow_bypass: *bypass,
            },
            Self::Lut {
                size,
                interpolation,
                bypass,
            } => {
                if *size == 0 || *size > MAX_COLOR_LUT_ENTRIES {
                    return Err(ColorOpError::invalid(format!(
                        "LUT size {size} outside 1..={MAX_COLOR_LUT_ENTRIES}"
                    )));
                }
                StageDesc::Lut {
                    size: *size,
                    interpolation: *interpolation,
                    allow_bypass: *bypass,
                }
            }
            Self::LutMultiSegment { ranges, bypass } => {
                validate_ranges(ranges)?;
                StageDesc::LutMultiSegment {
                    ranges: ranges.clone(),
                    allow_bypass: *bypass,
                }
            }
            Self::Matrix3x4 { bypass } => StageDesc::Matrix3x4 {
                allow_bypass: *bypass,
            },
            Self::Matrix3x3 { bypass } => StageDesc::Matrix3x3 {
                allow_bypass: *bypass,
            },
            Self::Multiplier { bypass } => StageDesc::Multiplier {
                allow_bypass: *bypass,
            },
        })
    }
}

impl PipelineConfig {
    /// Parses a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> ColorOpResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ColorOpResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Validates the configuration and converts it into stage lists.
    pub fn to_stage_lists(&self) -> ColorOpResult<Vec<Vec<StageDesc>>> {
        if self.pipelines.len() > MAX_COLOR_PIPELINES {
            return Err(ColorOpError::invalid(format!(
                "{} pipelines configured, at most {MAX_COLOR_PIPELINES} allowed",
                self.pipelines.len()
            )));
        }
        self.pipelines
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.stages.is_empty() || p.stages.len() > MAX_COLOR_PIPELINE_OPS {
                    return Err(ColorOpError::invalid(format!(
                        "pipeline {i} has {} stages, expected 1..={MAX_COLOR_PIPELINE_OPS}",
                        p.stages.len()
                    )));
                }
                p.stages.iter().map(StageConfig::to_stage).collect()
            })
            .collect()
    }

    /// Builds every configured pipeline for `surface`, all or nothing.
    pub fn install(&self, registry: &mut ColorOpRegistry, surface: &mut Surface) -> ColorOpResult<()> {
        let lists = self.to_stage_lists()?;
        initialize_color_pipelines(registry, surface, &lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_parse_all_stage_types() {
        let yaml = r#"
pipelines:
  - stages:
      - { type: curve, curves: [pq_125_eotf, bt2020_inv_oetf] }
      - { type: matrix3x4, bypass: false }
      - { type: matrix3x3 }
      - { type: multiplier }
      - { type: lut, size: 17, interpolation: nearest }
      - type: lut_multi_segment
        ranges:
          - { flags: 1, count: 5, input_bpc: 12, output_bpc: 12, start: 0, end: 65535, min: 0, max: 65535 }
"#;
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        let lists = config.to_stage_lists().unwrap();
        assert_eq!(lists.len(), 1);
        let stages = &lists[0];
        assert_eq!(stages.len(), 6);
        assert_eq!(
            stages[0],
            StageDesc::Curve {
                supported: (1 << 2) | (1 << 4),
                allow_bypass: true
            }
        );
        assert_eq!(stages[1], StageDesc::Matrix3x4 { allow_bypass: false });
        assert_eq!(
            stages[4],
            StageDesc::Lut {
                size: 17,
                interpolation: LutInterpolation::Nearest,
                allow_bypass: true
            }
        );
        assert!(matches!(&stages[5], StageDesc::LutMultiSegment { ranges, .. } if ranges[0].count == 5));
    }

    #[test]
    fn test_empty_curve_list_rejected() {
        let config =
            PipelineConfig::from_yaml_str("pipelines: [ { stages: [ { type: curve, curves: [] } ] } ]").unwrap();
        let err = config.to_stage_lists().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_unknown_stage_type() {
        let err = PipelineConfig::from_yaml_str("pipelines: [ { stages: [ { type: blur } ] } ]").unwrap_err();
        assert!(matches!(err, ColorOpError::Yaml(_)));
    }

    #[test]
    fn test_lut_size_bounds() {
        let config =
            PipelineConfig::from_yaml_str("pipelines: [ { stages: [ { type: lut, size: 5000 } ] } ]").unwrap();
        assert!(config.to_stage_lists().is_err());
    }

    #[test]
    fn test_empty_config() {
        let config = PipelineConfig::from_yaml_str("{}").unwrap();
        assert!(config.pipelines.is_empty());
        assert!(config.to_stage_lists().unwrap().is_empty());
    }
}
