//! # colorop-core
//!
//! Hardware-agnostic color pipelines for display scanout surfaces.
//!
//! A color pipeline is a chain of discrete stages (named curves, custom
//! LUTs, matrices, gain) that a display engine applies to a surface before
//! blending. This crate models the stages, builds pipelines all or nothing,
//! and manages their per-stage state transactionally.
//!
//! # Components
//!
//! - [`ColorOpRegistry`] - arena of stages, construction and state management
//! - [`build_pipeline`] and [`StageDesc`] - rollback-safe pipeline assembly
//! - [`Transaction`] - atomic multi-stage configuration changes
//! - [`Surface`] - pipeline selector of one scanout surface
//! - [`PipelineConfig`] - YAML pipeline descriptions
//! - [`ColorOpRegistry::apply_pipeline`] and [`CompiledPipeline`] - software evaluation of a committed chain
//!
//! # Usage
//!
//! ```rust
//! use colorop_core::{
//!     hdr_plane_pipeline, initialize_color_pipelines, ColorOpProperty, ColorOpRegistry,
//!     CurveType, PropertyValue, Surface, SurfaceId,
//! };
//!
//! let mut reg = ColorOpRegistry::new();
//! let mut plane = Surface::new(SurfaceId(31), "plane-0");
//! initialize_color_pipelines(&mut reg, &mut plane, &[hdr_plane_pipeline()]).unwrap();
//!
//! // Enable PQ decode on the first stage.
//! let head = plane.pipelines()[0].head;
//! let mut tx = reg.begin();
//! tx.set_property(head, ColorOpProperty::CurveType, PropertyValue::Curve(CurveType::Pq125Eotf)).unwrap();
//! tx.set_property(head, ColorOpProperty::Bypass, PropertyValue::Bool(false)).unwrap();
//! tx.commit().unwrap();
//!
//! plane.select_pipeline(head.get()).unwrap();
//! let out = reg.apply_pipeline(head, [0xffff, 0, 0]).unwrap();
//! assert_eq!(out, [0xffff, 0, 0]);
//! ```
//!
//! # Dependencies
//!
//! - [`colorop_lut`] - LUT and curve evaluation
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Diagnostics
//! - [`serde`], [`serde_yaml`] - Pipeline configuration files

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod apply;
mod caps;
mod colorop;
mod error;
mod matrix;
mod registry;
mod transaction;
pub mod config;
pub mod pipeline;
pub mod property;
pub mod state;
pub mod surface;

pub use apply::{apply_stage, CompiledPipeline};
pub use caps::CurveTypeSet;
pub use colorop::{ColorOp, ColorOpId, ColorOpKind, ColorOpType, SurfaceId};
pub use config::{PipelineConfig, PipelineSpec, StageConfig};
pub use error::{ColorOpError, ColorOpResult, ErrorKind};
pub use matrix::{apply_multiplier, ColorMatrix};
pub use pipeline::{
    build_pipeline, hdr_plane_pipeline, srgb_round_trip_pipeline, PipelineEntry, StageDesc,
    MAX_COLOR_PIPELINE_OPS,
};
pub use property::{ColorOpProperty, PropertyValue};
pub use registry::{ColorOpRegistry, DEFAULT_CAPACITY, MAX_COLOR_LUT_ENTRIES};
pub use state::{ColorOpState, StageParams};
pub use surface::{initialize_color_pipelines, Surface, MAX_COLOR_PIPELINES};
pub use transaction::Transaction;

pub use colorop_lut::{CurveType, LutEntry, LutInterpolation, LutRange};
