//! Scanout surfaces and their pipeline selector.
//!
//! A [`Surface`] lists the pipelines built for it and which one is active.
//! Clients see the list as an enumeration whose first value, `0`, means
//! "Bypass" and whose other values are pipeline head ids.

use tracing::debug;

use crate::colorop::{ColorOpId, SurfaceId};
use crate::pipeline::{build_pipeline, PipelineEntry, StageDesc};
use crate::registry::ColorOpRegistry;
use crate::{ColorOpError, ColorOpResult};

/// Maximum number of pipelines a surface can offer.
pub const MAX_COLOR_PIPELINES: usize = 5;

/// Name of the selector value that disables color processing.
pub const BYPASS_PIPELINE_NAME: &str = "Bypass";

/// A display scanout surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    id: SurfaceId,
    name: String,
    pipelines: Vec<PipelineEntry>,
    selected: Option<ColorOpId>,
}

impl Surface {
    /// Creates a surface with no pipelines.
    pub fn new(id: SurfaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            pipelines: Vec::new(),
            selected: None,
        }
    }

    /// Identity.
    #[inline]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offered pipelines.
    #[inline]
    pub fn pipelines(&self) -> &[PipelineEntry] {
        &self.pipelines
    }

    /// Head of the active pipeline, `None` for bypass.
    #[inline]
    pub fn selected(&self) -> Option<ColorOpId> {
        self.selected
    }

    /// Replaces the offered pipelines and selects bypass.
    pub fn attach_pipelines(&mut self, entries: Vec<PipelineEntry>) -> ColorOpResult<()> {
        if entries.len() > MAX_COLOR_PIPELINES {
            return Err(ColorOpError::invalid(format!(
                "surface {} offers {} pipelines, at most {MAX_COLOR_PIPELINES} allowed",
                self.id,
                entries.len()
            )));
        }
        self.pipelines = entries;
        self.selected = None;
        Ok(())
    }

    /// Selector values: `(0, "Bypass")` followed by every pipeline head.
    pub fn pipeline_enum(&self) -> Vec<(u32, String)> {
        std::iter::once((0, BYPASS_PIPELINE_NAME.to_string()))
            .chain(self.pipelines.iter().map(|p| (p.head.get(), p.name.clone())))
            .collect()
    }

    /// Activates the pipeline whose head is `value`, or bypass for `0`.
    pub fn select_pipeline(&mut self, value: u32) -> ColorOpResult<()> {
        let Some(head) = ColorOpId::new(value) else {
            self.selected = None;
            return Ok(());
        };
        if !self.pipelines.iter().any(|p| p.head == head) {
            return Err(ColorOpError::invalid(format!(
                "surface {} has no pipeline {value}",
                self.id
            )));
        }
        self.selected = Some(head);
        Ok(())
    }

    /// Releases every node built for this surface and clears its pipelines.
    ///
    /// Returns the number of nodes released.
    pub fn release(&mut self, registry: &mut ColorOpRegistry) -> usize {
        self.pipelines.clear();
        self.selected = None;
        registry.release_surface(self.id)
    }
}

fn release_chains(registry: &mut ColorOpRegistry, entries: &[PipelineEntry]) {
    for entry in entries.iter().rev() {
        if let Ok(ids) = registry.chain_from(entry.head) {
            for id in ids.into_iter().rev() {
                registry.remove(id);
            }
        }
    }
}

/// Builds every pipeline in `pipelines` for `surface` and attaches them.
///
/// Either all pipelines are built and attached or the registry and the
/// surface are left unchanged. Pipelines the surface offered before are
/// released once the new ones are in place.
pub fn initialize_color_pipelines(
    registry: &mut ColorOpRegistry,
    surface: &mut Surface,
    pipelines: &[Vec<StageDesc>],
) -> ColorOpResult<()> {
    if pipelines.len() > MAX_COLOR_PIPELINES {
        return Err(ColorOpError::invalid(format!(
            "{} pipelines requested, at most {MAX_COLOR_PIPELINES} allowed",
            pipelines.len()
        )));
    }

    let mut entries: Vec<PipelineEntry> = Vec::with_capacity(pipelines.len());
    for stages in pipelines {
        match build_pipeline(registry, surface.id, stages) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                release_chains(registry, &entries);
                return Err(e);
            }
        }
    }

    let previous = std::mem::take(&mut surface.pipelines);
    release_chains(registry, &previous);
    debug!(
        surface = surface.id.0,
        pipelines = entries.len(),
        replaced = previous.len(),
        "initialized color pipelines"
    );
    surface.attach_pipelines(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{hdr_plane_pipeline, srgb_round_trip_pipeline};

    #[test]
    fn test_enum_starts_with_bypass() {
        let mut reg = ColorOpRegistry::new();
        let mut surface = Surface::new(SurfaceId(1), "plane-0");
        initialize_color_pipelines(&mut reg, &mut surface, &[srgb_round_trip_pipeline()]).unwrap();

        let list = surface.pipeline_enum();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], (0, "Bypass".to_string()));
        let head = surface.pipelines()[0].head;
        assert_eq!(list[1], (head.get(), format!("Color Pipeline {head}")));
    }

    #[test]
    fn test_select() {
        let mut reg = ColorOpRegistry::new();
        let mut surface = Surface::new(SurfaceId(1), "plane-0");
        initialize_color_pipelines(&mut reg, &mut surface, &[hdr_plane_pipeline()]).unwrap();
        let head = surface.pipelines()[0].head;

        surface.select_pipeline(head.get()).unwrap();
        assert_eq!(surface.selected(), Some(head));
        assert!(surface.select_pipeline(head.get() + 100).is_err());
        assert_eq!(surface.selected(), Some(head));
        surface.select_pipeline(0).unwrap();
        assert_eq!(surface.selected(), None);
    }

    #[test]
    fn test_too_many_pipelines() {
        let mut reg = ColorOpRegistry::new();
        let mut surface = Surface::new(SurfaceId(1), "plane-0");
        let lists = vec![srgb_round_trip_pipeline(); MAX_COLOR_PIPELINES + 1];
        assert!(initialize_color_pipelines(&mut reg, &mut surface, &lists).is_err());
        assert!(reg.is_empty());
        assert!(surface.pipelines().is_empty());
    }

    #[test]
    fn test_reinitialize_releases_previous_pipelines() {
        let mut reg = ColorOpRegistry::new();
        let mut surface = Surface::new(SurfaceId(1), "plane-0");
        initialize_color_pipelines(&mut reg, &mut surface, &[hdr_plane_pipeline()]).unwrap();
        let old = surface.pipelines()[0].head;
        surface.select_pipeline(old.get()).unwrap();

        initialize_color_pipelines(&mut reg, &mut surface, &[srgb_round_trip_pipeline()]).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(reg.get(old).is_none());
        assert_eq!(surface.pipelines().len(), 1);
        assert_eq!(surface.selected(), None);
        assert!(surface.select_pipeline(old.get()).is_err());
    }

    #[test]
    fn test_failed_reinitialize_keeps_previous_pipelines() {
        let mut reg = ColorOpRegistry::new();
        let mut surface = Surface::new(SurfaceId(1), "plane-0");
        initialize_color_pipelines(&mut reg, &mut surface, &[srgb_round_trip_pipeline()]).unwrap();
        let head = surface.pipelines()[0].head;

        assert!(initialize_color_pipelines(&mut reg, &mut surface, &[Vec::new()]).is_err());
        assert_eq!(reg.len(), 2);
        assert_eq!(surface.pipelines()[0].head, head);
    }

    #[test]
    fn test_release_clears_selector() {
        let mut reg = ColorOpRegistry::new();
        let mut a = Surface::new(SurfaceId(1), "plane-0");
        let mut b = Surface::new(SurfaceId(2), "plane-1");
        initialize_color_pipelines(&mut reg, &mut a, &[srgb_round_trip_pipeline()]).unwrap();
        let stale = a.pipelines()[0].head;
        a.select_pipeline(stale.get()).unwrap();

        assert_eq!(a.release(&mut reg), 2);
        assert_eq!(a.pipeline_enum().len(), 1);
        assert_eq!(a.selected(), None);

        initialize_color_pipelines(&mut reg, &mut b, &[srgb_round_trip_pipeline()]).unwrap();
        assert_ne!(b.pipelines()[0].head, stale);
        assert!(a.select_pipeline(stale.get()).is_err());
        assert!(reg.get(stale).is_none());
    }

    #[test]
    fn test_second_pipeline_failure_releases_first() {
        let mut reg = ColorOpRegistry::new();
        let mut surface = Surface::new(SurfaceId(1), "plane-0");
        let lists = vec![srgb_round_trip_pipeline(), Vec::new()];
        assert!(initialize_color_pipelines(&mut reg, &mut surface, &lists).is_err());
        assert!(reg.is_empty());
        assert!(surface.pipelines().is_empty());
    }
}
