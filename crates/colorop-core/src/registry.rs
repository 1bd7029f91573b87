//! Device-wide arena of color operations.
//!
//! [`ColorOpRegistry`] owns every [`ColorOp`] and hands out stable
//! [`ColorOpId`]s. Ids increase monotonically and are never handed out
//! twice, so a stale id can only miss, never alias a newer node. Links
//! between stages are stored as ids, and a `next` that names a released node
//! is cleared when that node goes away.
//!
//! The registry is also the state manager. It duplicates, resets, swaps and
//! destroys the per-node [`ColorOpState`]. It performs no locking; callers
//! hold `&mut` access for the duration of a configuration change, which is
//! the single-writer guarantee the state model relies on.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::{ColorOpRegistry, CurveType, CurveTypeSet, SurfaceId};
//!
//! let mut reg = ColorOpRegistry::new();
//! let surface = SurfaceId(1);
//! let curve = reg.init_curve(surface, CurveTypeSet::new([CurveType::SrgbEotf]).unwrap(), true).unwrap();
//! let gain = reg.init_multiplier(surface, true).unwrap();
//! reg.chain(curve, gain).unwrap();
//!
//! assert_eq!(reg.get(curve).unwrap().next(), Some(gain));
//! assert_eq!(reg.get(gain).unwrap().next(), None);
//! ```

use std::collections::BTreeMap;

use colorop_lut::{ranges_from_blob, LutInterpolation};
use tracing::{debug, trace, warn};

use crate::caps::CurveTypeSet;
use crate::colorop::{ColorOp, ColorOpId, ColorOpKind, SurfaceId};
use crate::property::{self, ColorOpProperty, PropertyValue};
use crate::state::ColorOpState;
use crate::{ColorOpError, ColorOpResult};

/// Default maximum number of live color operations.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Largest LUT a custom LUT stage may declare.
pub const MAX_COLOR_LUT_ENTRIES: u32 = 4096;

/// Arena of color operations keyed by [`ColorOpId`].
#[derive(Debug)]
pub struct ColorOpRegistry {
    ops: BTreeMap<ColorOpId, ColorOp>,
    capacity: usize,
    next_index: u32,
}

impl Default for ColorOpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorOpRegistry {
    /// Creates an empty registry with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity_limit(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry holding at most `capacity` live nodes.
    ///
    /// Registering beyond the limit fails with
    /// [`ColorOpError::ResourceExhausted`].
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            ops: BTreeMap::new(),
            capacity,
            next_index: 0,
        }
    }

    /// Number of live color operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether no color operation is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Maximum number of live color operations.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Looks up a color operation.
    pub fn get(&self, id: ColorOpId) -> Option<&ColorOp> {
        self.ops.get(&id)
    }

    /// Looks up a color operation, failing for unknown ids.
    pub fn try_get(&self, id: ColorOpId) -> ColorOpResult<&ColorOp> {
        self.get(id).ok_or(ColorOpError::NotFound(id))
    }

    fn try_get_mut(&mut self, id: ColorOpId) -> ColorOpResult<&mut ColorOp> {
        self.ops.get_mut(&id).ok_or(ColorOpError::NotFound(id))
    }

    /// Live color operations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorOp> {
        self.ops.values()
    }

    /// Live color operations of one surface, in registration order.
    pub fn surface_ops(&self, surface: SurfaceId) -> impl Iterator<Item = &ColorOp> {
        self.iter().filter(move |op| op.surface == surface)
    }

    // ---- construction ----------------------------------------------------

    fn register(
        &mut self,
        surface: SurfaceId,
        kind: ColorOpKind,
        allow_bypass: bool,
    ) -> ColorOpResult<ColorOpId> {
        let exhausted = ColorOpError::ResourceExhausted {
            capacity: self.capacity,
        };
        if self.ops.len() >= self.capacity {
            return Err(exhausted);
        }
        // Ids are index + 1 and run out after u32::MAX registrations.
        let index = self.next_index;
        let id = index
            .checked_add(1)
            .and_then(ColorOpId::new)
            .ok_or(exhausted)?;

        let op = ColorOp::new(id, surface, index, kind, allow_bypass);
        trace!(id = id.get(), surface = surface.0, index, op_type = %op.op_type(), "colorop registered");
        self.ops.insert(id, op);
        self.next_index += 1;
        Ok(id)
    }

    /// Registers a named-curve stage.
    ///
    /// The lowest curve id in `supported` becomes the default selection.
    pub fn init_curve(
        &mut self,
        surface: SurfaceId,
        supported: CurveTypeSet,
        allow_bypass: bool,
    ) -> ColorOpResult<ColorOpId> {
        let kind = ColorOpKind::Curve {
            supported,
            default: supported.first(),
        };
        self.register(surface, kind, allow_bypass)
    }

    /// Registers a named-curve stage from a raw capability bitmask.
    ///
    /// The mask is validated before anything is allocated.
    pub fn init_curve_bits(
        &mut self,
        surface: SurfaceId,
        supported: u64,
        allow_bypass: bool,
    ) -> ColorOpResult<ColorOpId> {
        let supported = CurveTypeSet::from_bits(supported)?;
        self.init_curve(surface, supported, allow_bypass)
    }

    /// Registers a custom LUT stage of `size` entries.
    pub fn init_lut(
        &mut self,
        surface: SurfaceId,
        size: u32,
        interpolation: LutInterpolation,
        allow_bypass: bool,
    ) -> ColorOpResult<ColorOpId> {
        if size == 0 {
            return Err(ColorOpError::invalid("LUT size must be > 0"));
        }
        if size > MAX_COLOR_LUT_ENTRIES {
            return Err(ColorOpError::invalid(format!(
                "LUT size {size} exceeds {MAX_COLOR_LUT_ENTRIES}"
            )));
        }
        self.register(surface, ColorOpKind::Lut { size, interpolation }, allow_bypass)
    }

    /// Registers a multi-segment LUT stage described by a range table blob.
    ///
    /// The blob length must be a nonzero multiple of
    /// [`LutRange::SIZE`](colorop_lut::LutRange::SIZE) and every record must
    /// be well formed.
    pub fn init_lut_multi_segment(
        &mut self,
        surface: SurfaceId,
        ranges: &[u8],
        allow_bypass: bool,
    ) -> ColorOpResult<ColorOpId> {
        let ranges = ranges_from_blob(ranges)?;
        self.register(surface, ColorOpKind::LutMultiSegment { ranges }, allow_bypass)
    }

    /// Registers a 3x4 matrix stage.
    pub fn init_matrix_3x4(&mut self, surface: SurfaceId, allow_bypass: bool) -> ColorOpResult<ColorOpId> {
        self.register(surface, ColorOpKind::Matrix3x4, allow_bypass)
    }

    /// Registers a 3x3 matrix stage.
    pub fn init_matrix_3x3(&mut self, surface: SurfaceId, allow_bypass: bool) -> ColorOpResult<ColorOpId> {
        self.register(surface, ColorOpKind::Matrix3x3, allow_bypass)
    }

    /// Registers a multiplier stage.
    pub fn init_multiplier(&mut self, surface: SurfaceId, allow_bypass: bool) -> ColorOpResult<ColorOpId> {
        self.register(surface, ColorOpKind::Multiplier, allow_bypass)
    }

    /// Links `b` as the stage following `a`.
    ///
    /// Both must be live nodes of the same surface, `a` must not be linked
    /// yet and the chain starting at `b` must not lead back to `a`.
    pub fn chain(&mut self, a: ColorOpId, b: ColorOpId) -> ColorOpResult<()> {
        if a == b {
            return Err(ColorOpError::invalid(format!("color operation {a} cannot follow itself")));
        }
        let b_surface = self.try_get(b)?.surface;
        if self.chain_from(b)?.contains(&a) {
            return Err(ColorOpError::invalid(format!(
                "linking {a} to {b} would close a loop"
            )));
        }
        let op = self.try_get_mut(a)?;
        if op.surface != b_surface {
            return Err(ColorOpError::invalid(format!(
                "color operations {a} and {b} belong to different surfaces"
            )));
        }
        if let Some(existing) = op.next {
            return Err(ColorOpError::invalid(format!(
                "color operation {a} is already followed by {existing}"
            )));
        }
        op.next = Some(b);
        Ok(())
    }

    /// Removes one node and clears every link pointing at it.
    pub(crate) fn remove(&mut self, id: ColorOpId) -> Option<ColorOp> {
        let op = self.ops.remove(&id)?;
        for other in self.ops.values_mut() {
            if other.next == Some(id) {
                other.next = None;
            }
        }
        trace!(id = id.get(), "colorop released");
        Some(op)
    }

    /// Releases every node of `surface` together with its state.
    ///
    /// Returns the number of nodes released.
    pub fn release_surface(&mut self, surface: SurfaceId) -> usize {
        let ids: Vec<ColorOpId> = self.surface_ops(surface).map(ColorOp::id).collect();
        for id in ids.iter().rev() {
            self.remove(*id);
        }
        debug!(surface = surface.0, released = ids.len(), "released surface color operations");
        ids.len()
    }

    /// Walks the chain starting at `head`.
    ///
    /// Fails if `head` or any linked node is missing, or if the chain loops.
    pub fn chain_from(&self, head: ColorOpId) -> ColorOpResult<Vec<ColorOpId>> {
        let mut ids = Vec::new();
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            if ids.len() >= self.ops.len() {
                return Err(ColorOpError::InvalidState(format!(
                    "chain starting at {head} does not terminate"
                )));
            }
            ids.push(id);
            let Some(op) = self.get(id) else {
                warn!(head = head.get(), missing = id.get(), "chain walk hit a missing color operation");
                return Err(ColorOpError::NotFound(id));
            };
            cursor = op.next;
        }
        Ok(ids)
    }

    // ---- state management ------------------------------------------------

    /// Returns an independent copy of the committed state of `id`.
    ///
    /// The copy is always bypassed when the node supports bypass, so a
    /// proposed configuration starts out inert.
    pub fn duplicate_state(&self, id: ColorOpId) -> ColorOpResult<ColorOpState> {
        let op = self.try_get(id)?;
        let state = op.state.as_ref().ok_or_else(|| {
            ColorOpError::InvalidState(format!("color operation {id} has no state to duplicate"))
        })?;
        Ok(state.duplicate())
    }

    /// Replaces the state of `id` with a fresh default.
    ///
    /// The default is bypassed where supported and selects the curve
    /// recorded at construction.
    pub fn reset(&mut self, id: ColorOpId) -> ColorOpResult<()> {
        let op = self.try_get_mut(id)?;
        let fresh = ColorOpState::default_for(op);
        op.state = Some(fresh);
        trace!(id = id.get(), "colorop state reset");
        Ok(())
    }

    /// Releases a state that was never committed, or was swapped out.
    pub fn destroy_state(&self, state: Option<ColorOpState>) {
        if let Some(state) = state {
            trace!(id = state.colorop.get(), "colorop state destroyed");
        }
    }

    /// Commits `state` into its node and hands back the state it replaces.
    ///
    /// The state is validated against the node first; on error nothing is
    /// changed.
    pub fn swap_state(&mut self, state: ColorOpState) -> ColorOpResult<ColorOpState> {
        let id = state.colorop;
        let op = self.try_get_mut(id)?;
        state.validate_for(op)?;
        let Some(committed) = op.state.as_mut() else {
            return Err(ColorOpError::InvalidState(format!(
                "color operation {id} had no committed state"
            )));
        };
        let old = std::mem::replace(committed, state);
        trace!(id = id.get(), "colorop state swapped");
        Ok(old)
    }

    // ---- properties ------------------------------------------------------

    /// Reads a property from the node and its committed state.
    pub fn get_property(&self, id: ColorOpId, prop: ColorOpProperty) -> ColorOpResult<PropertyValue> {
        property::get(self.try_get(id)?, prop)
    }
}
