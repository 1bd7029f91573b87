//! Atomic configuration changes.
//!
//! A [`Transaction`] collects proposed states for any number of color
//! operations and commits them together. Proposed states start as
//! duplicates of the committed ones, so they are bypassed until the caller
//! explicitly clears bypass. Dropping a transaction without committing
//! discards every proposed state.
//!
//! # Example
//!
//! ```rust
//! use colorop_core::{ColorOpProperty, ColorOpRegistry, PropertyValue, SurfaceId};
//!
//! let mut reg = ColorOpRegistry::new();
//! let gain = reg.init_multiplier(SurfaceId(1), true).unwrap();
//!
//! let mut tx = reg.begin();
//! tx.set_property(gain, ColorOpProperty::Multiplier, PropertyValue::U64(2 << 32)).unwrap();
//! tx.set_property(gain, ColorOpProperty::Bypass, PropertyValue::Bool(false)).unwrap();
//! tx.commit().unwrap();
//!
//! assert_eq!(reg.apply_pipeline(gain, [100, 200, 300]).unwrap(), [200, 400, 600]);
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::colorop::ColorOpId;
use crate::property::{ColorOpProperty, PropertyValue};
use crate::registry::ColorOpRegistry;
use crate::state::ColorOpState;
use crate::ColorOpResult;

/// Pending set of state changes holding exclusive access to the registry.
#[derive(Debug)]
pub struct Transaction<'a> {
    registry: &'a mut ColorOpRegistry,
    pending: BTreeMap<ColorOpId, ColorOpState>,
}

impl ColorOpRegistry {
    /// Starts a transaction.
    pub fn begin(&mut self) -> Transaction<'_> {
        Transaction {
            registry: self,
            pending: BTreeMap::new(),
        }
    }
}

impl<'a> Transaction<'a> {
    /// Proposed state of `id`, duplicated from the committed one on first use.
    pub fn state_mut(&mut self, id: ColorOpId) -> ColorOpResult<&mut ColorOpState> {
        if !self.pending.contains_key(&id) {
            let state = self.registry.duplicate_state(id)?;
            self.pending.insert(id, state);
        }
        self.pending
            .get_mut(&id)
            .ok_or(crate::ColorOpError::NotFound(id))
    }

    /// Proposed state of `id`, if it has been touched.
    pub fn state(&self, id: ColorOpId) -> Option<&ColorOpState> {
        self.pending.get(&id)
    }

    /// Validates `value` and writes it into the proposed state of `id`.
    pub fn set_property(
        &mut self,
        id: ColorOpId,
        prop: ColorOpProperty,
        value: PropertyValue,
    ) -> ColorOpResult<()> {
        self.state_mut(id)?;
        let op = self.registry.try_get(id)?;
        let state = self
            .pending
            .get_mut(&id)
            .ok_or(crate::ColorOpError::NotFound(id))?;
        state.set_property(op, prop, value)
    }

    /// Number of color operations touched.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing has been touched.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Commits every proposed state.
    ///
    /// All states are validated before any is swapped in; if one is
    /// rejected nothing changes.
    pub fn commit(mut self) -> ColorOpResult<()> {
        for (id, state) in &self.pending {
            let op = self.registry.try_get(*id)?;
            state.validate_for(op)?;
        }
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for state in pending.into_values() {
            let old = self.registry.swap_state(state)?;
            self.registry.destroy_state(Some(old));
        }
        debug!(states = count, "committed color operation transaction");
        Ok(())
    }

    /// Discards every proposed state.
    pub fn cancel(self) {}
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        debug!(states = self.pending.len(), "discarded color operation transaction");
        for (_, state) in std::mem::take(&mut self.pending) {
            self.registry.destroy_state(Some(state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::CurveTypeSet;
    use crate::colorop::SurfaceId;
    use colorop_lut::CurveType;

    const S: SurfaceId = SurfaceId(4);

    #[test]
    fn test_commit_swaps_states() {
        let mut reg = ColorOpRegistry::new();
        let curve = reg.init_curve(S, CurveTypeSet::all(), true).unwrap();

        let mut tx = reg.begin();
        tx.set_property(curve, ColorOpProperty::CurveType, PropertyValue::Curve(CurveType::Gamma22))
            .unwrap();
        assert_eq!(tx.state(curve).unwrap().bypass(), Some(true));
        tx.set_property(curve, ColorOpProperty::Bypass, PropertyValue::Bool(false))
            .unwrap();
        tx.commit().unwrap();

        let state = reg.get(curve).unwrap().state().unwrap();
        assert_eq!(state.curve(), Some(CurveType::Gamma22));
        assert_eq!(state.bypass(), Some(false));
    }

    #[test]
    fn test_drop_discards() {
        let mut reg = ColorOpRegistry::new();
        let gain = reg.init_multiplier(S, true).unwrap();
        {
            let mut tx = reg.begin();
            tx.set_property(gain, ColorOpProperty::Multiplier, PropertyValue::U64(7))
                .unwrap();
            assert_eq!(tx.len(), 1);
        }
        assert_eq!(reg.get(gain).unwrap().state().unwrap().multiplier(), Some(0));
    }

    #[test]
    fn test_failed_set_keeps_proposal() {
        let mut reg = ColorOpRegistry::new();
        let lut = reg.init_lut(S, 4, colorop_lut::LutInterpolation::Linear, true).unwrap();
        let mut tx = reg.begin();
        assert!(tx
            .set_property(lut, ColorOpProperty::Data, PropertyValue::Blob(Some(vec![0; 8])))
            .is_err());
        tx.set_property(lut, ColorOpProperty::Data, PropertyValue::Blob(Some(vec![0; 32])))
            .unwrap();
        tx.commit().unwrap();
        assert_eq!(reg.get(lut).unwrap().state().unwrap().data().map(<[u8]>::len), Some(32));
    }

    #[test]
    fn test_unknown_id() {
        let mut reg = ColorOpRegistry::new();
        let mut tx = reg.begin();
        assert!(tx.state_mut(ColorOpId::new(9).unwrap()).is_err());
        assert!(tx.is_empty());
    }
}
