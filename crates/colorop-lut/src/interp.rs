//! Interpolation modes for 1D LUT evaluation.

/// How samples between two LUT entries are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LutInterpolation {
    /// Linear interpolation between the two neighbouring entries.
    ///
    /// This is the only mode display hardware is generally expected to offer.
    #[default]
    Linear,

    /// Nearest entry (no interpolation).
    Nearest,
}

impl LutInterpolation {
    /// Human-readable name, as exposed through the interpolation property.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Nearest => "Nearest",
        }
    }
}
