use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How surface normals are distributed over the tube.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NormalMode {
    /// Shared normals, continuous shading along and around the tube.
    #[default]
    Smooth,
    /// Flat shading per quad face.
    Hard,
    /// Flat around the tube, smooth along it.
    HardEdges,
}

/// Which path ends are closed with a flat disc.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CapMode {
    /// Open tube.
    None,
    /// Cap at the first point only.
    Begin,
    /// Cap at the last point only.
    End,
    /// Cap at both ends.
    #[default]
    Both,
}

impl CapMode {
    /// Whether the first point is capped.
    #[must_use]
    pub fn has_begin(self) -> bool {
        matches!(self, Self::Begin | Self::Both)
    }

    /// Whether the last point is capped.
    #[must_use]
    pub fn has_end(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }

    /// Number of capped ends (0, 1 or 2).
    #[must_use]
    pub fn cap_count(self) -> usize {
        usize::from(self.has_begin()) + usize::from(self.has_end())
    }
}
