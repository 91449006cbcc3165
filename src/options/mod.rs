//! Tube configuration with TOML preset support.
//!
//! Every tweakable generator setting (resolution, shading topology, caps,
//! UV mapping, radius) is consolidated in [`TubeOptions`]. Options
//! serialize to/from TOML so tube looks can be stored as presets.

mod modes;
mod uv;

use std::path::Path;

pub use modes::{CapMode, NormalMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use uv::UvRect;

use crate::error::TubeError;

/// Default number of edges around the tube.
pub const DEFAULT_EDGE_COUNT: usize = 12;

/// Default tube radius when no per-point radii are supplied.
pub const DEFAULT_RADIUS: f32 = 0.1;

/// Full generator configuration. Uses `#[serde(default)]` so partial TOML
/// files (e.g. only overriding `edge_count`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct TubeOptions {
    /// Edges around the cross-section. Minimum is three.
    #[schemars(title = "Edge Count", range(min = 3))]
    pub edge_count: usize,
    /// Shading topology.
    #[schemars(title = "Normal Mode")]
    pub normal_mode: NormalMode,
    /// Which ends are closed.
    #[schemars(title = "Caps")]
    pub cap_mode: CapMode,
    /// Render the tube inside out.
    #[schemars(title = "Invert Winding")]
    pub invert_winding: bool,
    /// Fill the tangent buffer.
    #[schemars(title = "Calculate Tangents")]
    pub calculate_tangents: bool,
    /// Use the begin-cap UV orientation for the end cap as well.
    #[schemars(title = "Mirror End Cap")]
    pub mirror_end_cap: bool,
    /// Advance U by arc length instead of by point index.
    #[schemars(title = "Anti-stretch UV")]
    pub anti_stretch_uv: bool,
    /// Roll of the cross-section around the forward axis, in degrees.
    #[schemars(title = "Forward Angle Offset")]
    pub forward_angle_offset: f32,
    /// Radius used when no per-point radii are supplied.
    #[schemars(title = "Radius")]
    pub radius: f32,
    /// Rerun postprocess hooks on every update, not only on changes.
    #[schemars(skip)]
    pub postprocess_continuously: bool,
    /// UV rect for the wrapped tube body.
    #[schemars(skip)]
    pub uv_rect: UvRect,
    /// UV rect for the caps.
    #[schemars(skip)]
    pub uv_rect_cap: UvRect,
}

impl Default for TubeOptions {
    fn default() -> Self {
        Self {
            edge_count: DEFAULT_EDGE_COUNT,
            normal_mode: NormalMode::Smooth,
            cap_mode: CapMode::Both,
            invert_winding: false,
            calculate_tangents: false,
            mirror_end_cap: false,
            anti_stretch_uv: false,
            forward_angle_offset: 0.0,
            radius: DEFAULT_RADIUS,
            postprocess_continuously: true,
            uv_rect: UvRect::UNIT,
            uv_rect_cap: UvRect::UNIT,
        }
    }
}

impl TubeOptions {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(TubeOptions)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, TubeError> {
        toml::from_str(content)
            .map_err(|e| TubeError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, TubeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), TubeError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TubeError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(TubeError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
