//! Unit-circle cross-section lookup.
//!
//! The template lives in the local XY plane with +Z as the sweep direction;
//! frames rotate it into place and radii scale it.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::options::NormalMode;

/// Inputs the template is a pure function of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateKey {
    /// Edges around the circle.
    pub edge_count: usize,
    /// Roll offset in degrees.
    pub angle_offset: f32,
    /// HardEdges shifts normals by half an edge.
    pub normal_mode: NormalMode,
}

/// Precomputed unit points, normals and tangents around a circle.
#[derive(Debug, Clone, Default)]
pub struct CrossSectionTemplate {
    key: Option<TemplateKey>,
    /// Unit positions, one per edge.
    pub points: Vec<Vec3>,
    /// Outward unit normals, one per edge.
    pub normals: Vec<Vec3>,
    /// `normal × Z`, the around-ring direction; steepness tilts rotate
    /// about it.
    pub tangents: Vec<Vec3>,
}

impl CrossSectionTemplate {
    /// Build a template for `key`.
    #[must_use]
    pub fn new(key: TemplateKey) -> Self {
        let mut template = Self::default();
        let _ = template.rebuild(key);
        template
    }

    /// The key the lookup was last built for, if any.
    #[must_use]
    pub fn key(&self) -> Option<TemplateKey> {
        self.key
    }

    /// Edge count of the current lookup.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.points.len()
    }

    /// Recompute the lookup unless it already matches `key`. Returns whether
    /// anything was rebuilt.
    pub fn rebuild(&mut self, key: TemplateKey) -> bool {
        if self.key == Some(key) {
            return false;
        }

        let n = key.edge_count;
        let step = TAU / n as f32;
        let offset = key.angle_offset.to_radians();

        self.points.clear();
        self.normals.clear();
        self.tangents.clear();
        for e in 0..n {
            let angle = e as f32 * step + offset;
            let point = Vec3::new(angle.cos(), angle.sin(), 0.0);
            let normal = if key.normal_mode == NormalMode::HardEdges {
                // Point the normal at the middle of the edge so it is
                // perpendicular to the flat face between e and e + 1.
                let mid = angle + step * 0.5;
                Vec3::new(mid.cos(), mid.sin(), 0.0)
            } else {
                point
            };
            self.points.push(point);
            self.normals.push(normal);
            self.tangents.push(normal.cross(Vec3::Z));
        }

        self.key = Some(key);
        true
    }
}
