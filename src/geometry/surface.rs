//! Vertex, normal and tangent generation for the three shading topologies.
//!
//! Every mode starts from the same ring positions: the cross-section
//! template rotated into each frame, scaled by the radius and moved to the
//! point. Smooth copies the rings verbatim, Hard splits them into four
//! vertices per quad face, HardEdges into two vertices per ring edge.
//!
//! Ring positions are written to a scratch buffer owned by the builder and
//! never to the output buffers, so the faceted expansions can fill output
//! slots in any order without reading their own writes. Caps are appended
//! after the body in every mode.

use glam::{Quat, Vec3, Vec4};

use super::budget::{body_vertex_count, cap_vertex_count};
use super::template::CrossSectionTemplate;
use crate::mesh::{Aabb, SurfaceMut};
use crate::options::{CapMode, NormalMode};

/// Handedness stored in every tangent's `w`. The profile is symmetric, so
/// one sign fits the whole surface.
pub const TANGENT_W: f32 = -1.0;

/// Radius source for the sweep.
#[derive(Debug, Clone, Copy)]
pub enum Radii<'a> {
    /// One radius for every point.
    Uniform(f32),
    /// One radius per point; length equals the point count.
    PerPoint(&'a [f32]),
}

impl Radii<'_> {
    /// Radius at point `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> f32 {
        match self {
            Self::Uniform(r) => *r,
            Self::PerPoint(r) => r[index],
        }
    }
}

/// Everything a redraw reads.
pub struct SurfaceInput<'a> {
    /// Path points (at least two).
    pub points: &'a [Vec3],
    /// Orientation per point.
    pub rotations: &'a [Quat],
    /// Steepness tilt per point in degrees; empty when radii are uniform.
    pub steepness: &'a [f32],
    /// Radius per point.
    pub radii: Radii<'a>,
    /// Unit cross-section.
    pub template: &'a CrossSectionTemplate,
    /// Shading topology.
    pub normal_mode: NormalMode,
    /// Capped ends.
    pub cap_mode: CapMode,
    /// Flip normals for an inside-out tube.
    pub invert: bool,
}

/// Builds surface buffers, keeping the ring scratch buffer between
/// redraws.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBuilder {
    rings: Vec<Vec3>,
}

/// Per-point rotation for normals: the frame orientation followed by the
/// steepness tilt about the given template tangent.
fn normal_rotation(
    input: &SurfaceInput<'_>,
    p: usize,
    tangent: Vec3,
) -> Quat {
    let rot = input.rotations[p];
    match input.steepness.get(p) {
        Some(&tilt) if tilt != 0.0 => {
            rot * Quat::from_axis_angle(tangent, tilt.to_radians())
        }
        _ => rot,
    }
}

fn with_w(v: Vec3) -> Vec4 {
    v.extend(TANGENT_W)
}

impl SurfaceBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring positions from the last build: `edge_count + 1` per point, the
    /// last of each ring duplicating the first.
    #[must_use]
    pub fn rings(&self) -> &[Vec3] {
        &self.rings
    }

    /// Fill `out` and return the surface bounds.
    ///
    /// `out.vertices` and `out.normals` must hold exactly
    /// [`super::budget::vertex_count`] entries for the input's
    /// configuration; `out.tangents` holds the same count or is empty to
    /// skip tangents.
    pub fn build(
        &mut self,
        input: &SurfaceInput<'_>,
        out: &mut SurfaceMut<'_>,
    ) -> Aabb {
        let bounds = self.build_rings(input);
        match input.normal_mode {
            NormalMode::Smooth => self.expand_smooth(input, out),
            NormalMode::Hard => self.expand_hard(input, out),
            NormalMode::HardEdges => self.expand_hard_edges(input, out),
        }
        self.build_caps(input, out);
        bounds
    }

    /// Sweep the template around every frame into the scratch rings.
    fn build_rings(&mut self, input: &SurfaceInput<'_>) -> Aabb {
        let edges = input.template.edge_count();
        self.rings.clear();
        self.rings.reserve(input.points.len() * (edges + 1));

        let mut bounds = Aabb::INVERTED;
        for (p, (&point, &rot)) in
            input.points.iter().zip(input.rotations).enumerate()
        {
            let radius = input.radii.at(p);
            bounds.include_sphere(point, radius);
            let first = self.rings.len();
            self.rings.extend(
                input
                    .template
                    .points
                    .iter()
                    .map(|&unit| point + rot * (unit * radius)),
            );
            // Duplicate the first vertex so UVs can wrap.
            self.rings.push(self.rings[first]);
        }
        bounds
    }

    fn expand_smooth(
        &self,
        input: &SurfaceInput<'_>,
        out: &mut SurfaceMut<'_>,
    ) {
        let t = input.template;
        let edges = t.edge_count();
        let sign = if input.invert { -1.0 } else { 1.0 };
        let ring_len = edges + 1;
        let with_tangents = !out.tangents.is_empty();

        out.vertices[..self.rings.len()].copy_from_slice(&self.rings);
        for p in 0..input.points.len() {
            let base = p * ring_len;
            for e in 0..edges {
                let rot = normal_rotation(input, p, t.tangents[e]);
                let normal = rot * t.normals[e];
                out.normals[base + e] = normal * sign;
                if with_tangents {
                    out.tangents[base + e] =
                        with_w((rot * t.tangents[e]).cross(normal));
                }
            }
            out.normals[base + edges] = out.normals[base];
            if with_tangents {
                out.tangents[base + edges] = out.tangents[base];
            }
        }
    }

    /// Four vertices per quad face, ordered (ring p, e), (ring p+1, e),
    /// (ring p+1, e+1), (ring p, e+1), sharing one flat face normal.
    fn expand_hard(
        &self,
        input: &SurfaceInput<'_>,
        out: &mut SurfaceMut<'_>,
    ) {
        let edges = input.template.edge_count();
        let ring_len = edges + 1;
        let sign = if input.invert { -1.0 } else { 1.0 };
        let with_tangents = !out.tangents.is_empty();
        let r = &self.rings;

        for p in 0..input.points.len() - 1 {
            for e in 0..edges {
                let v = (p * edges + e) * 4;
                let lv = p * ring_len + e;
                let quad = [lv, lv + ring_len, lv + ring_len + 1, lv + 1];

                let around = r[quad[3]] - r[quad[0]];
                let along = r[quad[1]] - r[quad[0]];
                let normal = around.cross(along).normalize_or_zero() * sign;
                for (q, &src) in quad.iter().enumerate() {
                    out.vertices[v + q] = r[src];
                    out.normals[v + q] = normal;
                }

                if with_tangents {
                    // Tangents follow the along-tube edge on each side of
                    // the face.
                    let near = with_w(along.normalize_or_zero());
                    let far = r[quad[2]] - r[quad[3]];
                    let far = with_w(far.normalize_or_zero());
                    out.tangents[v] = near;
                    out.tangents[v + 1] = near;
                    out.tangents[v + 2] = far;
                    out.tangents[v + 3] = far;
                }
            }
        }
    }

    /// Two vertices per ring edge, both carrying the edge's flat normal.
    fn expand_hard_edges(
        &self,
        input: &SurfaceInput<'_>,
        out: &mut SurfaceMut<'_>,
    ) {
        let t = input.template;
        let edges = t.edge_count();
        let ring_len = edges + 1;
        let sign = if input.invert { -1.0 } else { 1.0 };
        let with_tangents = !out.tangents.is_empty();

        for p in 0..input.points.len() {
            for e in 0..edges {
                let v = (p * edges + e) * 2;
                let lv = p * ring_len + e;
                let rot = normal_rotation(input, p, t.tangents[e]);
                let normal = rot * t.normals[e];

                out.vertices[v] = self.rings[lv];
                out.vertices[v + 1] = self.rings[lv + 1];
                out.normals[v] = normal * sign;
                out.normals[v + 1] = normal * sign;
                if with_tangents {
                    let tangent = with_w((rot * t.tangents[e]).cross(normal));
                    out.tangents[v] = tangent;
                    out.tangents[v + 1] = tangent;
                }
            }
        }
    }

    /// Duplicate the end rings with a flat along-axis normal, plus a center
    /// vertex at the end point.
    fn build_caps(&self, input: &SurfaceInput<'_>, out: &mut SurfaceMut<'_>) {
        let edges = input.template.edge_count();
        let n = input.points.len();
        let sign = if input.invert { -1.0 } else { 1.0 };
        let mut v = body_vertex_count(n, edges, input.normal_mode);

        if input.cap_mode.has_begin() {
            let rot = input.rotations[0];
            let cap = Cap {
                point: 0,
                center: input.points[0],
                normal: rot * Vec3::NEG_Z * sign,
                tangent: with_w(rot * Vec3::X),
            };
            self.write_cap(out, v, edges, &cap);
            v += cap_vertex_count(edges);
        }
        if input.cap_mode.has_end() {
            let rot = input.rotations[n - 1];
            // Seen from outside the end cap faces the other way, so right
            // flips to keep the tangent frame consistent.
            let cap = Cap {
                point: n - 1,
                center: input.points[n - 1],
                normal: rot * Vec3::Z * sign,
                tangent: with_w(rot * Vec3::NEG_X),
            };
            self.write_cap(out, v, edges, &cap);
        }
    }

    /// Ring `cap.point` (with its wrap vertex) followed by the center.
    fn write_cap(
        &self,
        out: &mut SurfaceMut<'_>,
        start: usize,
        edges: usize,
        cap: &Cap,
    ) {
        let ring_len = edges + 1;
        let ring = &self.rings[cap.point * ring_len..][..ring_len];
        let center = start + ring_len;
        out.vertices[start..center].copy_from_slice(ring);
        out.vertices[center] = cap.center;
        out.normals[start..=center].fill(cap.normal);
        if !out.tangents.is_empty() {
            out.tangents[start..=center].fill(cap.tangent);
        }
    }
}

/// One end cap's shared attributes.
struct Cap {
    point: usize,
    center: Vec3,
    normal: Vec3,
    tangent: Vec4,
}
