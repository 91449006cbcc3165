//! Texture coordinates for each vertex layout.
//!
//! U runs along the tube, V around it. Caps map the unit cross-section onto
//! their own rect so a round texture lands on the disc.

use glam::Vec2;

use super::template::CrossSectionTemplate;
use crate::options::{CapMode, NormalMode, UvRect};

/// Everything the UV pass reads.
pub struct UvInput<'a> {
    /// Per-point segment lengths; the last entry is zero.
    pub lengths: &'a [f32],
    /// Sum of `lengths`.
    pub total_length: f32,
    /// Unit cross-section, used for cap coordinates.
    pub template: &'a CrossSectionTemplate,
    /// Body vertex layout.
    pub normal_mode: NormalMode,
    /// Capped ends.
    pub cap_mode: CapMode,
    /// Body rect.
    pub uv_rect: UvRect,
    /// Cap rect.
    pub uv_rect_cap: UvRect,
    /// Map the end cap the same way round as the begin cap.
    pub mirror_end_cap: bool,
    /// Advance U by arc length.
    pub anti_stretch: bool,
}

impl UvInput<'_> {
    /// Unscaled U advance from point `p` to `p + 1`.
    fn advance(&self, p: usize) -> f32 {
        if self.uses_arc_length() {
            self.lengths[p]
        } else {
            1.0
        }
    }

    /// Arc length only works on a path that has some.
    fn uses_arc_length(&self) -> bool {
        self.anti_stretch && self.total_length > 0.0
    }
}

/// Map a unit-circle coordinate from `[-1, 1]` to `[0, 1]`.
fn unit(a: f32) -> f32 {
    a.mul_add(0.5, 0.5)
}

/// Rebuild `out` with one UV per vertex.
pub fn build_uvs(input: &UvInput<'_>, out: &mut Vec<Vec2>) {
    out.clear();
    let n = input.lengths.len();
    if n < 2 {
        return;
    }

    let edges = input.template.edge_count();
    let rect = input.uv_rect;
    let u_step = if input.uses_arc_length() {
        input.total_length.recip()
    } else {
        ((n - 1) as f32).recip()
    };
    let v_step = (edges as f32).recip();
    let v_at = |e: usize| rect.ymin() + rect.height * (e as f32 * v_step);
    let u_at = |pos: f32| rect.xmin() + rect.width * (pos * u_step);

    let mut u_pos = 0.0;
    match input.normal_mode {
        NormalMode::Smooth => {
            for p in 0..n {
                let u = u_at(u_pos);
                out.extend((0..=edges).map(|e| Vec2::new(u, v_at(e))));
                u_pos += input.advance(p);
            }
        }
        NormalMode::Hard => {
            for p in 0..n - 1 {
                let next_pos = u_pos + input.advance(p);
                let (u, next_u) = (u_at(u_pos), u_at(next_pos));
                for e in 0..edges {
                    let (v, next_v) = (v_at(e), v_at(e + 1));
                    out.extend([
                        Vec2::new(u, v),
                        Vec2::new(next_u, v),
                        Vec2::new(next_u, next_v),
                        Vec2::new(u, next_v),
                    ]);
                }
                u_pos = next_pos;
            }
        }
        NormalMode::HardEdges => {
            for p in 0..n {
                let u = u_at(u_pos);
                for e in 0..edges {
                    out.extend([
                        Vec2::new(u, v_at(e)),
                        Vec2::new(u, v_at(e + 1)),
                    ]);
                }
                u_pos += input.advance(p);
            }
        }
    }

    if input.cap_mode.has_begin() {
        push_cap(input, out, false);
    }
    if input.cap_mode.has_end() {
        push_cap(input, out, !input.mirror_end_cap);
    }
}

/// Cap ring (with wrap copy) and center, matching the cap vertex layout.
fn push_cap(input: &UvInput<'_>, out: &mut Vec<Vec2>, flip_u: bool) {
    let rect = input.uv_rect_cap;
    let first = out.len();
    out.extend(input.template.points.iter().map(|pt| {
        let s = if flip_u { 1.0 - unit(pt.y) } else { unit(pt.y) };
        rect.lerp(s, 1.0 - unit(pt.x))
    }));
    out.push(out[first]);
    out.push(rect.lerp(0.5, 0.5));
}
