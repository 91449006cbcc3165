//! Triangle stitching for each vertex layout.
//!
//! Indices depend only on the layout (point count, edge count, normal mode,
//! caps, winding), never on vertex values, so the index buffer is rebuilt
//! only when one of those changes.

use super::budget::{body_vertex_count, cap_vertex_count};
use crate::options::{CapMode, NormalMode};

/// Six local offsets (two triangles) for one quad face, relative to the
/// quad's first vertex.
fn quad_pattern(edges: u32, mode: NormalMode, invert: bool) -> [u32; 6] {
    match (mode, invert) {
        (NormalMode::Smooth, false) => {
            [0, 1, edges + 2, 0, edges + 2, edges + 1]
        }
        (NormalMode::Smooth, true) => {
            [0, edges + 2, 1, 0, edges + 1, edges + 2]
        }
        (NormalMode::Hard, false) => [0, 3, 1, 3, 2, 1],
        (NormalMode::Hard, true) => [0, 1, 3, 3, 1, 2],
        (NormalMode::HardEdges, false) => {
            [0, 1, edges * 2, edges * 2, 1, edges * 2 + 1]
        }
        (NormalMode::HardEdges, true) => {
            [0, edges * 2, 1, 1, edges * 2, edges * 2 + 1]
        }
    }
}

/// First vertex of quad `e` on segment `p`.
fn quad_base(p: u32, e: u32, edges: u32, mode: NormalMode) -> u32 {
    match mode {
        // One ring of edges + 1 per point; the wrap vertex is never a quad
        // origin.
        NormalMode::Smooth => p * (edges + 1) + e,
        NormalMode::Hard => (p * edges + e) * 4,
        NormalMode::HardEdges => (p * edges + e) * 2,
    }
}

/// Rebuild `out` as the triangle list for the given layout.
///
/// Vertex indices must fit in `u32`; the vertex budget keeps them far below
/// that.
pub fn build_triangles(
    point_count: usize,
    edge_count: usize,
    normal_mode: NormalMode,
    cap_mode: CapMode,
    invert: bool,
    out: &mut Vec<u32>,
) {
    out.clear();
    if point_count < 2 {
        return;
    }

    let edges = edge_count as u32;
    let quad = quad_pattern(edges, normal_mode, invert);
    for p in 0..point_count as u32 - 1 {
        for e in 0..edges {
            let v = quad_base(p, e, edges, normal_mode);
            out.extend(quad.iter().map(|&q| v + q));
        }
    }

    let mut base =
        body_vertex_count(point_count, edge_count, normal_mode) as u32;
    if cap_mode.has_begin() {
        let center = base + edges + 1;
        for e in base..base + edges {
            if invert {
                out.extend([e, e + 1, center]);
            } else {
                out.extend([e, center, e + 1]);
            }
        }
        base += cap_vertex_count(edge_count) as u32;
    }
    if cap_mode.has_end() {
        // The end cap looks the other way, so its fan winds opposite to
        // the begin cap's.
        let center = base + edges + 1;
        for e in base..base + edges {
            if invert {
                out.extend([e, center, e + 1]);
            } else {
                out.extend([e, e + 1, center]);
            }
        }
    }
}
