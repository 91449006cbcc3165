//! Closed-form vertex and index counts.
//!
//! Every buffer size in the crate is derived from these two functions, so
//! the budget check that guards setters and the buffers the surface builder
//! fills can never disagree.

use crate::error::TubeError;
use crate::options::{CapMode, NormalMode};

/// Hard ceiling on emitted vertices (16-bit index friendly).
pub const MAX_VERTEX_COUNT: usize = 65_000;

/// Vertices in the tube body, excluding caps. Saturates at `usize::MAX`.
#[must_use]
pub fn body_vertex_count(
    point_count: usize,
    edge_count: usize,
    normal_mode: NormalMode,
) -> usize {
    if point_count < 2 {
        return 0;
    }
    match normal_mode {
        NormalMode::Smooth => {
            point_count.saturating_mul(edge_count.saturating_add(1))
        }
        NormalMode::Hard => (point_count - 1)
            .saturating_mul(edge_count)
            .saturating_mul(4),
        NormalMode::HardEdges => {
            point_count.saturating_mul(edge_count).saturating_mul(2)
        }
    }
}

/// Vertices in one cap: the duplicated ring (with wrap vertex) plus the
/// center.
#[must_use]
pub fn cap_vertex_count(edge_count: usize) -> usize {
    edge_count.saturating_add(2)
}

/// Total vertex count for a configuration. Zero for paths with fewer than
/// two points, `usize::MAX` when the count does not fit.
#[must_use]
pub fn vertex_count(
    point_count: usize,
    edge_count: usize,
    normal_mode: NormalMode,
    cap_mode: CapMode,
) -> usize {
    if point_count < 2 {
        return 0;
    }
    let caps =
        cap_vertex_count(edge_count).saturating_mul(cap_mode.cap_count());
    body_vertex_count(point_count, edge_count, normal_mode).saturating_add(caps)
}

/// Total triangle index count for a configuration. Saturates at
/// `usize::MAX`.
#[must_use]
pub fn triangle_index_count(
    point_count: usize,
    edge_count: usize,
    cap_mode: CapMode,
) -> usize {
    if point_count < 2 {
        return 0;
    }
    let body = (point_count - 1)
        .saturating_mul(edge_count)
        .saturating_mul(6);
    let caps = edge_count.saturating_mul(3 * cap_mode.cap_count());
    body.saturating_add(caps)
}

/// Reject a configuration whose vertex count exceeds [`MAX_VERTEX_COUNT`].
///
/// `property` names the setter being guarded; it ends up in the error and
/// in the logged diagnostic.
pub fn check(
    property: &'static str,
    point_count: usize,
    edge_count: usize,
    normal_mode: NormalMode,
    cap_mode: CapMode,
) -> Result<usize, TubeError> {
    let requested =
        vertex_count(point_count, edge_count, normal_mode, cap_mode);
    if requested > MAX_VERTEX_COUNT {
        let err = TubeError::VertexBudgetExceeded {
            property,
            requested,
            limit: MAX_VERTEX_COUNT,
        };
        log::warn!("{err}");
        return Err(err);
    }
    Ok(requested)
}
