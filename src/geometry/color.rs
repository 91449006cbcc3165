//! Vertex colors broadcast from per-point colors.

use crate::mesh::Rgba8;
use crate::options::{CapMode, NormalMode};

/// Rebuild `out` with one color per vertex, or clear it when `colors` is
/// empty (no color channel).
///
/// `colors` must be empty or hold one entry per path point.
pub fn build_colors(
    colors: &[Rgba8],
    edge_count: usize,
    normal_mode: NormalMode,
    cap_mode: CapMode,
    out: &mut Vec<Rgba8>,
) {
    out.clear();
    let n = colors.len();
    if n < 2 {
        return;
    }

    match normal_mode {
        NormalMode::Smooth => {
            for &c in colors {
                out.extend(std::iter::repeat_n(c, edge_count + 1));
            }
        }
        NormalMode::Hard => {
            // Each face runs from the near ring to the far one, matching
            // the (near, far, far, near) quad vertex order.
            for pair in colors.windows(2) {
                let (near, far) = (pair[0], pair[1]);
                for _ in 0..edge_count {
                    out.extend([near, far, far, near]);
                }
            }
        }
        NormalMode::HardEdges => {
            for &c in colors {
                out.extend(std::iter::repeat_n(c, edge_count * 2));
            }
        }
    }

    let cap_len = edge_count + 2;
    if cap_mode.has_begin() {
        out.extend(std::iter::repeat_n(colors[0], cap_len));
    }
    if cap_mode.has_end() {
        out.extend(std::iter::repeat_n(colors[n - 1], cap_len));
    }
}
