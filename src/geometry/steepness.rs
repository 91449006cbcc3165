//! Tilt angles that keep the silhouette smooth where the radius varies.
//!
//! A cross-section swept perpendicular to the path shades a cone-shaped
//! section as if it were a cylinder. Tilting each normal about the ring's
//! tangent by `-atan2(dr, ds)` lines it up with the actual surface slope.

/// Per-point tilt angles in degrees.
#[derive(Debug, Clone, Default)]
pub struct SteepnessSolver {
    angles: Vec<f32>,
}

impl SteepnessSolver {
    /// An empty solver (no tilt anywhere).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tilt per point, in degrees. Empty when radii are uniform.
    #[must_use]
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Tilt at `index` in degrees, zero when none was computed.
    #[must_use]
    pub fn angle(&self, index: usize) -> f32 {
        self.angles.get(index).copied().unwrap_or(0.0)
    }

    /// Clear all tilts (uniform radius).
    pub fn clear(&mut self) {
        self.angles.clear();
    }

    /// Recompute tilts from per-point `radii` and per-point segment
    /// `lengths` (length `i` spans point `i` to `i + 1`).
    ///
    /// Each point averages the slope of its adjacent segments; end points
    /// use their single segment. `None` radii clear the solver.
    pub fn solve(&mut self, radii: Option<&[f32]>, lengths: &[f32]) {
        self.angles.clear();
        let Some(radii) = radii else {
            return;
        };
        let n = radii.len();
        if n < 2 || lengths.len() < n {
            return;
        }

        let slope = |i: usize| (radii[i + 1] - radii[i], lengths[i]);

        self.angles.extend((0..n).map(|p| {
            let (dr, ds) = if p == 0 {
                slope(0)
            } else if p == n - 1 {
                slope(n - 2)
            } else {
                let (dr0, ds0) = slope(p - 1);
                let (dr1, ds1) = slope(p);
                ((dr0 + dr1) * 0.5, (ds0 + ds1) * 0.5)
            };
            if dr == 0.0 {
                0.0
            } else {
                -dr.atan2(ds).to_degrees()
            }
        }));
    }
}
