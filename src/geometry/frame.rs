//! Per-point orientation frames along a polyline.
//!
//! Frames are transported point to point with a double cross product, which
//! keeps each new "up" as close as possible to the previous one, so the
//! cross-section does not roll as the path bends. Closed paths get their
//! residual roll spread evenly over the interior points.

use glam::{Mat3, Quat, Vec3};

/// Below this squared length a direction is treated as degenerate.
const DEGENERATE_EPS: f32 = 1e-12;

/// Orientation and segment data at one path point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Normalized direction to the next point (the last point repeats the
    /// previous direction).
    pub direction: Vec3,
    /// Distance to the next point; zero for the last point.
    pub length: f32,
    /// Rotation mapping local +Z to forward, +Y to up and +X to right.
    pub orientation: Quat,
}

impl Frame {
    /// World-space forward axis of the cross-section.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// World-space up axis of the cross-section.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// World-space right axis of the cross-section.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }
}

/// Rotation whose +Z looks along `forward` with +Y as close to `up` as
/// possible. `forward` must be normalized.
pub(crate) fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let mut right = up.cross(forward);
    if right.length_squared() < DEGENERATE_EPS {
        right = forward.any_orthonormal_vector();
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Carry `up` onto the plane perpendicular to `forward`.
///
/// `right = up × forward; up' = forward × right` yields the vector in the
/// new plane closest to the previous up, i.e. a minimal-twist transport.
fn transport_up(up: Vec3, forward: Vec3) -> Vec3 {
    let right = up.cross(forward);
    if right.length_squared() < DEGENERATE_EPS {
        // The path folded back onto the previous up; any perpendicular
        // keeps the frame valid.
        return forward.any_orthonormal_vector();
    }
    forward.cross(right).normalize()
}

/// Signed angle (radians) rotating `from` onto `to` about `axis`.
fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    axis.dot(from.cross(to)).atan2(from.dot(to))
}

/// Computes directions, segment lengths and twist-free orientations.
#[derive(Debug, Clone, Default)]
pub struct FrameSolver {
    directions: Vec<Vec3>,
    lengths: Vec<f32>,
    rotations: Vec<Quat>,
    total_length: f32,
    /// Up reference of the first frame from the previous solve; zero until
    /// the first solve.
    past_begin_up: Vec3,
}

impl FrameSolver {
    /// An empty solver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the remembered begin up so the next solve re-derives it from
    /// world axes.
    pub fn reset_begin_up(&mut self) {
        self.past_begin_up = Vec3::ZERO;
    }

    /// Number of frames from the last solve.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    /// Whether the last solve produced no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    /// Normalized per-point directions.
    #[must_use]
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// Per-point distances to the next point.
    #[must_use]
    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    /// Per-point orientations.
    #[must_use]
    pub fn rotations(&self) -> &[Quat] {
        &self.rotations
    }

    /// Sum of all segment lengths.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// Frame at `index`, if it exists.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<Frame> {
        Some(Frame {
            direction: *self.directions.get(index)?,
            length: *self.lengths.get(index)?,
            orientation: *self.rotations.get(index)?,
        })
    }

    /// Solve frames for `points`, applying per-point `twists` (degrees)
    /// when given. Paths with fewer than two points clear the solver.
    pub fn solve(&mut self, points: &[Vec3], twists: Option<&[f32]>) {
        let n = points.len();
        self.directions.clear();
        self.lengths.clear();
        self.rotations.clear();
        self.total_length = 0.0;
        if n < 2 {
            return;
        }

        self.compute_segments(points);

        let closed = points[0] == points[n - 1];
        let base = self.transport_frames(closed);
        self.rotations = base;

        if closed {
            self.close_loop();
        }
        if let Some(twists) = twists.filter(|t| t.len() == n) {
            self.apply_twists(twists, closed);
        }
    }

    /// Directions and lengths, with degenerate segments inheriting a
    /// neighbouring direction.
    fn compute_segments(&mut self, points: &[Vec3]) {
        let n = points.len();
        let raw: Vec<Vec3> = points.windows(2).map(|w| w[1] - w[0]).collect();
        self.lengths.extend(raw.iter().map(|d| d.length()));
        self.lengths.push(0.0);
        self.total_length = self.lengths.iter().sum();

        // First usable direction for leading degenerate segments.
        let first_valid = raw
            .iter()
            .zip(&self.lengths)
            .find(|pair| *pair.1 > 0.0)
            .map_or(Vec3::Y, |(d, len)| *d / *len);

        for (i, d) in raw.iter().enumerate() {
            let len = self.lengths[i];
            let dir = if len > 0.0 {
                *d / len
            } else if let Some(&prev) = self.directions.last() {
                prev
            } else {
                first_valid
            };
            self.directions.push(dir);
        }
        self.directions.push(self.directions[n - 2]);
    }

    /// Untwisted orientations via minimal-twist transport. For closed
    /// paths the last entry is the transported frame at the closing point,
    /// which [`Self::close_loop`] compares against the first.
    fn transport_frames(&mut self, closed: bool) -> Vec<Quat> {
        let n = self.directions.len();
        let dirs = &self.directions;

        let begin_forward = if closed {
            (dirs[n - 1] + dirs[0]).normalize_or(dirs[0])
        } else {
            dirs[0]
        };

        let mut up = if self.past_begin_up == Vec3::ZERO {
            if dirs[0].dot(Vec3::X).abs() < 0.5 {
                Vec3::X
            } else {
                Vec3::Y
            }
        } else {
            self.past_begin_up
        };
        up = transport_up(up, begin_forward);
        self.past_begin_up = up;

        let mut rotations = Vec::with_capacity(n);
        rotations.push(look_rotation(begin_forward, up));

        for p in 1..n - 1 {
            let blended = dirs[p] + dirs[p - 1];
            if blended.length_squared() < DEGENERATE_EPS {
                // Path reverses on itself; keep the previous orientation.
                rotations.push(rotations[p - 1]);
                continue;
            }
            let forward = blended.normalize();
            up = transport_up(up, forward);
            rotations.push(look_rotation(forward, up));
        }

        let end_forward = if closed { begin_forward } else { dirs[n - 1] };
        up = transport_up(up, end_forward);
        rotations.push(look_rotation(end_forward, up));
        rotations
    }

    /// Spread the roll mismatch at the closing point evenly over the path
    /// so the seam lines up, then pin the last frame to the first.
    fn close_loop(&mut self) {
        let n = self.rotations.len();
        let begin = self.rotations[0];
        let end = self.rotations[n - 1];
        let axis = begin * Vec3::Z;
        let mismatch = signed_angle(end * Vec3::X, begin * Vec3::X, axis);
        log::debug!(
            "closing loop of {n} points, roll mismatch {:.4} deg",
            mismatch.to_degrees()
        );

        let step = mismatch / (n - 1) as f32;
        for r in 1..n - 1 {
            let rot = self.rotations[r];
            let forward = rot * Vec3::Z;
            self.rotations[r] =
                (Quat::from_axis_angle(forward, r as f32 * step) * rot)
                    .normalize();
        }
        self.rotations[n - 1] = begin;
    }

    fn apply_twists(&mut self, twists: &[f32], closed: bool) {
        let n = self.rotations.len();
        let twisted = if closed { n - 1 } else { n };
        for (rot, &twist) in
            self.rotations.iter_mut().zip(twists).take(twisted)
        {
            if twist == 0.0 {
                continue;
            }
            let forward = *rot * Vec3::Z;
            *rot = (Quat::from_axis_angle(forward, twist.to_radians()) * *rot)
                .normalize();
        }
        if closed {
            self.rotations[n - 1] = self.rotations[0];
        }
    }
}
