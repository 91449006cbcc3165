//! The incremental tube generator.
//!
//! [`TubeGenerator`] owns the path, its per-point attributes, the
//! configuration and every output buffer. Setters only record which
//! pipeline stages their change invalidates; [`TubeGenerator::update`]
//! reruns exactly those stages, so a caller can poll it every tick for
//! free.
//!
//! Changes that would break an invariant (fewer than three edges, more
//! vertices than [`MAX_VERTEX_COUNT`]) are rejected before anything is
//! modified.

mod attribute;
mod postprocess;
#[cfg(test)]
mod tests;

pub use attribute::PerPointAttribute;
use glam::{Quat, Vec3, Vec4};
pub use postprocess::{MeshPostprocess, PostprocessId};
use postprocess::Postprocessors;

use crate::error::TubeError;
use crate::geometry::budget::{self, MAX_VERTEX_COUNT};
use crate::geometry::frame::{Frame, FrameSolver};
use crate::geometry::steepness::SteepnessSolver;
use crate::geometry::surface::{Radii, SurfaceBuilder, SurfaceInput};
use crate::geometry::template::{CrossSectionTemplate, TemplateKey};
use crate::geometry::uv::UvInput;
use crate::geometry::{color, topology, uv};
use crate::mesh::{Rgba8, TubeMesh};
use crate::options::{CapMode, NormalMode, TubeOptions, UvRect};
use crate::pipeline::{DirtyStages, Stage};

/// Smallest usable cross-section.
pub const MIN_EDGE_COUNT: usize = 3;

/// Stages that must rerun when the vertex layout changes size.
const LAYOUT: DirtyStages = DirtyStages::VERTEX_COUNT
    .union(DirtyStages::REDRAW)
    .union(DirtyStages::TRIANGLES)
    .union(DirtyStages::UVS)
    .union(DirtyStages::COLORS);

/// Stages invalidated by moving path points.
const GEOMETRY: DirtyStages = DirtyStages::ROTATIONS
    .union(DirtyStages::STEEPNESS_ANGLES)
    .union(DirtyStages::REDRAW);

/// Dirty stages implied by switching configuration `old` to `new`.
fn invalidated_by(old: &TubeOptions, new: &TubeOptions) -> DirtyStages {
    let mut dirty = DirtyStages::empty();
    if old.edge_count != new.edge_count {
        dirty |= DirtyStages::all();
    }
    if old.normal_mode != new.normal_mode {
        dirty |= LAYOUT | DirtyStages::CIRCLE_LOOKUP;
    }
    if old.cap_mode != new.cap_mode {
        dirty |= LAYOUT;
    }
    if old.invert_winding != new.invert_winding {
        dirty |= DirtyStages::TRIANGLES | DirtyStages::REDRAW;
    }
    if old.calculate_tangents != new.calculate_tangents {
        dirty |= DirtyStages::VERTEX_COUNT | DirtyStages::REDRAW;
    }
    if old.forward_angle_offset != new.forward_angle_offset {
        dirty |= DirtyStages::CIRCLE_LOOKUP
            | DirtyStages::REDRAW
            | DirtyStages::UVS;
    }
    if old.radius != new.radius {
        dirty |= DirtyStages::STEEPNESS_ANGLES | DirtyStages::REDRAW;
    }
    if old.uv_rect != new.uv_rect
        || old.uv_rect_cap != new.uv_rect_cap
        || old.mirror_end_cap != new.mirror_end_cap
        || old.anti_stretch_uv != new.anti_stretch_uv
    {
        dirty |= DirtyStages::UVS;
    }
    dirty
}

/// Sweeps a cross-section along a polyline and keeps the resulting mesh
/// up to date as the path, its attributes or the configuration change.
///
/// ```
/// use glam::Vec3;
/// use tubemesh::{CapMode, TubeGenerator};
///
/// let mut tube = TubeGenerator::new();
/// tube.set_points(vec![Vec3::ZERO, Vec3::Y])?;
/// tube.set_edge_count(4)?;
/// tube.set_cap_mode(CapMode::None)?;
/// tube.set_radius(1.0);
/// let _ = tube.update();
/// assert_eq!(tube.mesh().vertex_count(), 10);
/// assert_eq!(tube.mesh().indices().len(), 24);
/// # Ok::<(), tubemesh::TubeError>(())
/// ```
#[derive(Debug)]
pub struct TubeGenerator {
    options: TubeOptions,
    points: Vec<Vec3>,
    radii: PerPointAttribute<f32>,
    twists: PerPointAttribute<f32>,
    colors: PerPointAttribute<Rgba8>,
    frames: FrameSolver,
    steepness: SteepnessSolver,
    template: CrossSectionTemplate,
    surface: SurfaceBuilder,
    mesh: TubeMesh,
    dirty: DirtyStages,
    hooks: Postprocessors,
}

impl Default for TubeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TubeGenerator {
    /// A generator with default options and an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: TubeOptions::default(),
            points: Vec::new(),
            radii: PerPointAttribute::default(),
            twists: PerPointAttribute::default(),
            colors: PerPointAttribute::default(),
            frames: FrameSolver::new(),
            steepness: SteepnessSolver::new(),
            template: CrossSectionTemplate::default(),
            surface: SurfaceBuilder::new(),
            mesh: TubeMesh::default(),
            dirty: DirtyStages::all(),
            hooks: Postprocessors::default(),
        }
    }

    /// A generator configured with `options`.
    pub fn with_options(options: &TubeOptions) -> Result<Self, TubeError> {
        let mut generator = Self::new();
        generator.apply_options(options)?;
        Ok(generator)
    }

    // ==================== PATH & ATTRIBUTES ====================

    /// Replace the path. Takes ownership of `points`.
    ///
    /// Rejected, leaving the current path in place, if the new point count
    /// would exceed the vertex budget.
    pub fn set_points(
        &mut self,
        points: Vec<Vec3>,
    ) -> Result<(), TubeError> {
        if points.len() != self.points.len() {
            let _ = self.check_budget("points", points.len(), &self.options)?;
            self.dirty |= if self.points.len() < 2 {
                DirtyStages::all()
            } else {
                LAYOUT
            };
            self.warn_mismatched(points.len());
        }
        self.points = points;
        self.mark_points_moved();
        Ok(())
    }

    /// Move a single point. Returns `false` if `index` is out of range.
    pub fn set_point(&mut self, index: usize, position: Vec3) -> bool {
        let Some(point) = self.points.get_mut(index) else {
            return false;
        };
        *point = position;
        self.mark_points_moved();
        true
    }

    /// Current path.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Set one radius for the whole tube. Clears any per-point radii.
    pub fn set_radius(&mut self, radius: f32) {
        self.options.radius = radius;
        self.radii.clear();
        self.dirty |= DirtyStages::STEEPNESS_ANGLES | DirtyStages::REDRAW;
    }

    /// Global radius, used when no per-point radii apply.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.options.radius
    }

    /// Set one radius per point; an empty vector reverts to the global
    /// radius. Ignored while its length differs from the point count.
    pub fn set_radii(&mut self, radii: Vec<f32>) {
        self.radii.set(radii);
        self.warn_if_mismatched("radii", &self.radii);
        self.dirty |= DirtyStages::STEEPNESS_ANGLES | DirtyStages::REDRAW;
    }

    /// Per-point radii as supplied.
    #[must_use]
    pub fn radii(&self) -> &[f32] {
        self.radii.values()
    }

    /// Set one roll angle (degrees) per point; empty means no twist.
    pub fn set_twists(&mut self, twists: Vec<f32>) {
        self.twists.set(twists);
        self.warn_if_mismatched("twists", &self.twists);
        self.dirty |= DirtyStages::ROTATIONS | DirtyStages::REDRAW;
    }

    /// Per-point twists as supplied.
    #[must_use]
    pub fn twists(&self) -> &[f32] {
        self.twists.values()
    }

    /// Set one color per point; empty removes the color channel.
    pub fn set_colors(&mut self, colors: Vec<Rgba8>) {
        self.colors.set(colors);
        self.warn_if_mismatched("colors", &self.colors);
        self.dirty |= DirtyStages::COLORS;
    }

    /// Per-point colors as supplied.
    #[must_use]
    pub fn colors(&self) -> &[Rgba8] {
        self.colors.values()
    }

    // ==================== CONFIGURATION ====================

    /// Current configuration.
    #[must_use]
    pub fn options(&self) -> &TubeOptions {
        &self.options
    }

    /// Replace the whole configuration at once.
    ///
    /// Validation covers the combined change, so e.g. lowering the edge
    /// count while switching to a heavier normal mode is judged on the
    /// result. On error nothing is applied.
    pub fn apply_options(
        &mut self,
        options: &TubeOptions,
    ) -> Result<(), TubeError> {
        self.reconfigure("options", options.clone())?;
        Ok(())
    }

    /// Edges around the cross-section; at least [`MIN_EDGE_COUNT`].
    pub fn set_edge_count(
        &mut self,
        edge_count: usize,
    ) -> Result<(), TubeError> {
        let next = TubeOptions {
            edge_count,
            ..self.options.clone()
        };
        self.reconfigure("edge_count", next)
    }

    /// Shading topology.
    pub fn set_normal_mode(
        &mut self,
        normal_mode: NormalMode,
    ) -> Result<(), TubeError> {
        let next = TubeOptions {
            normal_mode,
            ..self.options.clone()
        };
        self.reconfigure("normal_mode", next)
    }

    /// Which ends get a cap.
    pub fn set_cap_mode(
        &mut self,
        cap_mode: CapMode,
    ) -> Result<(), TubeError> {
        let next = TubeOptions {
            cap_mode,
            ..self.options.clone()
        };
        self.reconfigure("cap_mode", next)
    }

    /// Turn the tube inside out.
    pub fn set_invert_winding(&mut self, invert: bool) {
        self.set_infallible(TubeOptions {
            invert_winding: invert,
            ..self.options.clone()
        });
    }

    /// Fill the tangent buffer.
    pub fn set_calculate_tangents(&mut self, enabled: bool) {
        self.set_infallible(TubeOptions {
            calculate_tangents: enabled,
            ..self.options.clone()
        });
    }

    /// UV rect of the tube body.
    pub fn set_uv_rect(&mut self, rect: UvRect) {
        self.set_infallible(TubeOptions {
            uv_rect: rect,
            ..self.options.clone()
        });
    }

    /// UV rect of the caps.
    pub fn set_uv_rect_cap(&mut self, rect: UvRect) {
        self.set_infallible(TubeOptions {
            uv_rect_cap: rect,
            ..self.options.clone()
        });
    }

    /// Map the end cap the same way round as the begin cap.
    pub fn set_mirror_end_cap(&mut self, mirror: bool) {
        self.set_infallible(TubeOptions {
            mirror_end_cap: mirror,
            ..self.options.clone()
        });
    }

    /// Advance U by arc length instead of by point index.
    pub fn set_anti_stretch_uv(&mut self, enabled: bool) {
        self.set_infallible(TubeOptions {
            anti_stretch_uv: enabled,
            ..self.options.clone()
        });
    }

    /// Roll the cross-section about the path, in degrees.
    pub fn set_forward_angle_offset(&mut self, degrees: f32) {
        self.set_infallible(TubeOptions {
            forward_angle_offset: degrees,
            ..self.options.clone()
        });
    }

    /// Rerun postprocess hooks on every update rather than only after a
    /// change.
    pub fn set_postprocess_continuously(&mut self, enabled: bool) {
        self.options.postprocess_continuously = enabled;
    }

    /// Validate and commit `next`, marking whatever it invalidates.
    fn reconfigure(
        &mut self,
        property: &'static str,
        next: TubeOptions,
    ) -> Result<(), TubeError> {
        if next.edge_count < MIN_EDGE_COUNT {
            log::warn!(
                "{property}: edge count {} rejected, minimum is \
                 {MIN_EDGE_COUNT}",
                next.edge_count
            );
            return Err(TubeError::InvalidEdgeCount {
                requested: next.edge_count,
            });
        }
        let dirty = invalidated_by(&self.options, &next);
        if dirty.contains(DirtyStages::VERTEX_COUNT) {
            let _ = self.check_budget(property, self.points.len(), &next)?;
        }
        if next.radius != self.options.radius {
            self.radii.clear();
        }
        self.options = next;
        self.dirty |= dirty;
        Ok(())
    }

    /// Commit an option change that can never break an invariant.
    fn set_infallible(&mut self, next: TubeOptions) {
        self.dirty |= invalidated_by(&self.options, &next);
        self.options = next;
    }

    fn check_budget(
        &self,
        property: &'static str,
        point_count: usize,
        options: &TubeOptions,
    ) -> Result<usize, TubeError> {
        budget::check(
            property,
            point_count,
            options.edge_count,
            options.normal_mode,
            options.cap_mode,
        )
    }

    // ==================== POSTPROCESS ====================

    /// Register a hook run after every redraw. Closures need their
    /// argument annotated: `|s: SurfaceMut<'_>| ...`.
    pub fn add_postprocess<H>(&mut self, hook: H) -> PostprocessId
    where
        H: MeshPostprocess + 'static,
    {
        self.dirty |= DirtyStages::REDRAW;
        self.hooks.add(Box::new(hook))
    }

    /// Unregister a hook. Returns whether it was registered.
    pub fn remove_postprocess(&mut self, id: PostprocessId) -> bool {
        let removed = self.hooks.remove(id);
        if removed {
            self.dirty |= DirtyStages::REDRAW;
        }
        removed
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn postprocess_count(&self) -> usize {
        self.hooks.len()
    }

    // ==================== PIPELINE ====================

    /// Whether any stage is waiting to run.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Stages waiting to run.
    #[must_use]
    pub fn pending(&self) -> DirtyStages {
        self.dirty
    }

    /// Mark every stage dirty (e.g. after mutating data the generator
    /// cannot observe).
    pub fn force_dirty(&mut self) {
        self.dirty = DirtyStages::all();
    }

    /// Rebuild everything now.
    pub fn force_update(&mut self) -> DirtyStages {
        self.force_dirty();
        self.update()
    }

    /// Run every pending stage in dependency order and return the stages
    /// that ran. With nothing pending this does nothing.
    ///
    /// A path with fewer than two points empties the mesh and leaves
    /// nothing pending. Growing the path back marks every stage.
    pub fn update(&mut self) -> DirtyStages {
        if self.points.len() < 2 {
            if !self.mesh.is_empty() || !self.frames.is_empty() {
                log::debug!(
                    "path has {} point(s), clearing mesh",
                    self.points.len()
                );
                self.mesh.clear();
                self.frames.solve(&[], None);
                self.steepness.clear();
            }
            self.dirty = DirtyStages::empty();
            return DirtyStages::empty();
        }

        if self.options.postprocess_continuously && !self.hooks.is_empty() {
            self.dirty |= DirtyStages::REDRAW;
        }

        let ran = self.dirty;
        for stage in ran.stages() {
            log::trace!("running stage {}", stage.name());
            self.run_stage(stage);
            self.dirty.remove(stage.flag());
        }
        ran
    }

    fn run_stage(&mut self, stage: Stage) {
        match stage {
            Stage::VertexCount => self.resize_buffers(),
            Stage::Rotations => {
                let n = self.points.len();
                self.frames.solve(&self.points, self.twists.resolve(n));
            }
            Stage::SteepnessAngles => {
                let n = self.points.len();
                self.steepness
                    .solve(self.radii.resolve(n), self.frames.lengths());
            }
            Stage::CircleLookup => {
                let _ = self.template.rebuild(TemplateKey {
                    edge_count: self.options.edge_count,
                    angle_offset: self.options.forward_angle_offset,
                    normal_mode: self.options.normal_mode,
                });
            }
            Stage::Redraw => self.redraw(),
            Stage::Triangles => topology::build_triangles(
                self.points.len(),
                self.options.edge_count,
                self.options.normal_mode,
                self.options.cap_mode,
                self.options.invert_winding,
                &mut self.mesh.indices,
            ),
            Stage::Uvs => {
                let input = UvInput {
                    lengths: self.frames.lengths(),
                    total_length: self.frames.total_length(),
                    template: &self.template,
                    normal_mode: self.options.normal_mode,
                    cap_mode: self.options.cap_mode,
                    uv_rect: self.options.uv_rect,
                    uv_rect_cap: self.options.uv_rect_cap,
                    mirror_end_cap: self.options.mirror_end_cap,
                    anti_stretch: self.options.anti_stretch_uv,
                };
                uv::build_uvs(&input, &mut self.mesh.uvs);
            }
            Stage::Colors => {
                let colors =
                    self.colors.resolve(self.points.len()).unwrap_or(&[]);
                color::build_colors(
                    colors,
                    self.options.edge_count,
                    self.options.normal_mode,
                    self.options.cap_mode,
                    &mut self.mesh.colors,
                );
            }
        }
    }

    fn resize_buffers(&mut self) {
        let n = self.points.len();
        let count = budget::vertex_count(
            n,
            self.options.edge_count,
            self.options.normal_mode,
            self.options.cap_mode,
        );
        let tangents = if self.options.calculate_tangents { count } else { 0 };
        if count != self.mesh.vertices.len() {
            log::debug!(
                "resizing tube buffers {} -> {count} vertices",
                self.mesh.vertices.len()
            );
        }
        self.mesh.vertices.resize(count, Vec3::ZERO);
        self.mesh.normals.resize(count, Vec3::ZERO);
        self.mesh.tangents.resize(tangents, Vec4::ZERO);
        if self.frames.len() != n {
            self.frames.reset_begin_up();
        }
    }

    fn redraw(&mut self) {
        let n = self.points.len();
        let radii = self
            .radii
            .resolve(n)
            .map_or(Radii::Uniform(self.options.radius), Radii::PerPoint);
        let input = SurfaceInput {
            points: &self.points,
            rotations: self.frames.rotations(),
            steepness: self.steepness.angles(),
            radii,
            template: &self.template,
            normal_mode: self.options.normal_mode,
            cap_mode: self.options.cap_mode,
            invert: self.options.invert_winding,
        };
        self.mesh.bounds =
            self.surface.build(&input, &mut self.mesh.surface_mut());
        self.hooks.run(&mut self.mesh);
    }

    fn mark_points_moved(&mut self) {
        self.dirty |= GEOMETRY;
        if self.options.anti_stretch_uv {
            self.dirty |= DirtyStages::UVS;
        }
    }

    fn warn_if_mismatched<T>(
        &self,
        name: &str,
        attribute: &PerPointAttribute<T>,
    ) {
        if attribute.is_mismatched(self.points.len()) {
            log::warn!(
                "{name}: {} values for {} points, ignoring until they match",
                attribute.len(),
                self.points.len()
            );
        }
    }

    /// Warn about attributes a new point count leaves mismatched.
    fn warn_mismatched(&self, point_count: usize) {
        let mismatched = [
            ("radii", self.radii.is_mismatched(point_count)),
            ("twists", self.twists.is_mismatched(point_count)),
            ("colors", self.colors.is_mismatched(point_count)),
        ];
        for (name, _) in mismatched.iter().filter(|(_, bad)| *bad) {
            log::warn!("{name} no longer match {point_count} points");
        }
    }

    // ==================== QUERIES ====================

    /// The generated mesh as of the last [`Self::update`].
    #[must_use]
    pub fn mesh(&self) -> &TubeMesh {
        &self.mesh
    }

    /// Vertex count the current path and configuration produce.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        Self::expected_vertex_count(
            self.points.len(),
            self.options.edge_count,
            self.options.normal_mode,
            self.options.cap_mode,
        )
    }

    /// Vertex count for an arbitrary path length and configuration,
    /// without building anything.
    #[must_use]
    pub fn expected_vertex_count(
        point_count: usize,
        edge_count: usize,
        normal_mode: NormalMode,
        cap_mode: CapMode,
    ) -> usize {
        budget::vertex_count(point_count, edge_count, normal_mode, cap_mode)
    }

    /// Vertex ceiling enforced by every setter.
    #[must_use]
    pub const fn max_vertex_count() -> usize {
        MAX_VERTEX_COUNT
    }

    /// Orientation at point `index`, identity when out of range.
    #[must_use]
    pub fn orientation_at(&self, index: usize) -> Quat {
        self.frames
            .rotations()
            .get(index)
            .copied()
            .unwrap_or(Quat::IDENTITY)
    }

    /// Distance from point `index` to the next, zero when out of range
    /// and for the last point.
    #[must_use]
    pub fn segment_length(&self, index: usize) -> f32 {
        self.frames.lengths().get(index).copied().unwrap_or(0.0)
    }

    /// Full frame at point `index`.
    #[must_use]
    pub fn frame_at(&self, index: usize) -> Option<Frame> {
        self.frames.frame(index)
    }

    /// Path length as of the last update.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.frames.total_length()
    }

    /// Steepness tilt at point `index`, in degrees.
    #[must_use]
    pub fn steepness_at(&self, index: usize) -> f32 {
        self.steepness.angle(index)
    }
}
