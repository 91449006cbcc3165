//! Output geometry buffers.
//!
//! [`TubeMesh`] owns every buffer the generator emits. Callers get
//! read-only slices; only the generator (and postprocess hooks, through
//! [`SurfaceMut`]) can write to them.

use glam::{Vec2, Vec3, Vec4};

/// 8-bit RGBA vertex color.
pub type Rgba8 = [u8; 4];

// ==================== BOUNDS ====================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Box inverted to infinity, ready to grow with `include_sphere`.
    pub(crate) const INVERTED: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Grow to contain a sphere at `center` with `radius`.
    pub(crate) fn include_sphere(&mut self, center: Vec3, radius: f32) {
        let r = Vec3::splat(radius.abs());
        self.min = self.min.min(center - r);
        self.max = self.max.max(center + r);
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box on each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ==================== VERTEX FORMAT ====================

/// 48-byte interleaved tube vertex for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TubeVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
    /// Linear RGBA color in `[0, 1]`; white when the mesh has no colors.
    pub color: [f32; 4],
}

// ==================== POSTPROCESS VIEW ====================

/// Mutable view of the surface buffers handed to postprocess hooks.
///
/// Slices, not vectors: a hook may rewrite values in place but can never
/// change a buffer's length.
pub struct SurfaceMut<'a> {
    /// Vertex positions.
    pub vertices: &'a mut [Vec3],
    /// Vertex normals, same length as `vertices`.
    pub normals: &'a mut [Vec3],
    /// Tangents with handedness in `w`; empty unless tangents are enabled.
    pub tangents: &'a mut [Vec4],
}

// ==================== MESH ====================

/// Geometry produced by a [`crate::TubeGenerator`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TubeMesh {
    pub(crate) vertices: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) tangents: Vec<Vec4>,
    pub(crate) uvs: Vec<Vec2>,
    pub(crate) colors: Vec<Rgba8>,
    pub(crate) indices: Vec<u32>,
    pub(crate) bounds: Aabb,
}

impl TubeMesh {
    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Vertex normals.
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Tangents (`w` = -1); empty unless tangents are enabled.
    #[must_use]
    pub fn tangents(&self) -> &[Vec4] {
        &self.tangents
    }

    /// Texture coordinates.
    #[must_use]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Vertex colors; empty unless per-point colors were supplied.
    #[must_use]
    pub fn colors(&self) -> &[Rgba8] {
        &self.colors
    }

    /// Triangle list indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Bounds of the swept surface.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Interleave positions, normals, UVs and colors into upload-ready
    /// vertices.
    #[must_use]
    pub fn interleaved(&self) -> Vec<TubeVertex> {
        const WHITE: [f32; 4] = [1.0; 4];
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, pos)| TubeVertex {
                position: pos.to_array(),
                normal: self.normals.get(i).map_or([0.0; 3], Vec3::to_array),
                uv: self.uvs.get(i).map_or([0.0; 2], Vec2::to_array),
                color: self.colors.get(i).map_or(WHITE, |c| {
                    c.map(|channel| f32::from(channel) / 255.0)
                }),
            })
            .collect()
    }

    /// Index buffer as raw bytes (`u32` little/native endian).
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Drop all geometry.
    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.tangents.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
        self.bounds = Aabb::default();
    }

    /// Borrow the surface buffers for writing.
    pub(crate) fn surface_mut(&mut self) -> SurfaceMut<'_> {
        SurfaceMut {
            vertices: &mut self.vertices,
            normals: &mut self.normals,
            tangents: &mut self.tangents,
        }
    }
}
