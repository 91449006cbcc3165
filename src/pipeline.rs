//! Pipeline stages and the dirty bits that schedule them.
//!
//! Setters mark the stages their change invalidates; `update` then runs
//! every marked stage in [`Stage::ORDER`], which lists each stage after
//! everything it reads from.

use bitflags::bitflags;

bitflags! {
    /// Set of pipeline stages waiting to run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyStages: u8 {
        /// Buffer sizes follow point count, edge count, mode or caps.
        const VERTEX_COUNT = 1 << 0;
        /// Frames follow points or twists.
        const ROTATIONS = 1 << 1;
        /// Tilts follow per-point radii or segment lengths.
        const STEEPNESS_ANGLES = 1 << 2;
        /// Cross-section template follows edge count, offset or mode.
        const CIRCLE_LOOKUP = 1 << 3;
        /// Vertices, normals and tangents.
        const REDRAW = 1 << 4;
        /// Index buffer.
        const TRIANGLES = 1 << 5;
        /// Texture coordinates.
        const UVS = 1 << 6;
        /// Vertex colors.
        const COLORS = 1 << 7;
    }
}

/// One stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resize the output buffers.
    VertexCount,
    /// Solve orientation frames.
    Rotations,
    /// Solve steepness tilts.
    SteepnessAngles,
    /// Rebuild the cross-section template.
    CircleLookup,
    /// Build vertices, normals and tangents, then run postprocess hooks.
    Redraw,
    /// Stitch the index buffer.
    Triangles,
    /// Fill texture coordinates.
    Uvs,
    /// Fill vertex colors.
    Colors,
}

impl Stage {
    /// Execution order; every stage comes after its dependencies.
    pub const ORDER: [Self; 8] = [
        Self::VertexCount,
        Self::Rotations,
        Self::SteepnessAngles,
        Self::CircleLookup,
        Self::Redraw,
        Self::Triangles,
        Self::Uvs,
        Self::Colors,
    ];

    /// The dirty bit that schedules this stage.
    #[must_use]
    pub const fn flag(self) -> DirtyStages {
        match self {
            Self::VertexCount => DirtyStages::VERTEX_COUNT,
            Self::Rotations => DirtyStages::ROTATIONS,
            Self::SteepnessAngles => DirtyStages::STEEPNESS_ANGLES,
            Self::CircleLookup => DirtyStages::CIRCLE_LOOKUP,
            Self::Redraw => DirtyStages::REDRAW,
            Self::Triangles => DirtyStages::TRIANGLES,
            Self::Uvs => DirtyStages::UVS,
            Self::Colors => DirtyStages::COLORS,
        }
    }

    /// Stages whose output this stage reads.
    #[must_use]
    pub const fn depends_on(self) -> DirtyStages {
        match self {
            Self::VertexCount | Self::CircleLookup => DirtyStages::empty(),
            Self::Rotations => DirtyStages::VERTEX_COUNT,
            Self::SteepnessAngles => DirtyStages::ROTATIONS,
            Self::Redraw => DirtyStages::VERTEX_COUNT
                .union(DirtyStages::ROTATIONS)
                .union(DirtyStages::STEEPNESS_ANGLES)
                .union(DirtyStages::CIRCLE_LOOKUP),
            Self::Triangles | Self::Colors => DirtyStages::REDRAW,
            Self::Uvs => DirtyStages::REDRAW
                .union(DirtyStages::ROTATIONS)
                .union(DirtyStages::CIRCLE_LOOKUP),
        }
    }

    /// Short name for log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VertexCount => "vertex_count",
            Self::Rotations => "rotations",
            Self::SteepnessAngles => "steepness_angles",
            Self::CircleLookup => "circle_lookup",
            Self::Redraw => "redraw",
            Self::Triangles => "triangles",
            Self::Uvs => "uvs",
            Self::Colors => "colors",
        }
    }
}

impl DirtyStages {
    /// Stages in this set, in execution order.
    pub fn stages(self) -> impl Iterator<Item = Stage> {
        Stage::ORDER
            .into_iter()
            .filter(move |stage| self.contains(stage.flag()))
    }
}
