//! Pure mesh-building stages.
//!
//! Each submodule is one pipeline stage and is a function of its inputs
//! only: frames from points, tilts from radii, surface from frames, and
//! indices, UVs and colors from the vertex layout. The generator owns the
//! buffers and decides which stages to rerun.

pub mod budget;
pub mod color;
pub mod frame;
pub mod steepness;
pub mod surface;
pub mod template;
pub mod topology;
pub mod uv;
