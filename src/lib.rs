// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (clippy defaults)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Procedural swept-tube meshes.
//!
//! A tube is a polygonal cross-section swept along a polyline. Per-point
//! radius, twist and color vary it along the way; the result is a set of
//! plain vertex, normal, tangent, UV, color and index buffers ready for
//! any renderer.
//!
//! # Key entry points
//!
//! - [`TubeGenerator`] - owns the path and configuration, rebuilds the mesh
//!   incrementally on [`TubeGenerator::update`]
//! - [`TubeOptions`] - serializable configuration with TOML presets
//! - [`TubeMesh`] - the generated buffers, plus an interleaved
//!   [`TubeVertex`] view for GPU upload
//! - [`geometry`] - the individual stages (frames, steepness, surface,
//!   topology, UVs, colors) as standalone building blocks
//!
//! # Pipeline
//!
//! Property setters mark the [`pipeline::Stage`]s they invalidate. Each
//! `update` runs only the marked stages, in dependency order: buffer
//! sizing, frames, steepness tilts, cross-section template, surface
//! (followed by [`MeshPostprocess`] hooks), then triangles, UVs and
//! colors. Changes that would exceed [`MAX_VERTEX_COUNT`] are rejected
//! before they touch any state.

pub mod error;
pub mod generator;
pub mod geometry;
pub mod mesh;
pub mod options;
pub mod pipeline;

pub use error::TubeError;
pub use generator::{
    MeshPostprocess, PerPointAttribute, PostprocessId, TubeGenerator,
    MIN_EDGE_COUNT,
};
pub use geometry::budget::MAX_VERTEX_COUNT;
pub use geometry::frame::Frame;
pub use mesh::{Aabb, Rgba8, SurfaceMut, TubeMesh, TubeVertex};
pub use options::{CapMode, NormalMode, TubeOptions, UvRect};
pub use pipeline::{DirtyStages, Stage};
