//! Hooks that rewrite the surface after each redraw.

use std::fmt;

use crate::mesh::{SurfaceMut, TubeMesh};

/// Callback run right after vertices, normals and tangents are rebuilt,
/// before the mesh is handed out.
///
/// Hooks may move vertices or bend normals but cannot resize buffers.
/// Any `FnMut(SurfaceMut<'_>)` closure is a hook.
pub trait MeshPostprocess {
    /// Rewrite the freshly built surface in place.
    fn postprocess(&mut self, surface: SurfaceMut<'_>);
}

impl<F> MeshPostprocess for F
where
    F: FnMut(SurfaceMut<'_>),
{
    fn postprocess(&mut self, surface: SurfaceMut<'_>) {
        self(surface);
    }
}

/// Handle returned by [`crate::TubeGenerator::add_postprocess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostprocessId(u64);

/// Registered hooks in insertion order.
#[derive(Default)]
pub(crate) struct Postprocessors {
    next_id: u64,
    hooks: Vec<(PostprocessId, Box<dyn MeshPostprocess>)>,
}

impl fmt::Debug for Postprocessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Postprocessors")
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl Postprocessors {
    pub(crate) fn add(
        &mut self,
        hook: Box<dyn MeshPostprocess>,
    ) -> PostprocessId {
        let id = PostprocessId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, hook));
        id
    }

    pub(crate) fn remove(&mut self, id: PostprocessId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook_id, _)| *hook_id != id);
        self.hooks.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run every hook, in insertion order, on `mesh`'s surface.
    pub(crate) fn run(&mut self, mesh: &mut TubeMesh) {
        for (_, hook) in &mut self.hooks {
            hook.postprocess(mesh.surface_mut());
        }
    }
}
