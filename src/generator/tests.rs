use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::geometry::budget::{triangle_index_count, vertex_count};
use crate::mesh::SurfaceMut;

const MODES: [NormalMode; 3] =
    [NormalMode::Smooth, NormalMode::Hard, NormalMode::HardEdges];
const CAPS: [CapMode; 4] =
    [CapMode::None, CapMode::Begin, CapMode::End, CapMode::Both];

fn tube(
    points: Vec<Vec3>,
    edges: usize,
    mode: NormalMode,
    caps: CapMode,
) -> TubeGenerator {
    let mut g = TubeGenerator::new();
    g.set_points(points).unwrap();
    g.set_edge_count(edges).unwrap();
    g.set_normal_mode(mode).unwrap();
    g.set_cap_mode(caps).unwrap();
    g
}

fn line(n: usize) -> Vec<Vec3> {
    (0..n).map(|i| Vec3::new(0.0, 0.0, i as f32)).collect()
}

/// `n` points around a wobbly circle plus a copy of the first.
fn closed_loop(n: usize) -> Vec<Vec3> {
    let mut points: Vec<Vec3> = (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * TAU;
            Vec3::new(2.0 * a.cos(), 2.0 * a.sin(), 0.5 * (3.0 * a).sin())
        })
        .collect();
    points.push(points[0]);
    points
}

fn same_basis(a: Quat, b: Quat, tol: f32) -> bool {
    [Vec3::X, Vec3::Y, Vec3::Z]
        .iter()
        .all(|&axis| (a * axis - b * axis).length() < tol)
}

fn random_points(rng: &mut StdRng, n: usize) -> Vec<Vec3> {
    let mut p = Vec3::ZERO;
    (0..n)
        .map(|_| {
            p += Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(0.1..1.0),
            );
            p
        })
        .collect()
}

fn assert_buffers_consistent(g: &TubeGenerator) {
    let mesh = g.mesh();
    let vc = mesh.vertex_count();
    assert_eq!(mesh.normals().len(), vc);
    assert_eq!(mesh.uvs().len(), vc);
    if g.options().calculate_tangents {
        assert_eq!(mesh.tangents().len(), vc);
    } else {
        assert!(mesh.tangents().is_empty());
    }
    if !mesh.colors().is_empty() {
        assert_eq!(mesh.colors().len(), vc);
    }
    assert!(mesh.indices().iter().all(|&i| (i as usize) < vc));
}

// ==================== SCENARIOS ====================

#[test]
fn single_segment_smooth_tube() {
    let mut g = tube(line(0), 4, NormalMode::Smooth, CapMode::None);
    g.set_points(vec![Vec3::ZERO, Vec3::Y]).unwrap();
    g.set_radius(1.0);
    let _ = g.update();

    let mesh = g.mesh();
    assert_eq!(mesh.vertex_count(), 10);
    assert_eq!(mesh.indices().len(), 24);
    assert_eq!(mesh.triangle_count(), 8);
    for v in mesh.vertices() {
        let radial = Vec3::new(v.x, 0.0, v.z);
        assert!((radial.length() - 1.0).abs() < 1e-5, "{v:?}");
    }
    let bounds = mesh.bounds();
    assert!((bounds.min - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-6);
    assert!((bounds.max - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-6);
    assert_buffers_consistent(&g);
}

#[test]
fn single_segment_with_both_caps() {
    let mut g = tube(
        vec![Vec3::ZERO, Vec3::Y],
        4,
        NormalMode::Smooth,
        CapMode::Both,
    );
    g.set_radius(1.0);
    let _ = g.update();

    let mesh = g.mesh();
    assert_eq!(mesh.vertex_count(), 10 + 12);
    assert_eq!(mesh.indices().len(), 24 + 24);
    // Cap centers sit on the path ends.
    assert_eq!(mesh.vertices()[15], Vec3::ZERO);
    assert_eq!(mesh.vertices()[21], Vec3::Y);
    assert_buffers_consistent(&g);
}

#[test]
fn closed_five_point_loop_matches_at_the_seam() {
    let points = vec![
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
    ];
    let mut g = tube(points, 8, NormalMode::Smooth, CapMode::None);
    g.set_twists(vec![0.0; 5]);
    let _ = g.update();

    let first = g.orientation_at(0);
    let last = g.orientation_at(4);
    assert!(same_basis(first, last, 1e-4), "{first:?} vs {last:?}");
    assert!(first.angle_between(last) < 1e-4);
}

#[test]
fn radius_bump_tilts_symmetrically() {
    let mut g = tube(line(5), 8, NormalMode::Smooth, CapMode::None);
    g.set_radii(vec![1.0, 1.0, 2.0, 1.0, 1.0]);
    let _ = g.update();

    let before = g.steepness_at(1);
    let after = g.steepness_at(3);
    assert!(before < -1.0, "rising side leans back: {before}");
    assert!((before + after).abs() < 1e-4, "{before} vs {after}");
    // The averaged slopes on either side of the peak cancel.
    assert!(g.steepness_at(2).abs() < 1e-4);
    assert_eq!(g.steepness_at(0), 0.0);
    assert_eq!(g.steepness_at(99), 0.0);
}

#[test]
fn switching_to_hard_duplicates_vertices() {
    let mut g = tube(line(3), 6, NormalMode::Smooth, CapMode::None);
    let _ = g.update();
    assert_eq!(g.mesh().vertex_count(), 21);
    assert_eq!(g.mesh().indices().len(), 72);

    g.set_normal_mode(NormalMode::Hard).unwrap();
    let ran = g.update();
    assert!(ran.contains(DirtyStages::VERTEX_COUNT | DirtyStages::REDRAW));
    assert_eq!(g.mesh().vertex_count(), 48);
    // Index count depends on segments and edges only.
    assert_eq!(g.mesh().indices().len(), 72);
    assert_buffers_consistent(&g);
}

// ==================== PROPERTIES ====================

#[test]
fn vertex_count_matches_closed_form() {
    let mut rng = StdRng::seed_from_u64(0x7ab3);
    for _ in 0..64 {
        let n = rng.random_range(2..40);
        let edges = rng.random_range(3..24);
        let mode = MODES[rng.random_range(0..MODES.len())];
        let caps = CAPS[rng.random_range(0..CAPS.len())];
        let mut g = tube(random_points(&mut rng, n), edges, mode, caps);
        g.set_calculate_tangents(rng.random_bool(0.5));
        if rng.random_bool(0.5) {
            g.set_colors((0..n).map(|i| [i as u8, 0, 0, 255]).collect());
        }
        let _ = g.update();

        let expected =
            TubeGenerator::expected_vertex_count(n, edges, mode, caps);
        assert_eq!(g.mesh().vertex_count(), expected, "{n} {edges} {mode:?}");
        assert_eq!(g.vertex_count(), expected);
        assert_eq!(
            g.mesh().indices().len(),
            triangle_index_count(n, edges, caps)
        );
        assert_buffers_consistent(&g);
    }
}

#[test]
fn update_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..16 {
        let n = rng.random_range(2..30);
        let mode = MODES[rng.random_range(0..MODES.len())];
        let caps = CAPS[rng.random_range(0..CAPS.len())];
        let mut g = tube(random_points(&mut rng, n), 7, mode, caps);
        g.set_radii((0..n).map(|_| rng.random_range(0.1..0.5)).collect());
        g.set_twists((0..n).map(|_| rng.random_range(-90.0..90.0)).collect());
        g.set_calculate_tangents(true);
        let _ = g.update();
        let first = g.mesh().clone();

        assert!(!g.is_dirty());
        assert_eq!(g.update(), DirtyStages::empty());
        assert_eq!(g.mesh(), &first);

        // A forced rebuild re-derives the begin frame from the remembered
        // up, which may differ in the last bits.
        let _ = g.force_update();
        assert_eq!(g.mesh().indices(), first.indices());
        assert_eq!(g.mesh().uvs(), first.uvs());
        for (a, b) in g.mesh().vertices().iter().zip(first.vertices()) {
            assert!((*a - *b).length() < 1e-4);
        }
    }
}

#[test]
fn closed_loop_orientations_agree() {
    for n in [6, 13, 40] {
        let mut g = tube(closed_loop(n), 6, NormalMode::Smooth, CapMode::None);
        let _ = g.update();
        let first = g.orientation_at(0);
        let last = g.orientation_at(n);
        assert!(first.angle_between(last) < 1e-4, "n={n}");
        for i in 0..n {
            let a = g.orientation_at(i);
            let b = g.orientation_at(i + 1);
            assert!(a.angle_between(b) < 1.5, "n={n} i={i}: frame jump");
        }
    }
}

#[test]
fn anti_stretch_uv_is_proportional_to_length() {
    let points = vec![
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, 3.0),
        Vec3::new(0.0, 0.0, 6.0),
    ];
    let mut g = tube(points, 4, NormalMode::Smooth, CapMode::None);
    g.set_anti_stretch_uv(true);
    let _ = g.update();
    assert!((g.total_length() - 6.0).abs() < 1e-5);

    let ring = 5;
    let uvs = g.mesh().uvs();
    for p in 0..3 {
        let du = uvs[(p + 1) * ring].x - uvs[p * ring].x;
        let expected = g.segment_length(p) / g.total_length();
        assert!((du - expected).abs() < 1e-5, "p={p}: {du} vs {expected}");
    }

    g.set_anti_stretch_uv(false);
    assert_eq!(g.pending(), DirtyStages::UVS);
    let _ = g.update();
    let uvs = g.mesh().uvs();
    for p in 0..3 {
        let du = uvs[(p + 1) * ring].x - uvs[p * ring].x;
        assert!((du - 1.0 / 3.0).abs() < 1e-5);
    }
}

// ==================== REJECTION ====================

#[test]
fn over_budget_edge_count_changes_nothing() {
    let mut g = tube(line(1000), 12, NormalMode::Smooth, CapMode::Both);
    let _ = g.update();
    let vertices = g.mesh().vertices().to_vec();
    let indices = g.mesh().indices().to_vec();

    let err = g.set_edge_count(100).unwrap_err();
    assert!(matches!(
        err,
        TubeError::VertexBudgetExceeded {
            property: "edge_count",
            limit: MAX_VERTEX_COUNT,
            ..
        }
    ));
    assert_eq!(g.options().edge_count, 12);
    assert!(!g.is_dirty());
    let _ = g.update();
    assert_eq!(g.mesh().vertices(), vertices.as_slice());
    assert_eq!(g.mesh().indices(), indices.as_slice());
}

#[test]
fn overflowing_edge_count_is_over_budget() {
    for mode in MODES {
        let mut g = tube(line(2), 4, mode, CapMode::None);
        let _ = g.update();

        let err = g.set_edge_count(usize::MAX).unwrap_err();
        assert!(
            matches!(
                err,
                TubeError::VertexBudgetExceeded {
                    property: "edge_count",
                    requested: usize::MAX,
                    ..
                }
            ),
            "{mode:?}: {err}"
        );
        assert_eq!(g.options().edge_count, 4);
        assert!(!g.is_dirty());

        let opts = TubeOptions {
            edge_count: usize::MAX / 2,
            ..g.options().clone()
        };
        assert!(g.apply_options(&opts).is_err());
        assert_eq!(g.options().edge_count, 4);
    }
}

#[test]
fn over_budget_mode_cap_and_points_are_rejected() {
    let mut g = tube(line(2000), 12, NormalMode::Smooth, CapMode::Both);
    assert!(g.set_normal_mode(NormalMode::Hard).is_err());
    assert_eq!(g.options().normal_mode, NormalMode::Smooth);

    g.set_cap_mode(CapMode::None).unwrap();
    g.set_points(line(5000)).unwrap();
    assert_eq!(g.vertex_count(), MAX_VERTEX_COUNT);
    assert!(g.set_cap_mode(CapMode::Begin).is_err());
    assert_eq!(g.options().cap_mode, CapMode::None);

    assert!(g.set_points(line(5001)).is_err());
    assert_eq!(g.points().len(), 5000);
}

#[test]
fn too_few_edges_are_rejected() {
    let mut g = tube(line(3), 5, NormalMode::Smooth, CapMode::None);
    let _ = g.update();
    let err = g.set_edge_count(2).unwrap_err();
    assert!(matches!(err, TubeError::InvalidEdgeCount { requested: 2 }));
    assert_eq!(g.options().edge_count, 5);
    assert!(!g.is_dirty());
}

#[test]
fn apply_options_is_all_or_nothing() {
    let mut g = tube(line(1000), 12, NormalMode::Smooth, CapMode::Both);
    let _ = g.update();
    let before = g.options().clone();

    let heavy = TubeOptions {
        edge_count: 100,
        invert_winding: true,
        ..before.clone()
    };
    assert!(g.apply_options(&heavy).is_err());
    assert_eq!(g.options(), &before);

    let light = TubeOptions {
        edge_count: 6,
        normal_mode: NormalMode::HardEdges,
        invert_winding: true,
        ..before
    };
    g.apply_options(&light).unwrap();
    let _ = g.update();
    assert_eq!(
        g.mesh().vertex_count(),
        vertex_count(1000, 6, NormalMode::HardEdges, CapMode::Both)
    );
}

// ==================== INCREMENTAL UPDATES ====================

#[test]
fn setters_mark_only_what_they_invalidate() {
    let mut g = tube(line(4), 6, NormalMode::Smooth, CapMode::Both);
    let _ = g.update();

    g.set_radius(0.3);
    assert_eq!(
        g.update(),
        DirtyStages::STEEPNESS_ANGLES | DirtyStages::REDRAW
    );

    g.set_colors(vec![[255; 4]; 4]);
    assert_eq!(g.update(), DirtyStages::COLORS);

    g.set_invert_winding(true);
    assert_eq!(g.pending(), DirtyStages::TRIANGLES | DirtyStages::REDRAW);

    g.set_uv_rect(UvRect::new(0.0, 0.0, 2.0, 1.0));
    g.set_mirror_end_cap(true);
    assert_eq!(
        g.update(),
        DirtyStages::REDRAW | DirtyStages::TRIANGLES | DirtyStages::UVS
    );

    let _ = g.set_point(1, Vec3::new(0.5, 0.0, 1.0));
    assert_eq!(
        g.update(),
        DirtyStages::ROTATIONS
            | DirtyStages::STEEPNESS_ANGLES
            | DirtyStages::REDRAW
    );

    g.set_edge_count(8).unwrap();
    assert_eq!(g.update(), DirtyStages::all());
    assert!(!g.set_point(10, Vec3::ZERO));
}

#[test]
fn triangles_face_along_their_vertex_normals() {
    let path: Vec<Vec3> = (0..8)
        .map(|i| {
            let t = i as f32;
            Vec3::new(0.5 * (t * 0.5).sin(), 0.2 * t, t)
        })
        .collect();
    let radii = vec![0.1, 0.12, 0.15, 0.12, 0.1, 0.1, 0.14, 0.1];

    let mut disagreements = Vec::new();
    for mode in MODES {
        for caps in CAPS {
            for invert in [false, true] {
                let mut g = tube(path.clone(), 7, mode, caps);
                g.set_radii(radii.clone());
                g.set_invert_winding(invert);
                let _ = g.update();

                let mesh = g.mesh();
                let (pos, nrm) = (mesh.vertices(), mesh.normals());
                for tri in mesh.indices().chunks_exact(3) {
                    let [a, b, c] =
                        [tri[0], tri[1], tri[2]].map(|i| i as usize);
                    let face = (pos[b] - pos[a]).cross(pos[c] - pos[a]);
                    if face.length_squared() < 1e-12 {
                        continue;
                    }
                    let shading = nrm[a] + nrm[b] + nrm[c];
                    if face.dot(shading) <= 0.0 {
                        disagreements.push((mode, caps, invert, [a, b, c]));
                    }
                }
            }
        }
    }
    assert!(disagreements.is_empty(), "{disagreements:?}");
}

#[test]
fn inverted_tube_flips_normals() {
    let mut plain = tube(line(3), 5, NormalMode::Hard, CapMode::Both);
    let mut inverted = tube(line(3), 5, NormalMode::Hard, CapMode::Both);
    inverted.set_invert_winding(true);
    let _ = plain.update();
    let _ = inverted.update();

    let a = plain.mesh();
    let b = inverted.mesh();
    assert_eq!(a.vertices(), b.vertices());
    assert_ne!(a.indices(), b.indices());
    for (na, nb) in a.normals().iter().zip(b.normals()) {
        assert!((*na + *nb).length() < 1e-5);
    }
}

#[test]
fn twist_rolls_the_frames() {
    let mut g = tube(line(3), 6, NormalMode::Smooth, CapMode::None);
    let _ = g.update();
    let plain = g.frame_at(1).unwrap();

    g.set_twists(vec![0.0, 90.0, 0.0]);
    assert_eq!(g.update(), DirtyStages::ROTATIONS | DirtyStages::REDRAW);
    let twisted = g.frame_at(1).unwrap();
    assert!((plain.forward() - twisted.forward()).length() < 1e-5);
    assert!(plain.up().dot(twisted.up()).abs() < 1e-5);
}

#[test]
fn tangents_follow_the_toggle() {
    let mut g = tube(line(3), 6, NormalMode::HardEdges, CapMode::Both);
    g.set_calculate_tangents(true);
    let _ = g.update();
    assert_eq!(g.mesh().tangents().len(), g.mesh().vertex_count());
    assert!(g.mesh().tangents().iter().all(|t| t.w == -1.0));

    g.set_calculate_tangents(false);
    let _ = g.update();
    assert!(g.mesh().tangents().is_empty());
}

// ==================== ATTRIBUTES ====================

#[test]
fn colors_are_cleared_when_removed() {
    let mut g = tube(line(2), 4, NormalMode::Smooth, CapMode::Both);
    g.set_colors(vec![[255, 0, 0, 255], [0, 0, 255, 255]]);
    let _ = g.update();
    assert_eq!(g.mesh().colors().len(), g.mesh().vertex_count());

    g.set_colors(Vec::new());
    let _ = g.update();
    assert!(g.mesh().colors().is_empty());
    assert_eq!(g.mesh().interleaved()[0].color, [1.0; 4]);
}

#[test]
fn mismatched_attributes_fall_back() {
    let mut plain = tube(line(3), 6, NormalMode::Smooth, CapMode::Both);
    plain.set_radius(0.4);
    let _ = plain.update();

    let mut g = tube(line(3), 6, NormalMode::Smooth, CapMode::Both);
    g.set_radius(0.4);
    g.set_radii(vec![1.0, 2.0]);
    g.set_twists(vec![45.0; 7]);
    g.set_colors(vec![[0; 4]; 2]);
    let _ = g.update();

    assert_eq!(g.mesh().vertices(), plain.mesh().vertices());
    assert!(g.mesh().colors().is_empty());
    assert_eq!(g.radii(), &[1.0, 2.0]);
}

#[test]
fn scalar_radius_replaces_per_point_radii() {
    let mut g = tube(line(3), 6, NormalMode::Smooth, CapMode::None);
    g.set_radii(vec![0.2, 0.4, 0.6]);
    let _ = g.update();
    assert!(g.steepness_at(1) != 0.0);

    g.set_radius(0.5);
    assert!(g.radii().is_empty());
    let _ = g.update();
    assert_eq!(g.steepness_at(1), 0.0);
    let v = g.mesh().vertices()[7];
    assert!((Vec3::new(v.x, v.y, 0.0).length() - 0.5).abs() < 1e-5);
}

#[test]
fn short_paths_empty_the_mesh() {
    let mut g = tube(line(3), 6, NormalMode::Smooth, CapMode::Both);
    let _ = g.update();
    assert!(!g.mesh().is_empty());

    g.set_points(vec![Vec3::ONE]).unwrap();
    assert_eq!(g.update(), DirtyStages::empty());
    assert!(!g.is_dirty());
    g.set_colors(vec![[255; 4]]);
    let _ = g.update();
    assert!(!g.is_dirty());
    assert!(g.mesh().is_empty());
    assert!(g.mesh().indices().is_empty());
    assert_eq!(g.orientation_at(0), Quat::IDENTITY);
    assert_eq!(g.segment_length(0), 0.0);
    assert!(g.frame_at(0).is_none());

    g.set_points(line(2)).unwrap();
    assert_eq!(g.pending(), DirtyStages::all());
    assert_eq!(g.update(), DirtyStages::all());
    assert_eq!(
        g.mesh().vertex_count(),
        vertex_count(2, 6, NormalMode::Smooth, CapMode::Both)
    );
    assert_eq!(g.mesh().colors().len(), 0);
    assert_buffers_consistent(&g);
}

#[test]
fn queries_fall_back_out_of_range() {
    let mut g = tube(line(3), 6, NormalMode::Smooth, CapMode::None);
    let _ = g.update();
    assert_eq!(g.segment_length(0), 1.0);
    assert_eq!(g.segment_length(2), 0.0);
    assert_eq!(g.segment_length(3), 0.0);
    assert_eq!(g.orientation_at(3), Quat::IDENTITY);
    assert!((g.total_length() - 2.0).abs() < 1e-6);
}

// ==================== POSTPROCESS ====================

#[test]
fn postprocess_hooks_rewrite_the_surface() {
    let mut g = tube(line(2), 4, NormalMode::Smooth, CapMode::None);
    let _ = g.update();
    let original = g.mesh().vertices().to_vec();

    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let id = g.add_postprocess(move |s: SurfaceMut<'_>| {
        counter.set(counter.get() + 1);
        for v in s.vertices.iter_mut() {
            v.x += 10.0;
        }
    });
    assert_eq!(g.postprocess_count(), 1);

    let _ = g.update();
    assert_eq!(calls.get(), 1);
    for (moved, orig) in g.mesh().vertices().iter().zip(&original) {
        assert!((moved.x - orig.x - 10.0).abs() < 1e-5);
    }

    // Continuous mode redraws on every update while hooks exist.
    assert!(g.update().contains(DirtyStages::REDRAW));
    assert_eq!(calls.get(), 2);

    g.set_postprocess_continuously(false);
    assert_eq!(g.update(), DirtyStages::empty());
    assert_eq!(calls.get(), 2);

    assert!(g.remove_postprocess(id));
    assert!(!g.remove_postprocess(id));
    let _ = g.update();
    assert_eq!(g.mesh().vertices(), original.as_slice());
}

#[test]
fn options_round_trip_through_the_generator() {
    let options = TubeOptions {
        edge_count: 5,
        normal_mode: NormalMode::HardEdges,
        cap_mode: CapMode::End,
        radius: 0.25,
        ..TubeOptions::default()
    };
    let mut g = TubeGenerator::with_options(&options).unwrap();
    assert_eq!(g.options(), &options);
    g.set_points(line(4)).unwrap();
    let _ = g.update();
    assert_eq!(
        g.mesh().vertex_count(),
        vertex_count(4, 5, NormalMode::HardEdges, CapMode::End)
    );

    let bad = TubeOptions {
        edge_count: 1,
        ..TubeOptions::default()
    };
    assert!(TubeGenerator::with_options(&bad).is_err());
}
