use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Serialize;
use tubemesh::{Rgba8, TubeError, TubeGenerator, TubeOptions};

/// Points sampled along the closed trefoil.
const SAMPLES: usize = 96;

/// Mesh statistics written as JSON.
#[derive(Serialize)]
struct Summary {
    points: usize,
    edge_count: usize,
    normal_mode: tubemesh::NormalMode,
    vertices: usize,
    triangles: usize,
    path_length: f32,
    bounds_min: [f32; 3],
    bounds_max: [f32; 3],
}

/// Closed trefoil knot; the last point repeats the first.
fn trefoil(samples: usize) -> Vec<Vec3> {
    let mut points: Vec<Vec3> = (0..samples)
        .map(|i| {
            let t = i as f32 / samples as f32 * TAU;
            Vec3::new(
                t.sin() + 2.0 * (2.0 * t).sin(),
                t.cos() - 2.0 * (2.0 * t).cos(),
                -(3.0 * t).sin(),
            )
        })
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

/// Hue ramp along the path.
fn rainbow(count: usize) -> Vec<Rgba8> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count.max(1) as f32 * TAU;
            let channel = |phase: f32| {
                ((t + phase).sin().mul_add(0.5, 0.5) * 255.0).round() as u8
            };
            [channel(0.0), channel(TAU / 3.0), channel(2.0 * TAU / 3.0), 255]
        })
        .collect()
}

fn build(options: &TubeOptions) -> Result<TubeGenerator, TubeError> {
    let points = trefoil(SAMPLES);
    let n = points.len();
    let base = options.radius;

    let mut tube = TubeGenerator::with_options(options)?;
    tube.set_points(points)?;
    tube.set_radii(
        (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32 * TAU;
                base * (3.0 * t).cos().mul_add(0.35, 1.0)
            })
            .collect(),
    );
    tube.set_twists((0..n).map(|i| i as f32 * 4.0).collect());
    tube.set_colors(rainbow(n));

    let stages = tube.update();
    log::debug!("ran stages {stages:?}");
    Ok(tube)
}

fn write_summary(tube: &TubeGenerator, path: &Path) -> Result<(), TubeError> {
    let mesh = tube.mesh();
    let bounds = mesh.bounds();
    let summary = Summary {
        points: tube.points().len(),
        edge_count: tube.options().edge_count,
        normal_mode: tube.options().normal_mode,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        path_length: tube.total_length(),
        bounds_min: bounds.min.to_array(),
        bounds_max: bounds.max.to_array(),
    };
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| TubeError::OptionsParse(e.to_string()))?;
    std::fs::write(path, json)?;
    log::info!("Wrote summary to {}", path.display());
    Ok(())
}

fn run(
    options_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
) -> Result<(), TubeError> {
    let options = match options_path {
        Some(path) => {
            log::info!("Loading options from {}", path.display());
            TubeOptions::load(&path)?
        }
        None => TubeOptions {
            radius: 0.25,
            ..TubeOptions::default()
        },
    };

    let tube = build(&options)?;
    let mesh = tube.mesh();
    let bounds = mesh.bounds();
    log::info!(
        "Trefoil: {} points, {} vertices, {} triangles, length {:.3}",
        tube.points().len(),
        mesh.vertex_count(),
        mesh.triangle_count(),
        tube.total_length()
    );
    log::info!(
        "Bounds: center {:?}, size {:?}; {} bytes of vertex data",
        bounds.center(),
        bounds.size(),
        std::mem::size_of_val(mesh.interleaved().as_slice())
    );

    if let Some(path) = summary_path {
        write_summary(&tube, &path)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let options_path = args.next();
    let summary_path = args.next();

    if let Err(e) = run(options_path, summary_path) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
