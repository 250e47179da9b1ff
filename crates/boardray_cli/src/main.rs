//! Command-line front end: load (or synthesize) a board scene, render
//! it progressively, and write a PNG.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use boardray_render::{
    render_blocking, start_render, CameraConfig, Light, Material, Quality, Scene,
    SceneDescription, Shape, Vec2, Vec3,
};

#[derive(Parser)]
#[command(name = "boardray", about = "Offline ray-traced board renderer")]
struct Args {
    /// Scene JSON file; renders a built-in demo board when omitted.
    scene: Option<PathBuf>,

    /// Output image path (PNG).
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Target samples per pixel.
    #[arg(short, long, default_value_t = 4)]
    samples: u32,

    /// Shadow rays per area light.
    #[arg(long, default_value_t = 8)]
    shadow_samples: u32,

    /// Worker threads; defaults to hardware concurrency.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Wall-clock budget in milliseconds; the render stops refining
    /// once it runs out.
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// Run the denoise post-process.
    #[arg(long)]
    denoise: bool,

    /// Print progress while rendering.
    #[arg(short, long)]
    progress: bool,
}

/// On-disk scene file: the description plus a camera. The camera's
/// width/height are overridden by the CLI resolution flags.
#[derive(Deserialize)]
struct SceneFile {
    #[serde(flatten)]
    description: SceneDescription,
    camera: CameraConfig,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (description, mut camera) = match &args.scene {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading scene file {}", path.display()))?;
            let file: SceneFile = serde_json::from_str(&text)
                .with_context(|| format!("parsing scene file {}", path.display()))?;
            (file.description, file.camera)
        }
        None => {
            log::info!("no scene file given, rendering the demo board");
            demo_board()
        }
    };
    camera.width = args.width;
    camera.height = args.height;

    let scene = Arc::new(Scene::build(&description).context("building scene")?);
    let quality = Quality {
        samples_per_pixel: args.samples,
        shadow_samples: args.shadow_samples,
        threads: args.threads,
        time_budget_ms: args.time_budget_ms,
        postprocess: args.denoise,
        ..Quality::default()
    };

    let result = if args.progress {
        let handle = start_render(scene, camera, quality);
        while !handle.is_finished() {
            eprint!("\r{:5.1}%", handle.progress() * 100.0);
            std::thread::sleep(Duration::from_millis(200));
        }
        eprintln!("\r100.0%");
        handle.wait()
    } else {
        render_blocking(scene, camera, quality)
    };

    log::info!(
        "rendered {} spp in {:.1?} (complete: {})",
        result.achieved_spp,
        result.elapsed,
        result.complete
    );

    let fb = result.framebuffer;
    let img = image::RgbImage::from_raw(fb.width(), fb.height(), fb.as_bytes().to_vec())
        .context("framebuffer size mismatch")?;
    img.save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}

/// A small self-contained board: substrate, soldermask layer with a
/// routed outline, copper traces and vias, one component body, and a
/// mesh part, under one point and one area light.
fn demo_board() -> (SceneDescription, CameraConfig) {
    let mut desc = SceneDescription::new();
    let substrate = desc.add_material(Material::substrate());
    let mask = desc.add_material(Material::soldermask());
    let copper = desc.add_material(Material::copper());
    let silk = desc.add_material(Material::silkscreen());

    // FR-4 core.
    desc.add_solid(
        Shape::Block {
            min: Vec3::new(-30.0, -20.0, -1.6),
            max: Vec3::new(30.0, 20.0, 0.0),
        },
        substrate,
    );

    // Soldermask layer with a notched outline.
    desc.add_solid(
        Shape::LayerSlab {
            outline: vec![
                Vec2::new(-30.0, -20.0),
                Vec2::new(30.0, -20.0),
                Vec2::new(30.0, 12.0),
                Vec2::new(22.0, 20.0),
                Vec2::new(-30.0, 20.0),
            ],
            z_bottom: 0.0,
            z_top: 0.05,
            tint: None,
        },
        mask,
    );

    // Exposed copper traces, slightly proud of the mask.
    for (i, y) in [-12.0f32, -6.0, 0.0, 6.0, 12.0].iter().enumerate() {
        desc.add_solid(
            Shape::LayerSlab {
                outline: vec![
                    Vec2::new(-25.0, y - 0.6),
                    Vec2::new(20.0, y - 0.6),
                    Vec2::new(20.0, y + 0.6),
                    Vec2::new(-25.0, y + 0.6),
                ],
                z_bottom: 0.05,
                z_top: 0.1,
                tint: if i % 2 == 0 {
                    None
                } else {
                    Some(Vec3::splat(0.8))
                },
            },
            copper,
        );
    }

    // Via barrels.
    for x in [-20.0f32, -10.0, 0.0, 10.0] {
        desc.add_solid(
            Shape::Cylinder {
                center: Vec2::new(x, 16.0),
                radius: 0.8,
                z_bottom: -1.6,
                z_top: 0.15,
            },
            copper,
        );
    }

    // Component body with a silkscreen reference patch beside it.
    desc.add_solid(
        Shape::Block {
            min: Vec3::new(5.0, -16.0, 0.1),
            max: Vec3::new(15.0, -9.0, 2.5),
        },
        silk,
    );
    desc.add_solid(
        Shape::Mesh {
            vertices: vec![
                Vec3::new(-14.0, 8.0, 0.1),
                Vec3::new(-8.0, 8.0, 0.1),
                Vec3::new(-8.0, 14.0, 0.1),
                Vec3::new(-14.0, 14.0, 0.1),
                Vec3::new(-11.0, 11.0, 3.0),
            ],
            indices: vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        },
        copper,
    );

    desc.add_light(Light::point(Vec3::new(-40.0, -30.0, 50.0), Vec3::splat(0.7)));
    desc.add_light(Light::area(Vec3::new(20.0, 30.0, 40.0), Vec3::splat(0.9), 6.0));

    let camera = CameraConfig {
        position: Vec3::new(0.0, -45.0, 35.0),
        look_at: Vec3::new(0.0, 0.0, 0.0),
        up: Vec3::Z,
        vfov_degrees: 45.0,
        width: 1280,
        height: 720,
    };
    (desc, camera)
}
