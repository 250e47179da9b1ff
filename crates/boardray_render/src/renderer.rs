//! Progressive render orchestration.
//!
//! [`start_render`] spawns a coordinator thread that runs a schedule of
//! full-frame passes at doubling sample counts (1, 2, 4, … up to the
//! quality target). After each completed pass the framebuffer holds a
//! coherent full-frame image at that pass's quality; a snapshot taken
//! mid-pass shows finished tiles of the new pass over the previous
//! pass's frame, never torn tiles. The wall-clock budget is checked
//! between passes only, so a pass that has started always runs to
//! completion (or cancellation).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use boardray_scene::{CameraConfig, Quality};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::color::{rgb_to_vec, vec_to_rgb};
use crate::framebuffer::Framebuffer;
use crate::scene::Scene;
use crate::scheduler::{render_pass, PassConfig};
use crate::tile::generate_tiles;

/// Outcome of a render: the final framebuffer plus what was actually
/// achieved before the budget or a cancellation stopped the schedule.
pub struct RenderResult {
    pub framebuffer: Framebuffer,
    /// Samples per pixel of the last fully completed pass; 0 if no
    /// pass finished.
    pub achieved_spp: u32,
    /// True when the full pass schedule ran; false on cancellation or
    /// an exhausted time budget.
    pub complete: bool,
    pub elapsed: std::time::Duration,
}

struct Shared {
    framebuffer: Mutex<Framebuffer>,
    cancel: AtomicBool,
    tiles_done: AtomicUsize,
    tiles_total: AtomicUsize,
}

/// Handle to an in-flight render: cancel it, poll progress, snapshot
/// the current framebuffer, or wait for the result.
pub struct RenderHandle {
    shared: Arc<Shared>,
    join: JoinHandle<RenderResult>,
}

impl RenderHandle {
    /// Request cancellation. Workers stop at the next tile boundary;
    /// the result arrives shortly after with `complete == false`.
    pub fn cancel(&self) {
        self.shared.cancel.store(true, Ordering::Relaxed);
    }

    /// Fraction of the total scheduled tile work done so far, in
    /// [0, 1]. Monotonic over the life of the render, and exactly 1.0
    /// once the render has finished, even when the time budget skipped
    /// later passes and their tiles never ran.
    pub fn progress(&self) -> f32 {
        if self.join.is_finished() {
            return 1.0;
        }
        let total = self.shared.tiles_total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let done = self.shared.tiles_done.load(Ordering::Relaxed);
        (done as f32 / total as f32).min(1.0)
    }

    /// Copy of the framebuffer as it stands right now. Finished tiles
    /// of the in-flight pass are visible; unfinished tiles still hold
    /// the previous pass.
    pub fn snapshot(&self) -> Framebuffer {
        self.shared
            .framebuffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the render finishes (all passes, budget exhausted,
    /// or cancelled) and take the result.
    pub fn wait(self) -> RenderResult {
        self.join.join().expect("render thread panicked")
    }
}

/// Start a progressive render on a coordinator thread and return a
/// handle to it immediately.
pub fn start_render(scene: Arc<Scene>, camera: CameraConfig, quality: Quality) -> RenderHandle {
    let cam = Camera::new(&camera);
    let tiles = generate_tiles(cam.width(), cam.height(), quality.tile_size);
    let passes = pass_schedule(quality.samples_per_pixel);

    let shared = Arc::new(Shared {
        framebuffer: Mutex::new(Framebuffer::new(cam.width(), cam.height())),
        cancel: AtomicBool::new(false),
        tiles_done: AtomicUsize::new(0),
        tiles_total: AtomicUsize::new(tiles.len() * passes.len()),
    });

    let threads = quality
        .threads
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()));

    log::info!(
        "render start: {}x{}, {} tiles, passes {passes:?}, {threads} threads",
        cam.width(),
        cam.height(),
        tiles.len(),
    );

    let worker_shared = Arc::clone(&shared);
    let join = std::thread::spawn(move || {
        run_schedule(&scene, &cam, &quality, &passes, &tiles, &worker_shared, threads)
    });

    RenderHandle { shared, join }
}

/// Render to completion on the calling thread's schedule and return the
/// result. Equivalent to `start_render(..).wait()`.
pub fn render_blocking(scene: Arc<Scene>, camera: CameraConfig, quality: Quality) -> RenderResult {
    start_render(scene, camera, quality).wait()
}

fn run_schedule(
    scene: &Scene,
    camera: &Camera,
    quality: &Quality,
    passes: &[u32],
    tiles: &[crate::tile::Tile],
    shared: &Shared,
    threads: usize,
) -> RenderResult {
    let start = Instant::now();
    let mut achieved_spp = 0;
    let mut complete = true;

    for (pass_index, &spp) in passes.iter().enumerate() {
        if let Some(budget_ms) = quality.time_budget_ms {
            if pass_index > 0 && start.elapsed().as_millis() as u64 >= budget_ms {
                log::info!(
                    "time budget exhausted after {} of {} passes ({} spp reached)",
                    pass_index,
                    passes.len(),
                    achieved_spp
                );
                complete = false;
                break;
            }
        }

        let pass = PassConfig {
            samples_per_pixel: spp,
            shadow_samples: quality.shadow_samples,
            max_depth: quality.max_depth,
        };
        let pass_start = Instant::now();
        let finished = render_pass(
            scene,
            camera,
            &pass,
            tiles,
            &shared.framebuffer,
            &shared.tiles_done,
            &shared.cancel,
            threads,
            pass_index as u32,
        );
        if !finished {
            log::warn!("render cancelled during pass {pass_index} ({spp} spp)");
            complete = false;
            break;
        }
        achieved_spp = spp;
        log::debug!("pass {pass_index} done: {spp} spp in {:.1?}", pass_start.elapsed());
    }

    if complete && quality.postprocess {
        let mut fb = shared
            .framebuffer
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *fb = denoise(&fb);
    }

    let framebuffer = shared
        .framebuffer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();

    let elapsed = start.elapsed();
    log::info!(
        "render finished: {} spp, complete={complete}, in {elapsed:.1?}",
        achieved_spp
    );

    RenderResult {
        framebuffer,
        achieved_spp,
        complete,
        elapsed,
    }
}

/// Doubling sample schedule ending exactly at the target: 1, 2, 4, …,
/// target. A non-power-of-two target becomes the final pass as-is.
fn pass_schedule(target_spp: u32) -> Vec<u32> {
    let target = target_spp.max(1);
    let mut passes = Vec::new();
    let mut spp = 1;
    while spp < target {
        passes.push(spp);
        spp *= 2;
    }
    passes.push(target);
    passes
}

/// Light 3x3 box-blur denoise over the final image, rows in parallel.
/// Deliberately mild; the point is taking the edge off low-sample noise
/// without smearing trace edges.
fn denoise(src: &Framebuffer) -> Framebuffer {
    let width = src.width();
    let height = src.height();
    let mut out = Framebuffer::new(width, height);

    let rows: Vec<Vec<crate::color::Rgb>> = (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| {
                    let mut sum = boardray_math::Vec3::ZERO;
                    let mut n = 0.0;
                    for dy in -1i64..=1 {
                        for dx in -1i64..=1 {
                            let sx = x as i64 + dx;
                            let sy = y as i64 + dy;
                            if sx < 0 || sy < 0 || sx >= width as i64 || sy >= height as i64 {
                                continue;
                            }
                            sum += rgb_to_vec(src.pixel(sx as u32, sy as u32));
                            n += 1.0;
                        }
                    }
                    vec_to_rgb(sum / n)
                })
                .collect()
        })
        .collect();

    for (y, row) in rows.into_iter().enumerate() {
        for (x, c) in row.into_iter().enumerate() {
            out.set_pixel(x as u32, y as u32, c);
        }
    }
    out
}
