//! Tile scheduler and worker pool for one render pass.
//!
//! Workers are scoped OS threads pulling tile indices from a shared
//! atomic counter. Each tile is rendered start-to-finish into a local
//! buffer, then blitted into the shared framebuffer under a short lock.
//! Cancellation is checked once per tile: a cancelled pass leaves every
//! finished tile intact and every unstarted tile untouched, never a
//! half-written tile.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use boardray_math::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::color::{average_samples, vec_to_rgb, Rgb};
use crate::framebuffer::Framebuffer;
use crate::scene::Scene;
use crate::shading::{trace, ShadingOptions};
use crate::tile::Tile;

/// Per-pass sampling parameters, fixed for the duration of the pass.
#[derive(Debug, Clone, Copy)]
pub struct PassConfig {
    /// Primary rays per pixel. With one sample the pixel center is
    /// used; otherwise samples are jittered inside the pixel.
    pub samples_per_pixel: u32,
    pub shadow_samples: u32,
    pub max_depth: u32,
}

impl PassConfig {
    fn shading(&self) -> ShadingOptions {
        ShadingOptions {
            shadow_samples: self.shadow_samples,
            max_depth: self.max_depth,
        }
    }
}

/// Render one full pass over `tiles` with a pool of `threads` workers.
///
/// `tiles_done` is incremented once per completed tile and can be read
/// concurrently for progress reporting. Returns `false` if the pass was
/// cut short by `cancel`, `true` if every tile was rendered.
#[allow(clippy::too_many_arguments)]
pub fn render_pass(
    scene: &Scene,
    camera: &Camera,
    pass: &PassConfig,
    tiles: &[Tile],
    framebuffer: &Mutex<Framebuffer>,
    tiles_done: &AtomicUsize,
    cancel: &AtomicBool,
    threads: usize,
    pass_index: u32,
) -> bool {
    let threads = threads.max(1);
    let next_tile = AtomicUsize::new(0);

    log::debug!(
        "pass {pass_index}: {} tiles, {} spp, {threads} threads",
        tiles.len(),
        pass.samples_per_pixel
    );

    std::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                loop {
                    let i = next_tile.fetch_add(1, Ordering::Relaxed);
                    let Some(tile) = tiles.get(i) else {
                        break;
                    };
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }

                    let pixels = render_tile(scene, camera, pass, tile, pass_index);

                    let mut fb = framebuffer.lock().unwrap_or_else(|e| e.into_inner());
                    fb.blit_tile(tile, &pixels);
                    drop(fb);

                    tiles_done.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    !cancel.load(Ordering::Relaxed)
}

/// Render one tile into a local row-major pixel buffer.
///
/// The RNG stream is seeded from (pass, tile), so a tile's noise
/// pattern is reproducible regardless of which worker picks it up and
/// differs between passes.
fn render_tile(
    scene: &Scene,
    camera: &Camera,
    pass: &PassConfig,
    tile: &Tile,
    pass_index: u32,
) -> Vec<Rgb> {
    let mut rng = SmallRng::seed_from_u64(((pass_index as u64) << 32) ^ tile.index as u64);
    let opts = pass.shading();

    let mut pixels = Vec::with_capacity(tile.pixel_count() as usize);
    for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            pixels.push(render_pixel(
                scene,
                camera,
                pass,
                &opts,
                tile.x + local_x,
                tile.y + local_y,
                &mut rng,
            ));
        }
    }
    pixels
}

fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    pass: &PassConfig,
    opts: &ShadingOptions,
    x: u32,
    y: u32,
    rng: &mut SmallRng,
) -> Rgb {
    let spp = pass.samples_per_pixel.max(1);
    let mut samples = Vec::with_capacity(spp as usize);
    for _ in 0..spp {
        let jitter = if spp == 1 {
            Vec2::ZERO
        } else {
            Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5))
        };
        let ray = camera.primary_ray(x, y, jitter);
        samples.push(vec_to_rgb(trace(scene, &ray, 0, opts, rng)));
    }
    average_samples(&samples)
}
