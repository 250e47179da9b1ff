//! Pinhole camera and primary ray generation.

use boardray_math::{Ray, Vec2, Vec3};
use boardray_scene::CameraConfig;

/// Immutable pinhole camera, fully derived from a [`CameraConfig`] at
/// construction: position, orthonormal basis, and the viewport's
/// per-pixel step vectors. Shared read-only across all workers.
#[derive(Clone)]
pub struct Camera {
    center: Vec3,
    pixel00: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    width: u32,
    height: u32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);

        // Standard camera basis: w looks backward, u right, v up
        // re-orthogonalized against the chosen up vector.
        let w = (config.position - config.look_at).normalize_or_zero();
        let w = if w == Vec3::ZERO { Vec3::Z } else { w };
        let up = if config.up.cross(w).length_squared() < 1e-8 {
            // Degenerate up (parallel to view direction); pick another.
            Vec3::X
        } else {
            config.up
        };
        let u = up.cross(w).normalize();
        let v = w.cross(u);

        let theta = config.vfov_degrees.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = viewport_height * (width as f32 / height as f32);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;
        let pixel_delta_u = viewport_u / width as f32;
        let pixel_delta_v = viewport_v / height as f32;

        let viewport_upper_left = config.position - w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00 = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        Self {
            center: config.position,
            pixel00,
            pixel_delta_u,
            pixel_delta_v,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Primary ray through pixel (x, y) with a sub-pixel jitter offset
    /// in [-0.5, 0.5]^2. Pass `Vec2::ZERO` to sample the pixel center.
    pub fn primary_ray(&self, x: u32, y: u32, jitter: Vec2) -> Ray {
        let pixel = self.pixel00
            + (x as f32 + jitter.x) * self.pixel_delta_u
            + (y as f32 + jitter.y) * self.pixel_delta_v;
        Ray::new(self.center, pixel - self.center)
    }
}
