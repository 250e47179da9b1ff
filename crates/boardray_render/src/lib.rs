//! Offline ray tracing renderer for 3D board visualization.
//!
//! The pipeline: a frozen [`Scene`] (primitive arena + BVH + materials
//! + lights) is traced by a pool of workers, each rendering whole
//! framebuffer tiles with jittered supersampling and Blinn-Phong
//! shading; the orchestrator runs progressive passes at increasing
//! sample counts until the quality target or wall-clock budget is
//! reached. Start a render with [`start_render`], or use
//! [`render_blocking`] when no live preview is needed.

mod bvh;
mod camera;
mod color;
mod framebuffer;
mod hit;
mod primitive;
mod renderer;
mod scene;
mod scheduler;
mod shading;
mod tile;

pub use bvh::Bvh;
pub use camera::Camera;
pub use color::{average_samples, blend2, blend3, blend4, rgb_to_vec, vec_to_rgb, Rgb};
pub use framebuffer::Framebuffer;
pub use hit::{HitInfo, RAY_EPSILON};
pub use primitive::Primitive;
pub use renderer::{render_blocking, start_render, RenderHandle, RenderResult};
pub use scene::Scene;
pub use scheduler::{render_pass, PassConfig};
pub use shading::{trace, ShadingOptions};
pub use tile::{generate_tiles, Tile};

// Re-export the boundary types so most callers need only this crate.
pub use boardray_math::{Aabb, Interval, Ray, Vec2, Vec3};
pub use boardray_scene::{
    BuildError, BuildResult, Bump, CameraConfig, Light, Material, Quality, SceneDescription,
    Shape, Solid, DEFAULT_TILE_SIZE,
};
