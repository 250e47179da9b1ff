//! Scene description types for the boardray renderer.
//!
//! This crate defines the boundary between the board-to-geometry
//! conversion stage and the ray tracing core: typed solid descriptors,
//! shared materials, lights, and camera/quality parameters. Everything
//! here is plain data: serializable, validated once at build time, and
//! frozen for the duration of a render.

pub mod description;
pub mod error;
pub mod light;
pub mod material;

pub use description::{
    CameraConfig, Quality, SceneDescription, Shape, Solid, DEFAULT_TILE_SIZE, MAX_PRIMITIVES,
};
pub use error::{BuildError, BuildResult};
pub use light::Light;
pub use material::{Bump, Material, MaterialId};
