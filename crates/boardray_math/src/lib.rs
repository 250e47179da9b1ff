//! Geometric foundation for the boardray renderer.
//!
//! Provides the ray, parameter interval, and axis-aligned bounding box
//! types shared by the intersection routines and the BVH. Vector math
//! comes from `glam`, re-exported here so downstream crates use a single
//! import path.

pub use glam::{Vec2, Vec3};

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
