//! Typed solid descriptors and the scene description handed to the
//! renderer.
//!
//! The board-to-geometry conversion stage (outside this workspace)
//! produces a [`SceneDescription`]: an ordered list of shapes with
//! material references, a light list, and global settings. The
//! description is validated once, then frozen into the render scene.

use boardray_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, BuildResult};
use crate::light::Light;
use crate::material::{Material, MaterialId};

/// Hard ceiling on scene size; validation fails above this rather than
/// letting a runaway geometry exporter exhaust memory mid-build.
pub const MAX_PRIMITIVES: usize = 1 << 20;

/// Geometric parameters for one solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned solid block. Also the fallback used for simplified
    /// board outlines and component courtyards.
    Block { min: Vec3, max: Vec3 },
    /// Vertical cylinder (plated through-hole, via barrel), axis +Z.
    Cylinder {
        center: Vec2,
        radius: f32,
        z_bottom: f32,
        z_top: f32,
    },
    /// Flat extruded polygon: one copper/soldermask layer of the stackup.
    LayerSlab {
        outline: Vec<Vec2>,
        z_bottom: f32,
        z_top: f32,
        /// Optional per-layer diffuse multiplier (inner-layer dimming).
        #[serde(default)]
        tint: Option<Vec3>,
    },
    /// Triangulated mesh from an imported 3D model.
    Mesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
}

/// One solid: a shape plus the material it renders with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub shape: Shape,
    pub material: MaterialId,
}

/// Pinhole camera parameters, including the target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub vfov_degrees: f32,
    pub width: u32,
    pub height: u32,
}

impl CameraConfig {
    pub fn new(position: Vec3, look_at: Vec3, width: u32, height: u32) -> Self {
        Self {
            position,
            look_at,
            up: Vec3::Y,
            vfov_degrees: 45.0,
            width,
            height,
        }
    }
}

/// Default tile edge length in pixels. Small enough that cancellation
/// latency (one tile) stays low even at high sample counts.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Quality / budget knobs for a render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    /// Target samples per pixel for the final pass; earlier passes use
    /// fewer and refine progressively.
    pub samples_per_pixel: u32,
    /// Shadow rays per area light per shading point (point lights
    /// always use one).
    pub shadow_samples: u32,
    /// Secondary-ray recursion cap (reflection/transmission).
    pub max_depth: u32,
    /// Tile edge length in pixels.
    pub tile_size: u32,
    /// Worker thread count; `None` = detected hardware concurrency.
    pub threads: Option<usize>,
    /// Wall-clock budget in milliseconds; passes already running are
    /// never interrupted, but no further pass starts once exhausted.
    pub time_budget_ms: Option<u64>,
    /// Run the denoise post-process after the final completed pass.
    pub postprocess: bool,
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            samples_per_pixel: 4,
            shadow_samples: 8,
            max_depth: 3,
            tile_size: DEFAULT_TILE_SIZE,
            threads: None,
            time_budget_ms: None,
            postprocess: false,
        }
    }
}

/// Everything the render core needs, in data form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub solids: Vec<Solid>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    /// Color returned for rays that miss all geometry.
    pub background: Vec3,
    /// Global ambient intensity, scaling each material's ambient term.
    pub ambient: f32,
}

impl SceneDescription {
    pub fn new() -> Self {
        Self {
            solids: Vec::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            background: Vec3::new(0.05, 0.05, 0.08),
            ambient: 0.4,
        }
    }

    /// Add a material, returning its id for subsequent solids.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_solid(&mut self, shape: Shape, material: MaterialId) {
        self.solids.push(Solid { shape, material });
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Structural validation, run once before the scene is frozen.
    ///
    /// Degenerate-but-harmless geometry (an outline with fewer than
    /// three points, a zero-radius cylinder) is logged and allowed: it
    /// simply never intersects. Only faults that would corrupt the
    /// frozen arenas are errors.
    pub fn validate(&self) -> BuildResult<()> {
        if self.solids.len() > MAX_PRIMITIVES {
            return Err(BuildError::TooManyPrimitives {
                count: self.solids.len(),
                limit: MAX_PRIMITIVES,
            });
        }

        for (i, solid) in self.solids.iter().enumerate() {
            if solid.material >= self.materials.len() {
                return Err(BuildError::UnknownMaterial {
                    solid: i,
                    material: solid.material,
                    count: self.materials.len(),
                });
            }

            match &solid.shape {
                Shape::Mesh { vertices, indices } => {
                    for tri in indices {
                        for &index in tri {
                            if index as usize >= vertices.len() {
                                return Err(BuildError::MeshIndexOutOfBounds {
                                    solid: i,
                                    index,
                                    count: vertices.len(),
                                });
                            }
                        }
                    }
                }
                Shape::LayerSlab { outline, .. } => {
                    if outline.len() < 3 {
                        log::warn!(
                            "solid {} has a {}-point outline; it will never be hit",
                            i,
                            outline.len()
                        );
                    }
                }
                Shape::Cylinder { radius, .. } => {
                    if *radius <= 0.0 {
                        log::warn!("solid {} has non-positive radius; it will never be hit", i);
                    }
                }
                Shape::Block { .. } => {}
            }
        }

        Ok(())
    }
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_material_scene() -> SceneDescription {
        let mut desc = SceneDescription::new();
        desc.add_material(Material::copper());
        desc
    }

    #[test]
    fn test_validate_empty_scene_is_legal() {
        assert!(SceneDescription::new().validate().is_ok());
    }

    #[test]
    fn test_quality_default_uses_tile_size_constant() {
        assert_eq!(Quality::default().tile_size, DEFAULT_TILE_SIZE);
    }

    #[test]
    fn test_validate_unknown_material() {
        let mut desc = one_material_scene();
        desc.add_solid(
            Shape::Block {
                min: Vec3::ZERO,
                max: Vec3::ONE,
            },
            3,
        );
        assert!(matches!(
            desc.validate(),
            Err(BuildError::UnknownMaterial { solid: 0, .. })
        ));
    }

    #[test]
    fn test_validate_mesh_index_out_of_bounds() {
        let mut desc = one_material_scene();
        desc.add_solid(
            Shape::Mesh {
                vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                indices: vec![[0, 1, 7]],
            },
            0,
        );
        assert!(matches!(
            desc.validate(),
            Err(BuildError::MeshIndexOutOfBounds { index: 7, .. })
        ));
    }

    #[test]
    fn test_validate_degenerate_outline_is_allowed() {
        let mut desc = one_material_scene();
        desc.add_solid(
            Shape::LayerSlab {
                outline: vec![Vec2::ZERO, Vec2::X],
                z_bottom: 0.0,
                z_top: 0.1,
                tint: None,
            },
            0,
        );
        assert!(desc.validate().is_ok());
    }
}
