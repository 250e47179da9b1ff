//! Phong-style surface materials.
//!
//! Materials are shared across many primitives of the same appearance
//! class (all copper pads reference one copper material) and never
//! mutated once a scene is frozen. Primitives hold a [`MaterialId`]
//! into the scene's material arena rather than owning a copy.

use boardray_math::Vec3;
use serde::{Deserialize, Serialize};

/// Index into the scene's material arena.
pub type MaterialId = usize;

/// Procedural normal perturbation applied at the hit point.
///
/// A closed set of bump kinds keeps materials serializable and lets the
/// shading path dispatch without indirection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bump {
    /// No perturbation; the geometric normal is used as-is.
    #[default]
    None,
    /// Periodic dimples in the slab plane, suggesting the drill/pad
    /// pattern pressed into a copper layer.
    DrillEmboss { spacing: f32, amplitude: f32 },
    /// Directional micro-grooves along X, a brushed-metal look.
    Brushed { frequency: f32, amplitude: f32 },
}

impl Bump {
    /// Perturb a unit normal at world-space point `p`. Returns a unit
    /// vector; the identity for `Bump::None`.
    pub fn perturb(&self, p: Vec3, normal: Vec3) -> Vec3 {
        match *self {
            Bump::None => normal,
            Bump::DrillEmboss { spacing, amplitude } => {
                if spacing <= 0.0 {
                    return normal;
                }
                let freq = std::f32::consts::TAU / spacing;
                let dx = (p.x * freq).sin() * (p.y * freq).cos() * amplitude;
                let dy = (p.x * freq).cos() * (p.y * freq).sin() * amplitude;
                (normal + Vec3::new(dx, dy, 0.0)).normalize_or_zero()
            }
            Bump::Brushed {
                frequency,
                amplitude,
            } => {
                let dy = (p.x * frequency).sin() * amplitude;
                (normal + Vec3::new(0.0, dy, 0.0)).normalize_or_zero()
            }
        }
    }
}

/// Surface appearance parameters for the Blinn-Phong shading model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Scaled by the scene's global ambient intensity, not per-light.
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Blinn-Phong exponent.
    pub shininess: f32,
    /// 0 = opaque, 1 = fully transparent.
    pub transparency: f32,
    /// Fraction of the reflected secondary ray blended in.
    pub reflectivity: f32,
    pub bump: Bump,
}

impl Material {
    /// A flat diffuse material with sensible defaults elsewhere.
    pub fn diffuse(name: impl Into<String>, diffuse: Vec3) -> Self {
        Self {
            name: name.into(),
            ambient: diffuse * 0.25,
            diffuse,
            specular: Vec3::splat(0.2),
            shininess: 16.0,
            transparency: 0.0,
            reflectivity: 0.0,
            bump: Bump::None,
        }
    }

    // Presets for the standard board appearance classes. Tints are in
    // linear RGB, eyeballed against rendered reference boards.

    pub fn copper() -> Self {
        Self {
            name: "copper".into(),
            ambient: Vec3::new(0.25, 0.15, 0.05),
            diffuse: Vec3::new(0.90, 0.55, 0.15),
            specular: Vec3::new(0.8, 0.7, 0.5),
            shininess: 48.0,
            transparency: 0.0,
            reflectivity: 0.25,
            bump: Bump::DrillEmboss {
                spacing: 0.5,
                amplitude: 0.08,
            },
        }
    }

    pub fn soldermask() -> Self {
        Self {
            name: "soldermask".into(),
            ambient: Vec3::new(0.0, 0.08, 0.02),
            diffuse: Vec3::new(0.07, 0.35, 0.12),
            specular: Vec3::splat(0.5),
            shininess: 64.0,
            transparency: 0.25,
            reflectivity: 0.10,
            bump: Bump::None,
        }
    }

    pub fn silkscreen() -> Self {
        Self {
            name: "silkscreen".into(),
            ambient: Vec3::splat(0.22),
            diffuse: Vec3::splat(0.90),
            specular: Vec3::splat(0.1),
            shininess: 8.0,
            transparency: 0.0,
            reflectivity: 0.0,
            bump: Bump::None,
        }
    }

    pub fn substrate() -> Self {
        Self {
            name: "substrate".into(),
            ambient: Vec3::new(0.08, 0.08, 0.05),
            diffuse: Vec3::new(0.45, 0.42, 0.25),
            specular: Vec3::splat(0.15),
            shininess: 12.0,
            transparency: 0.15,
            reflectivity: 0.0,
            bump: Bump::None,
        }
    }
}
