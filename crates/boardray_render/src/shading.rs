//! Blinn-Phong direct lighting with soft shadows and capped secondary
//! rays.
//!
//! For each hit: a constant ambient term, then per light a diffuse and
//! specular contribution scaled by a visibility fraction resolved with
//! shadow rays (several per area light, one per point light). Shadow
//! rays use the any-hit scene query, since they need "is the light
//! blocked" and nothing more, at samples × lights per primary hit.
//!
//! Reflective and transparent materials spawn one secondary ray each,
//! under a hard recursion cap. The cap is a termination guarantee, not
//! a tuning knob: two facing reflective planes must not hang the
//! renderer no matter what materials the scene declares.

use boardray_math::{Ray, Vec3};
use boardray_scene::Light;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::hit::{HitInfo, RAY_EPSILON};
use crate::scene::Scene;

/// Offset applied along the normal before casting shadow and secondary
/// rays, keeping them from re-hitting the surface they start on.
const SURFACE_BIAS: f32 = 1e-3;

/// Knobs the shading path needs, extracted from the render quality
/// settings once per pass.
#[derive(Debug, Clone, Copy)]
pub struct ShadingOptions {
    /// Shadow rays per area light per shading point.
    pub shadow_samples: u32,
    /// Recursion cap for reflection/transmission rays.
    pub max_depth: u32,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            shadow_samples: 8,
            max_depth: 3,
        }
    }
}

/// Trace a ray to its nearest hit and shade it; the scene background
/// on a miss. `depth` counts secondary bounces already taken.
pub fn trace(scene: &Scene, ray: &Ray, depth: u32, opts: &ShadingOptions, rng: &mut SmallRng) -> Vec3 {
    let mut hit = HitInfo::new();
    if !scene.intersect(ray, &mut hit) {
        return scene.background;
    }
    shade(scene, ray, &hit, depth, opts, rng)
}

fn shade(
    scene: &Scene,
    ray: &Ray,
    hit: &HitInfo,
    depth: u32,
    opts: &ShadingOptions,
    rng: &mut SmallRng,
) -> Vec3 {
    let Some(prim) = hit.prim else {
        return scene.background;
    };
    let material = scene.material_of(prim);
    let diffuse_color = scene.diffuse_color_of(prim);
    let normal = hit.normal;
    let above_surface = hit.point + normal * SURFACE_BIAS;

    let mut color = material.ambient * scene.ambient;

    for light in &scene.lights {
        let visibility = light_visibility(scene, above_surface, light, opts.shadow_samples, rng);
        if visibility <= 0.0 {
            continue;
        }

        let light_dir = (light.position - hit.point).normalize_or_zero();
        let n_dot_l = normal.dot(light_dir);
        if n_dot_l <= 0.0 {
            continue;
        }

        color += diffuse_color * light.color * (n_dot_l * visibility);

        // Blinn-Phong half-vector specular.
        let half = (light_dir - ray.dir).normalize_or_zero();
        let spec = normal.dot(half).max(0.0).powf(material.shininess);
        color += material.specular * light.color * (spec * visibility);
    }

    if depth < opts.max_depth {
        if material.reflectivity > 0.0 {
            let reflected = ray.dir - 2.0 * ray.dir.dot(normal) * normal;
            let secondary = Ray::new(above_surface, reflected);
            let bounce = trace(scene, &secondary, depth + 1, opts, rng);
            color = color.lerp(bounce, material.reflectivity);
        }
        if material.transparency > 0.0 {
            // Straight transmission; board layers are thin enough that
            // refraction bending buys nothing visible.
            let below_surface = hit.point - normal * SURFACE_BIAS;
            let secondary = Ray::new(below_surface, ray.dir);
            let through = trace(scene, &secondary, depth + 1, opts, rng);
            color = color.lerp(through, material.transparency);
        }
    }

    // One corrupted sample must stay one dark pixel sample, never an
    // Inf/NaN that spreads through blends.
    if color.is_finite() {
        color
    } else {
        Vec3::ZERO
    }
}

/// Fraction of shadow rays that reach the light: 1.0 fully lit, 0.0
/// fully occluded, in between inside a penumbra.
fn light_visibility(
    scene: &Scene,
    origin: Vec3,
    light: &Light,
    shadow_samples: u32,
    rng: &mut SmallRng,
) -> f32 {
    let samples = if light.is_area() {
        shadow_samples.max(1)
    } else {
        1
    };

    let mut unoccluded = 0u32;
    for _ in 0..samples {
        let target = if light.is_area() {
            light.position + sample_in_sphere(rng) * light.radius
        } else {
            light.position
        };
        let to_light = target - origin;
        let distance = to_light.length();
        if distance <= RAY_EPSILON {
            unoccluded += 1;
            continue;
        }
        let shadow_ray = Ray::new(origin, to_light);
        if !scene.occluded(&shadow_ray, distance - RAY_EPSILON) {
            unoccluded += 1;
        }
    }
    unoccluded as f32 / samples as f32
}

/// Uniform point in the unit sphere, by rejection.
fn sample_in_sphere(rng: &mut SmallRng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}
