//! The frozen render scene.
//!
//! Built once, single-threaded, from a validated [`SceneDescription`];
//! read-only for the lifetime of every render pass that references it.
//! This freeze-then-trace discipline is what lets the worker pool share
//! the scene with no locking at all.

use std::time::Instant;

use boardray_math::{Ray, Vec3};
use boardray_scene::{BuildResult, Light, Material, SceneDescription, Shape};

use crate::bvh::Bvh;
use crate::hit::HitInfo;
use crate::primitive::{Block, Cylinder, LayerSlab, MeshNode, Primitive};

pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub background: Vec3,
    pub ambient: f32,
    bvh: Bvh,
}

impl Scene {
    /// Validate and freeze a scene description. The only failure points
    /// of the whole renderer live here; after `build` returns `Ok`, a
    /// render can only complete or be cancelled.
    pub fn build(desc: &SceneDescription) -> BuildResult<Scene> {
        desc.validate()?;
        let start = Instant::now();

        let mut primitives = Vec::with_capacity(desc.solids.len());
        for solid in &desc.solids {
            let bump = desc.materials[solid.material].bump;
            let prim = match &solid.shape {
                Shape::Block { min, max } => Primitive::Block(Block::new(
                    boardray_math::Aabb::from_points(*min, *max),
                    solid.material,
                    bump,
                )),
                Shape::Cylinder {
                    center,
                    radius,
                    z_bottom,
                    z_top,
                } => Primitive::Cylinder(Cylinder::new(
                    *center,
                    *radius,
                    *z_bottom,
                    *z_top,
                    solid.material,
                    bump,
                )),
                Shape::LayerSlab {
                    outline,
                    z_bottom,
                    z_top,
                    tint,
                } => Primitive::Slab(LayerSlab::new(
                    outline.clone(),
                    *z_bottom,
                    *z_top,
                    *tint,
                    solid.material,
                    bump,
                )),
                Shape::Mesh { vertices, indices } => Primitive::Mesh(MeshNode::new(
                    vertices.clone(),
                    indices.clone(),
                    solid.material,
                    bump,
                )),
            };
            primitives.push(prim);
        }

        let bounds: Vec<_> = primitives.iter().map(|p| p.bbox()).collect();
        let bvh = Bvh::build(&bounds);

        log::info!(
            "scene frozen: {} primitives, {} BVH nodes, {} lights, in {:.1?}",
            primitives.len(),
            bvh.node_count(),
            desc.lights.len(),
            start.elapsed()
        );

        Ok(Scene {
            primitives,
            materials: desc.materials.clone(),
            lights: desc.lights.clone(),
            background: desc.background,
            ambient: desc.ambient,
            bvh,
        })
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Nearest-hit query through the BVH.
    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo) -> bool {
        self.bvh.intersect(ray, hit, &mut |i, hit| {
            self.primitives[i as usize].intersect(ray, hit, i)
        })
    }

    /// Reference nearest-hit query bypassing the BVH. Slow; exists to
    /// validate the accelerated path and for debugging suspect scenes.
    pub fn intersect_linear(&self, ray: &Ray, hit: &mut HitInfo) -> bool {
        let mut any = false;
        for (i, prim) in self.primitives.iter().enumerate() {
            any |= prim.intersect(ray, hit, i as u32);
        }
        any
    }

    /// Any-hit occlusion query for shadow rays.
    pub fn occluded(&self, ray: &Ray, max_dist: f32) -> bool {
        self.bvh.intersect_p(ray, max_dist, &mut |i| {
            self.primitives[i as usize].intersect_p(ray, max_dist)
        })
    }

    /// Material of a committed hit.
    pub fn material_of(&self, prim: u32) -> &Material {
        &self.materials[self.primitives[prim as usize].material()]
    }

    /// Diffuse color at a committed hit (per-primitive override aware).
    pub fn diffuse_color_of(&self, prim: u32) -> Vec3 {
        let p = &self.primitives[prim as usize];
        p.diffuse_color(&self.materials[p.material()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardray_math::Vec2;
    use boardray_scene::{Light, Material, SceneDescription, Shape};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_scene(rng: &mut SmallRng, n: usize) -> Scene {
        let mut desc = SceneDescription::new();
        let copper = desc.add_material(Material::copper());
        let mask = desc.add_material(Material::soldermask());

        for i in 0..n {
            match i % 3 {
                0 => {
                    let min = Vec3::new(
                        rng.gen_range(-20.0..20.0),
                        rng.gen_range(-20.0..20.0),
                        rng.gen_range(-5.0..5.0),
                    );
                    let size = Vec3::new(
                        rng.gen_range(0.5..4.0),
                        rng.gen_range(0.5..4.0),
                        rng.gen_range(0.2..2.0),
                    );
                    desc.add_solid(
                        Shape::Block {
                            min,
                            max: min + size,
                        },
                        copper,
                    );
                }
                1 => {
                    desc.add_solid(
                        Shape::Cylinder {
                            center: Vec2::new(
                                rng.gen_range(-20.0..20.0),
                                rng.gen_range(-20.0..20.0),
                            ),
                            radius: rng.gen_range(0.2..2.0),
                            z_bottom: rng.gen_range(-5.0..0.0),
                            z_top: rng.gen_range(0.1..5.0),
                        },
                        mask,
                    );
                }
                _ => {
                    let cx = rng.gen_range(-20.0..20.0);
                    let cy = rng.gen_range(-20.0..20.0);
                    let s = rng.gen_range(1.0..4.0);
                    desc.add_solid(
                        Shape::LayerSlab {
                            outline: vec![
                                Vec2::new(cx, cy),
                                Vec2::new(cx + s, cy),
                                Vec2::new(cx + s, cy + s),
                                Vec2::new(cx, cy + s),
                            ],
                            z_bottom: rng.gen_range(-3.0..0.0),
                            z_top: rng.gen_range(0.1..3.0),
                            tint: None,
                        },
                        copper,
                    );
                }
            }
        }
        Scene::build(&desc).unwrap()
    }

    #[test]
    fn test_empty_scene_reports_no_hit() {
        let scene = Scene::build(&SceneDescription::new()).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut hit = HitInfo::new();
        assert!(!scene.intersect(&ray, &mut hit));
        assert!(!scene.occluded(&ray, f32::INFINITY));
    }

    #[test]
    fn test_bvh_matches_linear_scan_on_mixed_scenes() {
        // Spec property: accelerated nearest-hit ≡ brute force, for
        // randomized scenes of every primitive kind.
        let mut rng = SmallRng::seed_from_u64(0xb0a7d);
        for round in 0..8 {
            let scene = random_scene(&mut rng, 30 + round * 10);
            for _ in 0..200 {
                let origin = Vec3::new(
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-10.0..10.0),
                );
                let dir = Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                if dir.length_squared() < 1e-6 {
                    continue;
                }
                let ray = Ray::new(origin, dir);

                let mut accel = HitInfo::new();
                scene.intersect(&ray, &mut accel);
                let mut brute = HitInfo::new();
                scene.intersect_linear(&ray, &mut brute);

                assert_eq!(accel.is_hit(), brute.is_hit());
                if accel.is_hit() {
                    assert!(
                        (accel.t - brute.t).abs() < 1e-3,
                        "accel t={} brute t={}",
                        accel.t,
                        brute.t
                    );
                    assert_eq!(accel.prim, brute.prim);
                }
            }
        }
    }

    #[test]
    fn test_any_hit_consistent_with_nearest_hit() {
        let mut rng = SmallRng::seed_from_u64(0xcafe);
        let scene = random_scene(&mut rng, 60);
        for _ in 0..300 {
            let origin = Vec3::new(
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-10.0..10.0),
            );
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if dir.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, dir);
            let max_dist = rng.gen_range(5.0..60.0);

            let mut hit = HitInfo::with_bound(max_dist);
            let nearest = scene.intersect(&ray, &mut hit);
            let occluded = scene.occluded(&ray, max_dist);

            // A nearest hit within the bound implies occlusion; no
            // nearest hit implies no occluder.
            assert_eq!(nearest, occluded);
        }
    }

    #[test]
    fn test_material_and_color_lookup() {
        let mut desc = SceneDescription::new();
        let copper = desc.add_material(Material::copper());
        desc.add_solid(
            Shape::LayerSlab {
                outline: vec![
                    Vec2::new(-5.0, -5.0),
                    Vec2::new(5.0, -5.0),
                    Vec2::new(5.0, 5.0),
                    Vec2::new(-5.0, 5.0),
                ],
                z_bottom: 0.0,
                z_top: 0.1,
                tint: Some(Vec3::splat(0.5)),
            },
            copper,
        );
        desc.add_light(Light::point(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE));
        let scene = Scene::build(&desc).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::new();
        assert!(scene.intersect(&ray, &mut hit));
        let prim = hit.prim.unwrap();
        assert_eq!(scene.material_of(prim).name, "copper");
        assert_eq!(
            scene.diffuse_color_of(prim),
            Material::copper().diffuse * 0.5
        );
    }
}
