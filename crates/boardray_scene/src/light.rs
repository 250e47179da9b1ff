use boardray_math::Vec3;
use serde::{Deserialize, Serialize};

/// A light source, optionally with a spherical area extent.
///
/// A zero radius is a point light: one shadow ray resolves its
/// visibility exactly. A positive radius gives the shadow rays a volume
/// to sample, producing soft penumbras at the cost of one shadow ray
/// per sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    /// Linear RGB intensity.
    pub color: Vec3,
    /// Radius of the spherical emitter; 0 = point light.
    #[serde(default)]
    pub radius: f32,
}

impl Light {
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color,
            radius: 0.0,
        }
    }

    pub fn area(position: Vec3, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            color,
            radius: radius.max(0.0),
        }
    }

    pub fn is_area(&self) -> bool {
        self.radius > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_light_is_not_area() {
        let l = Light::point(Vec3::ZERO, Vec3::ONE);
        assert!(!l.is_area());
    }

    #[test]
    fn test_area_clamps_negative_radius() {
        let l = Light::area(Vec3::ZERO, Vec3::ONE, -2.0);
        assert_eq!(l.radius, 0.0);
        assert!(!l.is_area());
    }
}
