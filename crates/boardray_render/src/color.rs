//! Fixed-point 8-bit color blending.
//!
//! Sample accumulation stays in integer arithmetic: shift-right with
//! rounding for the power-of-two blends, rounded integer division for
//! three-way and the general case. This matches the 8-bit-per-channel
//! output exactly and cannot drift the way repeated float accumulation
//! can over very large sample counts. Self-blend is the identity modulo
//! at most ±1 per channel.

use boardray_math::Vec3;

/// One framebuffer pixel, linear RGB, 8 bits per channel.
pub type Rgb = [u8; 3];

/// Average of two colors, rounding half up.
#[inline]
pub fn blend2(a: Rgb, b: Rgb) -> Rgb {
    [
        ((a[0] as u16 + b[0] as u16 + 1) >> 1) as u8,
        ((a[1] as u16 + b[1] as u16 + 1) >> 1) as u8,
        ((a[2] as u16 + b[2] as u16 + 1) >> 1) as u8,
    ]
}

/// Average of three colors via rounded integer division.
#[inline]
pub fn blend3(a: Rgb, b: Rgb, c: Rgb) -> Rgb {
    [
        ((a[0] as u16 + b[0] as u16 + c[0] as u16 + 1) / 3) as u8,
        ((a[1] as u16 + b[1] as u16 + c[1] as u16 + 1) / 3) as u8,
        ((a[2] as u16 + b[2] as u16 + c[2] as u16 + 1) / 3) as u8,
    ]
}

/// Average of four colors, rounding half up.
#[inline]
pub fn blend4(a: Rgb, b: Rgb, c: Rgb, d: Rgb) -> Rgb {
    [
        ((a[0] as u16 + b[0] as u16 + c[0] as u16 + d[0] as u16 + 2) >> 2) as u8,
        ((a[1] as u16 + b[1] as u16 + c[1] as u16 + d[1] as u16 + 2) >> 2) as u8,
        ((a[2] as u16 + b[2] as u16 + c[2] as u16 + d[2] as u16 + 2) >> 2) as u8,
    ]
}

/// Average an arbitrary sample list: the dedicated blends up to four
/// samples, rounded integer sums beyond. Empty input is black.
pub fn average_samples(samples: &[Rgb]) -> Rgb {
    match samples {
        [] => [0, 0, 0],
        [a] => *a,
        [a, b] => blend2(*a, *b),
        [a, b, c] => blend3(*a, *b, *c),
        [a, b, c, d] => blend4(*a, *b, *c, *d),
        _ => {
            let n = samples.len() as u32;
            let mut sum = [0u32; 3];
            for s in samples {
                sum[0] += s[0] as u32;
                sum[1] += s[1] as u32;
                sum[2] += s[2] as u32;
            }
            [
                ((sum[0] + n / 2) / n) as u8,
                ((sum[1] + n / 2) / n) as u8,
                ((sum[2] + n / 2) / n) as u8,
            ]
        }
    }
}

/// Quantize a linear RGB color to 8 bits with rounding. Infinities
/// clamp like any out-of-range value; NaN channels map to zero so a
/// poisoned sample darkens one pixel instead of spreading.
pub fn vec_to_rgb(c: Vec3) -> Rgb {
    let q = |v: f32| {
        if v.is_nan() {
            0
        } else {
            (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        }
    };
    [q(c.x), q(c.y), q(c.z)]
}

/// Inverse of [`vec_to_rgb`] up to quantization; used by post-process
/// filtering.
pub fn rgb_to_vec(c: Rgb) -> Vec3 {
    Vec3::new(
        c[0] as f32 / 255.0,
        c[1] as f32 / 255.0,
        c[2] as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBES: [Rgb; 5] = [
        [0, 0, 0],
        [255, 255, 255],
        [1, 128, 254],
        [17, 33, 91],
        [200, 3, 77],
    ];

    #[test]
    fn test_self_blend_is_identity_modulo_rounding() {
        for c in PROBES {
            for (i, channel) in blend2(c, c).iter().enumerate() {
                assert!((*channel as i16 - c[i] as i16).abs() <= 1);
            }
            for (i, channel) in blend3(c, c, c).iter().enumerate() {
                assert!((*channel as i16 - c[i] as i16).abs() <= 1);
            }
            for (i, channel) in blend4(c, c, c, c).iter().enumerate() {
                assert!((*channel as i16 - c[i] as i16).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_blend2_midpoint() {
        assert_eq!(blend2([0, 0, 0], [255, 255, 255]), [128, 128, 128]);
        assert_eq!(blend2([10, 20, 30], [20, 40, 60]), [15, 30, 45]);
    }

    #[test]
    fn test_average_dispatch_matches_blends() {
        let a = [10, 200, 31];
        let b = [90, 14, 200];
        let c = [55, 55, 55];
        let d = [0, 255, 128];

        assert_eq!(average_samples(&[a]), a);
        assert_eq!(average_samples(&[a, b]), blend2(a, b));
        assert_eq!(average_samples(&[a, b, c]), blend3(a, b, c));
        assert_eq!(average_samples(&[a, b, c, d]), blend4(a, b, c, d));
    }

    #[test]
    fn test_large_average_is_exact_for_constant_input() {
        let c = [123, 45, 67];
        let samples = vec![c; 1000];
        assert_eq!(average_samples(&samples), c);
    }

    #[test]
    fn test_vec_to_rgb_rounding_and_clamping() {
        assert_eq!(vec_to_rgb(Vec3::ZERO), [0, 0, 0]);
        assert_eq!(vec_to_rgb(Vec3::ONE), [255, 255, 255]);
        assert_eq!(vec_to_rgb(Vec3::new(2.0, -1.0, 0.5)), [255, 0, 128]);
    }

    #[test]
    fn test_vec_to_rgb_contains_nan() {
        assert_eq!(
            vec_to_rgb(Vec3::new(f32::NAN, f32::INFINITY, 0.5)),
            [0, 255, 128]
        );
    }
}
