/// A closed range of ray parameters `[min, max]`.
///
/// Intersection queries carry an interval to bound the acceptable hit
/// distance: the lower bound keeps self-intersections out, the upper
/// bound shrinks as nearer hits are found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// An interval containing every value.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_bounds() {
        let interval = Interval::new(0.5, 10.0);
        assert_eq!(interval.min, 0.5);
        assert_eq!(interval.max, 10.0);
    }

    #[test]
    fn test_universe_bounds_nothing() {
        assert!(Interval::UNIVERSE.min < f32::MIN);
        assert!(Interval::UNIVERSE.max > f32::MAX);
    }
}
