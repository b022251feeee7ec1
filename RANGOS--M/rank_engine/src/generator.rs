use std::ops::Range;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::point::{Point, PointSet};

/// Produces reproducible random point sets from a seed.
#[derive(Debug, Clone)]
pub struct PointGenerator {
    seed: u64,
    quantization: Option<f64>,
}

impl PointGenerator {
    /// Creates a generator with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            quantization: None,
        }
    }

    /// Snaps generated `y` values to multiples of `step` so ties show up.
    /// Non-positive or non-finite steps are ignored.
    #[must_use]
    pub fn with_quantization(mut self, step: f64) -> Self {
        self.quantization = (step.is_finite() && step > 0.0).then_some(step);
        self
    }

    /// Generates `count` points with both coordinates drawn from `range`.
    /// An empty range yields points at `range.start`.
    #[must_use]
    pub fn generate(&self, count: usize, range: Range<f64>) -> PointSet {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        (0..count)
            .map(|_| {
                let (x, y) = if range.is_empty() {
                    (range.start, range.start)
                } else {
                    (rng.gen_range(range.clone()), rng.gen_range(range.clone()))
                };
                Point::new(x, self.snap(y))
            })
            .collect()
    }

    fn snap(&self, y: f64) -> f64 {
        self.quantization
            .map_or(y, |step| (y / step).round() * step)
    }
}

/// Seed drawn from the thread RNG, for runs that do not ask for one.
#[must_use]
pub fn random_seed() -> u64 {
    rand::thread_rng().gen()
}
