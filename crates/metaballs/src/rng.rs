use crate::field::Extent;
use crate::types::Point;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

// pi * 100_000
const RANDOM_SEED: u64 = 314159;

pub fn new() -> impl Rng {
    Xoshiro256PlusPlus::seed_from_u64(RANDOM_SEED)
}

/// `n` points drawn uniformly inside `extent`.
pub fn scatter(rng: &mut impl Rng, extent: &Extent, n: usize) -> Vec<Point> {
    (0..n)
        .map(|_| {
            Point::new(
                rng.random_range(extent.x_min..extent.x_max),
                rng.random_range(extent.y_min..extent.y_max),
            )
        })
        .collect()
}
