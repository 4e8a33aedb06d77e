use rand::Rng;

/// Seeds are drawn uniformly from `0..SEED_UPPER_BOUND`.
pub const SEED_UPPER_BOUND: u64 = 1_000_000_000;

pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u64;
}

/// Fresh random seed per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSeed;

impl SeedSource for RandomSeed {
    fn next_seed(&self) -> u64 {
        rand::thread_rng().gen_range(0..SEED_UPPER_BOUND)
    }
}

/// Always returns the same seed. Useful for reproducible runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> u64 {
        self.0
    }
}
