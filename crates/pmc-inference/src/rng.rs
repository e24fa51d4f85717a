//! Random streams.
//!
//! Every randomized operation takes `seed: Option<u64>`. A present seed makes
//! the call bit-reproducible; an absent seed draws a base seed from the OS
//! once, at the call boundary. Independent units of work (sampling blocks,
//! replicate datasets) get their own generator seeded `base + index`, so
//! output never depends on how rayon schedules them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generator for a single-threaded call.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// The caller's seed, or a fresh one from the thread-local generator.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

/// Generator for unit `index` of a run with base seed `base`.
#[inline]
pub fn stream(base: u64, index: u64) -> StdRng {
    StdRng::seed_from_u64(base.wrapping_add(index))
}

/// `n` seeds for independent components of one run (e.g. separate variables).
///
/// Components must not share `base + index` streams, so each gets a seed drawn
/// from a generator seeded with `base` rather than an offset of it.
pub fn child_seeds(base: u64, n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(base);
    (0..n).map(|_| rng.random()).collect()
}
