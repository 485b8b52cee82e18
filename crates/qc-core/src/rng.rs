//! Explicit random streams.
//!
//! Every run owns its stream; nothing reads a process-wide generator. Replicate
//! streams are derived from a master seed by index, so the draws a replicate
//! sees do not depend on which worker runs it or in what order.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random stream type threaded through every simulation call.
pub type SimRng = ChaCha8Rng;

/// Open a stream for a single run.
pub fn stream(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Seed for replicate `index` under `master` (SplitMix64 finalizer).
pub fn derive_seed(master: u64, index: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut z = master ^ index.wrapping_mul(GOLDEN_GAMMA);
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
