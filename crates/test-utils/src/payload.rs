//! Deterministic payloads.

use rand::{RngCore, SeedableRng, rngs::StdRng};

/// `len` pseudo-random bytes, identical for identical `seed`.
pub fn random_payload(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut payload = vec![0u8; len];
    rng.fill_bytes(&mut payload);
    payload
}
