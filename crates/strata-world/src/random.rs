//! Seed mixing and coordinate-keyed random streams.
//!
//! Every stream is derived from the world seed and integer coordinates only, so two
//! workers asking for the same position always see the same numbers.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// SplitMix64 finaliser.
#[inline]
pub const fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derives an independent sub-seed for one consumer of the world seed.
#[inline]
pub const fn derive_seed(world_seed: u64, salt: u64) -> u64 {
    mix64(world_seed ^ mix64(salt.wrapping_add(0x9e37_79b9_7f4a_7c15)))
}

#[inline]
pub fn hash3(seed: u64, x: i32, y: i32, z: i32) -> u64 {
    let mut h = seed ^ 0x9e37_79b9_7f4a_7c15;
    h = mix64(h ^ u64::from(x as u32).wrapping_mul(0x85eb_ca6b));
    h = mix64(h ^ u64::from(y as u32).wrapping_mul(0xc2b2_ae35));
    h = mix64(h ^ u64::from(z as u32).wrapping_mul(0x27d4_eb2f));
    h
}

/// Uniform value in `[0, 1)` keyed by a block position.
#[inline]
pub fn unit3(seed: u64, x: i32, y: i32, z: i32) -> f64 {
    (hash3(seed, x, y, z) >> 11) as f64 / (1u64 << 53) as f64
}

/// A ChaCha stream seeded from a 3D position.
#[inline]
pub fn positional_rng(seed: u64, x: i32, y: i32, z: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash3(seed, x, y, z))
}

/// A ChaCha stream seeded from a block column.
#[inline]
pub fn column_rng(seed: u64, x: i32, z: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash3(seed, x, 0x5eed, z))
}

/// Integer division rounding toward negative infinity.
#[inline]
pub const fn floor_div(a: i32, b: i32) -> i32 {
    a.div_euclid(b)
}
