//! Seeded multi-octave coherent noise.
//!
//! A [`CoherentNoiseField`] sums a run of octaves, each a separately seeded lattice
//! noise. Octave `i` of a range starting at `first_octave` samples at frequency
//! `2^(first_octave + i)`; lower octaves carry more amplitude.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

use crate::random::derive_seed;

/// Coordinates are wrapped into this period before they reach the `f32` lattice so that
/// far-out positions keep sub-block precision.
const WRAP_PERIOD: f64 = 33_554_432.0;

/// Stable salts naming every field derived from the world seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoiseKey {
    Shape,
    ShapeDetail,
    Island,
    SurfaceDepth,
    AquiferLevel,
    AquiferType,
    AquiferEdge,
    NoodleToggle,
    NoodleThickness,
    NoodleRidgeA,
    NoodleRidgeB,
    VeinLikelihood,
    VeinSize,
    VeinType,
}

impl NoiseKey {
    pub const fn salt(self) -> u64 {
        match self {
            NoiseKey::Shape => 0x5348_4150_4500_0001,
            NoiseKey::ShapeDetail => 0x5348_4150_4500_0002,
            NoiseKey::Island => 0x4953_4c41_4e44_0001,
            NoiseKey::SurfaceDepth => 0x5355_5246_4143_0001,
            NoiseKey::AquiferLevel => 0x4151_5549_4c56_0001,
            NoiseKey::AquiferType => 0x4151_5549_5459_0001,
            NoiseKey::AquiferEdge => 0x4151_5549_4544_0001,
            NoiseKey::NoodleToggle => 0x4e4f_4f44_4c45_0001,
            NoiseKey::NoodleThickness => 0x4e4f_4f44_4c45_0002,
            NoiseKey::NoodleRidgeA => 0x4e4f_4f44_4c45_0003,
            NoiseKey::NoodleRidgeB => 0x4e4f_4f44_4c45_0004,
            NoiseKey::VeinLikelihood => 0x5645_494e_0000_0001,
            NoiseKey::VeinSize => 0x5645_494e_0000_0002,
            NoiseKey::VeinType => 0x5645_494e_0000_0003,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OctaveRange {
    #[serde(default = "d_first_octave")]
    pub first_octave: i32,
    #[serde(default = "d_amplitudes")]
    pub amplitudes: Vec<f64>,
}
fn d_first_octave() -> i32 {
    -7
}
fn d_amplitudes() -> Vec<f64> {
    vec![1.0, 1.0, 1.0, 1.0]
}
impl Default for OctaveRange {
    fn default() -> Self {
        Self {
            first_octave: d_first_octave(),
            amplitudes: d_amplitudes(),
        }
    }
}

impl OctaveRange {
    pub fn new(first_octave: i32, amplitudes: &[f64]) -> Self {
        Self {
            first_octave,
            amplitudes: amplitudes.to_vec(),
        }
    }

    pub fn single(octave: i32) -> Self {
        Self::new(octave, &[1.0])
    }
}

struct Octave {
    noise: FastNoiseLite,
    frequency: f64,
    amplitude: f64,
}

pub struct CoherentNoiseField {
    octaves: Vec<Octave>,
    max_value: f64,
}

impl CoherentNoiseField {
    pub fn new(world_seed: u64, key: NoiseKey, range: &OctaveRange) -> Self {
        Self::with_noise_type(world_seed, key, range, NoiseType::Perlin)
    }

    pub fn with_noise_type(
        world_seed: u64,
        key: NoiseKey,
        range: &OctaveRange,
        noise_type: NoiseType,
    ) -> Self {
        let field_seed = derive_seed(world_seed, key.salt());
        let n = range.amplitudes.len() as i32;
        // Lowest octave gets 2^(n-1) parts of 2^n - 1, halving upward.
        let norm = if n > 0 { (2f64.powi(n) - 1.0).max(1.0) } else { 1.0 };
        let mut octaves = Vec::with_capacity(range.amplitudes.len());
        let mut max_value = 0.0;
        for (i, &weight) in range.amplitudes.iter().enumerate() {
            if weight == 0.0 {
                continue;
            }
            let octave_seed = derive_seed(field_seed, i as u64);
            let mut noise = FastNoiseLite::with_seed(octave_seed as i32);
            noise.set_noise_type(Some(noise_type));
            noise.set_frequency(Some(1.0));
            let amplitude = weight * 2f64.powi(n - 1 - i as i32) / norm;
            max_value += amplitude.abs();
            octaves.push(Octave {
                noise,
                frequency: 2f64.powi(range.first_octave + i as i32),
                amplitude,
            });
        }
        Self { octaves, max_value }
    }

    /// Upper bound on `|sample|`.
    #[inline]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut sum = 0.0;
        for o in &self.octaves {
            let v = o.noise.get_noise_3d(
                wrap(x * o.frequency) as f32,
                wrap(y * o.frequency) as f32,
                wrap(z * o.frequency) as f32,
            );
            sum += f64::from(v) * o.amplitude;
        }
        sum
    }

    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        let mut sum = 0.0;
        for o in &self.octaves {
            let v = o
                .noise
                .get_noise_2d(wrap(x * o.frequency) as f32, wrap(z * o.frequency) as f32);
            sum += f64::from(v) * o.amplitude;
        }
        sum
    }
}

#[inline]
fn wrap(v: f64) -> f64 {
    v - (v / WRAP_PERIOD + 0.5).floor() * WRAP_PERIOD
}

#[inline]
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Maps `v` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`, clamping outside.
#[inline]
pub fn clamped_map(v: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let t = ((v - from_lo) / (from_hi - from_lo)).clamp(0.0, 1.0);
    lerp(t, to_lo, to_hi)
}

/// Replaces a non-finite density with a solid value; returns whether it had to.
#[inline]
pub fn finite_or_solid(v: f64) -> (f64, bool) {
    if v.is_finite() { (v, false) } else { (SOLID_FALLBACK, true) }
}

/// Density substituted for NaN or infinite noise output.
pub const SOLID_FALLBACK: f64 = 1.0;
