use strata_blocks::Material;

use crate::config::WorldGenParams;
use crate::random::{derive_seed, unit3};

const ROCK_SALT: u64 = 0x524f_434b_0000_0001;

/// Picks the solid block placed wherever resolved density is positive.
pub trait RockSource: Send + Sync {
    fn sample(&self, x: i32, y: i32, z: i32) -> Material;
}

#[derive(Clone, Copy, Debug)]
pub struct UniformRock(pub Material);

impl RockSource for UniformRock {
    #[inline]
    fn sample(&self, _x: i32, _y: i32, _z: i32) -> Material {
        self.0
    }
}

/// Upper rock above `top`, deep rock below `bottom`, and a dithered band between.
#[derive(Clone, Debug)]
pub struct LayeredRock {
    seed: u64,
    upper: Material,
    deep: Material,
    top: i32,
    bottom: i32,
}

impl LayeredRock {
    pub fn new(world_seed: u64, upper: Material, deep: Material, top: i32, bottom: i32) -> Self {
        Self {
            seed: derive_seed(world_seed, ROCK_SALT),
            upper,
            deep,
            top: top.max(bottom),
            bottom,
        }
    }

    pub fn from_params(world_seed: u64, params: &WorldGenParams) -> Self {
        Self::new(
            world_seed,
            params.shape.default_rock,
            params.deep_rock,
            params.rock_transition_top,
            params.rock_transition_bottom,
        )
    }
}

impl RockSource for LayeredRock {
    fn sample(&self, x: i32, y: i32, z: i32) -> Material {
        if y >= self.top {
            return self.upper;
        }
        if y < self.bottom {
            return self.deep;
        }
        let t = (self.top - y) as f64 / (self.top - self.bottom) as f64;
        if unit3(self.seed, x, y, z) < t {
            self.deep
        } else {
            self.upper
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_rock_bands() {
        let r = LayeredRock::new(5, Material::Stone, Material::Deepslate, 8, 0);
        assert_eq!(r.sample(0, 8, 0), Material::Stone);
        assert_eq!(r.sample(0, 100, 0), Material::Stone);
        assert_eq!(r.sample(0, -1, 0), Material::Deepslate);
        let mixed: Vec<_> = (0..64).map(|x| r.sample(x, 4, 3)).collect();
        assert!(mixed.contains(&Material::Stone));
        assert!(mixed.contains(&Material::Deepslate));
    }

    #[test]
    fn collapsed_band_has_no_dither() {
        let r = LayeredRock::new(5, Material::Stone, Material::Tuff, 0, 0);
        assert_eq!(r.sample(3, 0, 3), Material::Stone);
        assert_eq!(r.sample(3, -1, 3), Material::Tuff);
    }
}
