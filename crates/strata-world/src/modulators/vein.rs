use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use strata_blocks::Material;

use crate::config::ShapeConfig;
use crate::density::{FieldColumns, Lattice, LatticeDriven, field_lattice};
use crate::noise::{CoherentNoiseField, NoiseKey, OctaveRange, clamped_map};
use crate::random::{derive_seed, positional_rng};
use crate::rock::RockSource;

const VEIN_SALT: u64 = 0x5645_494e_5253_0001;
const LIKELIHOOD_SCALE: f64 = 4.0;
const SIZE_SCALE: f64 = 4.0;
const TYPE_SCALE: f64 = 1.5;
const MIN_LIKELIHOOD: f64 = 0.4;
const SKIP_CHANCE: f64 = 0.7;
const SOLID_SIZE: f64 = 0.5;
const RAW_BLOCK_CHANCE: f64 = 0.02;
const EDGE_ROUNDOFF: f64 = 20.0;

#[derive(Clone, Copy, Debug)]
struct VeinKind {
    ore: Material,
    raw: Material,
    filler: Material,
    min_y: i32,
    max_y: i32,
}

const COPPER: VeinKind = VeinKind {
    ore: Material::CopperOre,
    raw: Material::RawCopperBlock,
    filler: Material::Granite,
    min_y: 0,
    max_y: 50,
};

const IRON: VeinKind = VeinKind {
    ore: Material::IronOre,
    raw: Material::RawIronBlock,
    filler: Material::Tuff,
    min_y: -60,
    max_y: -8,
};

pub struct VeinFields {
    likelihood: CoherentNoiseField,
    size: CoherentNoiseField,
    kind: CoherentNoiseField,
    seed: u64,
}

impl VeinFields {
    pub fn new(seed: u64) -> Self {
        Self {
            likelihood: CoherentNoiseField::new(
                seed,
                NoiseKey::VeinLikelihood,
                &OctaveRange::single(-7),
            ),
            size: CoherentNoiseField::new(seed, NoiseKey::VeinSize, &OctaveRange::single(-7)),
            kind: CoherentNoiseField::new(seed, NoiseKey::VeinType, &OctaveRange::single(-8)),
            seed: derive_seed(seed, VEIN_SALT),
        }
    }
}

/// Copper and iron veins with their filler rock.
pub struct MineralVeinModulator<'g> {
    likelihood: Lattice<FieldColumns<'g>>,
    size: Lattice<FieldColumns<'g>>,
    kind: Lattice<FieldColumns<'g>>,
    seed: u64,
}

impl<'g> MineralVeinModulator<'g> {
    pub fn new(
        fields: &'g VeinFields,
        shape: &ShapeConfig,
        cells_xz: usize,
        first_cell_x: i32,
        first_cell_z: i32,
    ) -> Self {
        let lattice = |field: &'g CoherentNoiseField, scale: f64| {
            field_lattice(field, shape, scale, scale, cells_xz, first_cell_x, first_cell_z)
        };
        Self {
            likelihood: lattice(&fields.likelihood, LIKELIHOOD_SCALE),
            size: lattice(&fields.size, SIZE_SCALE),
            kind: lattice(&fields.kind, TYPE_SCALE),
            seed: fields.seed,
        }
    }

    /// Vein material at the block last reached by the lattice sweep, if any.
    pub fn vein_at(&self, x: i32, y: i32, z: i32) -> Option<Material> {
        let kind = if self.kind.value() > 0.0 { COPPER } else { IRON };
        if y < kind.min_y || y > kind.max_y {
            return None;
        }
        let edge = f64::from((y - kind.min_y).min(kind.max_y - y));
        let likelihood =
            self.likelihood.value().abs() + clamped_map(edge, 0.0, EDGE_ROUNDOFF, -0.2, 0.0);
        if likelihood < MIN_LIKELIHOOD {
            return None;
        }
        let mut rng = positional_rng(self.seed, x, y, z);
        if rng.r#gen::<f64>() > SKIP_CHANCE {
            return None;
        }
        let ore_chance = clamped_map(likelihood, 0.4, 0.6, 0.1, 0.3);
        if self.size.value().abs() < SOLID_SIZE && rng.r#gen::<f64>() < ore_chance {
            if rng.r#gen::<f64>() < RAW_BLOCK_CHANCE {
                Some(kind.raw)
            } else {
                Some(kind.ore)
            }
        } else {
            Some(kind.filler)
        }
    }

    fn lattices(&mut self) -> [&mut Lattice<FieldColumns<'g>>; 3] {
        [&mut self.likelihood, &mut self.size, &mut self.kind]
    }
}

impl LatticeDriven for MineralVeinModulator<'_> {
    fn prime(&mut self) {
        self.lattices().into_iter().for_each(|l| l.prime());
    }
    fn advance(&mut self, x_index: usize) {
        self.lattices().into_iter().for_each(|l| l.advance(x_index));
    }
    fn select(&mut self, y_level: usize, z_index: usize) {
        self.lattices()
            .into_iter()
            .for_each(|l| l.select(y_level, z_index));
    }
    fn apply_y(&mut self, t: f64) {
        self.lattices().into_iter().for_each(|l| l.apply_y(t));
    }
    fn apply_x(&mut self, t: f64) {
        self.lattices().into_iter().for_each(|l| l.apply_x(t));
    }
    fn apply_z(&mut self, t: f64) {
        self.lattices().into_iter().for_each(|l| l.apply_z(t));
    }
    fn rotate(&mut self) {
        self.lattices().into_iter().for_each(|l| l.rotate());
    }
}

/// Rock source that places the current vein block in preference to the fallback.
pub struct VeinRock<'a, 'g> {
    vein: Option<&'a MineralVeinModulator<'g>>,
    fallback: &'a dyn RockSource,
    placed: AtomicBool,
}

impl<'a, 'g> VeinRock<'a, 'g> {
    pub fn new(vein: Option<&'a MineralVeinModulator<'g>>, fallback: &'a dyn RockSource) -> Self {
        Self {
            vein,
            fallback,
            placed: AtomicBool::new(false),
        }
    }

    /// Whether the last sample came from a vein rather than the fallback.
    #[inline]
    pub fn placed_vein(&self) -> bool {
        self.placed.load(Ordering::Relaxed)
    }
}

impl RockSource for VeinRock<'_, '_> {
    fn sample(&self, x: i32, y: i32, z: i32) -> Material {
        let vein = self.vein.and_then(|v| v.vein_at(x, y, z));
        self.placed.store(vein.is_some(), Ordering::Relaxed);
        vein.unwrap_or_else(|| self.fallback.sample(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldGenParams;
    use crate::rock::UniformRock;

    #[test]
    fn veins_stay_in_their_bands() {
        let params = WorldGenParams::default();
        let fields = VeinFields::new(21);
        let mut m = MineralVeinModulator::new(&fields, &params.shape, 4, 0, 0);
        m.prime();
        m.advance(0);
        for level in 0..params.shape.cell_count_y() {
            m.select(level, 0);
            m.apply_y(0.0);
            m.apply_x(0.0);
            m.apply_z(0.0);
            let y = params.shape.min_y + level as i32 * params.shape.vertical_resolution;
            match m.vein_at(0, y, 0) {
                None => {}
                Some(Material::CopperOre | Material::RawCopperBlock | Material::Granite) => {
                    assert!((0..=50).contains(&y))
                }
                Some(Material::IronOre | Material::RawIronBlock | Material::Tuff) => {
                    assert!((-60..=-8).contains(&y))
                }
                Some(other) => panic!("unexpected vein material {other}"),
            }
        }
    }

    #[test]
    fn vein_rock_falls_back_without_vein() {
        let stone = UniformRock(Material::Stone);
        let rock = VeinRock::new(None, &stone);
        assert_eq!(rock.sample(1, 2, 3), Material::Stone);
        assert!(!rock.placed_vein());
    }

    #[test]
    fn vein_rock_prefers_the_vein() {
        let params = WorldGenParams::default();
        let fields = VeinFields::new(21);
        let stone = UniformRock(Material::Stone);
        let (min_y, v, h) = (
            params.shape.min_y,
            params.shape.vertical_resolution,
            params.shape.horizontal_resolution,
        );
        let mut hits = 0;
        for origin in 0..64 {
            let cell_x = origin * 97;
            let mut m = MineralVeinModulator::new(&fields, &params.shape, 4, cell_x, -cell_x);
            m.prime();
            for x_index in 0..4 {
                m.advance(x_index);
                for level in 0..params.shape.cell_count_y() {
                    for z_index in 0..4 {
                        m.select(level, z_index);
                        m.apply_y(0.0);
                        m.apply_x(0.0);
                        m.apply_z(0.0);
                        let x = (cell_x + x_index as i32) * h;
                        let z = (-cell_x + z_index as i32) * h;
                        let y = min_y + level as i32 * v;
                        let expected = m.vein_at(x, y, z);
                        let rock = VeinRock::new(Some(&m), &stone);
                        assert_eq!(rock.sample(x, y, z), expected.unwrap_or(Material::Stone));
                        assert_eq!(rock.placed_vein(), expected.is_some());
                        hits += usize::from(expected.is_some());
                    }
                }
                m.rotate();
            }
            if hits > 0 {
                break;
            }
        }
        assert!(hits > 0, "no vein blocks sampled");
    }
}
