use super::DensityModulator;
use crate::config::ShapeConfig;
use crate::density::{FieldColumns, Lattice, LatticeDriven, field_lattice};
use crate::noise::{CoherentNoiseField, NoiseKey, OctaveRange, clamped_map};

const BAND_FLOOR_OFFSET: i32 = 4;
const BAND_TOP: i32 = 30;
const RIDGE_SCALE: f64 = 2.6667;
const RIDGE_WEIGHT: f64 = 1.5;

pub struct WormFields {
    toggle: CoherentNoiseField,
    thickness: CoherentNoiseField,
    ridge_a: CoherentNoiseField,
    ridge_b: CoherentNoiseField,
}

impl WormFields {
    pub fn new(seed: u64) -> Self {
        Self {
            toggle: CoherentNoiseField::new(seed, NoiseKey::NoodleToggle, &OctaveRange::single(-8)),
            thickness: CoherentNoiseField::new(
                seed,
                NoiseKey::NoodleThickness,
                &OctaveRange::single(-8),
            ),
            ridge_a: CoherentNoiseField::new(seed, NoiseKey::NoodleRidgeA, &OctaveRange::single(-7)),
            ridge_b: CoherentNoiseField::new(seed, NoiseKey::NoodleRidgeB, &OctaveRange::single(-7)),
        }
    }
}

/// Thin winding tunnels carved where two ridge fields both run close to zero.
pub struct WormTunnelModulator<'g> {
    toggle: Lattice<FieldColumns<'g>>,
    thickness: Lattice<FieldColumns<'g>>,
    ridge_a: Lattice<FieldColumns<'g>>,
    ridge_b: Lattice<FieldColumns<'g>>,
    band: (i32, i32),
}

impl<'g> WormTunnelModulator<'g> {
    pub fn new(
        fields: &'g WormFields,
        shape: &ShapeConfig,
        cells_xz: usize,
        first_cell_x: i32,
        first_cell_z: i32,
    ) -> Self {
        let lattice = |field: &'g CoherentNoiseField, scale: f64| {
            field_lattice(field, shape, scale, scale, cells_xz, first_cell_x, first_cell_z)
        };
        Self {
            toggle: lattice(&fields.toggle, 1.0),
            thickness: lattice(&fields.thickness, 1.0),
            ridge_a: lattice(&fields.ridge_a, RIDGE_SCALE),
            ridge_b: lattice(&fields.ridge_b, RIDGE_SCALE),
            band: (shape.min_y + BAND_FLOOR_OFFSET, BAND_TOP),
        }
    }

    fn lattices(&mut self) -> [&mut Lattice<FieldColumns<'g>>; 4] {
        [
            &mut self.toggle,
            &mut self.thickness,
            &mut self.ridge_a,
            &mut self.ridge_b,
        ]
    }
}

impl LatticeDriven for WormTunnelModulator<'_> {
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

impl DensityModulator for WormTunnelModulator<'_> {
    fn adjust(&mut self, density: f64, _x: i32, y: i32, _z: i32) -> f64 {
        if y < self.band.0 || y > self.band.1 || self.toggle.value() < 0.0 {
            return density;
        }
        let thickness = clamped_map(self.thickness.value(), -1.0, 1.0, 0.05, 0.1);
        let a = (RIDGE_WEIGHT * self.ridge_a.value()).abs() - thickness;
        let b = (RIDGE_WEIGHT * self.ridge_b.value()).abs() - thickness;
        density.min(a.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldGenParams;

    fn drive_to_block(m: &mut WormTunnelModulator<'_>) {
        m.prime();
        m.advance(0);
        m.select(0, 0);
        m.apply_y(0.0);
        m.apply_x(0.0);
        m.apply_z(0.0);
    }

    #[test]
    fn identity_outside_band() {
        let params = WorldGenParams::default();
        let fields = WormFields::new(11);
        let mut m = WormTunnelModulator::new(&fields, &params.shape, 4, 0, 0);
        drive_to_block(&mut m);
        assert_eq!(m.adjust(0.75, 0, 31, 0), 0.75);
        assert_eq!(m.adjust(0.75, 0, params.shape.min_y + 3, 0), 0.75);
    }

    #[test]
    fn never_adds_density() {
        let params = WorldGenParams::default();
        let fields = WormFields::new(11);
        let mut m = WormTunnelModulator::new(&fields, &params.shape, 4, 0, 0);
        drive_to_block(&mut m);
        for y in -60..=30 {
            assert!(m.adjust(0.5, 0, y, 0) <= 0.5);
        }
    }
}
