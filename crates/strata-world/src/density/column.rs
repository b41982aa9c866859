use fastnoise_lite::NoiseType;

use super::ColumnSource;
use crate::biome::{BiomeSource, ShapeOverrides};
use crate::config::WorldGenParams;
use crate::noise::{
    CoherentNoiseField, NoiseKey, OctaveRange, clamped_map, finite_or_solid, lerp,
};
use crate::random::floor_div;

const TOP_SLIDE_CELLS: i32 = 3;
const TOP_SLIDE_TARGET: f64 = -1.5;
const BOTTOM_SLIDE_CELLS: i32 = 1;
const BOTTOM_SLIDE_TARGET: f64 = 1.5;
const ISLAND_CELL: i32 = 8;
const ISLAND_REACH: i64 = 12;

/// World-wide fields feeding the raw density and surface depth.
pub struct ShapeNoises {
    pub shape: CoherentNoiseField,
    pub detail: CoherentNoiseField,
    pub island: Option<CoherentNoiseField>,
    pub surface_depth: CoherentNoiseField,
}

impl ShapeNoises {
    pub fn new(seed: u64, params: &WorldGenParams) -> Self {
        let island = params.shape.island_override.then(|| {
            CoherentNoiseField::with_noise_type(
                seed,
                NoiseKey::Island,
                &OctaveRange::single(0),
                NoiseType::OpenSimplex2,
            )
        });
        let surface_type = if params.shape.simplex_surface_noise {
            NoiseType::OpenSimplex2
        } else {
            NoiseType::Perlin
        };
        Self {
            shape: CoherentNoiseField::new(seed, NoiseKey::Shape, &params.shape_octaves),
            detail: CoherentNoiseField::new(seed, NoiseKey::ShapeDetail, &params.detail_octaves),
            island,
            surface_depth: CoherentNoiseField::with_noise_type(
                seed,
                NoiseKey::SurfaceDepth,
                &params.surface_depth_octaves,
                surface_type,
            ),
        }
    }
}

/// Raw density at the coarse levels of one coarse column.
///
/// Shape noise plus a vertical gradient around sea level, shifted and stretched by
/// the biome overrides, with slides pinning the very top open and the floor solid.
pub struct ColumnDensitySampler<'g> {
    params: &'g WorldGenParams,
    noises: &'g ShapeNoises,
    biomes: &'g dyn BiomeSource,
    non_finite: u32,
}

impl<'g> ColumnDensitySampler<'g> {
    pub fn new(
        params: &'g WorldGenParams,
        noises: &'g ShapeNoises,
        biomes: &'g dyn BiomeSource,
    ) -> Self {
        Self {
            params,
            noises,
            biomes,
            non_finite: 0,
        }
    }

    /// Corner values that had to be replaced by a solid fallback.
    #[inline]
    pub fn non_finite_count(&self) -> u32 {
        self.non_finite
    }

    /// Overrides averaged over the 3x3 coarse columns around the given one.
    fn overrides_at(&self, cell_x: i32, cell_z: i32) -> ShapeOverrides {
        let shape = &self.params.shape;
        let h = shape.horizontal_resolution;
        let coarse_y = floor_div(shape.sea_level - shape.min_y, shape.vertical_resolution);
        let (mut depth, mut scale) = (0.0, 0.0);
        for dx in -1..=1 {
            for dz in -1..=1 {
                let o = self
                    .biomes
                    .biome_at((cell_x + dx) * h, coarse_y, (cell_z + dz) * h)
                    .shape_overrides();
                depth += o.depth;
                scale += o.scale;
            }
        }
        ShapeOverrides {
            depth: depth / 9.0,
            scale: (scale / 9.0).max(f64::EPSILON),
        }
    }

    /// End-style floating island height for a block column.
    fn island_height(field: &CoherentNoiseField, x: i32, z: i32) -> f64 {
        let ix = i64::from(floor_div(x, ISLAND_CELL));
        let iz = i64::from(floor_div(z, ISLAND_CELL));
        let cell_x = ix.div_euclid(2);
        let cell_z = iz.div_euclid(2);
        let frac_x = ix.rem_euclid(2) as f64;
        let frac_z = iz.rem_euclid(2) as f64;
        let mut h = (100.0 - ((ix * ix + iz * iz) as f64).sqrt() * 8.0).clamp(-100.0, 80.0);
        for dx in -ISLAND_REACH..=ISLAND_REACH {
            for dz in -ISLAND_REACH..=ISLAND_REACH {
                let nx = cell_x + dx;
                let nz = cell_z + dz;
                if nx * nx + nz * nz <= 4096 || field.sample_2d(nx as f64, nz as f64) >= -0.9 {
                    continue;
                }
                let size = ((nx.abs() * 3439 + nz.abs() * 147) % 13 + 9) as f64;
                let ox = frac_x - dx as f64 * 2.0;
                let oz = frac_z - dz as f64 * 2.0;
                let nh = 100.0 - (ox * ox + oz * oz).sqrt() * size;
                h = h.max(nh.clamp(-100.0, 80.0));
            }
        }
        h
    }

    fn raw_density(&self, x: i32, y: i32, z: i32, o: ShapeOverrides, island: Option<f64>) -> f64 {
        let p = self.params;
        let (sx, sy, sz) = (
            f64::from(x) * p.xz_scale,
            f64::from(y) * p.y_scale,
            f64::from(z) * p.xz_scale,
        );
        let noise =
            self.noises.shape.sample(sx, sy, sz) + p.detail_amplitude * self.noises.detail.sample(sx, sy, sz);
        let sea = f64::from(p.shape.sea_level);
        let falloff = p.vertical_falloff * o.scale;
        let base = match island {
            Some(h) => (h - 8.0) / 32.0 - (f64::from(y) - sea).abs() / (falloff / 4.0),
            None => (sea + o.depth * 32.0 - f64::from(y)) / falloff,
        };
        let mut d = noise + base;

        let v = p.shape.vertical_resolution;
        let top = clamped_map(
            f64::from(y),
            f64::from(p.shape.max_y() - TOP_SLIDE_CELLS * v),
            f64::from(p.shape.max_y()),
            0.0,
            1.0,
        );
        d = lerp(top, d, TOP_SLIDE_TARGET);
        let bottom = clamped_map(
            f64::from(y),
            f64::from(p.shape.min_y),
            f64::from(p.shape.min_y + BOTTOM_SLIDE_CELLS * v),
            1.0,
            0.0,
        );
        lerp(bottom, d, BOTTOM_SLIDE_TARGET)
    }
}

impl ColumnSource for ColumnDensitySampler<'_> {
    fn sample_column(&mut self, cell_x: i32, cell_z: i32, out: &mut [f64]) {
        let shape = &self.params.shape;
        let x = cell_x * shape.horizontal_resolution;
        let z = cell_z * shape.horizontal_resolution;
        let overrides = self.overrides_at(cell_x, cell_z);
        let island = self
            .noises
            .island
            .as_ref()
            .map(|field| Self::island_height(field, x, z));
        for (k, slot) in out.iter_mut().enumerate() {
            let y = shape.min_y + k as i32 * shape.vertical_resolution;
            let (d, replaced) = finite_or_solid(self.raw_density(x, y, z, overrides, island));
            if replaced {
                self.non_finite += 1;
                log::warn!("non-finite density at ({x}, {y}, {z}); using solid");
            }
            *slot = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::ConfiguredBiomes;

    fn column(params: &WorldGenParams, seed: u64) -> Vec<f64> {
        let noises = ShapeNoises::new(seed, params);
        let biomes = ConfiguredBiomes::from_params(params);
        let mut s = ColumnDensitySampler::new(params, &noises, &biomes);
        let mut out = vec![0.0; params.shape.cell_count_y() + 1];
        s.sample_column(3, -7, &mut out);
        out
    }

    #[test]
    fn solid_at_floor_open_at_ceiling() {
        let params = WorldGenParams::default();
        let col = column(&params, 9);
        assert!((col[0] - BOTTOM_SLIDE_TARGET).abs() < 1e-9);
        assert!((col[col.len() - 1] - TOP_SLIDE_TARGET).abs() < 1e-9);
        assert!(col[2] > 0.0);
    }

    #[test]
    fn sampling_is_pure() {
        let params = WorldGenParams::default();
        let a = column(&params, 77);
        let b = column(&params, 77);
        assert_eq!(a, b);
    }

    #[test]
    fn depth_override_raises_terrain() {
        let params = WorldGenParams::default();
        let mut raised = params.clone();
        raised.biome_depth = 1.0;
        let low = column(&params, 5);
        let high = column(&raised, 5);
        let sea_level_index = ((63 + 64) / 8) as usize;
        assert!(high[sea_level_index] > low[sea_level_index]);
    }

    #[test]
    fn island_override_stays_finite() {
        let mut params = WorldGenParams::default();
        params.shape.island_override = true;
        assert!(column(&params, 3).iter().all(|d| d.is_finite()));
    }
}
