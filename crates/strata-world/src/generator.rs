use std::sync::Arc;

use crate::aquifer::{AquiferFields, AquiferResolver};
use crate::biome::{BiomeSource, ConfiguredBiomes};
use crate::chunk_coord::ChunkCoord;
use crate::config::{ShapeConfig, WorldGenParams};
use crate::density::{ColumnDensitySampler, Lattice, LatticeInterpolator, ShapeNoises};
use crate::gen_ctx::{GenCtx, TerrainProfiler};
use crate::modulators::{
    MineralVeinModulator, StructureHollowingModulator, VeinFields, WormFields, WormTunnelModulator,
};
use crate::noise::CoherentNoiseField;
use crate::random::floor_div;
use crate::rock::{LayeredRock, RockSource};
use crate::structure::{NoStructures, StructureIndex};
use crate::CHUNK_WIDTH;

/// Seed-wide terrain state shared by every chunk of a world.
///
/// Holds the noise fields and the external collaborators; per-chunk state lives in
/// the [`GenCtx`] handed out by [`TerrainGenerator::make_gen_ctx`].
pub struct TerrainGenerator {
    seed: u64,
    params: WorldGenParams,
    shape_noises: ShapeNoises,
    worm_fields: WormFields,
    vein_fields: VeinFields,
    aquifer_fields: AquiferFields,
    biomes: Arc<dyn BiomeSource>,
    structures: Arc<dyn StructureIndex>,
    rock: Arc<dyn RockSource>,
}

impl TerrainGenerator {
    pub fn new(seed: u64, params: WorldGenParams) -> Self {
        let biomes: Arc<dyn BiomeSource> = Arc::new(ConfiguredBiomes::from_params(&params));
        let rock: Arc<dyn RockSource> = Arc::new(LayeredRock::from_params(seed, &params));
        log::debug!(
            "terrain generator seed={seed} min_y={} height={} aquifers={} veins={} noodles={}",
            params.shape.min_y,
            params.shape.height,
            params.shape.aquifers_enabled,
            params.shape.ore_veins_enabled,
            params.shape.noodle_caves_enabled,
        );
        Self {
            seed,
            shape_noises: ShapeNoises::new(seed, &params),
            worm_fields: WormFields::new(seed),
            vein_fields: VeinFields::new(seed),
            aquifer_fields: AquiferFields::new(seed),
            params,
            biomes,
            structures: Arc::new(NoStructures),
            rock,
        }
    }

    pub fn with_biomes(mut self, biomes: Arc<dyn BiomeSource>) -> Self {
        self.biomes = biomes;
        self
    }

    pub fn with_structures(mut self, structures: Arc<dyn StructureIndex>) -> Self {
        self.structures = structures;
        self
    }

    pub fn with_rock(mut self, rock: Arc<dyn RockSource>) -> Self {
        self.rock = rock;
        self
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    #[inline]
    pub fn shape(&self) -> &ShapeConfig {
        &self.params.shape
    }

    pub fn biomes(&self) -> &dyn BiomeSource {
        self.biomes.as_ref()
    }

    pub fn surface_noise(&self) -> &CoherentNoiseField {
        &self.shape_noises.surface_depth
    }

    /// Context covering the whole chunk column at `coord`.
    pub fn make_gen_ctx(&self, coord: ChunkCoord) -> GenCtx<'_> {
        let h = self.params.shape.horizontal_resolution;
        let (x0, z0) = (coord.min_block_x(), coord.min_block_z());
        let last = CHUNK_WIDTH as i32 - 1;
        self.make_ctx(
            self.params.shape.cell_count_xz(),
            floor_div(x0, h),
            floor_div(z0, h),
            (x0, z0, x0 + last, z0 + last),
        )
    }

    /// Context covering only the coarse cell that contains block column (`x`, `z`).
    ///
    /// Corner values and interpolation weights match a full chunk fill, so any
    /// block it resolves is bit-identical to the filled chunk.
    pub fn make_column_ctx(&self, x: i32, z: i32) -> GenCtx<'_> {
        let h = self.params.shape.horizontal_resolution;
        let (cx, cz) = (floor_div(x, h), floor_div(z, h));
        self.make_ctx(1, cx, cz, (cx * h, cz * h, cx * h + h - 1, cz * h + h - 1))
    }

    fn make_ctx(
        &self,
        cells_xz: usize,
        first_cell_x: i32,
        first_cell_z: i32,
        bounds: (i32, i32, i32, i32),
    ) -> GenCtx<'_> {
        let shape = &self.params.shape;
        let sampler = ColumnDensitySampler::new(&self.params, &self.shape_noises, self.biomes());
        let density = Lattice::new(
            LatticeInterpolator::new(cells_xz, shape.cell_count_y(), first_cell_x, first_cell_z),
            sampler,
        );
        let worm = shape.noodle_caves_enabled.then(|| {
            WormTunnelModulator::new(&self.worm_fields, shape, cells_xz, first_cell_x, first_cell_z)
        });
        let vein = shape.ore_veins_enabled.then(|| {
            MineralVeinModulator::new(&self.vein_fields, shape, cells_xz, first_cell_x, first_cell_z)
        });
        let (min_x, min_z, max_x, max_z) = bounds;
        GenCtx {
            params: &self.params,
            cells_xz,
            first_cell_x,
            first_cell_z,
            density,
            worm,
            vein,
            hollowing: StructureHollowingModulator::new(
                self.structures.as_ref(),
                min_x,
                min_z,
                max_x,
                max_z,
            ),
            aquifer: AquiferResolver::for_shape(shape, &self.aquifer_fields),
            rock: self.rock.as_ref(),
            profiler: TerrainProfiler::default(),
        }
    }
}
