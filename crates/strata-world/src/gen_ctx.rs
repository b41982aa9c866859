use std::time::{Duration, Instant};

use strata_blocks::Material;

use crate::aquifer::AquiferResolver;
use crate::config::WorldGenParams;
use crate::density::{ColumnDensitySampler, Lattice, LatticeDriven};
use crate::modulators::{
    DensityModulator, MineralVeinModulator, StructureHollowingModulator, VeinRock,
    WormTunnelModulator,
};
use crate::rock::RockSource;

const DENSITY_LIMIT: f64 = 64.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainStage {
    Noise,
    Surface,
    Bedrock,
}

pub const TERRAIN_STAGE_COUNT: usize = 3;
pub const TERRAIN_STAGE_LABELS: [&str; TERRAIN_STAGE_COUNT] = ["noise", "surface", "bedrock"];

impl TerrainStage {
    pub const ALL: [TerrainStage; TERRAIN_STAGE_COUNT] =
        [TerrainStage::Noise, TerrainStage::Surface, TerrainStage::Bedrock];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        TERRAIN_STAGE_LABELS[self as usize]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerrainMetrics {
    pub stage_micros: [u64; TERRAIN_STAGE_COUNT],
    pub blocks_written: u64,
    pub fluid_ticks: u32,
    pub vein_blocks: u32,
    pub non_finite: u32,
}

impl TerrainMetrics {
    pub fn total_micros(&self) -> u64 {
        self.stage_micros.iter().sum()
    }

    pub fn merge(&mut self, other: &TerrainMetrics) {
        for (a, b) in self.stage_micros.iter_mut().zip(other.stage_micros) {
            *a += b;
        }
        self.blocks_written += other.blocks_written;
        self.fluid_ticks += other.fluid_ticks;
        self.vein_blocks += other.vein_blocks;
        self.non_finite += other.non_finite;
    }
}

#[derive(Debug, Default)]
pub struct TerrainProfiler {
    metrics: TerrainMetrics,
    open: Option<(TerrainStage, Instant)>,
}

impl TerrainProfiler {
    pub fn begin_stage(&mut self, stage: TerrainStage) {
        self.end_stage();
        self.open = Some((stage, Instant::now()));
    }

    pub fn end_stage(&mut self) {
        if let Some((stage, started)) = self.open.take() {
            self.record_stage_duration(stage, started.elapsed());
        }
    }

    pub fn record_stage_duration(&mut self, stage: TerrainStage, elapsed: Duration) {
        self.metrics.stage_micros[stage.index()] += elapsed.as_micros() as u64;
    }

    #[inline]
    pub fn record_blocks(&mut self, n: u64) {
        self.metrics.blocks_written += n;
    }

    #[inline]
    pub fn record_fluid_tick(&mut self) {
        self.metrics.fluid_ticks += 1;
    }

    #[inline]
    pub fn record_vein(&mut self) {
        self.metrics.vein_blocks += 1;
    }

    pub fn metrics(&self) -> &TerrainMetrics {
        &self.metrics
    }

    pub fn finish(mut self) -> TerrainMetrics {
        self.end_stage();
        self.metrics
    }
}

/// Per-chunk generation state: density lattice, modulators and the aquifer cache.
///
/// Built by [`crate::TerrainGenerator`] at fill start and dropped when the fill
/// ends; nothing in here outlives one chunk.
pub struct GenCtx<'g> {
    pub(crate) params: &'g WorldGenParams,
    pub(crate) cells_xz: usize,
    pub(crate) first_cell_x: i32,
    pub(crate) first_cell_z: i32,
    pub(crate) density: Lattice<ColumnDensitySampler<'g>>,
    pub(crate) worm: Option<WormTunnelModulator<'g>>,
    pub(crate) vein: Option<MineralVeinModulator<'g>>,
    pub(crate) hollowing: StructureHollowingModulator<'g>,
    pub(crate) aquifer: AquiferResolver<'g>,
    pub(crate) rock: &'g dyn RockSource,
    pub(crate) profiler: TerrainProfiler,
}

impl<'g> GenCtx<'g> {
    #[inline]
    pub fn params(&self) -> &'g WorldGenParams {
        self.params
    }

    #[inline]
    pub fn cells_xz(&self) -> usize {
        self.cells_xz
    }

    #[inline]
    pub fn cells_y(&self) -> usize {
        self.params.shape.cell_count_y()
    }

    #[inline]
    pub fn horizontal_resolution(&self) -> i32 {
        self.params.shape.horizontal_resolution
    }

    #[inline]
    pub fn vertical_resolution(&self) -> i32 {
        self.params.shape.vertical_resolution
    }

    /// Block coordinates of the lattice origin.
    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        let h = self.horizontal_resolution();
        (self.first_cell_x * h, self.first_cell_z * h)
    }

    pub fn profiler_mut(&mut self) -> &mut TerrainProfiler {
        &mut self.profiler
    }

    fn drive(&mut self, mut f: impl FnMut(&mut dyn LatticeDriven)) {
        f(&mut self.density);
        if let Some(w) = self.worm.as_mut() {
            f(w);
        }
        if let Some(v) = self.vein.as_mut() {
            f(v);
        }
    }

    pub fn prime(&mut self) {
        self.drive(|l| l.prime());
    }

    pub fn advance(&mut self, x_index: usize) {
        self.drive(|l| l.advance(x_index));
    }

    pub fn select(&mut self, y_level: usize, z_index: usize) {
        self.drive(|l| l.select(y_level, z_index));
    }

    pub fn apply_y(&mut self, t: f64) {
        self.drive(|l| l.apply_y(t));
    }

    pub fn apply_x(&mut self, t: f64) {
        self.drive(|l| l.apply_x(t));
    }

    pub fn apply_z(&mut self, t: f64) {
        self.drive(|l| l.apply_z(t));
    }

    pub fn rotate(&mut self) {
        self.drive(|l| l.rotate());
    }

    /// Composed density at the current lattice position: raw, tunnels, structures.
    pub fn density(&mut self, x: i32, y: i32, z: i32) -> f64 {
        let mut d = self.density.value();
        if let Some(w) = self.worm.as_mut() {
            d = w.adjust(d, x, y, z);
        }
        d = self.hollowing.adjust(d, x, y, z);
        d.clamp(-DENSITY_LIMIT, DENSITY_LIMIT)
    }

    /// Final block at the current lattice position.
    pub fn resolve(&mut self, x: i32, y: i32, z: i32) -> Material {
        let weight = self.density(x, y, z);
        let rock = VeinRock::new(self.vein.as_ref(), self.rock);
        let m = self.aquifer.apply(&rock, x, y, z, weight);
        if rock.placed_vein() {
            self.profiler.record_vein();
        }
        m
    }

    /// Whether the block last returned by [`GenCtx::resolve`] needs a fluid tick.
    #[inline]
    pub fn needs_fluid_tick(&self) -> bool {
        self.aquifer.needs_fluid_tick()
    }

    pub fn finish(self) -> TerrainMetrics {
        let non_finite = self.density.source().non_finite_count();
        log::trace!(
            "gen ctx at cell ({}, {}): {} aquifer points cached",
            self.first_cell_x,
            self.first_cell_z,
            self.aquifer.cached_points()
        );
        let mut metrics = self.profiler.finish();
        metrics.non_finite += non_finite;
        metrics
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::structure::{PieceBox, PieceIndex};

    #[test]
    fn merge_adds_up() {
        let mut a = TerrainMetrics {
            stage_micros: [1, 2, 3],
            blocks_written: 10,
            ..Default::default()
        };
        let b = TerrainMetrics {
            stage_micros: [4, 5, 6],
            fluid_ticks: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.stage_micros, [5, 7, 9]);
        assert_eq!(a.total_micros(), 21);
        assert_eq!(a.fluid_ticks, 2);
        assert_eq!(a.blocks_written, 10);
    }

    fn vein_and_hollowing_column(noodles: bool) -> Vec<(Option<Material>, f64)> {
        let mut params = WorldGenParams::default();
        params.shape.noodle_caves_enabled = noodles;
        let piece = PieceBox::new([-40, 0, 88], [-34, 20, 95]);
        let generator = crate::TerrainGenerator::new(11, params)
            .with_structures(Arc::new(PieceIndex::new(vec![piece])));
        let (x, z) = (-37, 90);
        let mut ctx = generator.make_column_ctx(x, z);
        let h = f64::from(ctx.horizontal_resolution());
        let v = ctx.vertical_resolution();
        let (ox, oz) = ctx.origin();
        let min_y = generator.shape().min_y;
        let mut out = Vec::new();
        ctx.prime();
        ctx.advance(0);
        for level in (0..ctx.cells_y()).rev() {
            ctx.select(level, 0);
            for dy in (0..v).rev() {
                let y = min_y + level as i32 * v + dy;
                ctx.apply_y(f64::from(dy) / f64::from(v));
                ctx.apply_x(f64::from(x - ox) / h);
                ctx.apply_z(f64::from(z - oz) / h);
                let vein = ctx.vein.as_ref().and_then(|m| m.vein_at(x, y, z));
                out.push((vein, ctx.hollowing.adjust(0.0, x, y, z)));
            }
        }
        out
    }

    #[test]
    fn tunnels_do_not_affect_other_modulators() {
        let with = vein_and_hollowing_column(true);
        assert_eq!(with, vein_and_hollowing_column(false));
        assert!(with.iter().any(|&(_, w)| w < 0.0), "piece never reached");
        assert!(with.iter().any(|&(_, w)| w > 0.0), "floor never buttressed");
    }

    #[test]
    fn stage_labels_line_up() {
        for s in TerrainStage::ALL {
            assert_eq!(TERRAIN_STAGE_LABELS[s.index()], s.label());
        }
    }
}
