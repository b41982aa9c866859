use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard, TryLockError};

use strata_blocks::Material;
use strata_world::{CHUNK_WIDTH, ChunkCoord, ShapeConfig, TerrainGenerator, TerrainMetrics};

use crate::buf::ChunkBuf;
use crate::error::GenError;
use crate::heightmap::Heightmaps;
use crate::proto::{FluidTick, GenerationStage, LAYER, ProtoChunk};

/// Rows of blocks per storage section.
const SECTION_ROWS: usize = 16;

/// Cooperative cancellation flag shared between a scheduler and its fill tasks.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct Section {
    blocks: Vec<Material>,
}

#[derive(Debug, Default)]
struct ColumnMeta {
    stage: GenerationStage,
    heightmaps: Option<Heightmaps>,
    fluid_ticks: Vec<FluidTick>,
    metrics: TerrainMetrics,
}

/// Shared chunk column whose sections are individually locked.
#[derive(Debug)]
pub struct ChunkColumn {
    coord: ChunkCoord,
    min_y: i32,
    height: usize,
    sections: Vec<RwLock<Section>>,
    meta: Mutex<ColumnMeta>,
}

impl ChunkColumn {
    pub fn new(coord: ChunkCoord, shape: &ShapeConfig) -> Self {
        let height = shape.height as usize;
        let sections = (0..height.div_ceil(SECTION_ROWS))
            .map(|i| {
                let rows = SECTION_ROWS.min(height - i * SECTION_ROWS);
                RwLock::new(Section {
                    blocks: vec![Material::Air; rows * LAYER],
                })
            })
            .collect();
        Self {
            coord,
            min_y: shape.min_y,
            height,
            sections,
            meta: Mutex::new(ColumnMeta::default()),
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    fn meta(&self) -> MutexGuard<'_, ColumnMeta> {
        self.meta.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stage(&self) -> GenerationStage {
        self.meta().stage
    }

    pub fn fluid_ticks(&self) -> Vec<FluidTick> {
        self.meta().fluid_ticks.clone()
    }

    pub fn heightmaps(&self) -> Option<Heightmaps> {
        self.meta().heightmaps.clone()
    }

    pub fn metrics(&self) -> TerrainMetrics {
        self.meta().metrics.clone()
    }

    /// Takes every section for writing, or fails without holding any of them.
    pub fn try_lock_sections(&self) -> Result<SectionLease<'_>, GenError> {
        let mut guards = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            match section.try_write() {
                Ok(g) => guards.push(g),
                Err(TryLockError::Poisoned(p)) => guards.push(p.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    log::trace!("sections of {:?} busy", self.coord);
                    return Err(GenError::SectionsBusy(self.coord));
                }
            }
        }
        Ok(SectionLease {
            column: self,
            guards,
        })
    }

    pub fn read_block(&self, lx: usize, y: i32, lz: usize) -> Option<Material> {
        if y < self.min_y || y >= self.min_y + self.height as i32 {
            return None;
        }
        let ly = (y - self.min_y) as usize;
        let section = self.sections[ly / SECTION_ROWS]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        section
            .blocks
            .get(((ly % SECTION_ROWS) * CHUNK_WIDTH + lz) * CHUNK_WIDTH + lx)
            .copied()
    }

    /// Copies the committed blocks into a dense buffer.
    pub fn snapshot(&self) -> ChunkBuf {
        let mut buf = ChunkBuf::new_air(self.coord, self.min_y, self.height);
        for (i, section) in self.sections.iter().enumerate() {
            let section = section.read().unwrap_or_else(PoisonError::into_inner);
            let start = i * SECTION_ROWS * LAYER;
            buf.blocks[start..start + section.blocks.len()].copy_from_slice(&section.blocks);
        }
        buf
    }

    /// Generates the column in place. Nothing is written unless every stage succeeds.
    pub fn generate(
        &self,
        generator: &TerrainGenerator,
        cancel: &CancelToken,
    ) -> Result<TerrainMetrics, GenError> {
        let lease = self.try_lock_sections()?;
        let found = self.stage();
        if found != GenerationStage::NotStarted {
            return Err(GenError::StageOrder {
                found,
                wanted: GenerationStage::NoiseFilled,
            });
        }
        let mut proto = ProtoChunk::new(self.coord, generator.shape());
        crate::run_pipeline(generator, &mut proto, cancel)?;
        let metrics = proto.metrics().clone();
        lease.commit(proto);
        Ok(metrics)
    }
}

/// Write access to all sections of one column; released on drop.
pub struct SectionLease<'a> {
    column: &'a ChunkColumn,
    guards: Vec<RwLockWriteGuard<'a, Section>>,
}

impl SectionLease<'_> {
    pub fn coord(&self) -> ChunkCoord {
        self.column.coord
    }

    /// Publishes a finished scratch chunk into the leased sections.
    pub fn commit(mut self, proto: ProtoChunk) {
        let result = proto.into_result();
        for (i, guard) in self.guards.iter_mut().enumerate() {
            let start = i * SECTION_ROWS * LAYER;
            let len = guard.blocks.len();
            guard
                .blocks
                .copy_from_slice(&result.buf.blocks[start..start + len]);
        }
        let mut meta = self.column.meta();
        meta.stage = result.stage;
        meta.heightmaps = Some(result.heightmaps);
        meta.fluid_ticks = result.fluid_ticks;
        meta.metrics = result.terrain_metrics;
    }
}

impl Drop for SectionLease<'_> {
    fn drop(&mut self) {
        log::trace!(
            "releasing {} sections of {:?}",
            self.guards.len(),
            self.column.coord
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_world::WorldGenParams;

    #[test]
    fn second_lease_is_refused_until_release() {
        let shape = WorldGenParams::default().shape;
        let column = ChunkColumn::new(ChunkCoord::new(0, 0), &shape);
        let lease = column.try_lock_sections().unwrap();
        assert_eq!(
            column.try_lock_sections().err(),
            Some(GenError::SectionsBusy(ChunkCoord::new(0, 0)))
        );
        drop(lease);
        assert!(column.try_lock_sections().is_ok());
    }

    #[test]
    fn sections_cover_partial_heights() {
        let mut shape = WorldGenParams::default().shape;
        shape.height = 40;
        let column = ChunkColumn::new(ChunkCoord::new(0, 0), &shape);
        assert_eq!(column.sections.len(), 3);
        assert_eq!(column.snapshot().blocks.len(), 40 * LAYER);
        assert_eq!(column.read_block(0, shape.min_y + 39, 0), Some(Material::Air));
        assert_eq!(column.read_block(0, shape.min_y + 40, 0), None);
    }

    #[test]
    fn cancel_token_is_shared() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
