//! Parallel chunk generation over a shared column store.
#![forbid(unsafe_code)]

mod store;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use rayon::{ThreadPool, ThreadPoolBuilder};
use strata_chunk::{CancelToken, ChunkBuf, ChunkColumn, FluidTick, GenError, GenerationStage};
use strata_world::{ChunkCoord, TerrainGenerator, TerrainMetrics};
use thiserror::Error;

pub use store::ChunkStore;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("chunk {coord:?} still busy after {attempts} attempts")]
    RetriesExhausted { coord: ChunkCoord, attempts: u32 },
    #[error(transparent)]
    Gen(#[from] GenError),
    #[error("worker for chunk {0:?} exited without reporting")]
    Lost(ChunkCoord),
}

#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    pub workers: usize,
    pub max_retries: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            max_retries: 64,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub coord: ChunkCoord,
    pub buf: ChunkBuf,
    pub fluid_ticks: Vec<FluidTick>,
    pub terrain_metrics: TerrainMetrics,
    /// Whether this request ran the pipeline, as opposed to finding it already done.
    pub fresh: bool,
}

pub struct GenerationRuntime {
    pool: ThreadPool,
    generator: Arc<TerrainGenerator>,
    store: Arc<ChunkStore>,
    max_retries: u32,
}

impl GenerationRuntime {
    pub fn new(generator: Arc<TerrainGenerator>, config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let workers = config.workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("strata-gen-{i}"))
            .build()?;
        log::info!("generation runtime with {workers} workers");
        Ok(Self {
            pool,
            store: Arc::new(ChunkStore::new(generator.shape().clone())),
            generator,
            max_retries: config.max_retries,
        })
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Generates every requested chunk; results come back in request order.
    pub fn generate_region(
        &self,
        coords: &[ChunkCoord],
        cancel: &CancelToken,
    ) -> Result<Vec<GeneratedChunk>, RuntimeError> {
        let started = Instant::now();
        let (tx, rx) = unbounded();
        for (i, &coord) in coords.iter().enumerate() {
            let tx = tx.clone();
            let generator = Arc::clone(&self.generator);
            let column = self.store.get_or_insert(coord);
            let cancel = cancel.clone();
            let max_retries = self.max_retries;
            self.pool.spawn(move || {
                let res = generate_with_retry(&generator, &column, &cancel, max_retries);
                let _ = tx.send((i, res));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<GeneratedChunk>> = vec![None; coords.len()];
        let mut first_err = None;
        for (i, res) in rx.iter() {
            match res {
                Ok(chunk) => slots[i] = Some(chunk),
                Err(e) => {
                    log::warn!("chunk {:?} failed: {e}", coords[i]);
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }
        let out = slots
            .into_iter()
            .zip(coords)
            .map(|(slot, &coord)| slot.ok_or(RuntimeError::Lost(coord)))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "generated {} chunks in {:?}",
            out.len(),
            started.elapsed()
        );
        Ok(out)
    }
}

fn generate_with_retry(
    generator: &TerrainGenerator,
    column: &ChunkColumn,
    cancel: &CancelToken,
    max_retries: u32,
) -> Result<GeneratedChunk, RuntimeError> {
    let coord = column.coord();
    let mut attempts = 0;
    loop {
        attempts += 1;
        let fresh = match column.generate(generator, cancel) {
            Ok(_) => true,
            Err(GenError::StageOrder {
                found: GenerationStage::Done,
                ..
            }) => false,
            Err(GenError::SectionsBusy(_)) if attempts <= max_retries => {
                log::warn!("chunk {coord:?} busy, retry {attempts}/{max_retries}");
                thread::sleep(Duration::from_millis(u64::from(attempts.min(20))));
                continue;
            }
            Err(GenError::SectionsBusy(_)) => {
                return Err(RuntimeError::RetriesExhausted { coord, attempts });
            }
            Err(e) => return Err(e.into()),
        };
        return Ok(GeneratedChunk {
            coord,
            buf: column.snapshot(),
            fluid_ticks: column.fluid_ticks(),
            terrain_metrics: column.metrics(),
            fresh,
        });
    }
}

/// Sums the metrics of chunks generated by this request.
pub fn summarize(chunks: &[GeneratedChunk]) -> TerrainMetrics {
    let mut total = TerrainMetrics::default();
    for chunk in chunks.iter().filter(|c| c.fresh) {
        total.merge(&chunk.terrain_metrics);
    }
    total
}

/// Chunk coordinates of the square of side `2 * radius + 1` around `center`, row by row.
pub fn square_region(center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
    let mut out = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            out.push(center.offset(dx, dz));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_world::WorldGenParams;

    #[test]
    fn square_region_is_row_major() {
        let r = square_region(ChunkCoord::new(10, -4), 1);
        assert_eq!(r.len(), 9);
        assert_eq!(r[0], ChunkCoord::new(9, -5));
        assert_eq!(r[1], ChunkCoord::new(10, -5));
        assert_eq!(r[8], ChunkCoord::new(11, -3));
    }

    #[test]
    fn held_lease_exhausts_retries() {
        let generator = Arc::new(TerrainGenerator::new(3, WorldGenParams::default()));
        let column = ChunkColumn::new(ChunkCoord::new(0, 0), generator.shape());
        let _lease = column.try_lock_sections().unwrap();
        let err = generate_with_retry(&generator, &column, &CancelToken::new(), 2).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::RetriesExhausted { attempts: 3, .. }
        ));
    }
}
