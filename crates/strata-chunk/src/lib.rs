//! Chunk storage and the per-chunk terrain pipeline.
#![forbid(unsafe_code)]

mod bedrock;
mod buf;
mod column;
mod error;
mod fill;
mod heightmap;
mod proto;
mod query;
mod surface;

pub use bedrock::build_bedrock;
pub use buf::{ChunkBuf, ChunkOccupancy};
pub use column::{CancelToken, ChunkColumn, SectionLease};
pub use error::GenError;
pub use fill::fill_noise;
pub use heightmap::{Heightmap, HeightmapKind, Heightmaps};
pub use proto::{ChunkGenerateResult, FluidTick, GenerationStage, ProtoChunk};
pub use query::{HeightLimits, column_sample, height_at};
pub use surface::build_surface;

use strata_world::{ChunkCoord, TerrainGenerator};

/// Runs every stage for `coord` into a fresh scratch chunk.
pub fn generate_chunk(
    generator: &TerrainGenerator,
    coord: ChunkCoord,
    cancel: &CancelToken,
) -> Result<ChunkGenerateResult, GenError> {
    let mut proto = ProtoChunk::new(coord, generator.shape());
    run_pipeline(generator, &mut proto, cancel)?;
    Ok(proto.into_result())
}

pub(crate) fn run_pipeline(
    generator: &TerrainGenerator,
    proto: &mut ProtoChunk,
    cancel: &CancelToken,
) -> Result<(), GenError> {
    fill_noise(generator, proto, cancel)?;
    build_surface(generator, proto)?;
    build_bedrock(generator, proto)?;
    proto.advance_stage(GenerationStage::Done)?;
    log::debug!(
        "chunk {:?} done in {}us ({} blocks, {} fluid ticks)",
        proto.coord(),
        proto.metrics().total_micros(),
        proto.metrics().blocks_written,
        proto.fluid_ticks().len()
    );
    Ok(())
}
