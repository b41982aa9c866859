use strata_world::ChunkCoord;
use thiserror::Error;

use crate::proto::GenerationStage;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenError {
    #[error("sections of chunk {0:?} are held by another task")]
    SectionsBusy(ChunkCoord),
    #[error("generation of chunk {0:?} was cancelled")]
    Cancelled(ChunkCoord),
    #[error("stage {found:?} cannot advance to {wanted:?}")]
    StageOrder {
        found: GenerationStage,
        wanted: GenerationStage,
    },
    #[error("y range [{min_y}, {max_y}) lies outside the world [{world_min_y}, {world_max_y})")]
    OutOfBounds {
        min_y: i32,
        max_y: i32,
        world_min_y: i32,
        world_max_y: i32,
    },
}
