use strata_blocks::Material;
use strata_world::{CHUNK_WIDTH, ChunkCoord, ShapeConfig, TerrainMetrics};

use crate::buf::{ChunkBuf, ChunkOccupancy};
use crate::error::GenError;
use crate::heightmap::Heightmaps;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenerationStage {
    #[default]
    NotStarted,
    NoiseFilled,
    SurfaceBuilt,
    BedrockBuilt,
    Done,
}

impl GenerationStage {
    pub const fn next(self) -> Option<GenerationStage> {
        match self {
            GenerationStage::NotStarted => Some(GenerationStage::NoiseFilled),
            GenerationStage::NoiseFilled => Some(GenerationStage::SurfaceBuilt),
            GenerationStage::SurfaceBuilt => Some(GenerationStage::BedrockBuilt),
            GenerationStage::BedrockBuilt => Some(GenerationStage::Done),
            GenerationStage::Done => None,
        }
    }

    /// Moves to `wanted`, which must be the immediate successor.
    pub fn advance(&mut self, wanted: GenerationStage) -> Result<(), GenError> {
        if self.next() != Some(wanted) {
            return Err(GenError::StageOrder {
                found: *self,
                wanted,
            });
        }
        *self = wanted;
        Ok(())
    }
}

/// A fluid block that must be ticked once the chunk is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FluidTick {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub fluid: Material,
    pub delay: u32,
}

/// Scratch chunk owned by one fill; published only once every stage succeeded.
#[derive(Clone, Debug)]
pub struct ProtoChunk {
    buf: ChunkBuf,
    heightmaps: Heightmaps,
    fluid_ticks: Vec<FluidTick>,
    stage: GenerationStage,
    metrics: TerrainMetrics,
}

impl ProtoChunk {
    pub fn new(coord: ChunkCoord, shape: &ShapeConfig) -> Self {
        Self {
            buf: ChunkBuf::new_air(coord, shape.min_y, shape.height as usize),
            heightmaps: Heightmaps::new(shape.min_y),
            fluid_ticks: Vec::new(),
            stage: GenerationStage::NotStarted,
            metrics: TerrainMetrics::default(),
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.buf.coord
    }

    #[inline]
    pub fn min_y(&self) -> i32 {
        self.buf.min_y
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.buf.max_y()
    }

    #[inline]
    pub fn stage(&self) -> GenerationStage {
        self.stage
    }

    pub fn advance_stage(&mut self, wanted: GenerationStage) -> Result<(), GenError> {
        self.stage.advance(wanted)
    }

    pub(crate) fn expect_stage(&self, stage: GenerationStage) -> Result<(), GenError> {
        let wanted = stage.next().unwrap_or(GenerationStage::Done);
        if self.stage == stage && stage != GenerationStage::Done {
            Ok(())
        } else {
            Err(GenError::StageOrder {
                found: self.stage,
                wanted,
            })
        }
    }

    #[inline]
    pub fn get(&self, lx: usize, y: i32, lz: usize) -> Material {
        self.buf.get_local(lx, (y - self.buf.min_y) as usize, lz)
    }

    /// Writes a block in chunk-local x/z and world y, keeping the heightmaps current.
    #[inline]
    pub fn set(&mut self, lx: usize, y: i32, lz: usize, m: Material) {
        self.buf.set_local(lx, (y - self.buf.min_y) as usize, lz, m);
        self.heightmaps.note(lx, y, lz, m);
    }

    pub fn schedule_fluid_tick(&mut self, x: i32, y: i32, z: i32, fluid: Material) {
        self.fluid_ticks.push(FluidTick {
            x,
            y,
            z,
            fluid,
            delay: 0,
        });
    }

    pub fn buf(&self) -> &ChunkBuf {
        &self.buf
    }

    pub fn heightmaps(&self) -> &Heightmaps {
        &self.heightmaps
    }

    pub fn fluid_ticks(&self) -> &[FluidTick] {
        &self.fluid_ticks
    }

    pub fn metrics(&self) -> &TerrainMetrics {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut TerrainMetrics {
        &mut self.metrics
    }

    pub fn into_result(self) -> ChunkGenerateResult {
        ChunkGenerateResult {
            occupancy: ChunkOccupancy::of(&self.buf),
            buf: self.buf,
            heightmaps: self.heightmaps,
            fluid_ticks: self.fluid_ticks,
            stage: self.stage,
            terrain_metrics: self.metrics,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChunkGenerateResult {
    pub buf: ChunkBuf,
    pub heightmaps: Heightmaps,
    pub fluid_ticks: Vec<FluidTick>,
    pub stage: GenerationStage,
    pub occupancy: ChunkOccupancy,
    pub terrain_metrics: TerrainMetrics,
}

/// Blocks per horizontal layer of a chunk.
pub(crate) const LAYER: usize = CHUNK_WIDTH * CHUNK_WIDTH;
