//! Noise fields, density sampling, modulators and aquifers for terrain generation.
#![forbid(unsafe_code)]

pub mod aquifer;
pub mod biome;
mod chunk_coord;
pub mod config;
pub mod density;
mod gen_ctx;
mod generator;
pub mod modulators;
pub mod noise;
pub mod random;
pub mod rock;
pub mod structure;

pub use aquifer::{AquiferResolver, FluidControlPoint, FluidLevel};
pub use biome::{
    Biome, BiomeSource, ConfiguredBiome, ConfiguredBiomes, ShapeOverrides, SurfaceContext,
    SurfaceLayers,
};
pub use chunk_coord::ChunkCoord;
pub use config::{ConfigError, ShapeConfig, WorldGenConfig, WorldGenParams, load_params_from_path};
pub use gen_ctx::{
    GenCtx, TERRAIN_STAGE_COUNT, TERRAIN_STAGE_LABELS, TerrainMetrics, TerrainProfiler, TerrainStage,
};
pub use generator::TerrainGenerator;
pub use rock::{LayeredRock, RockSource, UniformRock};
pub use structure::{NoStructures, PieceBox, PieceIndex, StructureIndex};

/// Horizontal extent of a chunk column in blocks.
pub const CHUNK_WIDTH: usize = 16;
