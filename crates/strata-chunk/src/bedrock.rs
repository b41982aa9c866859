use std::time::Instant;

use rand::Rng;
use strata_blocks::Material;
use strata_world::random::{column_rng, derive_seed};
use strata_world::{CHUNK_WIDTH, TerrainGenerator, TerrainStage};

use crate::error::GenError;
use crate::proto::{GenerationStage, ProtoChunk};

const FLOOR_SALT: u64 = 0x4245_4452_4f43_0001;
const ROOF_SALT: u64 = 0x4245_4452_4f43_0002;
const MAX_THICKNESS: i32 = 4;

/// Per-column bedrock thickness in `0..=4`, keyed by seed, salt and column.
fn thickness(seed: u64, salt: u64, x: i32, z: i32) -> i32 {
    column_rng(derive_seed(seed, salt), x, z).gen_range(0..=MAX_THICKNESS)
}

/// Bedrock floor and optional roof: a contiguous run of zero to four layers per column.
pub fn build_bedrock(generator: &TerrainGenerator, proto: &mut ProtoChunk) -> Result<(), GenError> {
    proto.expect_stage(GenerationStage::SurfaceBuilt)?;
    let started = Instant::now();
    let params = generator.params();
    let seed = generator.seed();
    let coord = proto.coord();
    let (min_y, max_y) = (proto.min_y(), proto.max_y());
    let cap = max_y - min_y;

    for lz in 0..CHUNK_WIDTH {
        for lx in 0..CHUNK_WIDTH {
            let x = coord.min_block_x() + lx as i32;
            let z = coord.min_block_z() + lz as i32;
            if params.bedrock_floor {
                for i in 0..thickness(seed, FLOOR_SALT, x, z).min(cap) {
                    proto.set(lx, min_y + i, lz, Material::Bedrock);
                }
            }
            if params.bedrock_roof {
                for i in 0..thickness(seed, ROOF_SALT, x, z).min(cap) {
                    proto.set(lx, max_y - 1 - i, lz, Material::Bedrock);
                }
            }
        }
    }

    proto.metrics_mut().stage_micros[TerrainStage::Bedrock.index()] +=
        started.elapsed().as_micros() as u64;
    proto.advance_stage(GenerationStage::BedrockBuilt)
}
