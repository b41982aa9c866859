use std::time::Instant;

use rand::Rng;
use strata_world::random::{column_rng, derive_seed, floor_div};
use strata_world::{CHUNK_WIDTH, SurfaceContext, SurfaceLayers, TerrainGenerator, TerrainStage};

use crate::error::GenError;
use crate::proto::{GenerationStage, ProtoChunk};

const SURFACE_SALT: u64 = 0x5355_5246_4143_0002;
const BARE_ROCK: &str = "bare_rock";

/// Replaces the top of every solid run with the biome's surface materials.
///
/// Only base rock is replaced, so the pass never opens terrain and never touches
/// fluids, veins or air.
pub fn build_surface(generator: &TerrainGenerator, proto: &mut ProtoChunk) -> Result<(), GenError> {
    proto.expect_stage(GenerationStage::NoiseFilled)?;
    let started = Instant::now();
    let params = generator.params();
    let shape = generator.shape();
    let seed = derive_seed(generator.seed(), SURFACE_SALT);
    let coord = proto.coord();
    let (min_y, max_y) = (proto.min_y(), proto.max_y());

    for lz in 0..CHUNK_WIDTH {
        for lx in 0..CHUNK_WIDTH {
            let x = coord.min_block_x() + lx as i32;
            let z = coord.min_block_z() + lz as i32;
            let noise = generator.surface_noise().sample_2d(f64::from(x), f64::from(z));
            let mut rng = column_rng(seed, x, z);
            let depth =
                (params.depth_base + noise * params.depth_noise + rng.r#gen::<f64>() * 0.25) as i32;

            let mut run = -1;
            let mut wet = false;
            let mut layers: Option<SurfaceLayers> = None;
            for y in (min_y..max_y).rev() {
                let m = proto.get(lx, y, lz);
                if m.is_air() {
                    run = -1;
                    wet = false;
                    continue;
                }
                if m.is_fluid() {
                    run = -1;
                    wet = true;
                    continue;
                }
                if run == -1 {
                    run = depth.max(0);
                    layers = None;
                    if !m.is_base_rock() || depth <= 0 {
                        continue;
                    }
                    let coarse_y = floor_div(y - shape.min_y, shape.vertical_resolution);
                    let biome = generator.biomes().biome_at(x, coarse_y, z);
                    if biome.has_feature(BARE_ROCK) {
                        continue;
                    }
                    let l = biome.dress_surface(&SurfaceContext {
                        x,
                        z,
                        surface_y: y,
                        sea_level: shape.sea_level,
                    });
                    proto.set(lx, y, lz, if wet { l.underwater_top } else { l.top });
                    layers = Some(l);
                } else if run > 0 {
                    run -= 1;
                    if let Some(l) = layers.filter(|_| m.is_base_rock()) {
                        proto.set(lx, y, lz, if wet { l.underwater_top } else { l.under });
                    }
                }
            }
        }
    }

    proto.metrics_mut().stage_micros[TerrainStage::Surface.index()] +=
        started.elapsed().as_micros() as u64;
    proto.advance_stage(GenerationStage::SurfaceBuilt)
}
