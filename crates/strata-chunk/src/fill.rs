use strata_world::{TerrainGenerator, TerrainStage};

use crate::column::CancelToken;
use crate::error::GenError;
use crate::proto::{GenerationStage, ProtoChunk};

/// Noise stage: sweeps the coarse lattice and resolves every block of the chunk.
///
/// Coarse X advances outermost so each step reuses the previous corner plane; the
/// cancel token is polled once per step and an abandoned fill leaves the scratch
/// chunk unpublished.
pub fn fill_noise(
    generator: &TerrainGenerator,
    proto: &mut ProtoChunk,
    cancel: &CancelToken,
) -> Result<(), GenError> {
    proto.expect_stage(GenerationStage::NotStarted)?;
    let coord = proto.coord();
    let mut ctx = generator.make_gen_ctx(coord);
    ctx.profiler_mut().begin_stage(TerrainStage::Noise);

    let cells_xz = ctx.cells_xz();
    let cells_y = ctx.cells_y();
    let h = ctx.horizontal_resolution();
    let v = ctx.vertical_resolution();
    let (hf, vf) = (f64::from(h), f64::from(v));
    let min_y = proto.min_y();
    let (base_x, base_z) = (coord.min_block_x(), coord.min_block_z());
    let mut written = 0u64;

    ctx.prime();
    for cell_x in 0..cells_xz {
        if cancel.is_cancelled() {
            log::debug!("chunk {coord:?} cancelled at coarse x {cell_x}");
            return Err(GenError::Cancelled(coord));
        }
        ctx.advance(cell_x);
        for cell_z in 0..cells_xz {
            for cell_y in (0..cells_y).rev() {
                ctx.select(cell_y, cell_z);
                for dy in (0..v).rev() {
                    let y = min_y + cell_y as i32 * v + dy;
                    ctx.apply_y(f64::from(dy) / vf);
                    for dx in 0..h {
                        let lx = cell_x as i32 * h + dx;
                        ctx.apply_x(f64::from(dx) / hf);
                        for dz in 0..h {
                            let lz = cell_z as i32 * h + dz;
                            ctx.apply_z(f64::from(dz) / hf);
                            let (x, z) = (base_x + lx, base_z + lz);
                            let m = ctx.resolve(x, y, z);
                            if !m.is_air() {
                                proto.set(lx as usize, y, lz as usize, m);
                                written += 1;
                            }
                            if ctx.needs_fluid_tick() {
                                proto.schedule_fluid_tick(x, y, z, m);
                                ctx.profiler_mut().record_fluid_tick();
                            }
                        }
                    }
                }
            }
        }
        ctx.rotate();
    }

    ctx.profiler_mut().record_blocks(written);
    let metrics = ctx.finish();
    if metrics.non_finite > 0 {
        log::warn!(
            "chunk {coord:?}: {} non-finite densities replaced",
            metrics.non_finite
        );
    }
    proto.metrics_mut().merge(&metrics);
    proto.advance_stage(GenerationStage::NoiseFilled)
}
