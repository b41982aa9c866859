use std::sync::Arc;

use strata_chunk::{CancelToken, GenError};
use strata_runtime::{GenerationRuntime, RuntimeConfig, RuntimeError, square_region, summarize};
use strata_world::{ChunkCoord, TerrainGenerator, WorldGenParams};

fn runtime(seed: u64, workers: usize) -> GenerationRuntime {
    let generator = Arc::new(TerrainGenerator::new(seed, WorldGenParams::default()));
    GenerationRuntime::new(generator, RuntimeConfig {
        workers,
        max_retries: 1000,
    })
    .unwrap()
}

#[test]
fn worker_count_does_not_change_output() {
    let coords = square_region(ChunkCoord::new(0, 0), 1);
    let one = runtime(2024, 1)
        .generate_region(&coords, &CancelToken::new())
        .unwrap();
    let eight = runtime(2024, 8)
        .generate_region(&coords, &CancelToken::new())
        .unwrap();
    assert_eq!(one.len(), coords.len());
    for ((a, b), coord) in one.iter().zip(&eight).zip(&coords) {
        assert_eq!(a.coord, *coord);
        assert_eq!(b.coord, *coord);
        assert_eq!(a.buf.to_bytes(), b.buf.to_bytes());
        assert_eq!(a.fluid_ticks, b.fluid_ticks);
    }
}

#[test]
fn duplicate_requests_generate_once() {
    let rt = runtime(7, 4);
    let c = ChunkCoord::new(5, 5);
    let out = rt
        .generate_region(&[c, c, c, c], &CancelToken::new())
        .unwrap();
    assert_eq!(out.iter().filter(|g| g.fresh).count(), 1);
    assert!(out.windows(2).all(|w| w[0].buf == w[1].buf));
    assert_eq!(rt.store().len(), 1);
    assert!(summarize(&out).blocks_written > 0);
}

#[test]
fn cancelled_region_reports_cancellation() {
    let rt = runtime(7, 2);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = rt
        .generate_region(&[ChunkCoord::new(0, 0)], &cancel)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Gen(GenError::Cancelled(_))));
    let column = rt.store().get(ChunkCoord::new(0, 0)).unwrap();
    assert!(column.snapshot().is_all_air());
}
