use proptest::prelude::*;
use strata_world::{TerrainGenerator, WorldGenParams};

fn column_densities(params: WorldGenParams, seed: u64, x: i32, z: i32) -> Vec<f64> {
    let generator = TerrainGenerator::new(seed, params);
    let mut ctx = generator.make_column_ctx(x, z);
    let h = ctx.horizontal_resolution();
    let v = ctx.vertical_resolution();
    let (ox, oz) = ctx.origin();
    let (lx, lz) = (x - ox, z - oz);
    let min_y = generator.shape().min_y;
    let mut out = Vec::new();
    ctx.prime();
    ctx.advance(0);
    for level in 0..ctx.cells_y() {
        ctx.select(level, 0);
        for ly in 0..v {
            ctx.apply_y(f64::from(ly) / f64::from(v));
            ctx.apply_x(f64::from(lx) / f64::from(h));
            ctx.apply_z(f64::from(lz) / f64::from(h));
            let y = min_y + level as i32 * v + ly;
            out.push(ctx.density(x, y, z));
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // ore veins pick materials only; they never move the density
    #[test]
    fn veins_do_not_touch_density(seed in any::<u64>(), x in -5_000i32..5_000, z in -5_000i32..5_000) {
        let mut on = WorldGenParams::default();
        on.shape.noodle_caves_enabled = false;
        let mut off = on.clone();
        off.shape.ore_veins_enabled = false;
        prop_assert_eq!(column_densities(on, seed, x, z), column_densities(off, seed, x, z));
    }

    // tunnels only ever open terrain, and only inside their band
    #[test]
    fn tunnels_only_carve(seed in any::<u64>(), x in -5_000i32..5_000, z in -5_000i32..5_000) {
        let with = WorldGenParams::default();
        let mut without = with.clone();
        without.shape.noodle_caves_enabled = false;
        let min_y = with.shape.min_y;
        let a = column_densities(with, seed, x, z);
        let b = column_densities(without, seed, x, z);
        for (i, (da, db)) in a.iter().zip(&b).enumerate() {
            let y = min_y + i as i32;
            prop_assert!(da <= db);
            if y < min_y + 4 || y > 30 {
                prop_assert_eq!(da.to_bits(), db.to_bits());
            }
        }
    }
}
