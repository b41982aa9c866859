use proptest::prelude::*;
use strata_world::density::{ColumnSource, LatticeInterpolator};
use strata_world::noise::{CoherentNoiseField, NoiseKey, OctaveRange};

struct FieldSource {
    field: CoherentNoiseField,
}

impl ColumnSource for FieldSource {
    fn sample_column(&mut self, cell_x: i32, cell_z: i32, out: &mut [f64]) {
        for (k, v) in out.iter_mut().enumerate() {
            *v = self.field.sample(f64::from(cell_x) * 4.0, k as f64 * 8.0, f64::from(cell_z) * 4.0);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // every corner reached with zero fractions reproduces the raw sample exactly
    #[test]
    fn corners_are_exact(
        seed in any::<u64>(),
        first_x in -10_000i32..10_000,
        first_z in -10_000i32..10_000,
        x_index in 0usize..4,
        y_level in 0usize..6,
        z_index in 0usize..4,
    ) {
        let field = CoherentNoiseField::new(seed, NoiseKey::Shape, &OctaveRange::new(-5, &[1.0, 1.0]));
        let mut src = FieldSource { field };
        let mut li = LatticeInterpolator::new(4, 6, first_x, first_z);
        li.prime_columns(&mut src);
        for step in 0..=x_index {
            if step > 0 {
                li.rotate_buffers();
            }
            li.advance_column(&mut src, step);
        }
        li.select_corners(y_level, z_index);

        let mut raw = vec![0.0; 7];
        src.sample_column(first_x + x_index as i32, first_z + z_index as i32, &mut raw);
        li.apply_y(0.0);
        li.apply_x(0.0);
        prop_assert_eq!(li.evaluate(0.0).to_bits(), raw[y_level].to_bits());

        src.sample_column(first_x + x_index as i32 + 1, first_z + z_index as i32 + 1, &mut raw);
        li.apply_y(1.0);
        li.apply_x(1.0);
        let far = li.evaluate(1.0);
        prop_assert!((far - raw[y_level + 1]).abs() <= 1e-12);
    }

    // interior values never leave the hull of the 8 corners
    #[test]
    fn interior_stays_within_corners(seed in any::<u64>(), ty in 0.0f64..1.0, tx in 0.0f64..1.0, tz in 0.0f64..1.0) {
        let field = CoherentNoiseField::new(seed, NoiseKey::Shape, &OctaveRange::new(-4, &[1.0]));
        let mut src = FieldSource { field };
        let mut li = LatticeInterpolator::new(1, 1, 0, 0);
        li.prime_columns(&mut src);
        li.advance_column(&mut src, 0);
        li.select_corners(0, 0);
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (cx, cz) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            let mut col = vec![0.0; 2];
            src.sample_column(cx, cz, &mut col);
            for v in col {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        li.apply_y(ty);
        li.apply_x(tx);
        let v = li.evaluate(tz);
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }
}
