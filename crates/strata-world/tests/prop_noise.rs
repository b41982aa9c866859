use proptest::prelude::*;
use strata_world::noise::{CoherentNoiseField, NoiseKey, OctaveRange};

fn coord() -> impl Strategy<Value = f64> {
    -3.0e7f64..3.0e7
}

proptest! {
    // same seed, octave range and position give bit-identical samples
    #[test]
    fn sampling_is_deterministic(seed in any::<u64>(), x in coord(), y in -512.0f64..512.0, z in coord()) {
        let range = OctaveRange::new(-6, &[1.0, 0.5, 0.25]);
        let a = CoherentNoiseField::new(seed, NoiseKey::Shape, &range);
        let b = CoherentNoiseField::new(seed, NoiseKey::Shape, &range);
        prop_assert_eq!(a.sample(x, y, z).to_bits(), b.sample(x, y, z).to_bits());
    }

    // samples stay finite and inside the declared bound
    #[test]
    fn samples_are_bounded(seed in any::<u64>(), x in coord(), y in -512.0f64..512.0, z in coord()) {
        let range = OctaveRange::new(-7, &[1.0, 1.0, 1.0, 1.0]);
        let f = CoherentNoiseField::new(seed, NoiseKey::ShapeDetail, &range);
        let v = f.sample(x, y, z);
        prop_assert!(v.is_finite());
        prop_assert!(v.abs() <= f.max_value() * 1.5 + 1e-9);
    }
}
