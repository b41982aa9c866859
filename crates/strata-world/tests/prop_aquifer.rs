use proptest::prelude::*;
use strata_blocks::Material;
use strata_world::aquifer::{AquiferFields, AquiferResolver};
use strata_world::{UniformRock, WorldGenParams};

fn resolver_setup(seed: u64, aquifers: bool) -> (AquiferFields, strata_world::ShapeConfig) {
    let mut shape = WorldGenParams::default().shape;
    shape.aquifers_enabled = aquifers;
    (AquiferFields::new(seed), shape)
}

proptest! {
    // positive weight always yields the rock source's material and clears the tick flag
    #[test]
    fn positive_weight_is_rock(
        seed in any::<u64>(),
        aquifers in any::<bool>(),
        x in -100_000i32..100_000,
        y in -64i32..320,
        z in -100_000i32..100_000,
        weight in 1e-9f64..64.0,
    ) {
        let (fields, shape) = resolver_setup(seed, aquifers);
        let mut a = AquiferResolver::for_shape(&shape, &fields);
        let rock = UniformRock(Material::Deepslate);
        prop_assert_eq!(a.apply(&rock, x, y, z, weight), Material::Deepslate);
        prop_assert!(!a.needs_fluid_tick());
    }

    // the bottom ten layers with non-positive weight are lava for every seed
    #[test]
    fn bottom_layers_are_lava(
        seed in any::<u64>(),
        aquifers in any::<bool>(),
        x in -100_000i32..100_000,
        dy in 0i32..=9,
        z in -100_000i32..100_000,
        weight in -64.0f64..=0.0,
    ) {
        let (fields, shape) = resolver_setup(seed, aquifers);
        let mut a = AquiferResolver::for_shape(&shape, &fields);
        let rock = UniformRock(Material::Stone);
        prop_assert_eq!(a.apply(&rock, x, shape.min_y + dy, z, weight), Material::Lava);
        prop_assert!(!a.needs_fluid_tick());
    }

    // a fresh resolver and a warmed-up one agree; memoization never changes results
    #[test]
    fn cache_does_not_change_results(seed in any::<u64>(), x in -2_000i32..2_000, z in -2_000i32..2_000) {
        let (fields, shape) = resolver_setup(seed, true);
        let rock = UniformRock(Material::Stone);
        let mut warm = AquiferResolver::for_shape(&shape, &fields);
        for y in (-50..60).step_by(3) {
            warm.apply(&rock, x + 7, y, z - 3, -0.3);
        }
        for y in (-50..60).step_by(5) {
            let mut fresh = AquiferResolver::for_shape(&shape, &fields);
            prop_assert_eq!(warm.apply(&rock, x, y, z, -0.1), fresh.apply(&rock, x, y, z, -0.1));
            prop_assert_eq!(warm.needs_fluid_tick(), fresh.needs_fluid_tick());
        }
    }
}
