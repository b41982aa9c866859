//! Independent density modulators layered on top of the raw lattice density.

mod hollowing;
mod vein;
mod worm;

pub use hollowing::StructureHollowingModulator;
pub use vein::{MineralVeinModulator, VeinFields, VeinRock};
pub use worm::{WormFields, WormTunnelModulator};

pub trait DensityModulator {
    fn adjust(&mut self, density: f64, x: i32, y: i32, z: i32) -> f64;
}
