use super::DensityModulator;
use crate::structure::StructureIndex;

/// Adds the structure index weight so structure interiors are not refilled.
pub struct StructureHollowingModulator<'g> {
    index: &'g dyn StructureIndex,
    active: bool,
}

impl<'g> StructureHollowingModulator<'g> {
    /// Culls the index once for the block columns `[min_x, max_x] x [min_z, max_z]`.
    pub fn new(index: &'g dyn StructureIndex, min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> Self {
        Self {
            index,
            active: index.touches(min_x, min_z, max_x, max_z),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl DensityModulator for StructureHollowingModulator<'_> {
    #[inline]
    fn adjust(&mut self, density: f64, x: i32, y: i32, z: i32) -> f64 {
        if self.active {
            density + self.index.structure_weight_at(x, y, z)
        } else {
            density
        }
    }
}
