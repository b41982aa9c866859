//! Side-effect-free single-column queries against the noise stage.

use strata_blocks::Material;
use strata_world::random::floor_div;
use strata_world::{ShapeConfig, TerrainGenerator};

use crate::error::GenError;
use crate::heightmap::HeightmapKind;

/// Vertical window a query is answered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightLimits {
    pub min_y: i32,
    pub height: i32,
}

impl HeightLimits {
    pub fn of(shape: &ShapeConfig) -> Self {
        Self {
            min_y: shape.min_y,
            height: shape.height,
        }
    }

    /// One past the highest Y; saturates instead of overflowing.
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.min_y.saturating_add(self.height)
    }

    fn check(&self, shape: &ShapeConfig) -> Result<(), GenError> {
        let top = self.min_y.checked_add(self.height);
        match top {
            Some(top) if self.height >= 0 && self.min_y >= shape.min_y && top <= shape.max_y() => {
                Ok(())
            }
            _ => Err(GenError::OutOfBounds {
                min_y: self.min_y,
                max_y: self.max_y(),
                world_min_y: shape.min_y,
                world_max_y: shape.max_y(),
            }),
        }
    }
}

/// Noise-stage materials of block column (`x`, `z`), indexed from `limits.min_y`.
///
/// Runs the lattice over the single coarse cell containing the column, so every
/// value matches what a full chunk fill writes before surface and bedrock passes.
pub fn column_sample(
    generator: &TerrainGenerator,
    x: i32,
    z: i32,
    limits: HeightLimits,
) -> Result<Vec<Material>, GenError> {
    let shape = generator.shape();
    limits.check(shape)?;
    let mut out = vec![Material::Air; limits.height as usize];
    if limits.height == 0 {
        return Ok(out);
    }

    let mut ctx = generator.make_column_ctx(x, z);
    let h = ctx.horizontal_resolution();
    let v = ctx.vertical_resolution();
    let (hf, vf) = (f64::from(h), f64::from(v));
    let (ox, oz) = ctx.origin();
    let (dx, dz) = (x - ox, z - oz);
    let first_cell = floor_div(limits.min_y - shape.min_y, v) as usize;
    let last_cell = floor_div(limits.max_y() - 1 - shape.min_y, v) as usize;

    ctx.prime();
    ctx.advance(0);
    for cell_y in (first_cell..=last_cell).rev() {
        ctx.select(cell_y, 0);
        for dy in (0..v).rev() {
            let y = shape.min_y + cell_y as i32 * v + dy;
            if y < limits.min_y || y >= limits.max_y() {
                continue;
            }
            ctx.apply_y(f64::from(dy) / vf);
            ctx.apply_x(f64::from(dx) / hf);
            ctx.apply_z(f64::from(dz) / hf);
            out[(y - limits.min_y) as usize] = ctx.resolve(x, y, z);
        }
    }
    Ok(out)
}

/// Highest Y in `limits` whose noise-stage block counts for `kind`, or `limits.min_y - 1`.
pub fn height_at(
    generator: &TerrainGenerator,
    x: i32,
    z: i32,
    kind: HeightmapKind,
    limits: HeightLimits,
) -> Result<i32, GenError> {
    let column = column_sample(generator, x, z, limits)?;
    Ok(column
        .iter()
        .rposition(|&m| kind.counts(m))
        .map_or(limits.min_y - 1, |i| limits.min_y + i as i32))
}
