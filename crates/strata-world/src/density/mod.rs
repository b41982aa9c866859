//! Sparse density evaluation on the coarse lattice and its dense interpolation.
//!
//! Noise is only ever evaluated at coarse cell corners. Everything in between is
//! reconstructed by [`LatticeInterpolator`], which is driven through the same
//! sweep by the density sampler and by every modulator field.

mod column;
mod interpolator;

pub use column::{ColumnDensitySampler, ShapeNoises};
pub use interpolator::LatticeInterpolator;

use crate::config::ShapeConfig;
use crate::noise::CoherentNoiseField;

/// Produces corner values for one coarse column.
pub trait ColumnSource {
    /// Fills `out[k]` with the value at coarse level `k`, counted up from the world floor.
    fn sample_column(&mut self, cell_x: i32, cell_z: i32, out: &mut [f64]);
}

/// The lattice sweep protocol shared by the density lattice and modulator fields.
pub trait LatticeDriven {
    fn prime(&mut self);
    fn advance(&mut self, x_index: usize);
    fn select(&mut self, y_level: usize, z_index: usize);
    fn apply_y(&mut self, t: f64);
    fn apply_x(&mut self, t: f64);
    fn apply_z(&mut self, t: f64);
    fn rotate(&mut self);
}

/// An interpolator bound to the source that feeds its corner planes.
pub struct Lattice<S> {
    interp: LatticeInterpolator,
    source: S,
    value: f64,
}

impl<S: ColumnSource> Lattice<S> {
    pub fn new(interp: LatticeInterpolator, source: S) -> Self {
        Self {
            interp,
            source,
            value: 0.0,
        }
    }

    /// Value at the block last reached by [`LatticeDriven::apply_z`].
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ColumnSource> LatticeDriven for Lattice<S> {
    fn prime(&mut self) {
        self.interp.prime_columns(&mut self.source);
    }

    fn advance(&mut self, x_index: usize) {
        self.interp.advance_column(&mut self.source, x_index);
    }

    #[inline]
    fn select(&mut self, y_level: usize, z_index: usize) {
        self.interp.select_corners(y_level, z_index);
    }

    #[inline]
    fn apply_y(&mut self, t: f64) {
        self.interp.apply_y(t);
    }

    #[inline]
    fn apply_x(&mut self, t: f64) {
        self.interp.apply_x(t);
    }

    #[inline]
    fn apply_z(&mut self, t: f64) {
        self.value = self.interp.evaluate(t);
    }

    fn rotate(&mut self) {
        self.interp.rotate_buffers();
    }
}

/// Samples a noise field at coarse corner block positions.
pub struct FieldColumns<'g> {
    field: &'g CoherentNoiseField,
    horizontal_resolution: i32,
    vertical_resolution: i32,
    min_y: i32,
    xz_scale: f64,
    y_scale: f64,
}

impl<'g> FieldColumns<'g> {
    pub fn new(field: &'g CoherentNoiseField, shape: &ShapeConfig, xz_scale: f64, y_scale: f64) -> Self {
        Self {
            field,
            horizontal_resolution: shape.horizontal_resolution,
            vertical_resolution: shape.vertical_resolution,
            min_y: shape.min_y,
            xz_scale,
            y_scale,
        }
    }
}

impl ColumnSource for FieldColumns<'_> {
    fn sample_column(&mut self, cell_x: i32, cell_z: i32, out: &mut [f64]) {
        let x = f64::from(cell_x * self.horizontal_resolution) * self.xz_scale;
        let z = f64::from(cell_z * self.horizontal_resolution) * self.xz_scale;
        for (k, slot) in out.iter_mut().enumerate() {
            let y = self.min_y + k as i32 * self.vertical_resolution;
            *slot = self.field.sample(x, f64::from(y) * self.y_scale, z);
        }
    }
}

/// Builds a field lattice covering `cells_xz` cells from the given first cell.
pub fn field_lattice<'g>(
    field: &'g CoherentNoiseField,
    shape: &ShapeConfig,
    xz_scale: f64,
    y_scale: f64,
    cells_xz: usize,
    first_cell_x: i32,
    first_cell_z: i32,
) -> Lattice<FieldColumns<'g>> {
    Lattice::new(
        LatticeInterpolator::new(cells_xz, shape.cell_count_y(), first_cell_x, first_cell_z),
        FieldColumns::new(field, shape, xz_scale, y_scale),
    )
}
