use std::mem;

use super::ColumnSource;
use crate::noise::lerp;

/// Trilinear reconstruction over a sweep of coarse cells along X.
///
/// Two corner planes are held at a time: `start` at the current coarse X and `end`
/// one cell further. Each plane stores `cells_xz + 1` columns of `cells_y + 1`
/// levels. After a coarse-X step the planes are swapped so `end` becomes the next
/// `start` without resampling.
pub struct LatticeInterpolator {
    cells_xz: usize,
    cells_y: usize,
    first_cell_x: i32,
    first_cell_z: i32,
    start: Vec<f64>,
    end: Vec<f64>,
    corners: [f64; 8],
    after_y: [f64; 4],
    after_x: [f64; 2],
}

impl LatticeInterpolator {
    pub fn new(cells_xz: usize, cells_y: usize, first_cell_x: i32, first_cell_z: i32) -> Self {
        let plane = (cells_xz + 1) * (cells_y + 1);
        Self {
            cells_xz,
            cells_y,
            first_cell_x,
            first_cell_z,
            start: vec![0.0; plane],
            end: vec![0.0; plane],
            corners: [0.0; 8],
            after_y: [0.0; 4],
            after_x: [0.0; 2],
        }
    }

    #[inline]
    pub fn cells_xz(&self) -> usize {
        self.cells_xz
    }

    #[inline]
    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    #[inline]
    fn index(&self, z: usize, y: usize) -> usize {
        z * (self.cells_y + 1) + y
    }

    fn fill_plane<S: ColumnSource + ?Sized>(
        plane: &mut [f64],
        source: &mut S,
        cells_y: usize,
        cell_x: i32,
        first_cell_z: i32,
    ) {
        for (z, column) in plane.chunks_exact_mut(cells_y + 1).enumerate() {
            source.sample_column(cell_x, first_cell_z + z as i32, column);
        }
    }

    /// Samples the first corner plane into `start`.
    pub fn prime_columns<S: ColumnSource + ?Sized>(&mut self, source: &mut S) {
        Self::fill_plane(
            &mut self.start,
            source,
            self.cells_y,
            self.first_cell_x,
            self.first_cell_z,
        );
    }

    /// Samples the plane at the far side of coarse step `x_index` into `end`.
    pub fn advance_column<S: ColumnSource + ?Sized>(&mut self, source: &mut S, x_index: usize) {
        Self::fill_plane(
            &mut self.end,
            source,
            self.cells_y,
            self.first_cell_x + x_index as i32 + 1,
            self.first_cell_z,
        );
    }

    /// Loads the 8 corners of cell (`y_level`, `z_index`) between `start` and `end`.
    pub fn select_corners(&mut self, y_level: usize, z_index: usize) {
        let i00 = self.index(z_index, y_level);
        let i10 = self.index(z_index, y_level + 1);
        let i01 = self.index(z_index + 1, y_level);
        let i11 = self.index(z_index + 1, y_level + 1);
        // Order is [x][y][z] packed as x*4 + y*2 + z.
        self.corners = [
            self.start[i00],
            self.start[i01],
            self.start[i10],
            self.start[i11],
            self.end[i00],
            self.end[i01],
            self.end[i10],
            self.end[i11],
        ];
    }

    #[inline]
    pub fn apply_y(&mut self, t: f64) {
        let c = &self.corners;
        self.after_y = [
            lerp(t, c[0], c[2]),
            lerp(t, c[1], c[3]),
            lerp(t, c[4], c[6]),
            lerp(t, c[5], c[7]),
        ];
    }

    #[inline]
    pub fn apply_x(&mut self, t: f64) {
        let c = &self.after_y;
        self.after_x = [lerp(t, c[0], c[2]), lerp(t, c[1], c[3])];
    }

    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        lerp(t, self.after_x[0], self.after_x[1])
    }

    pub fn rotate_buffers(&mut self) {
        mem::swap(&mut self.start, &mut self.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Affine;

    impl ColumnSource for Affine {
        fn sample_column(&mut self, cell_x: i32, cell_z: i32, out: &mut [f64]) {
            for (k, v) in out.iter_mut().enumerate() {
                *v = f64::from(cell_x) * 3.0 - f64::from(cell_z) * 0.5 + k as f64 * 7.0;
            }
        }
    }

    #[test]
    fn corners_are_exact_and_interior_is_linear() {
        let mut li = LatticeInterpolator::new(2, 3, 5, -2);
        li.prime_columns(&mut Affine);
        li.advance_column(&mut Affine, 0);
        li.select_corners(1, 1);
        li.apply_y(0.0);
        li.apply_x(0.0);
        assert_eq!(li.evaluate(0.0), 5.0 * 3.0 - (-1.0) * 0.5 + 7.0);
        li.apply_y(1.0);
        li.apply_x(1.0);
        assert_eq!(li.evaluate(1.0), 6.0 * 3.0 - 0.0 * 0.5 + 14.0);
        li.apply_y(0.5);
        li.apply_x(0.25);
        let mid = li.evaluate(0.75);
        let want = 5.25 * 3.0 - (-0.25) * 0.5 + 1.5 * 7.0;
        assert!((mid - want).abs() < 1e-12);
    }

    #[test]
    fn rotate_reuses_end_plane() {
        let mut li = LatticeInterpolator::new(1, 1, 0, 0);
        li.prime_columns(&mut Affine);
        li.advance_column(&mut Affine, 0);
        li.rotate_buffers();
        li.advance_column(&mut Affine, 1);
        li.select_corners(0, 0);
        li.apply_y(0.0);
        li.apply_x(0.0);
        assert_eq!(li.evaluate(0.0), 3.0);
        li.apply_x(1.0);
        assert_eq!(li.evaluate(0.0), 6.0);
    }
}
