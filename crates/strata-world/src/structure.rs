//! Structure pieces that carve out or buttress the terrain around them.

/// Adds a signed density contribution near structure pieces.
pub trait StructureIndex: Send + Sync {
    fn structure_weight_at(&self, x: i32, y: i32, z: i32) -> f64;

    /// Whether any piece may reach the given block column range. Used to skip whole chunks.
    fn touches(&self, _min_x: i32, _min_z: i32, _max_x: i32, _max_z: i32) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoStructures;

impl StructureIndex for NoStructures {
    #[inline]
    fn structure_weight_at(&self, _x: i32, _y: i32, _z: i32) -> f64 {
        0.0
    }

    #[inline]
    fn touches(&self, _min_x: i32, _min_z: i32, _max_x: i32, _max_z: i32) -> bool {
        false
    }
}

/// Inclusive block bounds of one placed piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceBox {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl PieceBox {
    pub fn new(a: [i32; 3], b: [i32; 3]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
            max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        }
    }

    /// Per-axis distance from `p` to the box, zero inside.
    #[inline]
    fn gap(&self, p: [i32; 3]) -> [i32; 3] {
        let mut d = [0; 3];
        for i in 0..3 {
            d[i] = (self.min[i] - p[i]).max(p[i] - self.max[i]).max(0);
        }
        d
    }
}

const REACH: i32 = 12;
const SPAN: usize = (REACH as usize) + 1;
const STRENGTH: f64 = 2.0;

/// Pieces with a Gaussian falloff: hollow in and around a piece, fill beneath its floor.
#[derive(Clone, Debug)]
pub struct PieceIndex {
    pieces: Vec<PieceBox>,
    kernel: Vec<f64>,
}

impl PieceIndex {
    pub fn new(pieces: Vec<PieceBox>) -> Self {
        let mut kernel = vec![0.0; SPAN * SPAN * SPAN];
        for dx in 0..SPAN {
            for dy in 0..SPAN {
                for dz in 0..SPAN {
                    let d2 = (dx * dx + dy * dy + dz * dz) as f64;
                    kernel[(dx * SPAN + dy) * SPAN + dz] = (-d2 / 16.0).exp();
                }
            }
        }
        Self {
            pieces,
            kernel,
        }
    }
}

impl StructureIndex for PieceIndex {
    fn structure_weight_at(&self, x: i32, y: i32, z: i32) -> f64 {
        let mut sum = 0.0;
        for piece in &self.pieces {
            let [dx, dy, dz] = piece.gap([x, y, z]);
            if dx > REACH || dy > REACH || dz > REACH {
                continue;
            }
            let k = self.kernel[(dx as usize * SPAN + dy as usize) * SPAN + dz as usize];
            if y < piece.min[1] {
                sum += k;
            } else {
                sum -= k;
            }
        }
        sum * STRENGTH
    }

    fn touches(&self, min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> bool {
        self.pieces.iter().any(|p| {
            p.min[0] - REACH <= max_x
                && p.max[0] + REACH >= min_x
                && p.min[2] - REACH <= max_z
                && p.max[2] + REACH >= min_z
        })
    }
}
