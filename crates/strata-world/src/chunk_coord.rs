use serde::{Deserialize, Serialize};

use crate::CHUNK_WIDTH;

/// Horizontal position of a full-height chunk column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk containing the block column `(wx, wz)`.
    #[inline]
    pub fn containing(wx: i32, wz: i32) -> Self {
        let w = CHUNK_WIDTH as i32;
        Self {
            cx: wx.div_euclid(w),
            cz: wz.div_euclid(w),
        }
    }

    #[inline]
    pub fn min_block_x(self) -> i32 {
        self.cx * CHUNK_WIDTH as i32
    }

    #[inline]
    pub fn min_block_z(self) -> i32 {
        self.cz * CHUNK_WIDTH as i32
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_rounds_toward_negative_infinity() {
        assert_eq!(ChunkCoord::containing(-1, -16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::containing(-17, 15), ChunkCoord::new(-2, 0));
        assert_eq!(ChunkCoord::containing(16, 0).min_block_x(), 16);
    }
}
