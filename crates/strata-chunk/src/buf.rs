use strata_blocks::Material;
use strata_world::{CHUNK_WIDTH, ChunkCoord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub min_y: i32,
    pub height: usize,
    pub blocks: Vec<Material>,
}

impl ChunkBuf {
    pub fn new_air(coord: ChunkCoord, min_y: i32, height: usize) -> Self {
        Self {
            coord,
            min_y,
            height,
            blocks: vec![Material::Air; CHUNK_WIDTH * CHUNK_WIDTH * height],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * CHUNK_WIDTH + z) * CHUNK_WIDTH + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Material {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, m: Material) {
        let i = self.idx(x, y, z);
        self.blocks[i] = m;
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.min_y + self.height as i32
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_air())
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.has_non_air()
    }

    /// Raw material bytes in storage order.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.blocks.iter().map(|m| m.as_byte()).collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkOccupancy {
    Empty,
    Populated,
}

impl ChunkOccupancy {
    #[inline]
    pub fn of(buf: &ChunkBuf) -> Self {
        if buf.has_non_air() {
            ChunkOccupancy::Populated
        } else {
            ChunkOccupancy::Empty
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, ChunkOccupancy::Empty)
    }
}
