use strata_blocks::Material;
use strata_world::CHUNK_WIDTH;

use crate::buf::ChunkBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeightmapKind {
    /// Highest block that blocks motion.
    OceanFloor,
    /// Highest non-air block.
    WorldSurface,
}

impl HeightmapKind {
    #[inline]
    pub fn counts(self, m: Material) -> bool {
        match self {
            HeightmapKind::OceanFloor => m.blocks_motion(),
            HeightmapKind::WorldSurface => !m.is_air(),
        }
    }
}

/// Top Y per block column, or `min_y - 1` for a column with no counted block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmap {
    kind: HeightmapKind,
    min_y: i32,
    tops: Vec<i32>,
}

impl Heightmap {
    pub fn new(kind: HeightmapKind, min_y: i32) -> Self {
        Self {
            kind,
            min_y,
            tops: vec![min_y - 1; CHUNK_WIDTH * CHUNK_WIDTH],
        }
    }

    #[inline]
    pub fn kind(&self) -> HeightmapKind {
        self.kind
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> i32 {
        self.tops[z * CHUNK_WIDTH + x]
    }

    /// Records a placed block; blocks are only ever added or swapped for solids.
    #[inline]
    pub fn note(&mut self, x: usize, y: i32, z: usize, m: Material) {
        let top = &mut self.tops[z * CHUNK_WIDTH + x];
        if y > *top && self.kind.counts(m) {
            *top = y;
        }
    }

    /// Rebuilds from scratch by scanning each column downward.
    pub fn recompute(kind: HeightmapKind, buf: &ChunkBuf) -> Self {
        let mut hm = Self::new(kind, buf.min_y);
        for z in 0..CHUNK_WIDTH {
            for x in 0..CHUNK_WIDTH {
                if let Some(ly) = (0..buf.height).rev().find(|&ly| kind.counts(buf.get_local(x, ly, z))) {
                    hm.tops[z * CHUNK_WIDTH + x] = buf.min_y + ly as i32;
                }
            }
        }
        hm
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmaps {
    pub ocean_floor: Heightmap,
    pub world_surface: Heightmap,
}

impl Heightmaps {
    pub fn new(min_y: i32) -> Self {
        Self {
            ocean_floor: Heightmap::new(HeightmapKind::OceanFloor, min_y),
            world_surface: Heightmap::new(HeightmapKind::WorldSurface, min_y),
        }
    }

    #[inline]
    pub fn note(&mut self, x: usize, y: i32, z: usize, m: Material) {
        self.ocean_floor.note(x, y, z, m);
        self.world_surface.note(x, y, z, m);
    }

    pub fn get(&self, kind: HeightmapKind) -> &Heightmap {
        match kind {
            HeightmapKind::OceanFloor => &self.ocean_floor,
            HeightmapKind::WorldSurface => &self.world_surface,
        }
    }
}
