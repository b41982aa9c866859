use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use strata_chunk::ChunkColumn;
use strata_world::{ChunkCoord, ShapeConfig};

/// Shared map of chunk columns, created on first touch.
pub struct ChunkStore {
    shape: ShapeConfig,
    columns: RwLock<HashMap<ChunkCoord, Arc<ChunkColumn>>>,
}

impl ChunkStore {
    pub fn new(shape: ShapeConfig) -> Self {
        Self {
            shape,
            columns: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<ChunkColumn>> {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&coord)
            .cloned()
    }

    pub fn get_or_insert(&self, coord: ChunkCoord) -> Arc<ChunkColumn> {
        if let Some(column) = self.get(coord) {
            return column;
        }
        let mut columns = self.columns.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            columns
                .entry(coord)
                .or_insert_with(|| Arc::new(ChunkColumn::new(coord, &self.shape))),
        )
    }

    pub fn len(&self) -> usize {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
