//! Chunk coordinates - the unit of territory
//!
//! A chunk is a 32x32 column of blocks in the host world. Territory logic
//! only ever sees the integer chunk coordinate; block positions are converted
//! with [`ChunkKey::from_block`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// log2 of the chunk edge length in blocks (32).
pub const CHUNK_SHIFT: u32 = 5;

/// A discrete claimable cell: `(world, chunk_x, chunk_z)`.
///
/// Ordering is (world, x, z), which gives claim listings a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    world: String,
    x: i32,
    z: i32,
}

impl ChunkKey {
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }

    /// The chunk containing the given block column.
    pub fn from_block(world: impl Into<String>, block_x: i32, block_z: i32) -> Self {
        Self::new(world, block_x >> CHUNK_SHIFT, block_z >> CHUNK_SHIFT)
    }

    #[inline]
    pub fn world(&self) -> &str {
        &self.world
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn z(&self) -> i32 {
        self.z
    }

    /// The four axis neighbors (N, S, E, W). Diagonals are not adjacent.
    pub fn neighbors(&self) -> [ChunkKey; 4] {
        [
            Self::new(self.world.clone(), self.x, self.z - 1),
            Self::new(self.world.clone(), self.x, self.z + 1),
            Self::new(self.world.clone(), self.x + 1, self.z),
            Self::new(self.world.clone(), self.x - 1, self.z),
        ]
    }

    /// True when `other` is in the same world at Manhattan distance exactly 1.
    pub fn is_adjacent_to(&self, other: &ChunkKey) -> bool {
        self.world == other.world
            && (i64::from(self.x) - i64::from(other.x)).abs()
                + (i64::from(self.z) - i64::from(other.z)).abs()
                == 1
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.world, self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_block_floors_negative_coordinates() {
        assert_eq!(ChunkKey::from_block("w", 0, 31), ChunkKey::new("w", 0, 0));
        assert_eq!(ChunkKey::from_block("w", 32, 64), ChunkKey::new("w", 1, 2));
        assert_eq!(ChunkKey::from_block("w", -1, -32), ChunkKey::new("w", -1, -1));
        assert_eq!(ChunkKey::from_block("w", -33, 0), ChunkKey::new("w", -2, 0));
    }

    #[test]
    fn axis_neighbors_are_adjacent() {
        let origin = ChunkKey::new("w", 0, 0);
        for n in origin.neighbors() {
            assert!(origin.is_adjacent_to(&n), "{} should be adjacent", n);
        }
    }

    #[test]
    fn diagonals_and_gaps_are_not_adjacent() {
        let origin = ChunkKey::new("w", 0, 0);
        assert!(!origin.is_adjacent_to(&ChunkKey::new("w", 1, 1)));
        assert!(!origin.is_adjacent_to(&ChunkKey::new("w", 2, 0)));
        assert!(!origin.is_adjacent_to(&origin));
    }

    #[test]
    fn other_worlds_are_never_adjacent() {
        let a = ChunkKey::new("overworld", 0, 0);
        let b = ChunkKey::new("nether", 1, 0);
        assert!(!a.is_adjacent_to(&b));
    }

    #[test]
    fn equality_uses_all_fields() {
        assert_ne!(ChunkKey::new("a", 1, 2), ChunkKey::new("b", 1, 2));
        assert_ne!(ChunkKey::new("a", 1, 2), ChunkKey::new("a", 2, 1));
    }
}
