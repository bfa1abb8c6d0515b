//! Hidden-shard grid

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Grid width in cells
pub const GRID_W: u32 = 20;
/// Grid height in cells
pub const GRID_H: u32 = 10;
/// Cell edge in pixels
pub const CELL: u32 = 16;
/// Chance that a cell hides a shard
pub const SHARD_CHANCE: f64 = 0.3;

/// Result of brushing one point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    OutOfBounds,
    AlreadyRevealed,
    Empty { x: u32, y: u32 },
    Shard { x: u32, y: u32 },
}

/// The dirt grid and what lies under it
#[derive(Debug, Clone)]
pub struct Board {
    shards: Vec<bool>,
    revealed: Vec<bool>,
}

impl Board {
    /// Random layout from a seed (same seed, same board)
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self::from_fn(|_, _| rng.random_bool(SHARD_CHANCE))
    }

    /// Layout from a predicate over (x, y), filled row by row
    pub fn from_fn(mut has_shard: impl FnMut(u32, u32) -> bool) -> Self {
        let mut shards = Vec::with_capacity((GRID_W * GRID_H) as usize);
        for y in 0..GRID_H {
            for x in 0..GRID_W {
                shards.push(has_shard(x, y));
            }
        }
        Self {
            revealed: vec![false; shards.len()],
            shards,
        }
    }

    /// Canvas size in pixels
    pub fn pixel_size() -> Vec2 {
        Vec2::new((GRID_W * CELL) as f32, (GRID_H * CELL) as f32)
    }

    #[inline]
    fn index(x: u32, y: u32) -> usize {
        (y * GRID_W + x) as usize
    }

    /// Cell under a canvas pixel position
    pub fn cell_at(pos: Vec2) -> Option<(u32, u32)> {
        if !pos.is_finite() || pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let x = (pos.x / CELL as f32).floor() as u32;
        let y = (pos.y / CELL as f32).floor() as u32;
        (x < GRID_W && y < GRID_H).then_some((x, y))
    }

    pub fn has_shard(&self, x: u32, y: u32) -> bool {
        x < GRID_W && y < GRID_H && self.shards[Self::index(x, y)]
    }

    pub fn is_revealed(&self, x: u32, y: u32) -> bool {
        x < GRID_W && y < GRID_H && self.revealed[Self::index(x, y)]
    }

    /// Uncover the cell under `pos`; each cell can be uncovered once
    pub fn reveal_at(&mut self, pos: Vec2) -> Reveal {
        let Some((x, y)) = Self::cell_at(pos) else {
            return Reveal::OutOfBounds;
        };
        let i = Self::index(x, y);
        if self.revealed[i] {
            return Reveal::AlreadyRevealed;
        }
        self.revealed[i] = true;
        if self.shards[i] {
            Reveal::Shard { x, y }
        } else {
            Reveal::Empty { x, y }
        }
    }

    /// Shards uncovered so far
    pub fn score(&self) -> usize {
        self.shards
            .iter()
            .zip(&self.revealed)
            .filter(|(shard, revealed)| **shard && **revealed)
            .count()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.iter().filter(|s| **s).count()
    }
}
