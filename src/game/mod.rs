//! Sticky Carrot mini-game
//!
//! Brush away dirt to find hidden carrot shards before time runs out.
//! Pure and deterministic like the checklist core:
//! - Seeded RNG only
//! - Time comes in through `tick`, never read from a clock
//! - No rendering or platform dependencies

pub mod board;
pub mod round;

pub use board::{Board, CELL, GRID_H, GRID_W, Reveal};
pub use round::{GameEvent, Nudge, Round, RoundInput, RoundPhase, tick};
