//! Timed brushing round
//!
//! `tick` is the only thing that mutates a round. The browser shell collects
//! input between frames, calls `tick` once per frame, then drains events to
//! draw, beep and close the overlay.

use glam::Vec2;

use super::board::{Board, Reveal};
use crate::settings::Settings;

/// Meter ceiling
pub const METER_MAX: u32 = 100;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Timer running, brushing allowed
    Playing,
    /// Timer frozen, input ignored except resume / quit
    Paused,
    /// Time ran out or the player quit
    Finished,
}

/// Arrow-key brush movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
    Left,
    Right,
}

impl Nudge {
    fn direction(self) -> Vec2 {
        match self {
            Nudge::Up => Vec2::NEG_Y,
            Nudge::Down => Vec2::Y,
            Nudge::Left => Vec2::NEG_X,
            Nudge::Right => Vec2::X,
        }
    }

    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Nudge::Up),
            "ArrowDown" => Some(Nudge::Down),
            "ArrowLeft" => Some(Nudge::Left),
            "ArrowRight" => Some(Nudge::Right),
            _ => None,
        }
    }
}

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct RoundInput {
    /// Canvas positions brushed while the pointer was pressed, in order
    pub strokes: Vec<Vec2>,
    pub nudges: Vec<Nudge>,
    /// Toggle pause
    pub pause: bool,
    /// Toggle mute
    pub mute: bool,
    pub quit: bool,
}

/// Things the front-end reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Revealed { x: u32, y: u32 },
    ShardFound { x: u32, y: u32 },
    /// Play the shard sound
    Beep,
    Paused,
    Resumed,
    MuteChanged { muted: bool },
    Finished { score: usize },
    Quit,
}

/// One round of Sticky Carrot
#[derive(Debug, Clone)]
pub struct Round {
    pub board: Board,
    pub phase: RoundPhase,
    pub remaining_ms: f32,
    /// Brush position (canvas pixels)
    pub pointer: Vec2,
    pub meter: u32,
    pub muted: bool,
    brush_step: f32,
    events: Vec<GameEvent>,
}

impl Round {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self::with_board(Board::new(seed), settings)
    }

    pub fn with_board(board: Board, settings: &Settings) -> Self {
        Self {
            board,
            phase: RoundPhase::Playing,
            remaining_ms: settings.round_ms() as f32,
            pointer: Board::pixel_size() / 2.0,
            meter: 0,
            muted: settings.game_muted,
            brush_step: settings.effective_brush_step(),
            events: Vec::new(),
        }
    }

    pub fn score(&self) -> usize {
        self.board.score()
    }

    /// Whole seconds left, rounded up for display
    pub fn seconds_left(&self) -> u32 {
        (self.remaining_ms.max(0.0) / 1000.0).ceil() as u32
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn brush(&mut self, pos: Vec2) {
        match self.board.reveal_at(pos) {
            Reveal::Shard { x, y } => {
                self.events.push(GameEvent::ShardFound { x, y });
                self.meter = (self.meter + 1).min(METER_MAX);
                if !self.muted {
                    self.events.push(GameEvent::Beep);
                }
            }
            Reveal::Empty { x, y } => self.events.push(GameEvent::Revealed { x, y }),
            Reveal::OutOfBounds | Reveal::AlreadyRevealed => {}
        }
    }

    fn finish(&mut self) {
        self.phase = RoundPhase::Finished;
        self.remaining_ms = 0.0;
        let score = self.score();
        log::info!("Round finished with {} shards", score);
        self.events.push(GameEvent::Finished { score });
    }
}

/// Advance a round by `dt_ms`
pub fn tick(round: &mut Round, input: &RoundInput, dt_ms: f32) {
    if round.phase == RoundPhase::Finished {
        return;
    }

    if input.quit {
        round.phase = RoundPhase::Finished;
        round.events.push(GameEvent::Quit);
        return;
    }

    if input.mute {
        round.muted = !round.muted;
        round.events.push(GameEvent::MuteChanged {
            muted: round.muted,
        });
    }

    if input.pause {
        match round.phase {
            RoundPhase::Playing => {
                round.phase = RoundPhase::Paused;
                round.events.push(GameEvent::Paused);
            }
            RoundPhase::Paused => {
                round.phase = RoundPhase::Playing;
                round.events.push(GameEvent::Resumed);
            }
            RoundPhase::Finished => {}
        }
    }

    if round.phase == RoundPhase::Paused {
        return;
    }

    for &pos in &input.strokes {
        round.pointer = pos;
        round.brush(pos);
    }

    let max = Board::pixel_size();
    for nudge in &input.nudges {
        round.pointer = (round.pointer + nudge.direction() * round.brush_step).clamp(Vec2::ZERO, max);
        let pos = round.pointer;
        round.brush(pos);
    }

    if dt_ms.is_finite() && dt_ms > 0.0 {
        round.remaining_ms -= dt_ms;
    }
    if round.remaining_ms <= 0.0 {
        round.finish();
    }
}
