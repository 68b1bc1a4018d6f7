//! Entry/exit hysteresis as an explicit two-state latch per side.
//!
//! | side  | enter (→ In)     | exit (→ Out) | value while In |
//! |-------|------------------|--------------|----------------|
//! | long  | z < -threshold   | z >= 0       | +1             |
//! | short | z > +threshold   | z <= 0       | -1             |
//!
//! Between events the latch holds its state. An undefined z-score is never an
//! event. If a bar satisfies both conditions the exit wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Position value while the latch is In.
    pub fn sign(self) -> i8 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    Out,
    In,
}

#[derive(Debug, Clone)]
pub struct PositionLatch {
    direction: Direction,
    threshold: f64,
    state: LatchState,
}

impl PositionLatch {
    pub fn new(direction: Direction, threshold: f64) -> Self {
        Self {
            direction,
            threshold: threshold.abs(),
            state: LatchState::Out,
        }
    }

    pub fn long(threshold: f64) -> Self {
        Self::new(Direction::Long, threshold)
    }

    pub fn short(threshold: f64) -> Self {
        Self::new(Direction::Short, threshold)
    }

    pub fn state(&self) -> LatchState {
        self.state
    }

    /// Current position: the direction's sign while In, 0 while Out.
    pub fn position(&self) -> i8 {
        match self.state {
            LatchState::In => self.direction.sign(),
            LatchState::Out => 0,
        }
    }

    /// Feed one bar's z-score and return the position after it.
    pub fn update(&mut self, z_score: Option<f64>) -> i8 {
        if let Some(z) = z_score {
            if self.exits(z) {
                self.state = LatchState::Out;
            } else if self.enters(z) {
                self.state = LatchState::In;
            }
        }
        self.position()
    }

    fn enters(&self, z: f64) -> bool {
        match self.direction {
            Direction::Long => z < -self.threshold,
            Direction::Short => z > self.threshold,
        }
    }

    fn exits(&self, z: f64) -> bool {
        match self.direction {
            Direction::Long => z >= 0.0,
            Direction::Short => z <= 0.0,
        }
    }
}

/// Run a fresh latch over a z-score sequence.
pub fn latch_positions(z_scores: &[Option<f64>], direction: Direction, threshold: f64) -> Vec<i8> {
    let mut latch = PositionLatch::new(direction, threshold);
    z_scores.iter().map(|&z| latch.update(z)).collect()
}
