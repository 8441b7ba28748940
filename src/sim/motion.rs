//! Motion input recognition
//!
//! Each combatant keeps a short history of facing-relative directions. A
//! motion matches when its directions appear in order inside the window,
//! with any number of other samples between them. A motion special also
//! needs its button pressed within a few ticks of the motion completing.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::input::{Direction, InputSample};
use super::moves::{ButtonSpec, MoveId, MoveInput, MoveTable};
use super::state::CombatantId;

/// A direction recorded on a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionSample {
    pub direction: Direction,
    pub tick: u64,
}

/// Bounded ring of recent directional samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionWindow {
    samples: VecDeque<MotionSample>,
    max_age: u64,
}

impl MotionWindow {
    pub fn new(max_age: u64) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_age as usize),
            max_age,
        }
    }

    /// Append a sample and evict everything `max_age` ticks or older
    pub fn record(&mut self, direction: Direction, tick: u64) {
        self.samples.push_back(MotionSample { direction, tick });
        self.prune(tick);
    }

    pub fn prune(&mut self, now: u64) {
        while let Some(front) = self.samples.front() {
            if now.saturating_sub(front.tick) >= self.max_age || self.samples.len() > self.max_age as usize {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionSample> {
        self.samples.iter()
    }

    /// Tick at which `sequence` was most recently completed, if present.
    ///
    /// Completion is the first tick of the run that entered the final
    /// direction, so holding the last direction does not extend the grace
    /// period.
    pub fn completion_tick(&self, sequence: &[Direction]) -> Option<u64> {
        let (&last, rest) = sequence.split_last()?;

        let mut end = self.samples.iter().rposition(|s| s.direction == last)?;
        while end > 0 && self.samples[end - 1].direction == last {
            end -= 1;
        }
        let completed_at = self.samples[end].tick;

        let mut wanted = rest.iter().rev().peekable();
        for sample in self.samples.range(..end).rev() {
            let Some(&&dir) = wanted.peek() else { break };
            if dir == sample.direction {
                wanted.next();
            }
        }
        wanted.peek().is_none().then_some(completed_at)
    }
}

/// Motion windows for both combatants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionMatcher {
    windows: [MotionWindow; 2],
    grace_ticks: u64,
}

impl MotionMatcher {
    pub fn new(max_age: u64, grace_ticks: u64) -> Self {
        Self {
            windows: [MotionWindow::new(max_age), MotionWindow::new(max_age)],
            grace_ticks,
        }
    }

    pub fn record_sample(&mut self, id: CombatantId, direction: Direction, tick: u64) {
        self.windows[id.index()].record(direction, tick);
    }

    pub fn window(&self, id: CombatantId) -> &MotionWindow {
        &self.windows[id.index()]
    }

    /// True if the history holds `sequence` in order
    pub fn match_motion(&self, id: CombatantId, sequence: &[Direction]) -> bool {
        self.windows[id.index()].completion_tick(sequence).is_some()
    }

    /// Motion plus a button edge no later than the grace window after the motion
    pub fn match_special(
        &self,
        id: CombatantId,
        sequence: &[Direction],
        button: ButtonSpec,
        sample: &InputSample,
        tick: u64,
    ) -> bool {
        if !button.matches(sample.just_pressed) {
            return false;
        }
        match self.windows[id.index()].completion_tick(sequence) {
            Some(done) => {
                let late = tick.saturating_sub(done) > self.grace_ticks;
                if late {
                    log::trace!("{:?}: motion {:?} completed at {} but button came at {}", id, sequence, done, tick);
                }
                !late
            }
            None => false,
        }
    }

    /// First motion move in `candidates` whose input is satisfied this tick
    pub fn first_match(
        &self,
        id: CombatantId,
        table: &MoveTable,
        candidates: &[MoveId],
        sample: &InputSample,
        tick: u64,
    ) -> Option<MoveId> {
        candidates.iter().copied().find(|&move_id| match table.input(move_id) {
            Some(MoveInput::Motion { sequence, button }) => {
                self.match_special(id, sequence, *button, sample, tick)
            }
            _ => false,
        })
    }

    pub fn reset(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
    }
}
