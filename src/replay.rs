//! Recorded input scripts and seeded input generation
//!
//! A replay is just the raw inputs of both combatants, one entry per tick.
//! Played back against the same setup it reproduces the fight exactly.

use std::collections::VecDeque;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::sim::{Button, CombatEvent, CombatantId, Fight, RawInput, Stick};

/// Per-tick inputs for P1 and P2
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub frames: Vec<[RawInput; 2]>,
}

impl Replay {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let replay = Self::from_json(&json)?;
        log::info!("Loaded replay with {} frames from {}", replay.len(), path.display());
        Ok(replay)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn push(&mut self, inputs: [RawInput; 2]) {
        self.frames.push(inputs);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Feed every frame to `fight`, returning all events in order
    pub fn play(&self, fight: &mut Fight) -> Vec<CombatEvent> {
        self.frames
            .iter()
            .flat_map(|inputs| fight.step(*inputs))
            .collect()
    }
}

/// Quarter circles and dragon punches, written for a combatant facing right
const MOTIONS: [&[(bool, bool, bool)]; 3] = [
    // (down, forward, back)
    &[(true, false, false), (true, true, false), (false, true, false)],
    &[(false, true, false), (true, false, false), (true, true, false)],
    &[(true, false, false), (true, false, true), (false, false, true)],
];

/// Seeded generator of plausible inputs: held directions, button taps and
/// the occasional motion followed by a punch
#[derive(Debug, Clone)]
pub struct InputFuzzer {
    rng: Pcg32,
    held: [RawInput; 2],
    hold_ticks: [u32; 2],
    queued: [VecDeque<RawInput>; 2],
}

impl InputFuzzer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            held: [RawInput::neutral(); 2],
            hold_ticks: [0; 2],
            queued: [VecDeque::new(), VecDeque::new()],
        }
    }

    /// Inputs for the next tick
    pub fn next_frame(&mut self) -> [RawInput; 2] {
        CombatantId::ALL.map(|id| self.next_input(id))
    }

    /// Generate a replay of `ticks` frames
    pub fn record(&mut self, ticks: usize) -> Replay {
        Replay {
            frames: (0..ticks).map(|_| self.next_frame()).collect(),
        }
    }

    fn next_input(&mut self, id: CombatantId) -> RawInput {
        let slot = id.index();
        if let Some(input) = self.queued[slot].pop_front() {
            return input;
        }

        if self.rng.random_bool(0.04) {
            self.queue_motion(id);
            if let Some(input) = self.queued[slot].pop_front() {
                return input;
            }
        }

        if self.hold_ticks[slot] == 0 {
            self.held[slot] = self.random_stick();
            self.hold_ticks[slot] = self.rng.random_range(1..16);
        }
        self.hold_ticks[slot] -= 1;

        let mut input = self.held[slot];
        if self.rng.random_bool(0.12) {
            input.buttons = input.buttons.with(Button::ALL[self.rng.random_range(0..Button::ALL.len())]);
        }
        input
    }

    fn random_stick(&mut self) -> RawInput {
        let mut input = RawInput::neutral();
        for stick in Stick::ALL {
            if self.rng.random_bool(0.25) {
                input = input.holding(stick);
            }
        }
        input
    }

    fn queue_motion(&mut self, id: CombatantId) {
        // P2 starts on the right, so its forward is left
        let (forward, back) = match id {
            CombatantId::P1 => (Stick::Right, Stick::Left),
            CombatantId::P2 => (Stick::Left, Stick::Right),
        };
        let motion = MOTIONS[self.rng.random_range(0..MOTIONS.len())];
        let queue = &mut self.queued[id.index()];
        for &(down, fwd, bck) in motion {
            let mut input = RawInput::neutral();
            if down {
                input = input.holding(Stick::Down);
            }
            if fwd {
                input = input.holding(forward);
            }
            if bck {
                input = input.holding(back);
            }
            queue.push_back(input);
        }
        let button = if self.rng.random_bool(0.5) {
            Button::LightPunch
        } else {
            Button::HeavyPunch
        };
        queue.push_back(RawInput::neutral().pressing(button));
    }
}
