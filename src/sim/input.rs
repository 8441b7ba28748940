//! Input sampling boundary
//!
//! The core never polls devices. Each tick it asks an `InputSampler` for the
//! held directions and buttons of each combatant and reduces that to an
//! `InputSample`. Directions are absolute here; they only become
//! forward/back once combined with a facing.

use serde::{Deserialize, Serialize};

use super::state::{CombatantId, Facing};

/// Absolute stick direction as reported by the device layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stick {
    Up,
    Down,
    Left,
    Right,
}

impl Stick {
    pub const ALL: [Stick; 4] = [Stick::Up, Stick::Down, Stick::Left, Stick::Right];

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of held stick directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: Self = Self(0);

    pub fn with(mut self, stick: Stick) -> Self {
        self.insert(stick);
        self
    }

    pub fn insert(&mut self, stick: Stick) {
        self.0 |= stick.bit();
    }

    pub fn contains(&self, stick: Stick) -> bool {
        self.0 & stick.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Build from a raw device bitmask (extra bits are dropped)
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }
}

impl FromIterator<Stick> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Stick>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Attack buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Button {
    LightPunch,
    HeavyPunch,
    LightKick,
    HeavyKick,
}

impl Button {
    pub const ALL: [Button; 4] = [
        Button::LightPunch,
        Button::HeavyPunch,
        Button::LightKick,
        Button::HeavyKick,
    ];

    pub fn is_punch(self) -> bool {
        matches!(self, Button::LightPunch | Button::HeavyPunch)
    }

    pub fn is_kick(self) -> bool {
        matches!(self, Button::LightKick | Button::HeavyKick)
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of buttons (held or just pressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);

    pub fn with(mut self, button: Button) -> Self {
        self.insert(button);
        self
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn contains(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Buttons in `self` that are not in `other`
    pub fn difference(&self, other: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & !other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.contains(*b))
    }

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Facing-relative direction in numpad notation (6 = toward the opponent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    DownBack = 1,
    Down = 2,
    DownForward = 3,
    Back = 4,
    Neutral = 5,
    Forward = 6,
    UpBack = 7,
    Up = 8,
    UpForward = 9,
}

impl Direction {
    pub fn from_numpad(digit: u8) -> Option<Self> {
        Some(match digit {
            1 => Direction::DownBack,
            2 => Direction::Down,
            3 => Direction::DownForward,
            4 => Direction::Back,
            5 => Direction::Neutral,
            6 => Direction::Forward,
            7 => Direction::UpBack,
            8 => Direction::Up,
            9 => Direction::UpForward,
            _ => return None,
        })
    }

    pub fn numpad(self) -> u8 {
        self as u8
    }

    /// Build from axes: horizontal +1 = forward, vertical +1 = up
    pub fn from_axes(horizontal: i8, vertical: i8) -> Self {
        let digit = 5 + horizontal.signum() + 3 * vertical.signum();
        // digit is always within 1..=9 for signum inputs
        Direction::from_numpad(digit as u8).unwrap_or(Direction::Neutral)
    }

    pub fn horizontal(self) -> i8 {
        match self.numpad() % 3 {
            1 => -1,
            0 => 1,
            _ => 0,
        }
    }

    pub fn vertical(self) -> i8 {
        match self.numpad() {
            1..=3 => -1,
            7..=9 => 1,
            _ => 0,
        }
    }

    pub fn is_down(self) -> bool {
        self.vertical() < 0
    }

    pub fn is_up(self) -> bool {
        self.vertical() > 0
    }

    pub fn is_back(self) -> bool {
        self.horizontal() < 0
    }

    pub fn is_forward(self) -> bool {
        self.horizontal() > 0
    }
}

/// Raw device state for one combatant on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub directions: DirectionSet,
    #[serde(default)]
    pub buttons: ButtonSet,
}

impl RawInput {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn holding(mut self, stick: Stick) -> Self {
        self.directions.insert(stick);
        self
    }

    pub fn pressing(mut self, button: Button) -> Self {
        self.buttons.insert(button);
        self
    }
}

/// Per-tick input capability consumed by the core
pub trait InputSampler {
    fn held_directions(&self, id: CombatantId) -> DirectionSet;
    fn is_button_pressed(&self, id: CombatantId, button: Button) -> bool;
    fn is_button_just_pressed(&self, id: CombatantId, button: Button) -> bool;
}

/// One combatant's input for one tick, with press edges resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSample {
    pub directions: DirectionSet,
    pub held: ButtonSet,
    pub just_pressed: ButtonSet,
}

impl InputSample {
    /// Query the sampler once for this combatant
    pub fn capture<S: InputSampler + ?Sized>(sampler: &S, id: CombatantId) -> Self {
        let mut held = ButtonSet::EMPTY;
        let mut just_pressed = ButtonSet::EMPTY;
        for button in Button::ALL {
            if sampler.is_button_pressed(id, button) {
                held.insert(button);
            }
            if sampler.is_button_just_pressed(id, button) {
                just_pressed.insert(button);
            }
        }
        Self {
            directions: sampler.held_directions(id),
            held,
            just_pressed,
        }
    }

    /// Derive press edges by comparing against the previous tick
    pub fn from_edges(current: RawInput, previous: RawInput) -> Self {
        Self {
            directions: current.directions,
            held: current.buttons,
            just_pressed: current.buttons.difference(previous.buttons),
        }
    }

    /// Resolve the held stick to a facing-relative direction.
    ///
    /// Opposing directions held together cancel to neutral on that axis.
    pub fn stick(&self, facing: Facing) -> Direction {
        let dirs = &self.directions;
        let right = dirs.contains(Stick::Right) as i8 - dirs.contains(Stick::Left) as i8;
        let up = dirs.contains(Stick::Up) as i8 - dirs.contains(Stick::Down) as i8;
        let forward = match facing {
            Facing::Right => right,
            Facing::Left => -right,
        };
        Direction::from_axes(forward, up)
    }
}

/// Sampler backed by the current and previous raw inputs of both combatants
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInputs {
    pub current: [RawInput; 2],
    pub previous: [RawInput; 2],
}

impl FrameInputs {
    pub fn new(current: [RawInput; 2], previous: [RawInput; 2]) -> Self {
        Self { current, previous }
    }
}

impl InputSampler for FrameInputs {
    fn held_directions(&self, id: CombatantId) -> DirectionSet {
        self.current[id.index()].directions
    }

    fn is_button_pressed(&self, id: CombatantId, button: Button) -> bool {
        self.current[id.index()].buttons.contains(button)
    }

    fn is_button_just_pressed(&self, id: CombatantId, button: Button) -> bool {
        self.current[id.index()].buttons.contains(button)
            && !self.previous[id.index()].buttons.contains(button)
    }
}
