//! Player input normalisation.
//!
//! Two control schemes (pointer + keys, and dual virtual sticks on touch
//! screens) are reduced to one `InputSnapshot` that the tick reads at its
//! start. The host feeds raw events into an `InputDevice` between ticks and
//! hands the resulting snapshot to `ArenaSim::set_input`.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Maximum stick travel, in screen units, for full-speed movement.
pub const JOYSTICK_MAX_RADIUS: f32 = 50.0;
/// Aim-stick travel below which the aim angle is left untouched.
pub const AIM_DEAD_ZONE: f32 = 5.0;

/// Aim intent for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Aim {
    /// Leave the current facing unchanged.
    #[default]
    Keep,
    /// Face this absolute angle (radians).
    Angle(f32),
    /// Face a point in viewport coordinates (resolved against the player).
    Toward(Vec2),
}

/// Everything the tick needs from the player's controls.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Movement direction with magnitude in `[0, 1]`.
    pub movement: Vec2,
    pub aim: Aim,
    pub fire: bool,
}

// ============================================================================
// SCHEME DETECTION
// ============================================================================

/// What the host client reports about itself at startup.
#[derive(Debug, Clone, Default)]
pub struct ClientCapabilities {
    pub user_agent: String,
    pub max_touch_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    PointerAndKeys,
    TouchSticks,
}

const TOUCH_UA_TOKENS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl ControlScheme {
    /// Pick the scheme once at startup. Touch-capable clients get sticks.
    pub fn detect(caps: &ClientCapabilities) -> Self {
        let ua = caps.user_agent.to_ascii_lowercase();
        if caps.max_touch_points > 0 || TOUCH_UA_TOKENS.iter().any(|t| ua.contains(t)) {
            ControlScheme::TouchSticks
        } else {
            ControlScheme::PointerAndKeys
        }
    }
}

// ============================================================================
// POINTER + KEYS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Held movement keys plus pointer state.
#[derive(Debug, Clone, Default)]
pub struct PointerKeys {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    pointer: Vec2,
    button: bool,
}

impl PointerKeys {
    pub fn set_key(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn pointer_moved(&mut self, at: Vec2) {
        self.pointer = at;
    }

    pub fn set_button(&mut self, held: bool) {
        self.button = held;
    }

    pub fn snapshot(&self) -> InputSnapshot {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        InputSnapshot {
            movement: dir.normalize_or_zero(),
            aim: Aim::Toward(self.pointer),
            fire: self.button,
        }
    }
}

// ============================================================================
// VIRTUAL DUAL STICKS
// ============================================================================

/// Logical stick a touch contact can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StickSlot {
    /// Left half of the screen.
    Move,
    /// Right half of the screen. Holding it fires.
    Aim,
}

impl StickSlot {
    fn index(self) -> usize {
        match self {
            StickSlot::Move => 0,
            StickSlot::Aim => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StickBinding {
    contact: u64,
    origin: Vec2,
    current: Vec2,
}

impl StickBinding {
    fn displacement(&self) -> Vec2 {
        self.current - self.origin
    }
}

/// Contact-id → stick-slot table.
#[derive(Debug, Clone, Default)]
pub struct TouchSticks {
    bindings: [Option<StickBinding>; 2],
}

impl TouchSticks {
    /// Bind a new contact to the stick of the half it landed on, if that
    /// stick is free. Returns the slot it was bound to.
    pub fn touch_start(&mut self, contact: u64, at: Vec2, viewport_width: f32) -> Option<StickSlot> {
        let slot = if at.x < viewport_width / 2.0 {
            StickSlot::Move
        } else {
            StickSlot::Aim
        };
        let entry = &mut self.bindings[slot.index()];
        if entry.is_some() {
            return None;
        }
        *entry = Some(StickBinding { contact, origin: at, current: at });
        Some(slot)
    }

    pub fn touch_move(&mut self, contact: u64, at: Vec2) {
        for binding in self.bindings.iter_mut().flatten() {
            if binding.contact == contact {
                binding.current = at;
            }
        }
    }

    /// Release a contact (end or cancel). Returns the slot it freed.
    pub fn touch_end(&mut self, contact: u64) -> Option<StickSlot> {
        for slot in [StickSlot::Move, StickSlot::Aim] {
            let entry = &mut self.bindings[slot.index()];
            if entry.is_some_and(|b| b.contact == contact) {
                *entry = None;
                return Some(slot);
            }
        }
        None
    }

    pub fn is_bound(&self, slot: StickSlot) -> bool {
        self.bindings[slot.index()].is_some()
    }

    pub fn snapshot(&self) -> InputSnapshot {
        let movement = match &self.bindings[StickSlot::Move.index()] {
            Some(binding) => {
                let d = binding.displacement();
                let magnitude = d.length().min(JOYSTICK_MAX_RADIUS) / JOYSTICK_MAX_RADIUS;
                d.normalize_or_zero() * magnitude
            }
            None => Vec2::ZERO,
        };

        let (aim, fire) = match &self.bindings[StickSlot::Aim.index()] {
            Some(binding) => {
                let d = binding.displacement();
                let aim = if d.length() > AIM_DEAD_ZONE {
                    Aim::Angle(d.y.atan2(d.x))
                } else {
                    Aim::Keep
                };
                (aim, true)
            }
            None => (Aim::Keep, false),
        };

        InputSnapshot { movement, aim, fire }
    }
}

// ============================================================================
// DEVICE
// ============================================================================

/// Raw input state for whichever scheme was detected at startup.
#[derive(Debug, Clone)]
pub enum InputDevice {
    PointerAndKeys(PointerKeys),
    TouchSticks(TouchSticks),
}

impl InputDevice {
    pub fn for_scheme(scheme: ControlScheme) -> Self {
        match scheme {
            ControlScheme::PointerAndKeys => InputDevice::PointerAndKeys(PointerKeys::default()),
            ControlScheme::TouchSticks => InputDevice::TouchSticks(TouchSticks::default()),
        }
    }

    pub fn scheme(&self) -> ControlScheme {
        match self {
            InputDevice::PointerAndKeys(_) => ControlScheme::PointerAndKeys,
            InputDevice::TouchSticks(_) => ControlScheme::TouchSticks,
        }
    }

    pub fn snapshot(&self) -> InputSnapshot {
        match self {
            InputDevice::PointerAndKeys(keys) => keys.snapshot(),
            InputDevice::TouchSticks(sticks) => sticks.snapshot(),
        }
    }
}
