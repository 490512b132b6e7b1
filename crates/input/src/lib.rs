//! Flight input handling: device-agnostic action state and the control
//! input controller that turns it into [`engine_core::ControlInputs`].
//!
//! Device mapping (keys, sticks) lives with the host; it feeds this crate
//! through [`InputState::process_action`] and [`InputState::set_axis`].

mod controller;

pub use controller::*;

use std::collections::{HashMap, HashSet};

/// Digital flight actions a host can bind to buttons or keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightAction {
    ThrottleUp,
    ThrottleDown,
    PitchUp,
    PitchDown,
    RollLeft,
    RollRight,
    YawLeft,
    YawRight,
    SteerLeft,
    SteerRight,
    ToggleFlaps,
    FireGun,
    FireMissile,
}

/// Continuous axes fed from analog devices, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightAxis {
    Throttle,
    Pitch,
    Roll,
    Yaw,
    GroundSteer,
}

/// Press or release of a digital action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Pressed,
    Released,
}

/// Manages input state for the current tick.
#[derive(Debug, Default)]
pub struct InputState {
    /// Actions currently held down.
    held: HashSet<FlightAction>,
    /// Actions pressed this tick.
    pressed: HashSet<FlightAction>,
    /// Actions released this tick.
    released: HashSet<FlightAction>,
    /// Latest analog axis values. Absent means "no analog device on this axis".
    axes: HashMap<FlightAxis, f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-tick edge state. Call after the controller has consumed a tick.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Process a digital action event.
    pub fn process_action(&mut self, action: FlightAction, state: ActionState) {
        match state {
            ActionState::Pressed => {
                if !self.held.contains(&action) {
                    self.pressed.insert(action);
                }
                self.held.insert(action);
            }
            ActionState::Released => {
                if self.held.remove(&action) {
                    self.released.insert(action);
                }
            }
        }
    }

    /// Set an analog axis value (clamped to [-1, 1]).
    pub fn set_axis(&mut self, axis: FlightAxis, value: f32) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        self.axes.insert(axis, value);
    }

    /// Forget an analog axis so the digital bindings drive it again.
    pub fn clear_axis(&mut self, axis: FlightAxis) {
        self.axes.remove(&axis);
    }

    pub fn is_held(&self, action: FlightAction) -> bool {
        self.held.contains(&action)
    }

    pub fn is_pressed(&self, action: FlightAction) -> bool {
        self.pressed.contains(&action)
    }

    pub fn is_released(&self, action: FlightAction) -> bool {
        self.released.contains(&action)
    }

    /// Value of an axis: the analog value when present, else the digital pair
    /// (`positive` held = +1, `negative` held = -1, both or neither = 0).
    pub fn axis(&self, axis: FlightAxis) -> f32 {
        if let Some(v) = self.axes.get(&axis) {
            return *v;
        }
        let (positive, negative) = match axis {
            FlightAxis::Throttle => (FlightAction::ThrottleUp, FlightAction::ThrottleDown),
            FlightAxis::Pitch => (FlightAction::PitchUp, FlightAction::PitchDown),
            FlightAxis::Roll => (FlightAction::RollRight, FlightAction::RollLeft),
            FlightAxis::Yaw => (FlightAction::YawRight, FlightAction::YawLeft),
            FlightAxis::GroundSteer => (FlightAction::SteerRight, FlightAction::SteerLeft),
        };
        let mut value = 0.0;
        if self.is_held(positive) {
            value += 1.0;
        }
        if self.is_held(negative) {
            value -= 1.0;
        }
        value
    }
}
