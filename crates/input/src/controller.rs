//! Converts held/pressed flight actions into pilot control inputs.

use engine_core::{interp_to, ControlInputs};
use serde::{Deserialize, Serialize};

use crate::{FlightAction, FlightAxis, InputState};

/// How throttle input is integrated over time.
///
/// Only throttle is smoothed; rotational axes always follow input directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThrottleModel {
    /// Input moves the *target* throttle; the actual throttle eases toward it.
    Sticky {
        /// Target change per second at full input.
        ramp_speed: f32,
        /// Interpolation speed of current throttle toward target.
        interp_speed: f32,
    },
    /// Input moves the actual throttle directly.
    Direct {
        /// Throttle change per second at full input.
        acceleration: f32,
    },
}

impl Default for ThrottleModel {
    fn default() -> Self {
        ThrottleModel::Direct { acceleration: 0.5 }
    }
}

/// One-shot requests produced by a controller update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlEdges {
    pub fire_missile: bool,
    pub flaps_toggled: bool,
}

/// Turns raw input into [`ControlInputs`] once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlInputController {
    model: ThrottleModel,
}

impl ControlInputController {
    pub fn new(model: ThrottleModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> ThrottleModel {
        self.model
    }

    /// Apply one tick of input to `controls`.
    pub fn update(&self, input: &InputState, controls: &mut ControlInputs, dt: f32) -> ControlEdges {
        let dt = dt.max(0.0);
        self.update_throttle(input.axis(FlightAxis::Throttle), controls, dt);

        // Digital bindings read 0 once released; analog axes track the stick.
        controls.set_axes(
            input.axis(FlightAxis::Pitch),
            input.axis(FlightAxis::Roll),
            input.axis(FlightAxis::Yaw),
            input.axis(FlightAxis::GroundSteer),
        );

        let flaps_toggled = input.is_pressed(FlightAction::ToggleFlaps);
        if flaps_toggled {
            controls.flaps_deployed = !controls.flaps_deployed;
            log::debug!(
                "Flaps {}",
                if controls.flaps_deployed { "deployed" } else { "retracted" }
            );
        }
        controls.firing = input.is_held(FlightAction::FireGun);

        ControlEdges {
            fire_missile: input.is_pressed(FlightAction::FireMissile),
            flaps_toggled,
        }
    }

    fn update_throttle(&self, throttle_input: f32, controls: &mut ControlInputs, dt: f32) {
        match self.model {
            ThrottleModel::Sticky {
                ramp_speed,
                interp_speed,
            } => {
                controls.set_throttle_target(controls.throttle_target + throttle_input * ramp_speed * dt);
                let current = interp_to(controls.current_throttle, controls.throttle_target, dt, interp_speed);
                controls.set_current_throttle(current);
            }
            ThrottleModel::Direct { acceleration } => {
                controls.set_throttle(controls.current_throttle + throttle_input * acceleration * dt);
            }
        }
    }
}
