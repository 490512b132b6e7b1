//! Arcade aerodynamic model: thrust, lift with a stall curve, parasitic and
//! induced drag, flaps, ground effect and airspeed-scaled control torques.
//!
//! Everything here is a pure function of the body snapshot, pilot controls,
//! airframe tuning and two environment flags. Forces are in newtons; the
//! torque is an angular acceleration (rad/s²) applied as a velocity change.

use engine_core::{angle_between, map_range_clamped, ControlInputs, RigidBodyState, Vec3};
use serde::{Deserialize, Serialize};

/// Shape of the lift coefficient below the critical angle of attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiftCurve {
    /// `aoa / critical`.
    Linear,
    /// `sin(aoa / critical * π/2)`; steeper at low angles.
    Sine,
}

/// Per-airframe aerodynamic tuning. Rotation speeds are in degrees per second².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AeroConfig {
    pub max_thrust: f32,
    pub pitch_speed: f32,
    pub roll_speed: f32,
    pub yaw_speed: f32,
    pub ground_steer_speed: f32,
    pub lift_coefficient: f32,
    /// Residual lift coefficient once the wing has stalled.
    pub stall_lift_coefficient: f32,
    pub drag_coefficient: f32,
    pub induced_drag_coefficient: f32,
    pub critical_angle_of_attack_degrees: f32,
    pub lift_curve: LiftCurve,
    /// Share of yaw authority added per unit roll input (coordinated turn).
    pub roll_yaw_factor: f32,
    pub flaps_lift_multiplier: f32,
    pub flaps_drag_multiplier: f32,
    pub ground_effect_altitude: f32,
    pub ground_effect_lift_multiplier: f32,
    /// Airspeed at which control surfaces reach full authority.
    pub control_reference_speed: f32,
    /// Below this airspeed no lift, drag or control torque is produced.
    pub min_airspeed: f32,
}

impl Default for AeroConfig {
    fn default() -> Self {
        Self {
            max_thrust: 175_500.0,
            pitch_speed: 30.0,
            roll_speed: 80.0,
            yaw_speed: 10.0,
            ground_steer_speed: 80.0,
            lift_coefficient: 12.0,
            stall_lift_coefficient: 0.6,
            drag_coefficient: 1.5,
            induced_drag_coefficient: 0.02,
            critical_angle_of_attack_degrees: 15.0,
            lift_curve: LiftCurve::Linear,
            roll_yaw_factor: 0.15,
            flaps_lift_multiplier: 1.75,
            flaps_drag_multiplier: 2.0,
            ground_effect_altitude: 15.0,
            ground_effect_lift_multiplier: 1.5,
            control_reference_speed: 150.0,
            min_airspeed: 1.0,
        }
    }
}

impl AeroConfig {
    /// Reduced-fidelity tuning: no induced drag, no flaps or ground-effect bonus.
    /// Same algorithm, simpler behaviour.
    pub fn simplified() -> Self {
        Self {
            induced_drag_coefficient: 0.0,
            flaps_lift_multiplier: 1.0,
            flaps_drag_multiplier: 1.0,
            ground_effect_lift_multiplier: 1.0,
            roll_yaw_factor: 0.0,
            ..Self::default()
        }
    }
}

/// Environment flags sampled by the host each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AeroEnvironment {
    pub on_ground: bool,
    pub altitude: f32,
}

/// Forces and torque for one tick, plus the intermediate terms.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AeroOutput {
    pub force: Vec3,
    pub torque: Vec3,
    pub thrust: Vec3,
    pub lift: Vec3,
    pub drag: Vec3,
    pub control_torque: Vec3,
    pub ground_steer_torque: Vec3,
    pub angle_of_attack_degrees: f32,
    pub lift_coefficient: f32,
    pub control_effectiveness: f32,
    pub stalled: bool,
}

/// Lift coefficient for an angle of attack (degrees), before flaps and ground effect.
pub fn lift_coefficient(config: &AeroConfig, angle_of_attack_degrees: f32) -> f32 {
    let critical = config.critical_angle_of_attack_degrees;
    if critical <= 0.0 || angle_of_attack_degrees >= critical {
        return config.stall_lift_coefficient;
    }
    let t = (angle_of_attack_degrees / critical).clamp(0.0, 1.0);
    let shape = match config.lift_curve {
        LiftCurve::Linear => t,
        LiftCurve::Sine => (t * std::f32::consts::FRAC_PI_2).sin(),
    };
    shape * config.lift_coefficient
}

/// Control authority in [0, 1]: 0 when stationary, 1 at the reference speed and above.
pub fn control_effectiveness(config: &AeroConfig, airspeed: f32) -> f32 {
    map_range_clamped(airspeed, 0.0, config.control_reference_speed, 0.0, 1.0)
}

/// Compute this tick's force and torque for one aircraft.
pub fn compute_aero_forces(
    body: &RigidBodyState,
    controls: &ControlInputs,
    config: &AeroConfig,
    env: AeroEnvironment,
) -> AeroOutput {
    let forward = body.forward();
    let right = body.right();
    let up = body.up();

    let mut out = AeroOutput {
        thrust: forward * controls.current_throttle * config.max_thrust,
        ..Default::default()
    };

    // Positive yaw and steer turn the nose right, i.e. about -up.
    if env.on_ground {
        out.ground_steer_torque =
            -up * controls.ground_steer * config.ground_steer_speed.to_radians();
    }

    let airspeed = body.airspeed();
    if airspeed >= config.min_airspeed.max(f32::EPSILON) {
        let velocity_dir = body.linear_velocity.normalize_or_zero();
        let effectiveness = control_effectiveness(config, airspeed);
        out.control_effectiveness = effectiveness;

        if !env.on_ground {
            let aoa = angle_between(velocity_dir, forward).to_degrees();
            let base_cl = lift_coefficient(config, aoa);
            out.angle_of_attack_degrees = aoa;
            out.stalled = aoa >= config.critical_angle_of_attack_degrees;

            let mut cl = base_cl;
            let mut cd = config.drag_coefficient;
            if controls.flaps_deployed {
                cl *= config.flaps_lift_multiplier;
                cd *= config.flaps_drag_multiplier;
            }
            if env.altitude < config.ground_effect_altitude {
                cl *= config.ground_effect_lift_multiplier;
            }
            out.lift_coefficient = cl;

            let speed_sq = airspeed * airspeed;
            let mut lift_dir = right.cross(velocity_dir).normalize_or_zero();
            if lift_dir.dot(up) < 0.0 {
                lift_dir = -lift_dir;
            }
            out.lift = lift_dir * speed_sq * cl;

            let parasitic = -velocity_dir * speed_sq * cd;
            let induced =
                -velocity_dir * speed_sq * (base_cl * base_cl * config.induced_drag_coefficient);
            out.drag = parasitic + induced;
        }

        let pitch = right * controls.pitch * config.pitch_speed.to_radians();
        let roll = forward * controls.roll * config.roll_speed.to_radians();
        let yaw_input = if env.on_ground {
            0.0
        } else {
            controls.yaw + controls.roll * config.roll_yaw_factor
        };
        let yaw = -up * yaw_input * config.yaw_speed.to_radians();
        out.control_torque = (pitch + roll + yaw) * effectiveness;
    }

    out.force = out.thrust + out.lift + out.drag;
    out.torque = out.control_torque + out.ground_steer_torque;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Quat;

    fn level_body(velocity: Vec3) -> RigidBodyState {
        RigidBodyState {
            position: Vec3::new(0.0, 1000.0, 0.0),
            linear_velocity: velocity,
            mass: 15_000.0,
            ..Default::default()
        }
    }

    fn airborne() -> AeroEnvironment {
        AeroEnvironment {
            on_ground: false,
            altitude: 1000.0,
        }
    }

    /// Velocity at `aoa` degrees below the nose (nose pitched up relative to flight path).
    fn velocity_at_aoa(speed: f32, aoa_degrees: f32) -> Vec3 {
        let a = aoa_degrees.to_radians();
        Vec3::new(0.0, -a.sin(), -a.cos()) * speed
    }

    #[test]
    fn zero_airspeed_gives_thrust_only() {
        let body = level_body(Vec3::ZERO);
        let mut controls = ControlInputs::default();
        controls.set_throttle(0.8);
        controls.set_axes(1.0, 1.0, 1.0, 0.0);
        let config = AeroConfig::default();

        let out = compute_aero_forces(&body, &controls, &config, airborne());
        assert_eq!(out.lift, Vec3::ZERO);
        assert_eq!(out.drag, Vec3::ZERO);
        assert_eq!(out.control_torque, Vec3::ZERO);
        assert!((out.thrust - Vec3::NEG_Z * 0.8 * config.max_thrust).length() < 1e-2);
        assert_eq!(out.force, out.thrust);
        assert!(out.force.is_finite() && out.torque.is_finite());
    }

    #[test]
    fn below_min_airspeed_skips_aero_terms() {
        let body = level_body(Vec3::new(0.0, 0.0, -0.5));
        let out = compute_aero_forces(&body, &ControlInputs::default(), &AeroConfig::default(), airborne());
        assert_eq!(out.lift, Vec3::ZERO);
        assert_eq!(out.drag, Vec3::ZERO);
    }

    #[test]
    fn lift_ramps_then_collapses_at_critical_angle() {
        let config = AeroConfig::default();
        assert_eq!(lift_coefficient(&config, 0.0), 0.0);
        assert!((lift_coefficient(&config, 7.5) - 6.0).abs() < 1e-4);
        assert!(lift_coefficient(&config, 14.9) > lift_coefficient(&config, 10.0));
        assert_eq!(lift_coefficient(&config, 15.0), config.stall_lift_coefficient);
        assert_eq!(lift_coefficient(&config, 60.0), config.stall_lift_coefficient);
        // No hysteresis: back under the critical angle, lift returns immediately.
        assert!(lift_coefficient(&config, 14.0) > config.stall_lift_coefficient);
    }

    #[test]
    fn sine_curve_is_steeper_early() {
        let linear = AeroConfig::default();
        let sine = AeroConfig {
            lift_curve: LiftCurve::Sine,
            ..linear
        };
        assert!(lift_coefficient(&sine, 5.0) > lift_coefficient(&linear, 5.0));
        assert!((lift_coefficient(&sine, 14.999) - sine.lift_coefficient).abs() < 0.01);
    }

    #[test]
    fn lift_points_up_and_drag_opposes_velocity() {
        let velocity = velocity_at_aoa(150.0, 8.0);
        let body = level_body(velocity);
        let out = compute_aero_forces(&body, &ControlInputs::default(), &AeroConfig::default(), airborne());

        assert!(out.lift.y > 0.0);
        assert!(out.lift.dot(velocity).abs() < 1e-2 * out.lift.length() * velocity.length());
        assert!(out.drag.dot(velocity) < 0.0);
        assert!(!out.stalled);
        assert!((out.angle_of_attack_degrees - 8.0).abs() < 0.05);
    }

    #[test]
    fn stall_drops_lift() {
        let config = AeroConfig::default();
        let pre = compute_aero_forces(&level_body(velocity_at_aoa(150.0, 14.0)), &ControlInputs::default(), &config, airborne());
        let post = compute_aero_forces(&level_body(velocity_at_aoa(150.0, 16.0)), &ControlInputs::default(), &config, airborne());
        assert!(post.stalled);
        assert!(post.lift.length() < pre.lift.length() * 0.1);
    }

    #[test]
    fn flaps_and_ground_effect_multiply_lift() {
        let config = AeroConfig::default();
        let body = level_body(velocity_at_aoa(100.0, 5.0));
        let clean = compute_aero_forces(&body, &ControlInputs::default(), &config, airborne());

        let mut flaps = ControlInputs::default();
        flaps.flaps_deployed = true;
        let with_flaps = compute_aero_forces(&body, &flaps, &config, airborne());
        let ratio = with_flaps.lift.length() / clean.lift.length();
        assert!((ratio - config.flaps_lift_multiplier).abs() < 1e-3);
        assert!(with_flaps.drag.length() > clean.drag.length());

        let low = AeroEnvironment {
            on_ground: false,
            altitude: 5.0,
        };
        let ground_effect = compute_aero_forces(&body, &ControlInputs::default(), &config, low);
        let ratio = ground_effect.lift.length() / clean.lift.length();
        assert!((ratio - config.ground_effect_lift_multiplier).abs() < 1e-3);
    }

    #[test]
    fn induced_drag_vanishes_in_simplified_config() {
        let body = level_body(velocity_at_aoa(120.0, 10.0));
        let full = compute_aero_forces(&body, &ControlInputs::default(), &AeroConfig::default(), airborne());
        let simple = compute_aero_forces(&body, &ControlInputs::default(), &AeroConfig::simplified(), airborne());
        let parasitic = 120.0 * 120.0 * AeroConfig::default().drag_coefficient;
        assert!((simple.drag.length() - parasitic).abs() < 1.0);
        assert!(full.drag.length() > simple.drag.length());
    }

    #[test]
    fn control_authority_scales_with_airspeed() {
        let config = AeroConfig::default();
        assert_eq!(control_effectiveness(&config, 0.0), 0.0);
        assert!((control_effectiveness(&config, 75.0) - 0.5).abs() < 1e-6);
        assert_eq!(control_effectiveness(&config, 400.0), 1.0);

        let mut controls = ControlInputs::default();
        controls.set_axes(1.0, 0.0, 0.0, 0.0);
        let slow = compute_aero_forces(&level_body(Vec3::NEG_Z * 30.0), &controls, &config, airborne());
        let fast = compute_aero_forces(&level_body(Vec3::NEG_Z * 300.0), &controls, &config, airborne());
        assert!(slow.control_torque.length() < fast.control_torque.length());
        // Pitch acts about the right axis (+X at identity).
        assert!((fast.control_torque.normalize() - Vec3::X).length() < 1e-5);
        assert!((fast.control_torque.length() - config.pitch_speed.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn roll_adds_coordinated_yaw() {
        let config = AeroConfig::default();
        let mut controls = ControlInputs::default();
        controls.set_axes(0.0, 1.0, 0.0, 0.0);
        let out = compute_aero_forces(&level_body(Vec3::NEG_Z * 300.0), &controls, &config, airborne());
        let expected_yaw = config.roll_yaw_factor * config.yaw_speed.to_radians();
        // Roll about forward (-Z), coordinated yaw about -up (-Y).
        assert!((out.control_torque.z + config.roll_speed.to_radians()).abs() < 1e-5);
        assert!((out.control_torque.y + expected_yaw).abs() < 1e-5);
    }

    #[test]
    fn on_ground_steers_and_suppresses_lift() {
        let config = AeroConfig::default();
        let mut controls = ControlInputs::default();
        controls.set_throttle(1.0);
        controls.set_axes(0.0, 0.0, 1.0, 1.0);
        let env = AeroEnvironment {
            on_ground: true,
            altitude: 1.0,
        };

        let rolling = compute_aero_forces(&level_body(velocity_at_aoa(60.0, 5.0)), &controls, &config, env);
        assert_eq!(rolling.lift, Vec3::ZERO);
        assert_eq!(rolling.drag, Vec3::ZERO);
        assert!((rolling.ground_steer_torque - Vec3::NEG_Y * config.ground_steer_speed.to_radians()).length() < 1e-5);
        // Yaw input is replaced by steering, not added to it.
        assert!(rolling.control_torque.y.abs() < 1e-6);

        // Steering still works when parked.
        let parked = compute_aero_forces(&level_body(Vec3::ZERO), &controls, &config, env);
        assert!(parked.ground_steer_torque.length() > 0.0);
        assert!(parked.thrust.length() > 0.0);
    }

    #[test]
    fn rotated_body_thrusts_along_its_nose() {
        let mut body = level_body(Vec3::ZERO);
        body.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let mut controls = ControlInputs::default();
        controls.set_throttle(1.0);
        let out = compute_aero_forces(&body, &controls, &AeroConfig::default(), airborne());
        assert!((out.thrust.normalize() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn degenerate_velocity_stays_finite() {
        let body = level_body(Vec3::new(1e-3, 1.0000001, -1e-4));
        let out = compute_aero_forces(&body, &ControlInputs::default(), &AeroConfig::default(), airborne());
        assert!(out.force.is_finite());
        assert!(out.torque.is_finite());
        assert!(out.angle_of_attack_degrees.is_finite());
    }
}
