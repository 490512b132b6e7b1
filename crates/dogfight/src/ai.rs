//! Enemy pilot behaviour: seek, circle, evade.
//!
//! Seeking and Circling are re-decided from distance every tick. Evading is
//! only entered from a damage event and always ends back in Seeking.

use engine_core::{look_rotation, rotate_towards, AIState, Quat, RigidBodyState, Vec3};
use serde::{Deserialize, Serialize};

/// Remaining evasion time below this counts as expired.
const EVASION_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Maximum heading change while pursuing, degrees per second.
    pub turn_speed: f32,
    /// Thrust is applied only below this airspeed.
    pub max_speed: f32,
    /// Closer than this to the opponent the AI circles instead of seeking.
    pub avoidance_distance: f32,
    /// Circling aims this far from the opponent along the AI's right axis.
    pub circling_offset_distance: f32,
    pub evasion_duration: f32,
    /// Evasive turn rate, degrees per second.
    pub evasion_turn_speed: f32,
    /// Gun fires when the cosine to the opponent exceeds this.
    pub fire_angle_threshold: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            turn_speed: 50.0,
            max_speed: 160.0,
            avoidance_distance: 100.0,
            circling_offset_distance: 50.0,
            evasion_duration: 2.0,
            evasion_turn_speed: 90.0,
            fire_angle_threshold: 0.98,
        }
    }
}

/// What the AI wants this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiCommand {
    /// New heading, applied kinematically.
    pub rotation: Quat,
    /// 1 when below max speed, 0 otherwise.
    pub throttle: f32,
    pub fire: bool,
    /// Point steered toward, when pursuing.
    pub aim_point: Option<Vec3>,
    /// Set when the state variant changed during this update.
    pub transition: Option<(AIState, AIState)>,
}

/// AI pilot component.
#[derive(Debug, Clone, Copy)]
pub struct AiPilot {
    pub config: AiConfig,
    pub state: AIState,
}

/// Choose Seeking or Circling and the point to steer toward.
pub fn pursuit_target(position: Vec3, right: Vec3, opponent: Vec3, config: &AiConfig) -> (AIState, Vec3) {
    if position.distance(opponent) < config.avoidance_distance {
        (AIState::Circling, opponent + right * config.circling_offset_distance)
    } else {
        (AIState::Seeking, opponent)
    }
}

impl AiPilot {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            state: AIState::Seeking,
        }
    }

    /// React to being hit. Returns true if this started a new evasion.
    pub fn on_damage_taken(&mut self) -> bool {
        if self.state.is_evading() {
            return false;
        }
        self.state = AIState::Evading {
            remaining: self.config.evasion_duration,
        };
        true
    }

    /// Run one tick against the opponent's position, if there is one.
    pub fn update(&mut self, body: &RigidBodyState, opponent: Option<Vec3>, dt: f32) -> AiCommand {
        let before = self.state;
        let throttle = if body.airspeed() < self.config.max_speed { 1.0 } else { 0.0 };
        let mut command = AiCommand {
            rotation: body.rotation,
            throttle,
            fire: false,
            aim_point: None,
            transition: None,
        };

        match self.state {
            AIState::Evading { remaining } => {
                // Hard right turn about world up.
                let turn = Quat::from_rotation_y(-self.config.evasion_turn_speed.to_radians() * dt);
                command.rotation = (turn * body.rotation).normalize();
                let remaining = remaining - dt;
                self.state = if remaining <= EVASION_EPSILON {
                    AIState::Seeking
                } else {
                    AIState::Evading { remaining }
                };
            }
            AIState::Seeking | AIState::Circling => {
                if let Some(opponent) = opponent {
                    let (state, aim) = pursuit_target(body.position, body.right(), opponent, &self.config);
                    self.state = state;
                    let desired = look_rotation(aim - body.position, Vec3::Y);
                    command.rotation = rotate_towards(
                        body.rotation,
                        desired,
                        self.config.turn_speed.to_radians() * dt,
                    );
                    command.aim_point = Some(aim);

                    let forward = command.rotation * Vec3::NEG_Z;
                    let to_opponent = (opponent - body.position).normalize_or_zero();
                    command.fire = forward.dot(to_opponent) > self.config.fire_angle_threshold;
                }
            }
        }

        if std::mem::discriminant(&before) != std::mem::discriminant(&self.state) {
            log::debug!("AI state {:?} -> {:?}", before, self.state);
            command.transition = Some((before, self.state));
        }
        command
    }
}
