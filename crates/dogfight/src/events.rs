//! Events emitted by a simulation tick for the host (HUD, audio, game mode).

use engine_core::{AIState, Entity, Vec3};

/// Presentation cue. The simulation only says what happened and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectCue {
    MuzzleFlash { position: Vec3 },
    GunSound { position: Vec3 },
    MissileLaunch { position: Vec3 },
    Explosion { position: Vec3 },
}

/// Who was flying an aircraft that died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pilot {
    Player,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    HealthChanged {
        entity: Entity,
        current: f32,
        max: f32,
    },
    Died {
        entity: Entity,
        pilot: Pilot,
    },
    AiStateChanged {
        entity: Entity,
        from: AIState,
        to: AIState,
    },
    LockChanged {
        entity: Entity,
        target: Option<Entity>,
    },
    GunFired {
        shooter: Entity,
        hit: Option<Entity>,
    },
    MissileLaunched {
        shooter: Entity,
        target: Entity,
    },
    MissileDetonated {
        hit: Option<Entity>,
        position: Vec3,
    },
    MissileExpired {
        missile: Entity,
    },
    /// Short message for the player's HUD.
    Notice {
        entity: Entity,
        message: &'static str,
    },
    Effect(EffectCue),
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Victory,
    Defeat,
}

/// Counts living enemies from the event stream and decides the match.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchTally {
    living_enemies: u32,
    kills: u32,
    outcome: Option<MatchOutcome>,
}

impl MatchTally {
    pub fn new(enemies: u32) -> Self {
        Self {
            living_enemies: enemies,
            ..Default::default()
        }
    }

    /// Feed one event. The first decided outcome sticks.
    pub fn observe(&mut self, event: &SimEvent) -> Option<MatchOutcome> {
        if let SimEvent::Died { pilot, .. } = event {
            match pilot {
                Pilot::Ai => {
                    self.living_enemies = self.living_enemies.saturating_sub(1);
                    self.kills += 1;
                    if self.living_enemies == 0 && self.outcome.is_none() {
                        log::info!("All enemies destroyed");
                        self.outcome = Some(MatchOutcome::Victory);
                    }
                }
                Pilot::Player => {
                    if self.outcome.is_none() {
                        log::info!("Player destroyed");
                        self.outcome = Some(MatchOutcome::Defeat);
                    }
                }
            }
        }
        self.outcome
    }

    pub fn living_enemies(&self) -> u32 {
        self.living_enemies
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }
}
