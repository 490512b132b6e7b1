//! Damage resolution and death handling for aircraft.

use engine_core::{Damage, DamageOutcome, Entity, Health, Player, World};

use crate::ai::AiPilot;
use crate::events::{Pilot, SimEvent};
use crate::weapons::Gun;

/// Apply one hit to `target`.
///
/// A target that no longer exists, or has no health, is ignored. Any damage
/// to an AI aircraft puts it into evasion and holds its fire. A kill stops the victim's gun and
/// emits [`SimEvent::Died`] exactly once; removal from the world happens at
/// the end of the tick.
pub fn apply_damage(
    world: &mut World,
    target: Entity,
    damage: Damage,
    events: &mut Vec<SimEvent>,
) -> DamageOutcome {
    if !world.contains(target) {
        return DamageOutcome::Ignored;
    }
    let (outcome, max) = match world.get::<&mut Health>(target) {
        Ok(mut health) => (health.take_damage(damage.amount), health.max()),
        Err(_) => return DamageOutcome::Ignored,
    };

    match outcome {
        DamageOutcome::Ignored => {}
        DamageOutcome::Damaged { new_health } => {
            events.push(SimEvent::HealthChanged {
                entity: target,
                current: new_health,
                max,
            });
            if let Ok(mut pilot) = world.get::<&mut AiPilot>(target) {
                let from = pilot.state;
                if pilot.on_damage_taken() {
                    log::debug!("{:?} evading after {:?} hit", target, damage.damage_type);
                    if let Ok(mut gun) = world.get::<&mut Gun>(target) {
                        gun.stop_fire();
                    }
                    events.push(SimEvent::AiStateChanged {
                        entity: target,
                        from,
                        to: pilot.state,
                    });
                }
            }
        }
        DamageOutcome::Killed => {
            events.push(SimEvent::HealthChanged {
                entity: target,
                current: 0.0,
                max,
            });
            let pilot = if world.get::<&Player>(target).is_ok() {
                Pilot::Player
            } else {
                Pilot::Ai
            };
            log::info!("{:?} ({:?}) destroyed by {:?}", target, pilot, damage.damage_type);
            if let Ok(mut gun) = world.get::<&mut Gun>(target) {
                gun.stop_fire();
            }
            events.push(SimEvent::Died {
                entity: target,
                pilot,
            });
        }
    }
    outcome
}

/// Whether `entity` exists and is still alive.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Health>(entity)
        .map(|h| !h.is_dead())
        .unwrap_or(false)
}
