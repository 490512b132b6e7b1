//! Missile lock acquisition.
//!
//! Locks are recomputed from scratch every tick: no hysteresis, and a lock
//! is only ever a weak reference that callers re-validate before use.

use engine_core::{Entity, Faction, Health, Transform, Vec3, World};

use crate::events::SimEvent;
use crate::health::is_alive;

/// Current missile lock of an aircraft.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetLock {
    pub target: Option<Entity>,
}

impl TargetLock {
    /// The locked entity, if it still exists and is alive.
    pub fn valid_target(&self, world: &World) -> Option<Entity> {
        self.target.filter(|t| is_alive(world, *t))
    }
}

/// Pick the candidate most centred in the forward cone.
///
/// A candidate qualifies when the cosine between `forward` and the direction
/// to it is at least `min_cos`. Among qualifying candidates the largest
/// cosine wins; the first one seen wins a tie.
pub fn select_lock(
    origin: Vec3,
    forward: Vec3,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
    min_cos: f32,
) -> Option<Entity> {
    let forward = forward.normalize_or_zero();
    let mut best: Option<(Entity, f32)> = None;
    for (entity, position) in candidates {
        let to_candidate = (position - origin).normalize_or_zero();
        if to_candidate == Vec3::ZERO {
            continue;
        }
        let dot = forward.dot(to_candidate);
        if dot < min_cos {
            continue;
        }
        if best.map_or(true, |(_, score)| dot > score) {
            best = Some((entity, dot));
        }
    }
    best.map(|(entity, _)| entity)
}

/// Recompute every aircraft's lock against living hostile aircraft.
pub fn update_locks(world: &mut World, min_cos: f32, events: &mut Vec<SimEvent>) {
    let candidates: Vec<(Entity, Vec3, Faction)> = world
        .query::<(&Transform, &Faction, &Health)>()
        .iter()
        .filter(|(_, (_, _, health))| !health.is_dead())
        .map(|(entity, (transform, faction, _))| (entity, transform.position, *faction))
        .collect();

    for (entity, (transform, faction, health, lock)) in
        world.query_mut::<(&Transform, &Faction, &Health, &mut TargetLock)>()
    {
        let target = if health.is_dead() {
            None
        } else {
            let hostile = candidates
                .iter()
                .filter(|(other, _, other_faction)| *other != entity && faction.is_hostile_to(*other_faction))
                .map(|(other, position, _)| (*other, *position));
            select_lock(transform.position, transform.forward(), hostile, min_cos)
        };
        if lock.target != target {
            lock.target = target;
            events.push(SimEvent::LockChanged { entity, target });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> (World, Vec<Entity>) {
        let mut world = World::new();
        let list = (0..n).map(|_| world.spawn((0u8,))).collect();
        (world, list)
    }

    #[test]
    fn most_centred_candidate_wins() {
        let (_world, e) = entities(3);
        let candidates = [
            (e[0], Vec3::new(50.0, 0.0, -100.0)),
            (e[1], Vec3::new(5.0, 0.0, -100.0)),
            (e[2], Vec3::new(-30.0, 0.0, -100.0)),
        ];
        assert_eq!(select_lock(Vec3::ZERO, Vec3::NEG_Z, candidates, 0.8), Some(e[1]));
    }

    #[test]
    fn cone_threshold_is_inclusive() {
        let (_world, e) = entities(2);
        let dead_ahead = (e[0], Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(select_lock(Vec3::ZERO, Vec3::NEG_Z, [dead_ahead], 1.0), Some(e[0]));

        let outside = (e[1], Vec3::new(4.0, 0.0, -3.0));
        assert_eq!(select_lock(Vec3::ZERO, Vec3::NEG_Z, [outside], 0.8), None);
    }

    #[test]
    fn nothing_behind_is_locked() {
        let (_world, e) = entities(1);
        assert_eq!(
            select_lock(Vec3::ZERO, Vec3::NEG_Z, [(e[0], Vec3::new(0.0, 0.0, 100.0))], 0.8),
            None
        );
    }

    #[test]
    fn locks_only_living_hostiles_and_clears() {
        let mut world = World::new();
        let player = world.spawn((
            Transform::default(),
            Faction::Player,
            Health::new(100.0),
            TargetLock::default(),
        ));
        let _wingman = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, -50.0)),
            Faction::Player,
            Health::new(100.0),
        ));
        let enemy = world.spawn((
            Transform::from_position(Vec3::new(0.0, 5.0, -300.0)),
            Faction::Enemy,
            Health::new(100.0),
        ));
        let mut events = Vec::new();

        update_locks(&mut world, 0.8, &mut events);
        assert_eq!(world.get::<&TargetLock>(player).unwrap().target, Some(enemy));
        assert_eq!(events, vec![SimEvent::LockChanged { entity: player, target: Some(enemy) }]);

        world.get::<&mut Health>(enemy).unwrap().take_damage(100.0);
        update_locks(&mut world, 0.8, &mut events);
        assert_eq!(world.get::<&TargetLock>(player).unwrap().target, None);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn stale_lock_is_not_valid() {
        let mut world = World::new();
        let enemy = world.spawn((Health::new(100.0),));
        let lock = TargetLock { target: Some(enemy) };
        assert_eq!(lock.valid_target(&world), Some(enemy));
        world.despawn(enemy).unwrap();
        assert_eq!(lock.valid_target(&world), None);
    }
}
