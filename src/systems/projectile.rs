//! Projectile advancement against the physics world, and the sync system
//! that mirrors simulator state onto the pooled render entities.

use avian3d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::components::{Crashed, ProjectileVisual};
use crate::damage::Health;
use crate::events::{Died, HealthChanged, ProjectileHit};
use crate::projectile::{ProjectileSimulator, VisualEvent};
use crate::resources::{CombatConfig, SimRng};
use crate::types::{HitBody, RayHit, RaycastWorld};

/// [`RaycastWorld`] over avian's spatial query pipeline, filtered to the
/// configured interaction layers.
struct AvianRayWorld<'a, 'w1, 's1, 'w2, 's2> {
    spatial: &'a SpatialQuery<'w1, 's1>,
    bodies: &'a Query<'w2, 's2, &'static RigidBody>,
    mask: u32,
}

impl RaycastWorld for AvianRayWorld<'_, '_, '_, '_, '_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Entity,
    ) -> Option<RayHit> {
        let direction = Dir3::new(direction).ok()?;
        let filter =
            SpatialQueryFilter::from_mask(LayerMask(self.mask)).with_excluded_entities([exclude]);
        let hit = self
            .spatial
            .cast_ray(origin, direction, max_distance, true, &filter)?;

        let body = self.bodies.get(hit.entity).ok().map(|body| HitBody {
            entity: hit.entity,
            kinematic: !matches!(body, RigidBody::Dynamic),
        });
        Some(RayHit {
            entity: hit.entity,
            point: origin + *direction * hit.distance,
            normal: hit.normal,
            distance: hit.distance,
            body,
        })
    }
}

/// [`crate::types::HitSink`] over the live ECS world: impulses land on
/// `LinearVelocity`, damage resolves `Health` on the hit entity or its
/// nearest ancestor, and the outcome fans out as messages.
struct WorldHitSink<'a, 'w1, 's1, 'w2, 's2, 'w3, 's3, 'w4, 'w5, 'w6> {
    velocities: &'a mut Query<'w1, 's1, &'static mut LinearVelocity>,
    healths: &'a mut Query<'w2, 's2, &'static mut Health>,
    parents: &'a Query<'w3, 's3, &'static ChildOf>,
    hits: &'a mut MessageWriter<'w4, ProjectileHit>,
    health_changed: &'a mut MessageWriter<'w5, HealthChanged>,
    deaths: &'a mut MessageWriter<'w6, Died>,
}

impl WorldHitSink<'_, '_, '_, '_, '_, '_, '_, '_, '_, '_> {
    /// Walk up the hierarchy to the first entity carrying `Health`.
    fn health_carrier(&self, start: Entity) -> Option<Entity> {
        let mut entity = start;
        loop {
            if self.healths.contains(entity) {
                return Some(entity);
            }
            entity = self.parents.get(entity).ok()?.parent();
        }
    }
}

impl crate::types::HitSink for WorldHitSink<'_, '_, '_, '_, '_, '_, '_, '_, '_, '_> {
    fn apply_damage(&mut self, target: Entity, amount: f32, initiator: Entity) {
        let Some(carrier) = self.health_carrier(target) else {
            return;
        };
        let Ok(mut health) = self.healths.get_mut(carrier) else {
            return;
        };

        let delta = health.add(amount);
        if !delta.changed {
            return;
        }
        if amount < 0.0 {
            self.hits.write(ProjectileHit {
                target: carrier,
                initiator,
                damage: -amount,
            });
        }
        self.health_changed.write(HealthChanged {
            entity: carrier,
            current: health.current(),
            max: health.max(),
        });
        if delta.died {
            self.deaths.write(Died {
                entity: carrier,
                attacker: Some(initiator),
            });
        }
    }

    fn apply_impulse(&mut self, body: Entity, impulse: Vec3, _at: Vec3) {
        if let Ok(mut velocity) = self.velocities.get_mut(body) {
            velocity.0 += impulse;
        }
    }
}

/// Step the projectile simulator by the fixed delta against the physics
/// world. Gated on the spatial query pipeline existing.
#[allow(clippy::too_many_arguments)]
pub fn advance_projectiles(
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut simulator: ResMut<ProjectileSimulator>,
    mut rng: ResMut<SimRng>,
    spatial: SpatialQuery,
    bodies: Query<&'static RigidBody>,
    mut velocities: Query<&'static mut LinearVelocity>,
    mut healths: Query<&'static mut Health>,
    parents: Query<&'static ChildOf>,
    mut hits: MessageWriter<ProjectileHit>,
    mut health_changed: MessageWriter<HealthChanged>,
    mut deaths: MessageWriter<Died>,
) {
    let world = AvianRayWorld {
        spatial: &spatial,
        bodies: &bodies,
        mask: config.interaction_mask,
    };
    let mut sink = WorldHitSink {
        velocities: &mut velocities,
        healths: &mut healths,
        parents: &parents,
        hits: &mut hits,
        health_changed: &mut health_changed,
        deaths: &mut deaths,
    };
    simulator.advance(time.delta_secs(), config.gravity, &world, &mut sink, &mut rng.0);
}

/// Mirror simulator state onto the pooled render entities: apply the queued
/// lifecycle events, then drag every live projectile's transform along.
pub fn sync_projectile_visuals(
    mut commands: Commands,
    mut simulator: ResMut<ProjectileSimulator>,
    mut visuals: Query<(&mut Transform, &mut Visibility)>,
) {
    let events: Vec<VisualEvent> = simulator.drain_visual_events().collect();
    for event in events {
        match event {
            VisualEvent::Spawned {
                entity,
                position,
                direction,
                color,
            } => {
                if let Ok((mut transform, mut visibility)) = visuals.get_mut(entity) {
                    transform.translation = position;
                    transform.look_to(direction, Vec3::Y);
                    *visibility = Visibility::Visible;
                }
                commands
                    .entity(entity)
                    .insert(ProjectileVisual { color })
                    .remove::<Crashed>();
            }
            VisualEvent::Hidden { entity } => {
                if let Ok((_, mut visibility)) = visuals.get_mut(entity) {
                    *visibility = Visibility::Hidden;
                }
            }
            VisualEvent::Crashed { entity, position } => {
                if let Ok((mut transform, _)) = visuals.get_mut(entity) {
                    transform.translation = position;
                }
                commands.entity(entity).insert(Crashed);
            }
            VisualEvent::Discarded { entity } => {
                commands.entity(entity).despawn();
            }
        }
    }

    for record in simulator.iter_active() {
        if let Ok((mut transform, _)) = visuals.get_mut(record.handle.entity()) {
            transform.translation = record.position;
            transform.look_to(record.velocity, Vec3::Y);
        }
    }
}
