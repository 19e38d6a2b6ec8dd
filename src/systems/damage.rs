//! Impulse-based damage from physical contacts.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::damage::{Health, ImpulseAware};
use crate::events::{CollisionImpulse, Died, HealthChanged};

/// Turn reported contact impulses into health loss on impulse-aware
/// entities, running the scaled impulse through the entity's damage curve.
pub fn apply_collision_impulse_damage(
    mut impacts: MessageReader<CollisionImpulse>,
    mut targets: Query<(&ImpulseAware, &mut Health)>,
    mut health_changed: MessageWriter<HealthChanged>,
    mut deaths: MessageWriter<Died>,
) {
    for impact in impacts.read() {
        let Ok((aware, mut health)) = targets.get_mut(impact.entity) else {
            continue;
        };

        let damage = aware
            .curve
            .damage_for(impact.impulse * aware.impulse_multiplier);
        if damage <= 0.0 {
            continue;
        }

        let delta = health.add(-damage);
        if delta.changed {
            health_changed.write(HealthChanged {
                entity: impact.entity,
                current: health.current(),
                max: health.max(),
            });
        }
        if delta.died {
            deaths.write(Died {
                entity: impact.entity,
                attacker: None,
            });
        }
    }
}
