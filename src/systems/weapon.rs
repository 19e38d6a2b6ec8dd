//! Weapon ticking and fire-request processing.

use avian3d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::components::{EquippedWeapon, FireControl, Team};
use crate::events::WeaponFired;
use crate::projectile::ProjectileSimulator;
use crate::resources::SimRng;

/// Advance cooldown and reload timers on every equipped weapon.
pub fn tick_weapon_states(time: Res<Time>, mut weapons: Query<&mut EquippedWeapon>) {
    let dt = time.delta_secs();
    for mut weapon in weapons.iter_mut() {
        weapon.0.tick(dt);
    }
}

/// Process trigger intents: attempt a shot for each requesting actor, spawn
/// projectiles through the simulator, apply recoil and resolve the request.
///
/// Render entities backing new projectiles spawn hidden here; the sync system
/// places and reveals them when it drains the spawn event.
pub fn process_fire_requests(
    mut commands: Commands,
    time: Res<Time>,
    mut simulator: ResMut<ProjectileSimulator>,
    mut rng: ResMut<SimRng>,
    mut fired: MessageWriter<WeaponFired>,
    mut actors: Query<(
        Entity,
        &mut FireControl,
        &mut EquippedWeapon,
        Option<&Team>,
        Option<&mut LinearVelocity>,
    )>,
) {
    let dt = time.delta_secs();
    for (entity, mut control, mut weapon, team, velocity) in actors.iter_mut() {
        if !control.request.is_requested() {
            continue;
        }

        if !weapon.0.try_fire() {
            control.request.resolve(false);
            continue;
        }

        let profile = weapon.0.profile().clone();
        let color = team.map(Team::color).unwrap_or(Color::WHITE);
        let result = simulator.fire(
            entity,
            &profile,
            control.origin,
            control.aim,
            dt,
            color,
            &mut rng.0,
            || spawn_projectile_entity(&mut commands),
        );

        match result {
            Ok(back_impulse) => {
                if let Some(mut velocity) = velocity {
                    velocity.0 += back_impulse;
                }
                fired.write(WeaponFired {
                    shooter: entity,
                    archetype: profile.archetype,
                    pellets: profile.num_pellets,
                    back_impulse,
                });
            }
            Err(err) => {
                warn!("shot from {entity} dropped: {err}");
            }
        }
        // The attempt concluded either way; an exhausted pool must not keep
        // a finish-when-ready request spinning.
        control.request.resolve(true);
    }
}

fn spawn_projectile_entity(commands: &mut Commands) -> Entity {
    commands
        .spawn((Transform::default(), Visibility::Hidden))
        .id()
}

/// Muzzle frame helper: aim along an actor's forward axis from an offset in
/// its local space.
pub fn muzzle_from_transform(transform: &Transform, local_offset: Vec3) -> (Vec3, Vec3) {
    let origin = transform.translation + transform.rotation * local_offset;
    (origin, transform.forward().as_vec3())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muzzle_offset_rotates_with_the_actor() {
        let transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let (origin, aim) = muzzle_from_transform(&transform, Vec3::new(0.0, 0.5, -1.0));

        // Local -Z turns into world -X under a quarter turn around Y.
        assert!(aim.abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 2.5, 3.0), 1e-5));
    }
}
