//! End-to-end simulation test: fire a weapon, fly the projectile into a
//! wall, watch it crash, wait out the grace period and reuse the pooled
//! handle for the next shot.

use std::sync::Arc;

use bevy::ecs::world::World;
use bevy::prelude::*;
use bevy_arena_combat::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A wall spanning the plane `x = wall_x`, facing -X.
struct WallWorld {
    wall_x: f32,
    target: Entity,
}

impl RaycastWorld for WallWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _exclude: Entity,
    ) -> Option<RayHit> {
        if direction.x <= 1e-6 || origin.x >= self.wall_x {
            return None;
        }
        let distance = (self.wall_x - origin.x) / direction.x;
        if distance > max_distance {
            return None;
        }
        Some(RayHit {
            entity: self.target,
            point: origin + direction * distance,
            normal: Vec3::NEG_X,
            distance,
            body: Some(HitBody {
                entity: self.target,
                kinematic: true,
            }),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    damage: Vec<(Entity, f32, Entity)>,
}

impl HitSink for RecordingSink {
    fn apply_damage(&mut self, target: Entity, amount: f32, initiator: Entity) {
        self.damage.push((target, amount, initiator));
    }

    fn apply_impulse(&mut self, _body: Entity, _impulse: Vec3, _at: Vec3) {}
}

#[test]
fn full_combat_cycle() {
    let mut library = WeaponLibrary::default();
    let id = library
        .register(WeaponProfile {
            spread_angle: 0.0,
            rebound_chance: 0.0,
            gravity_factor: 0.0,
            projectile_lifetime: 5.0,
            magazine_size: 2,
            reserve_ammo: 4,
            ..presets::blaster()
        })
        .unwrap();
    let profile = library.get(id).unwrap().clone();

    let mut world = World::new();
    let shooter = world.spawn_empty().id();
    let wall = world.spawn_empty().id();

    let mut weapon = WeaponState::new(Arc::clone(&profile));
    let mut simulator = ProjectileSimulator::new(16);
    let mut rng = StdRng::seed_from_u64(3);
    let scene = WallWorld {
        wall_x: 10.0,
        target: wall,
    };
    let mut sink = RecordingSink::default();
    let dt = 1.0 / 60.0;

    assert!(weapon.try_fire());
    simulator
        .fire(
            shooter,
            &profile,
            Vec3::ZERO,
            Vec3::X,
            dt,
            Color::WHITE,
            &mut rng,
            || world.spawn_empty().id(),
        )
        .unwrap();
    assert_eq!(simulator.active_count(), 1);
    let handle_entity = simulator.iter_active().next().unwrap().handle.entity();

    // The spawn event goes out before any advancement.
    let events: Vec<VisualEvent> = simulator.drain_visual_events().collect();
    assert!(matches!(events.as_slice(), [VisualEvent::Spawned { .. }]));

    // 10 m at 170 m/s lands within a handful of fixed steps.
    let mut frames = 0;
    while simulator.active_count() > 0 {
        simulator.advance(dt, Vec3::ZERO, &scene, &mut sink, &mut rng);
        weapon.tick(dt);
        frames += 1;
        assert!(frames < 30, "projectile never reached the wall");
    }

    assert_eq!(sink.damage.len(), 1);
    let (target, amount, initiator) = sink.damage[0];
    assert_eq!(target, wall);
    assert_eq!(initiator, shooter);
    assert!((amount + profile.damage_per_hit).abs() < 1e-4);

    let events: Vec<VisualEvent> = simulator.drain_visual_events().collect();
    assert!(matches!(
        events.as_slice(),
        [VisualEvent::Crashed { position, .. }] if (position.x - 10.0).abs() < 1e-3
    ));
    assert_eq!(simulator.dying_count(), 1);

    // Grace period over, the handle is back in the pool.
    simulator.advance(1.1, Vec3::ZERO, &scene, &mut sink, &mut rng);
    weapon.tick(1.1);
    assert_eq!(simulator.dying_count(), 0);

    // The next shot reuses the same render entity.
    assert!(weapon.try_fire());
    simulator
        .fire(
            shooter,
            &profile,
            Vec3::ZERO,
            Vec3::X,
            dt,
            Color::WHITE,
            &mut rng,
            || world.spawn_empty().id(),
        )
        .unwrap();
    assert_eq!(simulator.iter_active().next().unwrap().handle.entity(), handle_entity);

    // That was the magazine's last round; the reload is running.
    assert_eq!(weapon.ammo_in_magazine(), 0);
    assert!(weapon.remaining_reload_normalized() > 0.0);
    weapon.tick(profile.reload_time + 0.01);
    assert_eq!(weapon.ammo_in_magazine(), 2);
    assert_eq!(weapon.ammo_reserve(), 2);
}

#[test]
fn health_and_impulse_damage_interplay() {
    let mut health = Health::new(40.0);
    let curve = ImpulseDamageCurve::default();
    let aware = ImpulseAware::default();

    // A 10-unit contact impulse scaled by 2 crosses the threshold.
    let damage = curve.damage_for(10.0 * aware.impulse_multiplier);
    assert!(damage > 0.0);

    let delta = health.add(-damage);
    assert!(delta.changed);
    assert!(!delta.died);

    let delta = health.add(-curve.damage_for(100.0));
    assert!(delta.died);
    assert!(health.is_dead());
}
