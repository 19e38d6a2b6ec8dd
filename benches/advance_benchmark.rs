//! Benchmark for the projectile advance loop.

use std::sync::Arc;

use bevy::ecs::world::World;
use bevy::prelude::*;
use bevy_arena_combat::prelude::*;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

struct EmptyWorld;

impl RaycastWorld for EmptyWorld {
    fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: Entity) -> Option<RayHit> {
        None
    }
}

struct NullSink;

impl HitSink for NullSink {
    fn apply_damage(&mut self, _: Entity, _: f32, _: Entity) {}
    fn apply_impulse(&mut self, _: Entity, _: Vec3, _: Vec3) {}
}

fn populated_simulator(count: usize) -> ProjectileSimulator {
    let profile = Arc::new(WeaponProfile {
        spread_angle: 0.3,
        projectile_lifetime: 1000.0,
        ..presets::blaster()
    });

    let mut world = World::new();
    let shooter = world.spawn_empty().id();
    let mut simulator = ProjectileSimulator::new(count.max(1));
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..count {
        simulator
            .fire(
                shooter,
                &profile,
                Vec3::ZERO,
                Vec3::X,
                1.0 / 60.0,
                Color::WHITE,
                &mut rng,
                || world.spawn_empty().id(),
            )
            .unwrap();
    }
    simulator.drain_visual_events();
    simulator
}

fn benchmark_advance(c: &mut Criterion) {
    let gravity = Vec3::new(0.0, -9.81, 0.0);
    let mut group = c.benchmark_group("Projectile Advance");

    for projectile_count in [100, 1000, 10000].iter() {
        let simulator = populated_simulator(*projectile_count);

        group.bench_with_input(
            BenchmarkId::from_parameter(projectile_count),
            projectile_count,
            |b, &_count| {
                b.iter_batched(
                    || (simulator.clone(), StdRng::seed_from_u64(7)),
                    |(mut simulator, mut rng)| {
                        simulator.advance(
                            1.0 / 60.0,
                            gravity,
                            &EmptyWorld,
                            &mut NullSink,
                            &mut rng,
                        );
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn benchmark_spread(c: &mut Criterion) {
    use bevy_arena_combat::projectile::perturb_direction;

    c.bench_function("Spread Perturbation", |b| {
        let mut rng = StdRng::seed_from_u64(12345);
        b.iter(|| perturb_direction(Vec3::NEG_Z, 0.1, &mut rng));
    });
}

criterion_group!(benches, benchmark_advance, benchmark_spread);
criterion_main!(benches);
