//! Pooled projectile simulation: spawning, ballistic advancement, collision
//! resolution and handle recycling.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;
use rand_distr::UnitDisc;

use crate::damage::apply_projectile_hit;
use crate::types::{ArchetypeId, HitSink, RaycastWorld};
use crate::weapon::WeaponProfile;

/// Cosmetic grace period a projectile spends in the dying list before its
/// handle returns to the pool, leaving time for crash effects to play out.
pub const DYING_SECONDS: f32 = 1.0;

/// Offset along the reflected direction after a rebound, lifting the
/// projectile off the surface so the next raycast does not re-hit it.
const SURFACE_NUDGE: f32 = 0.01;

/// Failure to start a shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireError {
    /// The archetype's pool is at capacity and no handle could be acquired.
    /// Handles acquired for other pellets of the same shot are returned, so a
    /// failed fire leaves the bucket untouched.
    PoolExhausted,
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolExhausted => write!(f, "projectile pool exhausted"),
        }
    }
}

impl std::error::Error for FireError {}

/// Visual lifecycle notification queued by the simulator and drained by the
/// render-sync system. The core never touches transforms, visibility or
/// materials directly.
///
/// There is no standalone make-visible event: a handle only becomes visible
/// when it goes live, so that transition is folded into [`Spawned`], and
/// [`Hidden`] is its inverse when the handle returns to the pool.
///
/// [`Spawned`]: VisualEvent::Spawned
/// [`Hidden`]: VisualEvent::Hidden
#[derive(Clone, Debug)]
pub enum VisualEvent {
    /// A pooled handle went live at `position`, flying along `direction`.
    /// Implies visibility; the sync system reveals the entity here.
    Spawned {
        entity: Entity,
        position: Vec3,
        direction: Vec3,
        color: Color,
    },
    /// The grace period ended and the handle returned to the pool; hide it.
    Hidden { entity: Entity },
    /// The projectile's flight ended at `position` (impact or expiry); show
    /// the crash state there.
    Crashed { entity: Entity, position: Vec3 },
    /// The handle no longer fits in its pool; despawn the entity.
    Discarded { entity: Entity },
}

/// Pooled proxy for the render entity backing one projectile.
///
/// Exactly one of the pool, the active list or the dying list owns a handle
/// at any time. All visual side effects go through the event queue.
#[derive(Clone, Copy, Debug)]
pub struct ProjectileHandle(Entity);

impl ProjectileHandle {
    /// The render entity behind this handle.
    pub fn entity(&self) -> Entity {
        self.0
    }

    fn spawn(&self, events: &mut Vec<VisualEvent>, position: Vec3, direction: Vec3, color: Color) {
        events.push(VisualEvent::Spawned {
            entity: self.0,
            position,
            direction,
            color,
        });
    }

    fn make_hidden(&self, events: &mut Vec<VisualEvent>) {
        events.push(VisualEvent::Hidden { entity: self.0 });
    }

    fn make_crashed(&self, events: &mut Vec<VisualEvent>, position: Vec3) {
        events.push(VisualEvent::Crashed {
            entity: self.0,
            position,
        });
    }
}

/// Bounded free list of projectile handles for one archetype.
#[derive(Clone, Debug)]
pub struct ProjectilePool {
    available: Vec<ProjectileHandle>,
    created: usize,
    max_size: usize,
}

impl ProjectilePool {
    fn new(max_size: usize) -> Self {
        Self {
            available: Vec::new(),
            created: 0,
            max_size,
        }
    }

    /// Pop a free handle, instantiating a fresh render entity while under
    /// capacity. `None` once `max_size` handles are live.
    fn acquire(&mut self, instantiate: &mut dyn FnMut() -> Entity) -> Option<ProjectileHandle> {
        if let Some(handle) = self.available.pop() {
            return Some(handle);
        }
        if self.created < self.max_size {
            self.created += 1;
            return Some(ProjectileHandle(instantiate()));
        }
        None
    }

    /// Return a handle to the free list. A handle that no longer fits (the
    /// capacity was lowered at runtime) is discarded and its entity despawned
    /// through the event queue.
    fn release(&mut self, handle: ProjectileHandle, events: &mut Vec<VisualEvent>) {
        if self.available.len() < self.max_size {
            self.available.push(handle);
        } else {
            self.created = self.created.saturating_sub(1);
            events.push(VisualEvent::Discarded {
                entity: handle.entity(),
            });
        }
    }

    /// Handles currently sitting in the free list.
    pub fn available(&self) -> usize {
        self.available.len()
    }
}

/// One in-flight projectile.
///
/// # Fields
/// * `sender` - Firing actor, excluded from raycasts and never damaged
/// * `handle` - Pooled render proxy, exclusively owned by this record
/// * `profile` - Tuning the shot was fired with. Advancement always reads
///   this, so two profiles sharing an archetype id (one registered, one
///   hand-built) never borrow each other's gravity, rebound or damage values
/// * `position` - Current world-space position
/// * `velocity` - Current velocity (m/s)
/// * `time_to_live` - Seconds until expiry
/// * `effect_multiplier` - Damage/impulse scale; starts at the frame delta
///   for damage-over-time archetypes (else 1) and shrinks on every rebound
#[derive(Clone, Debug)]
pub struct ProjectileRecord {
    pub sender: Entity,
    pub handle: ProjectileHandle,
    pub profile: Arc<WeaponProfile>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub time_to_live: f32,
    pub effect_multiplier: f32,
}

/// A spent projectile waiting out its cosmetic grace period.
#[derive(Clone, Debug)]
struct DyingProjectile {
    handle: ProjectileHandle,
    time_left: f32,
}

/// Per-archetype projectile storage: the live records, the dying records and
/// the handle pool, keyed by archetype id.
#[derive(Clone, Debug)]
pub struct ArchetypeBucket {
    active: Vec<ProjectileRecord>,
    dying: Vec<DyingProjectile>,
    pool: ProjectilePool,
}

impl ArchetypeBucket {
    fn new(pool_capacity: usize) -> Self {
        Self {
            active: Vec::new(),
            dying: Vec::new(),
            pool: ProjectilePool::new(pool_capacity),
        }
    }

    /// The handle pool for this archetype.
    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }
}

/// Frame-stepped projectile simulator.
///
/// Owns every in-flight projectile, bucketed by weapon archetype. The world
/// is observed only through [`RaycastWorld`] and mutated only through
/// [`HitSink`], so the whole simulator runs headless under test and clones
/// cheaply for benchmarks. Visual side effects queue as [`VisualEvent`]s.
#[derive(Resource, Clone, Debug)]
pub struct ProjectileSimulator {
    buckets: HashMap<ArchetypeId, ArchetypeBucket>,
    visual_events: Vec<VisualEvent>,
    pool_capacity: usize,
}

impl Default for ProjectileSimulator {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProjectileSimulator {
    /// Create a simulator whose per-archetype pools hold at most
    /// `pool_capacity` handles.
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            buckets: HashMap::new(),
            visual_events: Vec::new(),
            pool_capacity,
        }
    }

    /// Spawn one shot's worth of pellets for `profile`.
    ///
    /// Acquires all `num_pellets` handles up front; if the pool runs out the
    /// already-acquired handles go straight back and the call fails without
    /// having spawned anything. Each pellet's direction is the aim direction
    /// perturbed inside the spread cone.
    ///
    /// Returns the accumulated recoil impulse to apply to the firer,
    /// `-aim * back_impulse_on_fire` split evenly across pellets (scaled by
    /// the effect multiplier for profiles that opt in).
    ///
    /// # Arguments
    /// * `sender` - Firing actor
    /// * `profile` - Weapon archetype to fire
    /// * `origin` - Muzzle position
    /// * `aim_dir` - Aim direction, assumed normalized
    /// * `dt` - Frame delta, the effect multiplier for damage-over-time shots
    /// * `color` - Tint forwarded to the visual layer
    /// * `rng` - Spread randomness source
    /// * `instantiate` - Creates a fresh render entity when the pool grows
    #[allow(clippy::too_many_arguments)]
    pub fn fire(
        &mut self,
        sender: Entity,
        profile: &Arc<WeaponProfile>,
        origin: Vec3,
        aim_dir: Vec3,
        dt: f32,
        color: Color,
        rng: &mut impl Rng,
        mut instantiate: impl FnMut() -> Entity,
    ) -> Result<Vec3, FireError> {
        let pool_capacity = self.pool_capacity;
        let bucket = self
            .buckets
            .entry(profile.archetype)
            .or_insert_with(|| ArchetypeBucket::new(pool_capacity));

        let pellets = profile.num_pellets as usize;
        let mut handles = Vec::with_capacity(pellets);
        for _ in 0..pellets {
            match bucket.pool.acquire(&mut instantiate) {
                Some(handle) => handles.push(handle),
                None => {
                    for handle in handles {
                        bucket.pool.release(handle, &mut self.visual_events);
                    }
                    return Err(FireError::PoolExhausted);
                }
            }
        }

        let effect_multiplier = if profile.damage_over_time { dt } else { 1.0 };
        let impulse_scale = if profile.back_impulse_scales_with_effect {
            effect_multiplier
        } else {
            1.0
        };
        let mut back_impulse = Vec3::ZERO;

        for handle in handles {
            let direction = perturb_direction(aim_dir, profile.spread_angle, rng);
            handle.spawn(&mut self.visual_events, origin, direction, color);
            bucket.active.push(ProjectileRecord {
                sender,
                handle,
                profile: Arc::clone(profile),
                position: origin,
                velocity: direction * profile.projectile_speed,
                time_to_live: profile.projectile_lifetime,
                effect_multiplier,
            });
            back_impulse -=
                direction * profile.back_impulse_on_fire * impulse_scale / pellets as f32;
        }
        Ok(back_impulse)
    }

    /// Advance every projectile by `dt` seconds.
    ///
    /// Per bucket: dying records count down and return their handles to the
    /// pool, then each active record loses `dt` of lifetime (strictly
    /// non-positive means expired), falls under `gravity * gravity_factor`,
    /// and casts a single ray over the distance it would travel. A hit
    /// applies the damage model at the hit point, then either rebounds
    /// (reflected velocity, nudged off the surface, effect multiplier scaled
    /// down) or crashes into the dying list. At most one rebound happens per
    /// projectile per call.
    pub fn advance(
        &mut self,
        dt: f32,
        gravity: Vec3,
        world: &impl RaycastWorld,
        sink: &mut impl HitSink,
        rng: &mut impl Rng,
    ) {
        let Self {
            buckets,
            visual_events,
            ..
        } = self;

        for bucket in buckets.values_mut() {
            let ArchetypeBucket {
                active,
                dying,
                pool,
            } = bucket;

            let mut i = 0;
            while i < dying.len() {
                dying[i].time_left -= dt;
                if dying[i].time_left <= 0.0 {
                    let spent = dying.swap_remove(i);
                    spent.handle.make_hidden(visual_events);
                    pool.release(spent.handle, visual_events);
                } else {
                    i += 1;
                }
            }

            let mut i = 0;
            while i < active.len() {
                let record = &mut active[i];

                record.time_to_live -= dt;
                if record.time_to_live <= 0.0 {
                    record.handle.make_crashed(visual_events, record.position);
                    let record = active.swap_remove(i);
                    dying.push(DyingProjectile {
                        handle: record.handle,
                        time_left: DYING_SECONDS,
                    });
                    continue;
                }

                record.velocity += gravity * record.profile.gravity_factor * dt;
                let travel = record.velocity.length() * dt;
                let Some(direction) = record.velocity.try_normalize() else {
                    i += 1;
                    continue;
                };

                match world.cast_ray(record.position, direction, travel, record.sender) {
                    Some(hit) => {
                        let profile = Arc::clone(&record.profile);
                        apply_projectile_hit(sink, &hit, direction, &profile, record);
                        record.position = hit.point;
                        if try_chance(profile.rebound_chance, rng) {
                            record.velocity = reflect(record.velocity, hit.normal);
                            if let Some(out) = record.velocity.try_normalize() {
                                record.position += out * SURFACE_NUDGE;
                            }
                            record.effect_multiplier *= profile.rebound_damage_multiplier;
                            i += 1;
                        } else {
                            record.handle.make_crashed(visual_events, hit.point);
                            let record = active.swap_remove(i);
                            dying.push(DyingProjectile {
                                handle: record.handle,
                                time_left: DYING_SECONDS,
                            });
                        }
                    }
                    None => {
                        record.position += direction * travel;
                        i += 1;
                    }
                }
            }
        }
    }

    /// Iterate every in-flight (active, not dying) projectile.
    pub fn iter_active(&self) -> impl Iterator<Item = &ProjectileRecord> {
        self.buckets.values().flat_map(|bucket| bucket.active.iter())
    }

    /// Drain the queued visual lifecycle events.
    pub fn drain_visual_events(&mut self) -> std::vec::Drain<'_, VisualEvent> {
        self.visual_events.drain(..)
    }

    /// Number of in-flight projectiles across all archetypes.
    pub fn active_count(&self) -> usize {
        self.buckets.values().map(|b| b.active.len()).sum()
    }

    /// Number of projectiles waiting out their grace period.
    pub fn dying_count(&self) -> usize {
        self.buckets.values().map(|b| b.dying.len()).sum()
    }

    /// Storage bucket for one archetype, if any shot of it was ever fired.
    pub fn bucket(&self, archetype: ArchetypeId) -> Option<&ArchetypeBucket> {
        self.buckets.get(&archetype)
    }
}

/// Perturb `direction` by a uniformly disk-sampled deflection inside a cone
/// of half-angle `spread_angle` radians.
pub fn perturb_direction(direction: Vec3, spread_angle: f32, rng: &mut impl Rng) -> Vec3 {
    let direction = direction.normalize_or_zero();
    if spread_angle <= 0.0 {
        return direction;
    }

    let [x, y]: [f32; 2] = rng.sample(UnitDisc);
    let radius = (x * x + y * y).sqrt();
    if radius < 1e-6 {
        return direction;
    }

    let (u, v) = direction.any_orthonormal_pair();
    let lateral = (u * x + v * y) / radius;
    let theta = spread_angle * radius;
    (direction * theta.cos() + lateral * theta.sin()).normalize()
}

/// Bernoulli draw: true with probability `chance`.
pub fn try_chance(chance: f32, rng: &mut impl Rng) -> bool {
    if chance <= 0.0 {
        return false;
    }
    if chance >= 1.0 {
        return true;
    }
    rng.random::<f32>() < chance
}

/// Mirror `v` about the plane with unit normal `n`.
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
