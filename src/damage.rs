//! Health bookkeeping and the two damage models: projectile hits and
//! impulse-based (collision/fall) damage.

use bevy::prelude::*;

use crate::projectile::ProjectileRecord;
use crate::types::{HitSink, RayHit};
use crate::weapon::WeaponProfile;

/// Hit points clamped to `[0, max]`.
///
/// Mutations go through [`Health::add`], which reports what happened so the
/// calling system can emit the matching messages. Death fires exactly once,
/// on the transition from positive to non-positive; later damage against a
/// dead entity changes nothing.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Health {
    max: f32,
    current: f32,
    /// Invulnerability switch; damage is ignored, healing still applies.
    pub god: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Outcome of one [`Health::add`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthDelta {
    /// The current value moved.
    pub changed: bool,
    /// This call crossed from alive to dead.
    pub died: bool,
}

impl Health {
    /// Full health with the given maximum (floored at 1).
    pub fn new(max: f32) -> Self {
        let max = max.max(1.0);
        Self {
            max,
            current: max,
            god: false,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Apply a signed hit-point delta (negative damages, positive heals).
    ///
    /// Zero deltas, damage while `god` is set, and anything against an
    /// already-dead entity are no-ops.
    pub fn add(&mut self, amount: f32) -> HealthDelta {
        const NO_CHANGE: HealthDelta = HealthDelta {
            changed: false,
            died: false,
        };

        if amount == 0.0 || self.is_dead() {
            return NO_CHANGE;
        }
        if amount < 0.0 && self.god {
            return NO_CHANGE;
        }

        let before = self.current;
        self.current = (self.current + amount).clamp(0.0, self.max);
        if self.current == before {
            return NO_CHANGE;
        }
        HealthDelta {
            changed: true,
            died: self.current <= 0.0,
        }
    }
}

/// Resolve one projectile hit against the world.
///
/// Applies the hit impulse to dynamic bodies and the hit damage to the hit
/// entity, both scaled by the record's effect multiplier and split across the
/// shot's pellets. The firer never damages itself, even off a rebound.
pub fn apply_projectile_hit(
    sink: &mut impl HitSink,
    hit: &RayHit,
    direction: Vec3,
    profile: &WeaponProfile,
    record: &ProjectileRecord,
) {
    let scale = record.effect_multiplier / profile.num_pellets as f32;

    if let Some(body) = &hit.body {
        if !body.kinematic {
            sink.apply_impulse(body.entity, direction * profile.impulse_on_hit * scale, hit.point);
        }
    }

    if hit.entity != record.sender {
        sink.apply_damage(hit.entity, -profile.damage_per_hit * scale, record.sender);
    }
}

/// Monotonic impulse-to-damage mapping for collision and fall damage.
///
/// Zero below `threshold`, linear from `min_damage` at the threshold to
/// `max_damage` at `cap`, clamped above.
#[derive(Clone, Copy, Debug, Reflect)]
pub struct ImpulseDamageCurve {
    pub threshold: f32,
    pub cap: f32,
    pub min_damage: f32,
    pub max_damage: f32,
}

impl Default for ImpulseDamageCurve {
    fn default() -> Self {
        Self {
            threshold: 12.0,
            cap: 50.0,
            min_damage: 4.0,
            max_damage: 50.0,
        }
    }
}

impl ImpulseDamageCurve {
    /// Damage dealt by an impulse of the given magnitude.
    pub fn damage_for(&self, impulse: f32) -> f32 {
        if impulse < self.threshold {
            return 0.0;
        }
        if self.cap <= self.threshold {
            return self.max_damage;
        }
        let t = ((impulse - self.threshold) / (self.cap - self.threshold)).min(1.0);
        self.min_damage + (self.max_damage - self.min_damage) * t
    }
}

/// Marks an entity as taking damage from physical impacts.
///
/// Incoming collision impulses are scaled by `impulse_multiplier` before
/// running through the curve.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ImpulseAware {
    pub impulse_multiplier: f32,
    pub curve: ImpulseDamageCurve,
}

impl Default for ImpulseAware {
    fn default() -> Self {
        Self {
            impulse_multiplier: 2.0,
            curve: ImpulseDamageCurve::default(),
        }
    }
}
