//! Messages emitted and consumed by the combat systems.
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::types::ArchetypeId;

/// Sent once per successful shot, after the projectiles are in flight.
///
/// # Fields
/// * `shooter` - Actor the shot came from
/// * `archetype` - Weapon archetype fired
/// * `pellets` - Projectiles spawned by this shot
/// * `back_impulse` - Recoil impulse applied to the shooter
#[derive(Message, Clone)]
pub struct WeaponFired {
    /// Firing actor
    pub shooter: Entity,
    /// Weapon archetype
    pub archetype: ArchetypeId,
    /// Projectiles spawned
    pub pellets: u32,
    /// Recoil applied to the shooter
    pub back_impulse: Vec3,
}

/// Sent when a projectile damages an entity.
///
/// # Fields
/// * `target` - Entity that took the hit
/// * `initiator` - Actor credited with the hit
/// * `damage` - Hit-point loss, already scaled and pellet-split
#[derive(Message, Clone)]
pub struct ProjectileHit {
    /// Hit entity
    pub target: Entity,
    /// Actor credited with the hit
    pub initiator: Entity,
    /// Hit points removed
    pub damage: f32,
}

/// Sent whenever an entity's health value actually moves.
#[derive(Message, Clone)]
pub struct HealthChanged {
    /// Entity whose health changed
    pub entity: Entity,
    /// Health after the change
    pub current: f32,
    /// Health ceiling
    pub max: f32,
}

/// Sent exactly once when an entity's health crosses to zero.
///
/// # Fields
/// * `entity` - The entity that died
/// * `attacker` - Actor credited with the kill, when the death came from a
///   tracked hit
#[derive(Message, Clone)]
pub struct Died {
    /// Entity that died
    pub entity: Entity,
    /// Actor credited with the kill
    pub attacker: Option<Entity>,
}

/// Inbound report of a physical contact impulse on an entity.
///
/// Contact detection stays outside this crate; whatever observes the physics
/// world writes these, and the impulse-damage system turns them into health
/// changes for impulse-aware entities.
#[derive(Message, Clone)]
pub struct CollisionImpulse {
    /// Entity that absorbed the impact
    pub entity: Entity,
    /// Impulse magnitude
    pub impulse: f32,
}
