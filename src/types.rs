//! Common types and collaborator traits for the combat core.

use bevy::prelude::*;

/// Identifier of a weapon archetype (all weapons sharing one profile).
///
/// Assigned by [`crate::resources::WeaponLibrary`] at registration time and
/// used to key per-archetype projectile buckets in the simulator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Reflect)]
pub struct ArchetypeId(pub u32);

/// Physical body information attached to a raycast hit.
///
/// # Fields
/// * `entity` - The body entity (may differ from the collider entity)
/// * `kinematic` - True for kinematic and static bodies; impulses only apply
///   to dynamic bodies
#[derive(Clone, Copy, Debug)]
pub struct HitBody {
    /// Body entity
    pub entity: Entity,
    /// Whether the body ignores impulses (kinematic or static)
    pub kinematic: bool,
}

/// Hit result from a projectile raycast.
///
/// # Fields
/// * `entity` - The entity that was hit by the raycast
/// * `point` - World-space coordinates of the hit point
/// * `normal` - Surface normal vector at the hit point
/// * `distance` - Distance from the ray origin to the hit point
/// * `body` - Physical body info, when the hit entity carries one
#[derive(Clone, Debug)]
pub struct RayHit {
    /// Hit entity
    pub entity: Entity,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal
    pub normal: Vec3,
    /// Distance from ray origin
    pub distance: f32,
    /// Rigid body attached to the hit entity, if any
    pub body: Option<HitBody>,
}

/// Spatial query abstraction over the physical world.
///
/// The simulator only ever issues single rays through this trait, which keeps
/// the hot loop independent of the physics backend and lets tests substitute
/// a synthetic world. The production implementation wraps avian3d's
/// `SpatialQuery`.
pub trait RaycastWorld {
    /// Cast a ray and return the first hit.
    ///
    /// A `None` result means "no collision this step" - this includes rays
    /// against despawned or filtered-out entities.
    ///
    /// # Arguments
    /// * `origin` - Starting point of the ray in world space
    /// * `direction` - Normalized direction vector of the ray
    /// * `max_distance` - Maximum distance to cast the ray
    /// * `exclude` - Entity excluded from the query (the firing actor)
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Entity,
    ) -> Option<RayHit>;
}

/// Damage and impulse application contract exposed by world actors.
///
/// The simulator never mutates health or body velocities directly; every hit
/// flows through this sink so that hit-marker UI, kill credit and physics
/// response stay outside the core. Implementations are free to ignore calls
/// against entities without a health or body component.
pub trait HitSink {
    /// Apply a damage delta to `target`, crediting `initiator`.
    ///
    /// A zero delta must be a no-op.
    fn apply_damage(&mut self, target: Entity, amount: f32, initiator: Entity);

    /// Apply a physical impulse to `body` at the world-space point `at`.
    fn apply_impulse(&mut self, body: Entity, impulse: Vec3, at: Vec3);
}
