//! # Bevy Arena Combat
//!
//! Combat-simulation core for arena shooters on Bevy 0.18.
//!
//! ## Features
//! - Frame-stepped projectile simulation with ballistic drop and ricochets
//! - Per-weapon fire/ammo/reload state machines with shotgun-style pellets
//! - Object pooling per weapon archetype
//! - Raycast hit detection via avian3d
//! - Projectile and impulse-based (collision/fall) damage models
//! - Deterministic runs through a seedable simulation RNG
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_arena_combat::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ArenaCombatPluginGroup)
//!         .run();
//! }
//! ```

pub mod components;
pub mod damage;
pub mod events;
pub mod projectile;
pub mod resources;
pub mod systems;
pub mod types;
pub mod weapon;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::damage::{Health, HealthDelta, ImpulseAware, ImpulseDamageCurve};
    pub use crate::events::*;
    pub use crate::projectile::{FireError, ProjectileSimulator, VisualEvent};
    pub use crate::resources::*;
    pub use crate::types::*;
    pub use crate::weapon::{presets, WeaponProfile, WeaponState};
    pub use crate::ArenaCombatPluginGroup;
    pub use crate::{CombatCorePlugin, CombatDamagePlugin, CombatDebugPlugin};
}

use avian3d::prelude::SpatialQueryPipeline;
use bevy::prelude::*;

/// Main plugin group that includes all combat subsystems.
///
/// This plugin group bundles together:
/// - Weapon ticking, fire-request processing and projectile simulation
/// - Impulse-based (collision/fall) damage
/// - Debug visualization of in-flight projectiles
///
/// # Example
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_arena_combat::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(ArenaCombatPluginGroup)
///         .run();
/// }
/// ```
#[derive(Default)]
pub struct ArenaCombatPluginGroup;

impl PluginGroup for ArenaCombatPluginGroup {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(CombatCorePlugin)
            .add(CombatDamagePlugin)
            .add(CombatDebugPlugin)
    }
}

/// Core combat plugin: weapon state machines and projectile simulation.
///
/// # Systems
/// - `tick_weapon_states` - Advances cooldown/reload timers (FixedUpdate)
/// - `process_fire_requests` - Turns trigger intents into in-flight pellets
/// - `advance_projectiles` - Steps ballistics and resolves hits against the
///   physics world (gated on the spatial query pipeline)
/// - `sync_projectile_visuals` - Mirrors simulator state onto the pooled
///   render entities (Update)
pub struct CombatCorePlugin;

impl Plugin for CombatCorePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<types::ArchetypeId>()
            .register_type::<components::FireControl>()
            .register_type::<components::Team>()
            .register_type::<components::ProjectileVisual>()
            .register_type::<components::Crashed>()
            .register_type::<weapon::WeaponProfile>()
            .init_resource::<resources::CombatConfig>()
            .init_resource::<resources::SimRng>()
            .init_resource::<resources::WeaponLibrary>()
            .init_resource::<projectile::ProjectileSimulator>()
            .add_message::<events::WeaponFired>()
            .add_message::<events::ProjectileHit>()
            .add_message::<events::HealthChanged>()
            .add_message::<events::Died>()
            .add_systems(
                FixedUpdate,
                (
                    systems::weapon::tick_weapon_states,
                    systems::weapon::process_fire_requests,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                systems::projectile::advance_projectiles
                    .after(systems::weapon::process_fire_requests)
                    .run_if(resource_exists::<SpatialQueryPipeline>),
            )
            .add_systems(Update, systems::projectile::sync_projectile_visuals);
    }
}

/// Impulse damage plugin: turns reported contact impulses into health loss.
///
/// # Systems
/// - `apply_collision_impulse_damage` - Runs `CollisionImpulse` messages
///   through each target's damage curve
pub struct CombatDamagePlugin;

impl Plugin for CombatDamagePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<damage::Health>()
            .register_type::<damage::ImpulseAware>()
            .add_message::<events::CollisionImpulse>()
            .add_systems(FixedUpdate, systems::damage::apply_collision_impulse_damage);
    }
}

/// Debug plugin for combat visualization.
pub struct CombatDebugPlugin;

impl Plugin for CombatDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, systems::debug::draw_projectile_gizmos);
    }
}
