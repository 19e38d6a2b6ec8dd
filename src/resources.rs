//! Resources configuring and backing the combat simulation.

use std::sync::Arc;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::types::ArchetypeId;
use crate::weapon::{presets, ProfileError, WeaponProfile};

/// Global tuning for the combat simulation.
///
/// # Fields
/// * `gravity` - World gravity applied to projectiles (scaled per profile)
/// * `interaction_mask` - Collision layer mask projectile raycasts run against
/// * `pool_capacity` - Maximum live handles per archetype pool
/// * `debug_draw` - Enables the gizmo visualization systems
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct CombatConfig {
    /// World gravity (m/s^2)
    pub gravity: Vec3,
    /// Raycast collision layer mask
    pub interaction_mask: u32,
    /// Per-archetype projectile pool capacity
    pub pool_capacity: usize,
    /// Draw debug gizmos for in-flight projectiles
    pub debug_draw: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            interaction_mask: u32::MAX,
            pool_capacity: 256,
            debug_draw: false,
        }
    }
}

/// The single randomness source for spread and rebound rolls.
///
/// OS-seeded by default; swap in [`SimRng::seeded`] for deterministic runs
/// and replays.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl SimRng {
    /// A deterministic generator for reproducible simulations.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Registry of weapon archetypes.
///
/// Profiles register once (typically deserialized from game data), are
/// validated, receive their [`ArchetypeId`], and are handed out as shared
/// `Arc`s from then on.
#[derive(Resource, Clone, Debug, Default)]
pub struct WeaponLibrary {
    profiles: Vec<Arc<WeaponProfile>>,
}

impl WeaponLibrary {
    /// A library pre-populated with the built-in presets.
    pub fn with_defaults() -> Self {
        let mut library = Self::default();
        for preset in [
            presets::blaster(),
            presets::rifle(),
            presets::scatter(),
            presets::beam(),
        ] {
            // Presets are validated by test, registration cannot fail here.
            let _ = library.register(preset);
        }
        library
    }

    /// Validate `profile`, assign its archetype id and store it.
    pub fn register(&mut self, mut profile: WeaponProfile) -> Result<ArchetypeId, ProfileError> {
        profile.validate()?;
        let id = ArchetypeId(self.profiles.len() as u32);
        profile.archetype = id;
        self.profiles.push(Arc::new(profile));
        Ok(id)
    }

    /// Look up a profile by archetype id.
    pub fn get(&self, id: ArchetypeId) -> Option<&Arc<WeaponProfile>> {
        self.profiles.get(id.0 as usize)
    }

    /// Look up a profile by name.
    pub fn find(&self, name: &str) -> Option<&Arc<WeaponProfile>> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Number of registered archetypes.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_sequential_ids() {
        let mut library = WeaponLibrary::default();
        let a = library.register(presets::blaster()).unwrap();
        let b = library.register(presets::rifle()).unwrap();
        assert_eq!(a, ArchetypeId(0));
        assert_eq!(b, ArchetypeId(1));
        assert_eq!(library.get(a).unwrap().archetype, a);
        assert_eq!(library.get(b).unwrap().name, "Rifle");
    }

    #[test]
    fn register_rejects_invalid_profiles() {
        let mut library = WeaponLibrary::default();
        let bad = WeaponProfile {
            rebound_chance: 2.0,
            ..Default::default()
        };
        assert!(library.register(bad).is_err());
        assert!(library.is_empty());
    }

    #[test]
    fn find_by_name() {
        let library = WeaponLibrary::with_defaults();
        assert_eq!(library.len(), 4);
        assert!(library.find("Scatter").is_some());
        assert!(library.find("Railgun").is_none());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        use rand::Rng;
        let mut a = SimRng::seeded(42);
        let mut b = SimRng::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.0.random::<u64>(), b.0.random::<u64>());
        }
    }
}
