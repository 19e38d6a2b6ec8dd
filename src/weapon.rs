//! Weapon archetypes and the per-weapon firing state machine.

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::ArchetypeId;

/// Immutable tunable parameters describing a weapon archetype.
///
/// One profile is shared (via `Arc`) by every weapon instance of its kind and
/// by the projectile simulator; it is never mutated after registration. All
/// per-instance state lives in [`WeaponState`].
///
/// # Fields
/// * `name` - Human-readable archetype name
/// * `archetype` - Archetype id, assigned by the weapon library
/// * `damage_per_hit` - Full-shot damage; each pellet carries `1/num_pellets` of it
/// * `num_pellets` - Projectiles spawned per trigger pull (shotgun-style)
/// * `spread_angle` - Cone half-angle for pellet perturbation (radians)
/// * `impulse_on_hit` - Impulse applied to dynamic bodies at the hit point
/// * `back_impulse_on_fire` - Recoil impulse returned to the firer
/// * `back_impulse_scales_with_effect` - Whether recoil scales with the
///   damage-over-time multiplier (source revisions disagree, so it is a flag)
/// * `projectile_speed` - Muzzle speed (m/s)
/// * `projectile_lifetime` - Seconds before an unimpacted projectile expires
/// * `gravity_factor` - Multiplier on world gravity for ballistic drop
/// * `rebound_chance` - Probability in `[0, 1]` of a ricochet per hit
/// * `rebound_damage_multiplier` - Damage falloff factor applied per bounce
/// * `cooldown_time` - Inter-shot delay (seconds)
/// * `reload_time` - Magazine refill delay (seconds)
/// * `magazine_size` - Rounds per magazine; `0` marks an ammo-less weapon
/// * `reserve_ammo` - Rounds carried outside the magazine at equip time
/// * `damage_over_time` - When true, damage/impulse scale by the frame delta
///   (continuous beam-like weapons) instead of a fixed per-shot quantum
#[derive(Clone, Debug, Reflect, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    #[serde(skip)]
    pub archetype: ArchetypeId,
    pub damage_per_hit: f32,
    pub num_pellets: u32,
    pub spread_angle: f32,
    pub impulse_on_hit: f32,
    pub back_impulse_on_fire: f32,
    pub back_impulse_scales_with_effect: bool,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub gravity_factor: f32,
    pub rebound_chance: f32,
    pub rebound_damage_multiplier: f32,
    pub cooldown_time: f32,
    pub reload_time: f32,
    pub magazine_size: u32,
    pub reserve_ammo: u32,
    pub damage_over_time: bool,
}

impl Default for WeaponProfile {
    /// Baseline single-pellet blaster tuning.
    fn default() -> Self {
        Self {
            name: "Blaster".to_string(),
            archetype: ArchetypeId::default(),
            damage_per_hit: 12.0,
            num_pellets: 1,
            spread_angle: 0.1,
            impulse_on_hit: 20.0,
            back_impulse_on_fire: 2.0,
            back_impulse_scales_with_effect: false,
            projectile_speed: 170.0,
            projectile_lifetime: 2.5,
            gravity_factor: 1.0,
            rebound_chance: 0.6,
            rebound_damage_multiplier: 0.4,
            cooldown_time: 0.4,
            reload_time: 1.2,
            magazine_size: 30,
            reserve_ammo: 400,
            damage_over_time: false,
        }
    }
}

impl WeaponProfile {
    /// True when the weapon never consumes ammo and never reloads.
    pub fn is_ammoless(&self) -> bool {
        self.magazine_size == 0
    }

    /// Validate the profile's numeric invariants.
    ///
    /// Every numeric field must be non-negative, chances must stay within
    /// `[0, 1]`, and multi-pellet fire needs at least one pellet. Profiles are
    /// validated once at registration; a state machine is never ticked with an
    /// invalid profile.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let non_negative = [
            ("damage_per_hit", self.damage_per_hit),
            ("spread_angle", self.spread_angle),
            ("impulse_on_hit", self.impulse_on_hit),
            ("back_impulse_on_fire", self.back_impulse_on_fire),
            ("projectile_speed", self.projectile_speed),
            ("projectile_lifetime", self.projectile_lifetime),
            ("gravity_factor", self.gravity_factor),
            ("rebound_damage_multiplier", self.rebound_damage_multiplier),
            ("cooldown_time", self.cooldown_time),
            ("reload_time", self.reload_time),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileError::NegativeField(field));
            }
        }
        if !(0.0..=1.0).contains(&self.rebound_chance) {
            return Err(ProfileError::ChanceOutOfRange("rebound_chance"));
        }
        if self.num_pellets == 0 {
            return Err(ProfileError::NoPellets);
        }
        Ok(())
    }
}

/// Profile validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileError {
    /// A numeric field is negative or non-finite.
    NegativeField(&'static str),
    /// A probability field lies outside `[0, 1]`.
    ChanceOutOfRange(&'static str),
    /// `num_pellets` is zero.
    NoPellets,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeField(field) => write!(f, "field `{field}` must be non-negative"),
            Self::ChanceOutOfRange(field) => write!(f, "field `{field}` must lie in [0, 1]"),
            Self::NoPellets => write!(f, "num_pellets must be at least 1"),
        }
    }
}

impl std::error::Error for ProfileError {}

/// Per-weapon-instance firing, ammo and reload state machine.
///
/// Three implicit states: idle (ready), cooling down (inter-shot delay) and
/// reloading (magazine empty, refill pending). The two timers are never
/// simultaneously positive: firing the last magazine round with reserve left
/// always starts the reload timer, any other successful shot starts the
/// cooldown timer.
///
/// Magazine and reserve are disjoint pools. [`WeaponState::try_fire`] only
/// drains the magazine; the reload completion in [`WeaponState::tick`]
/// transfers up to a full magazine from the reserve. Total ammo
/// (`magazine + reserve`) therefore never increases except through
/// [`WeaponState::set_profile`].
#[derive(Clone, Debug)]
pub struct WeaponState {
    profile: Arc<WeaponProfile>,
    ammo_in_magazine: u32,
    ammo_reserve: u32,
    cooldown_timer: f32,
    reload_timer: f32,
}

impl WeaponState {
    /// Create a state machine for `profile`, with a full magazine and the
    /// profile's initial reserve.
    pub fn new(profile: Arc<WeaponProfile>) -> Self {
        Self {
            ammo_in_magazine: profile.magazine_size,
            ammo_reserve: profile.reserve_ammo,
            cooldown_timer: 0.0,
            reload_timer: 0.0,
            profile,
        }
    }

    /// Replace the profile, discarding any in-progress cooldown or reload and
    /// resetting both ammo pools to the new profile's values.
    pub fn set_profile(&mut self, profile: Arc<WeaponProfile>) {
        self.cooldown_timer = 0.0;
        self.reload_timer = 0.0;
        self.ammo_in_magazine = profile.magazine_size;
        self.ammo_reserve = profile.reserve_ammo;
        self.profile = profile;
    }

    /// Advance the weapon's timers by `dt` seconds.
    ///
    /// Once the reload timer elapses with an empty magazine and reserve
    /// remaining, up to a full magazine is transferred from the reserve. The
    /// transfer happens here, never inside `try_fire`, so a reload always
    /// takes its full duration.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);
        self.reload_timer = (self.reload_timer - dt).max(0.0);

        if !self.profile.is_ammoless()
            && self.ammo_in_magazine == 0
            && self.ammo_reserve > 0
            && self.reload_timer <= 0.0
        {
            let transfer = self.profile.magazine_size.min(self.ammo_reserve);
            self.ammo_in_magazine += transfer;
            self.ammo_reserve -= transfer;
        }
    }

    /// Attempt to fire one logical shot.
    ///
    /// Returns `false` without any state change while cooling down, reloading
    /// or out of ammo - a negative result is the normal contract, not an
    /// error. On success, one round leaves the magazine; emptying it with
    /// reserve remaining starts the reload, otherwise the cooldown starts.
    ///
    /// Multi-pellet weapons still consume a single round per call - the
    /// caller spawns `num_pellets` projectiles for one successful fire.
    pub fn try_fire(&mut self) -> bool {
        if self.cooldown_timer > 0.0 || self.reload_timer > 0.0 {
            return false;
        }

        if self.profile.is_ammoless() {
            self.cooldown_timer = self.profile.cooldown_time;
            return true;
        }

        if self.ammo_in_magazine == 0 {
            return false;
        }

        self.ammo_in_magazine -= 1;
        if self.ammo_in_magazine == 0 && self.ammo_reserve > 0 {
            self.reload_timer = self.profile.reload_time;
        } else {
            self.cooldown_timer = self.profile.cooldown_time;
        }
        true
    }

    /// The profile this weapon currently fires with.
    pub fn profile(&self) -> &Arc<WeaponProfile> {
        &self.profile
    }

    /// True when the next [`WeaponState::try_fire`] call would succeed.
    pub fn is_ready_to_fire(&self) -> bool {
        if self.cooldown_timer > 0.0 || self.reload_timer > 0.0 {
            return false;
        }
        self.profile.is_ammoless() || self.ammo_in_magazine > 0
    }

    /// Remaining cooldown as a fraction of the full cooldown, in `[0, 1]`.
    pub fn remaining_cooldown_normalized(&self) -> f32 {
        if self.profile.cooldown_time <= 0.0 {
            return 0.0;
        }
        (self.cooldown_timer / self.profile.cooldown_time).clamp(0.0, 1.0)
    }

    /// Remaining reload as a fraction of the full reload, in `[0, 1]`.
    pub fn remaining_reload_normalized(&self) -> f32 {
        if self.profile.reload_time <= 0.0 {
            return 0.0;
        }
        (self.reload_timer / self.profile.reload_time).clamp(0.0, 1.0)
    }

    /// Rounds currently loaded.
    pub fn ammo_in_magazine(&self) -> u32 {
        self.ammo_in_magazine
    }

    /// Rounds carried outside the magazine.
    pub fn ammo_reserve(&self) -> u32 {
        self.ammo_reserve
    }

    /// Total rounds remaining across magazine and reserve.
    pub fn total_ammo(&self) -> u32 {
        self.ammo_in_magazine + self.ammo_reserve
    }
}

/// Profile presets for common arena-shooter archetypes.
pub mod presets {
    use super::*;

    /// Mid-range single-shot blaster: the baseline tuning, with a strong
    /// ricochet tendency.
    pub fn blaster() -> WeaponProfile {
        WeaponProfile::default()
    }

    /// Fast-firing rifle: low per-shot damage, flat trajectory, rare bounces.
    pub fn rifle() -> WeaponProfile {
        WeaponProfile {
            name: "Rifle".to_string(),
            damage_per_hit: 8.0,
            spread_angle: 0.03,
            impulse_on_hit: 10.0,
            back_impulse_on_fire: 1.0,
            projectile_speed: 320.0,
            projectile_lifetime: 2.0,
            gravity_factor: 0.4,
            rebound_chance: 0.25,
            rebound_damage_multiplier: 0.5,
            cooldown_time: 0.1,
            reload_time: 1.6,
            magazine_size: 30,
            reserve_ammo: 240,
            ..Default::default()
        }
    }

    /// Pellet scatter-gun: one trigger pull spreads eight pellets sharing the
    /// shot's total damage.
    pub fn scatter() -> WeaponProfile {
        WeaponProfile {
            name: "Scatter".to_string(),
            damage_per_hit: 48.0,
            num_pellets: 8,
            spread_angle: 0.25,
            impulse_on_hit: 40.0,
            back_impulse_on_fire: 6.0,
            projectile_speed: 120.0,
            projectile_lifetime: 1.2,
            gravity_factor: 1.5,
            rebound_chance: 0.0,
            rebound_damage_multiplier: 0.0,
            cooldown_time: 0.9,
            reload_time: 2.2,
            magazine_size: 6,
            reserve_ammo: 36,
            ..Default::default()
        }
    }

    /// Continuous beam: ammo-less, no cooldown, damage scales with the frame
    /// delta instead of a per-shot quantum.
    pub fn beam() -> WeaponProfile {
        WeaponProfile {
            name: "Beam".to_string(),
            damage_per_hit: 60.0,
            spread_angle: 0.0,
            impulse_on_hit: 30.0,
            back_impulse_on_fire: 4.0,
            back_impulse_scales_with_effect: true,
            projectile_speed: 400.0,
            projectile_lifetime: 0.5,
            gravity_factor: 0.0,
            rebound_chance: 0.0,
            rebound_damage_multiplier: 0.0,
            cooldown_time: 0.0,
            reload_time: 0.0,
            magazine_size: 0,
            reserve_ammo: 0,
            damage_over_time: true,
            ..Default::default()
        }
    }
}
