//! ECS components for actors and projectile visuals.

use bevy::prelude::*;

use crate::weapon::WeaponState;

/// How an actor currently wants its weapon triggered.
///
/// Written by input or AI, consumed and resolved by the fire-request system
/// after each attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
pub enum ActionRequest {
    /// No trigger intent.
    #[default]
    NotRequested,
    /// Fire this frame if possible; the request clears whether or not the
    /// attempt succeeds.
    TryNow,
    /// Keep trying until one shot actually goes out, then clear.
    DoWhenReadyAndFinish,
    /// Fire whenever ready until the request is replaced (held trigger).
    DoRepeat,
}

impl ActionRequest {
    /// Resolve the request after an attempt. `done` means the attempt
    /// concluded (a shot went out).
    pub fn resolve(&mut self, done: bool) {
        match self {
            Self::TryNow => *self = Self::NotRequested,
            Self::DoWhenReadyAndFinish if done => *self = Self::NotRequested,
            _ => {}
        }
    }

    /// True when an attempt should be made this frame.
    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::NotRequested)
    }
}

/// Trigger intent plus the muzzle frame it should fire from.
///
/// # Fields
/// * `request` - Current trigger intent
/// * `origin` - Muzzle position in world space
/// * `aim` - Normalized aim direction
#[derive(Component, Clone, Debug, Reflect)]
#[reflect(Component)]
pub struct FireControl {
    pub request: ActionRequest,
    pub origin: Vec3,
    pub aim: Vec3,
}

impl Default for FireControl {
    fn default() -> Self {
        Self {
            request: ActionRequest::NotRequested,
            origin: Vec3::ZERO,
            aim: Vec3::NEG_Z,
        }
    }
}

/// The weapon state machine an actor currently carries.
///
/// Not reflected; the state shares its profile through an `Arc`.
#[derive(Component, Clone, Debug)]
pub struct EquippedWeapon(pub WeaponState);

/// Team affiliation, used to tint projectiles and effects.
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
#[reflect(Component)]
pub enum Team {
    #[default]
    Rogue,
    Red,
    Blue,
}

impl Team {
    /// The team's signature color.
    pub fn color(&self) -> Color {
        match self {
            Self::Rogue => Color::srgb(0.8, 0.8, 0.2),
            Self::Red => Color::srgb(0.9, 0.2, 0.2),
            Self::Blue => Color::srgb(0.2, 0.4, 0.9),
        }
    }
}

/// Render-side component on pooled projectile entities, carrying the tint
/// picked at fire time.
#[derive(Component, Clone, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct ProjectileVisual {
    pub color: Color,
}

/// Marker set on a projectile entity while it plays its crash state.
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Crashed;
