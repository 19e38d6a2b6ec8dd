//! Bevy systems driving the combat simulation.

pub mod damage;
pub mod debug;
pub mod projectile;
pub mod weapon;
