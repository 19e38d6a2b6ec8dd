use bevy::prelude::*;

use crate::projectile::ProjectileSimulator;
use crate::resources::CombatConfig;

/// Draw debug gizmos for in-flight projectiles.
///
/// Draws positions and velocity vectors for every active projectile.
pub fn draw_projectile_gizmos(
    mut gizmos: Gizmos,
    simulator: Res<ProjectileSimulator>,
    config: Res<CombatConfig>,
) {
    if !config.debug_draw {
        return;
    }

    for record in simulator.iter_active() {
        gizmos.sphere(record.position, 0.05, Color::srgb(1.0, 0.4, 0.0));

        // Scale the velocity down for visibility
        let end = record.position + record.velocity * 0.1;
        gizmos.line(record.position, end, Color::srgb(0.0, 1.0, 0.0));
    }
}
