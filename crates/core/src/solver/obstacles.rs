//! Obstacle interaction: wind shadow, full occlusion and push
//!
//! A cell inside an obstacle is fully occluded: its incoming velocity is
//! scaled by `1 - shadow_strength` and the cell is flagged for diffusion.
//! Cells downstream of an obstacle (relative to a global source's direction)
//! are partially shadowed, with the attenuation fading out over
//! `shadow_distance * radius * 2 * speed` from the obstacle surface.

use crate::core_types::vec3::{safe_normalize, saturate, Vec3};
use crate::sources::obstacle::Obstacle;

/// Velocity after the shadow pass and whether an obstacle fully covered the cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowResult {
    pub velocity: Vec3,
    pub occluded: bool,
}

/// Attenuate `velocity` at `position` for a stimulus blowing along `direction`.
///
/// The first obstacle containing the cell ends the pass. Partial shadows
/// accumulate across obstacles.
pub fn apply_shadow(
    position: &Vec3,
    velocity: Vec3,
    direction: &Vec3,
    speed: f32,
    obstacles: &[Obstacle],
) -> ShadowResult {
    let mut velocity = velocity;

    for obstacle in obstacles.iter().filter(|o| o.is_usable()) {
        let to_obstacle = obstacle.position - position;
        let distance = to_obstacle.norm();

        if distance <= obstacle.radius {
            return ShadowResult {
                velocity: velocity * (1.0 - obstacle.shadow_strength),
                occluded: true,
            };
        }

        let projection = to_obstacle.dot(direction);
        if projection >= 0.0 {
            continue;
        }

        let on_axis = position + direction * projection;
        if (on_axis - obstacle.position).norm() > obstacle.radius {
            continue;
        }

        let falloff = obstacle.shadow_distance * obstacle.radius * 2.0 * speed;
        let d = if falloff > 0.0 && falloff.is_finite() {
            saturate((distance - obstacle.radius) / falloff)
        } else {
            1.0
        };

        let shadowed = velocity * d.sqrt();
        velocity = velocity.lerp(&shadowed, obstacle.shadow_strength);
    }

    ShadowResult {
        velocity,
        occluded: false,
    }
}

/// Add the push of moving obstacles to `velocity`.
///
/// Only cells within `radius * (1 + edge_length)` are affected, and only
/// those ahead of the obstacle's motion: the push scales with
/// `clamp01(dot(motion, obstacle→cell))`.
pub fn apply_push(position: &Vec3, velocity: Vec3, edge_length: f32, obstacles: &[Obstacle]) -> Vec3 {
    let mut velocity = velocity;

    for obstacle in obstacles.iter().filter(|o| o.is_usable()) {
        if obstacle.push_strength == 0.0 || obstacle.velocity == Vec3::zeros() {
            continue;
        }

        let offset = position - obstacle.position;
        if offset.norm() > obstacle.radius * (1.0 + edge_length) {
            continue;
        }

        let alignment = safe_normalize(&obstacle.velocity).dot(&safe_normalize(&offset));
        velocity += obstacle.velocity * (obstacle.push_strength * saturate(alignment));
    }

    velocity
}
