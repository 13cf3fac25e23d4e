//! Global and local source contributions for a single cell

use crate::core_types::noise::SimplexNoise;
use crate::core_types::vec3::{safe_normalize, Vec3};
use crate::geometry::{inside_cylinder, inside_sphere};
use crate::solver::obstacles::apply_shadow;
use crate::sources::global::{GlobalWindKind, GlobalWindSource};
use crate::sources::local::{LocalWindKind, LocalWindSource};
use crate::sources::obstacle::Obstacle;

/// Result of the global pass for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalPass {
    pub velocity: Vec3,
    /// Some obstacle fully covered the cell for at least one source
    pub occluded: bool,
}

/// Apply every active global source, each followed by the obstacle shadow.
///
/// # Arguments
///
/// * `position` - World position of the cell
/// * `velocity` - Velocity after advection and decay
/// * `globals` - Global source snapshot, applied in order
/// * `obstacles` - Obstacles casting shadows
/// * `noise` - Turbulence field
/// * `time` - Simulation time, drives the turbulence drift
pub fn apply_global_sources(
    position: &Vec3,
    velocity: Vec3,
    globals: &[GlobalWindSource],
    obstacles: &[Obstacle],
    noise: &SimplexNoise,
    time: f32,
) -> GlobalPass {
    let mut velocity = velocity;
    let mut occluded = false;

    for source in globals.iter().filter(|s| s.active) {
        match source.kind {
            GlobalWindKind::Directional => {
                velocity += source.direction * (source.strength * source.speed);
            }
            GlobalWindKind::Turbulent => {
                let drift = -source.direction * (time * source.speed);
                let sample_at = position * source.noise_scale + drift;
                let (_, gradient) = noise.sample_with_gradient(&sample_at);
                velocity += gradient * source.strength;
            }
        }

        let shadow = apply_shadow(position, velocity, &source.direction, source.speed, obstacles);
        velocity = shadow.velocity;
        occluded |= shadow.occluded;
    }

    GlobalPass { velocity, occluded }
}

/// Blend factor and unit direction of a local source at `position`, if it reaches the cell.
pub fn local_contribution(position: &Vec3, source: &LocalWindSource) -> Option<(f32, Vec3)> {
    match source.kind {
        LocalWindKind::Directional => {
            // The source's speed doubles as the cylinder length
            let t = inside_cylinder(
                position,
                &source.position,
                &source.direction,
                source.radius,
                source.radius,
                source.speed,
            )?;
            Some((1.0 - t, source.direction))
        }
        LocalWindKind::Omni => {
            let t = inside_sphere(position, &source.position, source.radius)?;
            Some((1.0 - t, radial_direction(position, source)))
        }
        LocalWindKind::Vortex => {
            let t = inside_sphere(position, &source.position, source.radius)?;
            let swirl = radial_direction(position, source).cross(&source.direction);
            Some((1.0 - t, swirl))
        }
    }
}

/// Outward direction from the source to the cell; at the exact centre the
/// source's own direction is used.
fn radial_direction(position: &Vec3, source: &LocalWindSource) -> Vec3 {
    let radial = safe_normalize(&(position - source.position));
    if radial == Vec3::zeros() {
        source.direction
    } else {
        radial
    }
}

/// Apply local sources in order. Overwriting sources replace what came before.
pub fn apply_local_sources(position: &Vec3, velocity: Vec3, locals: &[LocalWindSource]) -> Vec3 {
    let mut velocity = velocity;

    for source in locals.iter().filter(|s| s.active) {
        let Some((blend, direction)) = local_contribution(position, source) else {
            continue;
        };

        let contribution = direction * (blend * source.speed);
        velocity = if source.overwrite {
            contribution
        } else {
            velocity + contribution
        };
    }

    velocity
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn directional(direction: Vec3, strength: f32, speed: f32) -> GlobalWindSource {
        GlobalWindSource {
            active: true,
            kind: GlobalWindKind::Directional,
            direction,
            strength,
            speed,
            noise_scale: 1.0,
        }
    }

    fn local(kind: LocalWindKind, speed: f32, radius: f32) -> LocalWindSource {
        LocalWindSource {
            active: true,
            kind,
            overwrite: false,
            position: Vec3::zeros(),
            direction: Vec3::z(),
            speed,
            radius,
        }
    }

    #[test]
    fn test_directional_global_scales_by_strength_and_speed() {
        let noise = SimplexNoise::default();
        let pass = apply_global_sources(
            &Vec3::zeros(),
            Vec3::zeros(),
            &[directional(Vec3::x(), 2.0, 1.5)],
            &[],
            &noise,
            0.0,
        );
        assert_eq!(pass.velocity, Vec3::new(3.0, 0.0, 0.0));
        assert!(!pass.occluded);
    }

    #[test]
    fn test_inactive_global_ignored() {
        let noise = SimplexNoise::default();
        let mut source = directional(Vec3::x(), 2.0, 1.0);
        source.active = false;
        let pass = apply_global_sources(&Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), &[source], &[], &noise, 0.0);
        assert_eq!(pass.velocity, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_turbulent_uses_noise_gradient() {
        let noise = SimplexNoise::new(3);
        let source = GlobalWindSource {
            active: true,
            kind: GlobalWindKind::Turbulent,
            direction: Vec3::x(),
            strength: 2.0,
            speed: 0.5,
            noise_scale: 0.25,
        };
        let position = Vec3::new(1.0, 2.0, 3.0);
        let time = 4.0;

        let pass = apply_global_sources(&position, Vec3::zeros(), &[source], &[], &noise, time);
        let expected = noise
            .sample_with_gradient(&(position * 0.25 - Vec3::x() * 2.0))
            .1
            * 2.0;
        assert_relative_eq!(pass.velocity, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_occlusion_is_ored_across_sources() {
        let noise = SimplexNoise::default();
        let obstacle = Obstacle {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            radius: 1.0,
            push_strength: 0.0,
            shadow_strength: 1.0,
            shadow_distance: 1.0,
        };
        let mut inactive = directional(Vec3::y(), 1.0, 1.0);
        inactive.active = false;
        let sources = [directional(Vec3::x(), 1.0, 1.0), inactive];

        let pass = apply_global_sources(&Vec3::zeros(), Vec3::zeros(), &sources, &[obstacle], &noise, 0.0);
        assert!(pass.occluded);
        assert_eq!(pass.velocity, Vec3::zeros());
    }

    #[test]
    fn test_omni_blend_falls_off_to_boundary() {
        let source = local(LocalWindKind::Omni, 3.0, 5.0);
        let (blend, direction) = local_contribution(&Vec3::new(0.0, 2.5, 0.0), &source).unwrap();
        assert_relative_eq!(blend, 0.5);
        assert_relative_eq!(direction, Vec3::y());

        let (blend, _) = local_contribution(&Vec3::new(5.0, 0.0, 0.0), &source).unwrap();
        assert_eq!(blend, 0.0);
        assert!(local_contribution(&Vec3::new(5.1, 0.0, 0.0), &source).is_none());
    }

    #[test]
    fn test_omni_centre_uses_source_direction() {
        let source = local(LocalWindKind::Omni, 3.0, 5.0);
        let v = apply_local_sources(&Vec3::zeros(), Vec3::zeros(), &[source]);
        assert_relative_eq!(v.norm(), 3.0);
    }

    #[test]
    fn test_vortex_swirls_around_axis() {
        let source = local(LocalWindKind::Vortex, 2.0, 4.0);
        let v = apply_local_sources(&Vec3::new(2.0, 0.0, 0.0), Vec3::zeros(), &[source]);
        // cross(+x, +z) = -y, half strength at half radius
        assert_relative_eq!(v, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_directional_local_uses_speed_as_length() {
        const CYLINDER_LENGTH_IS_SPEED: f32 = 4.0;
        let source = local(LocalWindKind::Directional, CYLINDER_LENGTH_IS_SPEED, 1.0);

        let inside = apply_local_sources(&Vec3::new(0.0, 0.0, 1.0), Vec3::zeros(), &[source]);
        assert_relative_eq!(inside, Vec3::new(0.0, 0.0, 3.0));

        let beyond = apply_local_sources(&Vec3::new(0.0, 0.0, 4.5), Vec3::zeros(), &[source]);
        assert_eq!(beyond, Vec3::zeros());
    }

    #[test]
    fn test_overwrite_order_matters() {
        let mut first = local(LocalWindKind::Omni, 2.0, 10.0);
        first.overwrite = true;
        let additive = local(LocalWindKind::Directional, 10.0, 10.0);
        let position = Vec3::new(0.0, 0.0, 5.0);

        let a = apply_local_sources(&position, Vec3::new(100.0, 0.0, 0.0), &[first, additive]);
        let b = apply_local_sources(&position, Vec3::new(100.0, 0.0, 0.0), &[additive, first]);
        // Existing velocity is dropped either way; only `a` keeps the additive source
        assert_relative_eq!(a, Vec3::new(0.0, 0.0, 1.0 + 5.0));
        assert_relative_eq!(b, Vec3::new(0.0, 0.0, 1.0));
    }
}
