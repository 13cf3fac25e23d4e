//! Simplex noise with analytic gradient for turbulent wind
//!
//! Turbulent global winds need a smooth, deterministic 3D field whose
//! derivative is available in closed form: the gradient itself is used as the
//! turbulence vector, so it has to be continuous everywhere the field is.
//!
//! # Implementation
//!
//! Classic 3D simplex noise (skewed tetrahedral lattice) with the
//! `(r² - |d|²)⁴` radial kernel. Using `r² = 0.5` keeps every corner's support
//! inside the simplices that reference it, so both the value and the gradient
//! are continuous across cell boundaries. Gradients are the 12 cube-edge
//! directions, normalized.
//!
//! # References
//!
//! - Perlin, K. (2001). Noise hardware. SIGGRAPH course notes.
//! - Gustavson, S. (2005). Simplex noise demystified.

use crate::core_types::vec3::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::f32::consts::FRAC_1_SQRT_2;

/// Seed used when the caller does not pick one.
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0F3D_u64;

/// Skew factor for 3D: (sqrt(4) - 1) / 3
const F3: f32 = 1.0 / 3.0;
/// Unskew factor for 3D: (1 - 1/sqrt(4)) / 3
const G3: f32 = 1.0 / 6.0;

/// Squared kernel radius
const KERNEL_RADIUS_SQ: f32 = 0.5;

/// Brings the summed kernels to roughly [-1, 1]
const OUTPUT_SCALE: f32 = 39.5;

const GRADIENTS: [[f32; 3]; 12] = [
    [FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0],
    [-FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0],
    [FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0],
    [-FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0],
    [FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2],
    [-FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2],
    [FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2],
    [-FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2],
    [0.0, -FRAC_1_SQRT_2, FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
    [0.0, -FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
];

/// Deterministic 3D simplex noise generator.
///
/// The permutation table is shuffled from `seed`, so two generators with the
/// same seed produce identical fields.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    seed: u64,
    /// Doubled permutation table, avoids wrapping during corner hashing
    perm: [u8; 512],
}

impl SimplexNoise {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0_u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }

        Self { seed, perm }
    }

    /// Seed this generator was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Noise value at `p`, roughly in [-1, 1].
    #[must_use]
    pub fn sample(&self, p: &Vec3) -> f32 {
        self.sample_with_gradient(p).0
    }

    /// Noise value and its analytic gradient at `p`.
    ///
    /// Non-finite input yields `(0, 0)` rather than propagating NaN.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn sample_with_gradient(&self, p: &Vec3) -> (f32, Vec3) {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return (0.0, Vec3::zeros());
        }

        // Skew into simplex cell space
        let s = (p.x + p.y + p.z) * F3;
        let i = (p.x + s).floor();
        let j = (p.y + s).floor();
        let k = (p.z + s).floor();

        let t = (i + j + k) * G3;
        let d0 = Vec3::new(p.x - (i - t), p.y - (j - t), p.z - (k - t));

        // Which of the six tetrahedra we are in
        let (c1, c2): ([usize; 3], [usize; 3]) = if d0.x >= d0.y {
            if d0.y >= d0.z {
                ([1, 0, 0], [1, 1, 0])
            } else if d0.x >= d0.z {
                ([1, 0, 0], [1, 0, 1])
            } else {
                ([0, 0, 1], [1, 0, 1])
            }
        } else if d0.y < d0.z {
            ([0, 0, 1], [0, 1, 1])
        } else if d0.x < d0.z {
            ([0, 1, 0], [0, 1, 1])
        } else {
            ([0, 1, 0], [1, 1, 0])
        };

        let corners = [[0, 0, 0], c1, c2, [1, 1, 1]];

        let ii = lattice_index(i);
        let jj = lattice_index(j);
        let kk = lattice_index(k);

        let mut value = 0.0_f32;
        let mut gradient = Vec3::zeros();

        for (n, corner) in corners.iter().enumerate() {
            let unskew = G3 * n as f32;
            let d = Vec3::new(
                d0.x - corner[0] as f32 + unskew,
                d0.y - corner[1] as f32 + unskew,
                d0.z - corner[2] as f32 + unskew,
            );

            let falloff = KERNEL_RADIUS_SQ - d.norm_squared();
            if falloff <= 0.0 {
                continue;
            }

            let g = self.corner_gradient(ii + corner[0], jj + corner[1], kk + corner[2]);
            let g_dot = g.dot(&d);
            let f2 = falloff * falloff;
            let f4 = f2 * f2;

            value += f4 * g_dot;
            // d/dp [f⁴ (g·d)] = f⁴ g - 8 f³ (g·d) d
            gradient += g * f4 - d * (8.0 * f2 * falloff * g_dot);
        }

        (value * OUTPUT_SCALE, gradient * OUTPUT_SCALE)
    }

    /// Gradient vector assigned to a lattice corner.
    #[inline]
    fn corner_gradient(&self, x: usize, y: usize, z: usize) -> Vec3 {
        let hz = self.perm[z] as usize;
        let hy = self.perm[y + hz] as usize;
        let h = self.perm[x + hy] as usize;
        let g = GRADIENTS[h % GRADIENTS.len()];
        Vec3::new(g[0], g[1], g[2])
    }
}

impl Default for SimplexNoise {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

/// Wrap a floored lattice coordinate into the permutation table range.
#[inline]
fn lattice_index(v: f32) -> usize {
    // Saturating float-to-int cast keeps huge inputs defined
    ((v as i64) & 255) as usize
}
