//! Single-octave 3D gradient noise, the building block of [`super::PerlinNoise`].

use crate::random::Random;

use super::{
    floor, lerp3,
    lattice::{Lattice, grad_dot},
    smoothstep,
};

/// Cube corners in `lerp3` argument order: x varies fastest, then y, then z.
const CORNERS: [[i32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// One octave of Perlin noise over a seeded lattice.
#[derive(Debug, Clone)]
pub struct ImprovedNoise {
    lattice: Lattice,
}

impl ImprovedNoise {
    /// Creates a new `ImprovedNoise` from a random source.
    pub fn new<R: Random>(random: &mut R) -> Self {
        Self {
            lattice: Lattice::new(random),
        }
    }

    /// Offset added to every sample position.
    #[must_use]
    pub const fn origin(&self) -> [f64; 3] {
        self.lattice.origin
    }

    /// Samples the noise at `(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise_with_y_params(x, y, z, 0.0, 0.0)
    }

    /// Samples with vertical smearing: the y offset used for the gradients is
    /// snapped down to a multiple of `y_scale`, capped at `y_max` when that is
    /// non-negative. A zero `y_scale` disables it.
    #[must_use]
    pub fn noise_with_y_params(&self, x: f64, y: f64, z: f64, y_scale: f64, y_max: f64) -> f64 {
        let [xo, yo, zo] = self.lattice.origin;
        let (x, y, z) = (x + xo, y + yo, z + zo);
        let cell = [floor(x), floor(y), floor(z)];
        let local = [
            x - f64::from(cell[0]),
            y - f64::from(cell[1]),
            z - f64::from(cell[2]),
        ];

        let smear = if y_scale == 0.0 {
            0.0
        } else {
            let limit = if (0.0..local[1]).contains(&y_max) {
                y_max
            } else {
                local[1]
            };
            // 1.0E-7F in the game, a float widened to double.
            f64::from(floor(limit / y_scale + f64::from(1.0e-7_f32))) * y_scale
        };

        self.blend_corners(cell, [local[0], local[1] - smear, local[2]], local[1])
    }

    /// Trilinear blend of the eight corner gradients. The y fade uses the
    /// unsmeared offset.
    fn blend_corners(&self, cell: [i32; 3], offset: [f64; 3], fade_y: f64) -> f64 {
        let lattice = &self.lattice;
        let mut values = [0.0; 8];
        for (value, [cx, cy, cz]) in values.iter_mut().zip(CORNERS) {
            let hash = lattice.hash(
                lattice.hash(lattice.hash(cell[0] + cx) + cell[1] + cy) + cell[2] + cz,
            );
            *value = grad_dot(
                hash,
                offset[0] - f64::from(cx),
                offset[1] - f64::from(cy),
                offset[2] - f64::from(cz),
            );
        }

        let [v000, v100, v010, v110, v001, v101, v011, v111] = values;
        lerp3(
            smoothstep(offset[0]),
            smoothstep(fade_y),
            smoothstep(offset[2]),
            v000,
            v100,
            v010,
            v110,
            v001,
            v101,
            v011,
            v111,
        )
    }
}
