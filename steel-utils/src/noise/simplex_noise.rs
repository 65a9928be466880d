//! Simplex noise over a seeded lattice. The climate and surface noises only
//! sample it in 2D; the 3D form seeds their higher octaves.

use crate::random::Random;

use super::{
    floor,
    lattice::{Lattice, grad_dot},
};

/// Skew factor for 2D, `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskew factor for 2D, `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_1;
const F3: f64 = 1.0 / 3.0;
const G3: f64 = 1.0 / 6.0;

/// Contribution of one simplex corner with radial falloff `radius`.
#[inline]
fn corner(gradient: i32, x: f64, y: f64, z: f64, radius: f64) -> f64 {
    let falloff = radius - x * x - y * y - z * z;
    if falloff < 0.0 {
        0.0
    } else {
        let squared = falloff * falloff;
        squared * squared * grad_dot(gradient, x, y, z)
    }
}

/// One simplex noise instance.
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    lattice: Lattice,
}

impl SimplexNoise {
    /// Creates a new `SimplexNoise` from a random source.
    pub fn new<R: Random>(random: &mut R) -> Self {
        Self {
            lattice: Lattice::new(random),
        }
    }

    /// The seeded origin. Callers add it themselves; sampling does not.
    #[must_use]
    pub const fn origin(&self) -> [f64; 3] {
        self.lattice.origin
    }

    /// Gradient index of a 2D lattice point. Only the first twelve gradients
    /// are reachable.
    #[inline]
    fn gradient_2d(&self, i: i32, j: i32) -> i32 {
        self.lattice.hash(i + self.lattice.hash(j)) % 12
    }

    #[inline]
    fn gradient_3d(&self, i: i32, j: i32, k: i32) -> i32 {
        self.lattice
            .hash(i + self.lattice.hash(j + self.lattice.hash(k)))
            % 12
    }

    /// Samples 2D noise, roughly in `[-1, 1]`.
    #[must_use]
    pub fn get_value_2d(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * F2;
        let (i, j) = (floor(x + skew), floor(y + skew));
        let unskew = f64::from(i + j) * G2;
        let (x0, y0) = (x - (f64::from(i) - unskew), y - (f64::from(j) - unskew));

        // Lower or upper triangle of the skewed cell.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };
        let (x1, y1) = (x0 - f64::from(i1) + G2, y0 - f64::from(j1) + G2);
        let (x2, y2) = (x0 - 1.0 + 2.0 * G2, y0 - 1.0 + 2.0 * G2);

        let (ii, jj) = (i & 255, j & 255);
        let n0 = corner(self.gradient_2d(ii, jj), x0, y0, 0.0, 0.5);
        let n1 = corner(self.gradient_2d(ii + i1, jj + j1), x1, y1, 0.0, 0.5);
        let n2 = corner(self.gradient_2d(ii + 1, jj + 1), x2, y2, 0.0, 0.5);
        70.0 * (n0 + n1 + n2)
    }

    /// Samples 3D noise, roughly in `[-1, 1]`.
    #[must_use]
    pub fn get_value_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let skew = (x + y + z) * F3;
        let (i, j, k) = (floor(x + skew), floor(y + skew), floor(z + skew));
        let unskew = f64::from(i + j + k) * G3;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);
        let z0 = z - (f64::from(k) - unskew);

        // The two middle corners of the tetrahedron containing the point.
        let (second, third) = if x0 >= y0 {
            if y0 >= z0 {
                ([1, 0, 0], [1, 1, 0])
            } else if x0 >= z0 {
                ([1, 0, 0], [1, 0, 1])
            } else {
                ([0, 0, 1], [1, 0, 1])
            }
        } else if y0 < z0 {
            ([0, 0, 1], [0, 1, 1])
        } else if x0 < z0 {
            ([0, 1, 0], [0, 1, 1])
        } else {
            ([0, 1, 0], [1, 1, 0])
        };
        let offset = |step: [i32; 3], unskew: f64| {
            (
                x0 - f64::from(step[0]) + unskew,
                y0 - f64::from(step[1]) + unskew,
                z0 - f64::from(step[2]) + unskew,
            )
        };
        let (x1, y1, z1) = offset(second, G3);
        let (x2, y2, z2) = offset(third, 2.0 * G3);
        let (x3, y3, z3) = (x0 - 1.0 + 0.5, y0 - 1.0 + 0.5, z0 - 1.0 + 0.5);

        let (ii, jj, kk) = (i & 255, j & 255, k & 255);
        let gradient_at =
            |[di, dj, dk]: [i32; 3]| self.gradient_3d(ii + di, jj + dj, kk + dk);
        let n0 = corner(gradient_at([0, 0, 0]), x0, y0, z0, 0.6);
        let n1 = corner(gradient_at(second), x1, y1, z1, 0.6);
        let n2 = corner(gradient_at(third), x2, y2, z2, 0.6);
        let n3 = corner(gradient_at([1, 1, 1]), x3, y3, z3, 0.6);
        32.0 * (n0 + n1 + n2 + n3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RandomSource, legacy_random::LegacyRandom};

    fn noise(seed: u64) -> SimplexNoise {
        SimplexNoise::new(&mut RandomSource::Legacy(LegacyRandom::from_seed(seed)))
    }

    #[test]
    fn same_seed_same_noise() {
        let (a, b) = (noise(1234), noise(1234));
        for i in 0..32 {
            let p = f64::from(i) * 0.61 - 9.0;
            assert_eq!(a.get_value_2d(p, -p).to_bits(), b.get_value_2d(p, -p).to_bits());
            assert_eq!(
                a.get_value_3d(p, 0.5, -p).to_bits(),
                b.get_value_3d(p, 0.5, -p).to_bits()
            );
        }
        assert_ne!(noise(1).origin(), noise(2).origin());
    }

    #[test]
    fn samples_stay_near_unit_range() {
        let noise = noise(42);
        for x in -20..20 {
            for y in -20..20 {
                let (px, py) = (f64::from(x) * 0.37, f64::from(y) * 0.41);
                let flat = noise.get_value_2d(px, py);
                assert!((-1.5..=1.5).contains(&flat), "2D {flat}");
                let solid = noise.get_value_3d(px, py, px - py);
                assert!((-1.5..=1.5).contains(&solid), "3D {solid}");
            }
        }
    }

    #[test]
    fn simplex_vertices_sample_zero() {
        let noise = noise(7);
        // Each vertex is the only corner in range and sits at zero offset.
        assert_eq!(noise.get_value_2d(0.0, 0.0), 0.0);
        assert_eq!(noise.get_value_3d(0.0, 0.0, 0.0), 0.0);
    }
}
