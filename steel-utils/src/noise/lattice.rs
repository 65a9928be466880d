//! The seeded lattice shared by the gradient noises: a random origin and a
//! shuffled permutation of `0..256` that hashes lattice points to gradients.

use crate::random::Random;

/// The sixteen gradient directions. The last four repeat earlier ones so a
/// hash can be masked with `15` instead of reduced modulo `12`.
const GRADIENTS: [[f64; 3]; 16] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, -1.0],
];

/// Dot product of the gradient picked by `hash` with an offset.
#[inline]
pub(super) fn grad_dot(hash: i32, x: f64, y: f64, z: f64) -> f64 {
    let [gx, gy, gz] = GRADIENTS[(hash & 15) as usize];
    gx * x + gy * y + gz * z
}

/// Origin and permutation table of one noise instance.
#[derive(Debug, Clone)]
pub(super) struct Lattice {
    permutation: [u8; 256],
    /// Offset added to every sample position.
    pub origin: [f64; 3],
}

impl Lattice {
    /// Draws the origin, then shuffles the table with a forward Fisher-Yates
    /// pass. The draw order is fixed by the game.
    pub fn new<R: Random>(random: &mut R) -> Self {
        let origin = [
            random.next_f64() * 256.0,
            random.next_f64() * 256.0,
            random.next_f64() * 256.0,
        ];

        let mut permutation = [0u8; 256];
        for (slot, value) in permutation.iter_mut().zip(0..=255u8) {
            *slot = value;
        }
        for i in 0..256 {
            let j = random.next_i32_bounded(256 - i as i32) as usize;
            permutation.swap(i, i + j);
        }

        Self {
            permutation,
            origin,
        }
    }

    /// Permutation entry for `index`, wrapping every 256.
    #[inline]
    pub fn hash(&self, index: i32) -> i32 {
        i32::from(self.permutation[(index & 255) as usize])
    }
}
