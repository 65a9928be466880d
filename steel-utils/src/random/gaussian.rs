//! Marsaglia polar method, matching `java.util.Random#nextGaussian`.

use super::Random;

/// Random sources that cache the second value of each generated gaussian pair.
pub trait MarsagliaPolarGaussian: Random {
    /// The cached second value, if any.
    fn stored_next_gaussian(&self) -> Option<f64>;

    /// Replaces the cached value.
    fn set_stored_next_gaussian(&mut self, value: Option<f64>);

    /// Produces the next gaussian, consuming the cached one first.
    fn calculate_gaussian(&mut self) -> f64 {
        if let Some(gaussian) = self.stored_next_gaussian() {
            self.set_stored_next_gaussian(None);
            return gaussian;
        }

        loop {
            let v1 = 2.0 * self.next_f64() - 1.0;
            let v2 = 2.0 * self.next_f64() - 1.0;
            let s = v1 * v1 + v2 * v2;
            if s < 1.0 && s != 0.0 {
                let multiplier = (-2.0 * s.ln() / s).sqrt();
                self.set_stored_next_gaussian(Some(v2 * multiplier));
                return v1 * multiplier;
            }
        }
    }
}
