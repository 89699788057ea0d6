//! Deterministic pseudo-random generator.
//!
//! A small LCG keeps sampling and parameter initialization reproducible
//! for a fixed seed, independent of any device RNG state.

/// Linear congruential generator (Knuth constants).
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 31-bit value.
    fn next_raw(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        self.state >> 33
    }

    /// Next 62-bit value, for deriving child seeds.
    pub fn next_u64(&mut self) -> u64 {
        (self.next_raw() << 31) | self.next_raw()
    }

    /// Uniform f32 in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_raw() as f64 / (1u64 << 31) as f64) as f32
    }

    /// Uniform f32 in [low, high).
    pub fn next_range(&mut self, low: f32, high: f32) -> f32 {
        low + self.next_f32() * (high - low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);

        for _ in 0..100 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn test_unit_interval() {
        let mut rng = Lcg::new(7);
        for _ in 0..1000 {
            let x = rng.next_f32();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
