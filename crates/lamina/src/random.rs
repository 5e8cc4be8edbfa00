//! Seeded pseudo random numbers.
//!
//! One [`Random`] is created per top-level invocation and handed down by `&mut`; every
//! randomized decision (rank policy, sweep direction, first-layer shuffle, barycenter jitter)
//! draws from it in a fixed order so a seed reproduces a layout exactly.

/// xorshift64* generator.
#[derive(Debug, Clone)]
pub struct Random {
    state: u64,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    /// Restarts the sequence as if freshly created with `seed`.
    pub fn set_seed(&mut self, seed: u64) {
        self.state = seed.max(1);
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }

    /// Uniform in `[0, 1)` with 24 bits of precision.
    pub fn next_f32(&mut self) -> f32 {
        let u = self.next_u64() >> 40;
        (u as f32) / ((1u32 << 24) as f32)
    }

    pub fn next_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let idx = (self.next_f64() * (upper as f64)).floor() as usize;
        idx.min(upper - 1)
    }
}
