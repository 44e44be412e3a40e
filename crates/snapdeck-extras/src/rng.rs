#![forbid(unsafe_code)]

//! Small deterministic PRNG shared by the extras.
//!
//! Decorative layout and shuffle order only need "looks random", and tests
//! need reproducibility, so a seeded xorshift64 is enough. Hosts seed it
//! from the wall clock.

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// xorshift64 generator.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Seed the generator. Any seed is valid, including zero.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let state = seed.wrapping_add(1) ^ GOLDEN;
        Self {
            state: if state == 0 { GOLDEN } else { state },
        }
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[-0.5, 0.5)`.
    pub fn centered(&mut self) -> f64 {
        self.next_f64() - 0.5
    }

    /// Uniform index in `[0, n)`. Returns 0 for `n == 0`.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        (self.next_f64() * n as f64) as usize % n
    }

    /// Lowercase base-36 string of `len` digits.
    pub fn base36(&mut self, len: usize) -> String {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        (0..len)
            .map(|_| DIGITS[self.below(DIGITS.len())] as char)
            .collect()
    }
}
