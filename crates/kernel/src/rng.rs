use std::f64::consts::PI;

/// Deterministic generator for scene setup.
///
/// Each draw advances the state with splitmix64, so a given seed always
/// reproduces the same layout on every platform.
#[derive(Debug, Clone)]
pub struct SceneRng {
    seed: u64,
    state: u64,
}

impl SceneRng {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform draw in `[0, 1)`, using the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform draw in `(-r/2, r/2]`, computed as `r/2 - u*r`.
    pub fn centered(&mut self, r: f64) -> f64 {
        r / 2.0 - self.next_f64() * r
    }

    /// Uniform angle in `[0, π)`.
    pub fn half_turn(&mut self) -> f64 {
        self.next_f64() * PI
    }
}
