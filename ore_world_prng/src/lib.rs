// Seedable pseudo-random source for the ore world simulation.
//
// xoshiro256++ (Blackman & Vigna, 2019) seeded through SplitMix64. The sim
// draws exactly two kinds of values from it: the action period of ore spawned
// by a vein, and the animation period of a blob that ore matures into. Both
// are half-open integer ranges, so the public surface is deliberately small.
//
// The generator is owned by `SimState` and lent to behaviors as `&mut`. There
// is no process-wide instance; two sims built from the same seed replay the
// same world exactly.
//
// **Critical constraint: determinism.** Output depends only on the seed and
// the number of prior draws. No floating point, no OS entropy.

/// Xoshiro256++ generator state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Create a generator from a `u64` seed. SplitMix64 expands the seed into
    /// the 256-bit state, so small seeds (0, 1, 42) are fine.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)`, without modulo bias.
    ///
    /// Panics if `low >= high`. Callers that take ranges from config validate
    /// them up front (see `SimConfig::validate`).
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        // Reject the short tail of the u64 space that would bias small values.
        let threshold = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % span);
            }
        }
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
