use rand_core::{Error, RngCore};
use std::time::{SystemTime, UNIX_EPOCH};

// --- Pseudo-Random Number Generator ---
// Algorithm: xoshiro256** (StarStar), seeded through SplitMix64.
// Reference: https://prng.di.unimi.it/

/// Anything that can hand the trial simulator a uniform value in [0, 1).
///
/// The simulator only ever asks for rolls through this trait, so tests can
/// replay a scripted sequence and land exactly on a threshold.
pub trait RollSource {
    fn next_roll(&mut self) -> f64;
}

#[derive(Clone, Debug)]
pub struct Rng {
    state: [u64; 4],
}

#[inline]
fn split_mix64(s: &mut u64) -> u64 {
    *s = s.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *s;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

impl Rng {
    pub fn from_seed(mut seed: u64) -> Self {
        Rng {
            state: [
                split_mix64(&mut seed),
                split_mix64(&mut seed),
                split_mix64(&mut seed),
                split_mix64(&mut seed),
            ],
        }
    }

    /// Seed from the wall clock mixed with a heap address (ASLR entropy).
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let heap_var = Box::new(0u8);
        let ptr_val = &*heap_var as *const u8 as u64;
        Self::from_seed(nanos ^ ptr_val)
    }

    /// Independent stream for one trial of a batch.
    ///
    /// The trial index is pushed through SplitMix64 before seeding so that
    /// neighbouring trials do not share correlated starting states, and the
    /// stream depends only on `(base_seed, trial)`, never on which worker
    /// thread picks the trial up.
    pub fn for_trial(base_seed: u64, trial: u64) -> Self {
        let mut mix = base_seed ^ trial.wrapping_mul(0xd1b54a32d192ed03);
        Self::from_seed(split_mix64(&mut mix))
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];

        self.state[2] ^= t;

        self.state[3] = self.state[3].rotate_left(45);

        result
    }
}

// Any rand_core generator can drive a trial: (u64 >> 11) * 2^-53, always in [0.0, 1.0)
impl<R: RngCore> RollSource for R {
    #[inline]
    fn next_roll(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / 9007199254740992.0)
    }
}

impl RngCore for Rng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        Rng::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = Rng::next_u64(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
