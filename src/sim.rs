use crate::config::GachaSystemConfig;
use crate::pity::pity_rate;
use crate::rng::RollSource;
use serde::{Deserialize, Serialize};

/// Result of one player pulling until the featured outcome lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub pulls: u32,
    /// True when the featured outcome came only from the cumulative guarantee.
    pub won_at_guarantee: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PullCounters {
    /// Never reset; becomes `TrialOutcome::pulls`.
    pub total_pulls: u32,
    /// Reset to 0 whenever a generic success loses the 50/50.
    pub pity_counter: u32,
    /// Never reset; drives the featured guarantee.
    pub featured_counter: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialState {
    Pulling(PullCounters),
    Done(TrialOutcome),
}

impl TrialState {
    pub fn start() -> Self {
        TrialState::Pulling(PullCounters::default())
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TrialState::Done(_))
    }

    /// Performs one pull. `Done` is absorbing.
    ///
    /// Draws one roll for the success check and, only on a generic success
    /// that is not already forced to be featured under a 50/50 banner, a
    /// second independent roll for the coin.
    pub fn step<R: RollSource + ?Sized>(self, config: &GachaSystemConfig, rng: &mut R) -> Self {
        let mut counters = match self {
            TrialState::Done(_) => return self,
            TrialState::Pulling(counters) => counters,
        };

        counters.total_pulls += 1;
        counters.pity_counter += 1;
        counters.featured_counter += 1;

        let current_rate = pity_rate(counters.pity_counter, config);
        let roll = rng.next_roll();

        let hit_hard_pity = counters.pity_counter >= config.hard_pity;
        let hit_featured_guarantee = counters.featured_counter >= config.featured_guarantee;

        if !(roll < current_rate || hit_hard_pity || hit_featured_guarantee) {
            return TrialState::Pulling(counters);
        }

        let featured = if hit_featured_guarantee {
            true
        } else if config.has_fifty_fifty {
            rng.next_roll() < 0.5
        } else {
            true
        };

        if featured {
            TrialState::Done(TrialOutcome {
                pulls: counters.total_pulls,
                won_at_guarantee: hit_featured_guarantee,
            })
        } else {
            counters.pity_counter = 0;
            TrialState::Pulling(counters)
        }
    }
}

/// Runs one trial to completion.
///
/// Terminates within `featured_guarantee` pulls (or `hard_pity` pulls without
/// a 50/50) since `featured_counter` only ever grows.
pub fn simulate_trial<R: RollSource + ?Sized>(config: &GachaSystemConfig, rng: &mut R) -> TrialOutcome {
    let mut state = TrialState::start();
    loop {
        match state.step(config, rng) {
            TrialState::Done(outcome) => return outcome,
            next => state = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;
    use std::collections::VecDeque;

    struct ScriptedRolls(VecDeque<f64>);

    impl ScriptedRolls {
        fn new(rolls: &[f64]) -> Self {
            ScriptedRolls(rolls.iter().copied().collect())
        }
    }

    impl RollSource for ScriptedRolls {
        fn next_roll(&mut self) -> f64 {
            self.0.pop_front().expect("script ran out of rolls")
        }
    }

    /// Bare rand_core generator that always yields the same word.
    struct ConstantRng(u64);

    impl rand_core::RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            rand_core::impls::fill_bytes_via_next(self, dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn config(base_rate: f64, hard_pity: u32, featured_guarantee: u32, has_fifty_fifty: bool) -> GachaSystemConfig {
        GachaSystemConfig {
            base_rate,
            soft_pity_start: 1,
            soft_pity_increment: 0.0,
            hard_pity,
            featured_guarantee,
            has_fifty_fifty,
        }
    }

    fn endfield(has_fifty_fifty: bool) -> GachaSystemConfig {
        GachaSystemConfig {
            base_rate: 0.008,
            soft_pity_start: 65,
            soft_pity_increment: 0.05,
            hard_pity: 80,
            featured_guarantee: 120,
            has_fifty_fifty,
        }
    }

    #[test]
    fn zero_base_rate_finishes_exactly_at_forced_pull() {
        let mut rng = Rng::from_seed(11);
        for has_fifty_fifty in [false, true] {
            let config = config(0.0, 5, 5, has_fifty_fifty);
            for _ in 0..100 {
                let outcome = simulate_trial(&config, &mut rng);
                assert_eq!(outcome.pulls, 5);
                assert!(outcome.won_at_guarantee);
            }
        }
    }

    #[test]
    fn certain_rate_without_coin_finishes_on_first_pull() {
        let mut rng = Rng::from_seed(12);
        let config = config(1.0, 80, 120, false);
        for _ in 0..100 {
            let outcome = simulate_trial(&config, &mut rng);
            assert_eq!(outcome, TrialOutcome { pulls: 1, won_at_guarantee: false });
        }
    }

    #[test]
    fn roll_threshold_is_strict() {
        let config = config(0.25, 80, 120, false);

        let mut just_below = ScriptedRolls::new(&[0.249_999]);
        let state = TrialState::start().step(&config, &mut just_below);
        assert!(state.is_done());

        let mut exactly_at = ScriptedRolls::new(&[0.25]);
        let state = TrialState::start().step(&config, &mut exactly_at);
        assert_eq!(
            state,
            TrialState::Pulling(PullCounters { total_pulls: 1, pity_counter: 1, featured_counter: 1 })
        );
    }

    #[test]
    fn lost_coin_resets_only_pity() {
        let config = config(0.0, 3, 10, true);
        // pulls 1-2 miss, pull 3 hard pity + lost coin, pulls 4-5 miss,
        // pull 6 hard pity + won coin.
        let mut script = ScriptedRolls::new(&[0.9, 0.9, 0.9, 0.7, 0.9, 0.9, 0.9, 0.2]);

        let mut state = TrialState::start();
        for _ in 0..3 {
            state = state.step(&config, &mut script);
        }
        assert_eq!(
            state,
            TrialState::Pulling(PullCounters { total_pulls: 3, pity_counter: 0, featured_counter: 3 })
        );

        for _ in 0..3 {
            state = state.step(&config, &mut script);
        }
        assert_eq!(state, TrialState::Done(TrialOutcome { pulls: 6, won_at_guarantee: false }));
        assert!(script.0.is_empty());
    }

    #[test]
    fn featured_guarantee_skips_the_coin() {
        let config = config(0.0, 3, 7, true);
        // Coin lost at pulls 3 and 6; pull 7 is forced featured with no coin drawn.
        let mut script = ScriptedRolls::new(&[0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9]);
        let outcome = simulate_trial(&config, &mut script);
        assert_eq!(outcome, TrialOutcome { pulls: 7, won_at_guarantee: true });
        assert!(script.0.is_empty());
    }

    #[test]
    fn any_rng_core_drives_a_trial() {
        let config = endfield(true);

        // Rolls of ~1.0 miss every probability check and lose every coin.
        let outcome = simulate_trial(&config, &mut ConstantRng(u64::MAX));
        assert_eq!(outcome, TrialOutcome { pulls: 120, won_at_guarantee: true });

        // Rolls of 0.0 hit on the first pull and win the coin.
        let outcome = simulate_trial(&config, &mut ConstantRng(0));
        assert_eq!(outcome, TrialOutcome { pulls: 1, won_at_guarantee: false });
    }

    #[test]
    fn done_state_is_absorbing() {
        let config = config(1.0, 80, 120, false);
        let done = TrialState::Done(TrialOutcome { pulls: 4, won_at_guarantee: false });
        let mut script = ScriptedRolls::new(&[]);
        assert_eq!(done.step(&config, &mut script), done);
    }

    #[test]
    fn fifty_fifty_pulls_never_exceed_featured_guarantee() {
        let config = endfield(true);
        let mut rng = Rng::from_seed(2024);
        for _ in 0..5_000 {
            let outcome = simulate_trial(&config, &mut rng);
            assert!(outcome.pulls >= 1 && outcome.pulls <= config.featured_guarantee);
            assert_eq!(outcome.won_at_guarantee, outcome.pulls == config.featured_guarantee);
        }
    }

    #[test]
    fn without_coin_pulls_never_exceed_hard_pity() {
        let config = endfield(false);
        let mut rng = Rng::from_seed(2025);
        for _ in 0..5_000 {
            let outcome = simulate_trial(&config, &mut rng);
            assert!(outcome.pulls >= 1 && outcome.pulls <= config.hard_pity);
            assert!(!outcome.won_at_guarantee);
        }
    }
}
