use crate::config::{GachaSystemConfig, SimParams};
use crate::error::{Result, SimError};
use crate::rng::Rng;
use crate::sim::{simulate_trial, TrialOutcome};
use crate::worker::TrialWorker;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const CHUNK_SIZE: usize = 256;

/// Outcomes of one Monte Carlo run, in trial-index order.
///
/// Read-only once built; the aggregators only ever borrow it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationBatch {
    outcomes: Vec<TrialOutcome>,
}

impl SimulationBatch {
    pub fn new(outcomes: Vec<TrialOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[TrialOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn pulls(&self) -> Vec<u32> {
        self.outcomes.iter().map(|o| o.pulls).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrialOutcome> {
        self.outcomes.iter()
    }
}

/// Master seed -> per-batch base seed. Trial `i` then uses
/// `Rng::for_trial(base_seed, i)`, so results only depend on `seed`.
fn base_seed(seed: u64) -> u64 {
    Rng::from_seed(seed).next_u64()
}

fn run_trial(config: &GachaSystemConfig, base_seed: u64, trial: usize) -> TrialOutcome {
    let mut rng = Rng::for_trial(base_seed, trial as u64);
    simulate_trial(config, &mut rng)
}

/// Single-threaded batch. Yields the same batch as [`MonteCarloEngine::run`]
/// for the same seed.
pub fn run_monte_carlo(config: &GachaSystemConfig, sim_count: usize, seed: u64) -> SimulationBatch {
    if sim_count == 0 {
        warn!("Monte Carlo run requested with 0 trials, returning an empty batch");
        return SimulationBatch::default();
    }
    let base_seed = base_seed(seed);
    let outcomes = (0..sim_count)
        .map(|trial| run_trial(config, base_seed, trial))
        .collect();
    SimulationBatch::new(outcomes)
}

/// Pooled batch runner.
pub struct MonteCarloEngine {
    worker: TrialWorker,
}

impl MonteCarloEngine {
    pub fn new(worker: TrialWorker) -> Self {
        Self { worker }
    }

    pub fn thread_count(&self) -> usize {
        self.worker.thread_count()
    }

    pub fn run(&self, params: &SimParams, seed: u64) -> Result<SimulationBatch> {
        let never = AtomicBool::new(false);
        self.run_cancellable(params, seed, &never)
    }

    /// Like [`run`](Self::run) but checks `cancel` between trials. A
    /// cancelled run yields `SimError::Cancelled`, never a partial batch.
    pub fn run_cancellable(&self, params: &SimParams, seed: u64, cancel: &AtomicBool) -> Result<SimulationBatch> {
        let sim_count = params.sim_count;
        if sim_count == 0 {
            warn!("Monte Carlo run requested with 0 trials, returning an empty batch");
            return Ok(SimulationBatch::default());
        }

        let config = &params.config;
        let base_seed = base_seed(seed);
        let chunk_count = (sim_count + CHUNK_SIZE - 1) / CHUNK_SIZE;
        info!(
            "Running {} trials in {} chunks on {} threads",
            sim_count,
            chunk_count,
            self.worker.thread_count()
        );

        let start = Instant::now();
        let chunks: Option<Vec<Vec<TrialOutcome>>> = self.worker.execute(|| {
            (0..chunk_count)
                .into_par_iter()
                .map(|chunk_idx| {
                    let start = chunk_idx * CHUNK_SIZE;
                    let end = (start + CHUNK_SIZE).min(sim_count);
                    let mut local = Vec::with_capacity(end - start);
                    for trial in start..end {
                        if cancel.load(Ordering::Relaxed) {
                            return None;
                        }
                        local.push(run_trial(config, base_seed, trial));
                    }
                    Some(local)
                })
                .collect()
        })?;

        let chunks = chunks.ok_or(SimError::Cancelled)?;
        let outcomes: Vec<TrialOutcome> = chunks.into_iter().flatten().collect();
        debug!("Batch of {} trials finished in {:.2?}", outcomes.len(), start.elapsed());
        Ok(SimulationBatch::new(outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endfield() -> GachaSystemConfig {
        GachaSystemConfig {
            base_rate: 0.008,
            soft_pity_start: 65,
            soft_pity_increment: 0.05,
            hard_pity: 80,
            featured_guarantee: 120,
            has_fifty_fifty: true,
        }
    }

    fn engine(threads: usize) -> MonteCarloEngine {
        MonteCarloEngine::new(TrialWorker::new(threads).unwrap())
    }

    #[test]
    fn batch_has_one_outcome_per_trial() {
        let batch = run_monte_carlo(&endfield(), 1_000, 5);
        assert_eq!(batch.len(), 1_000);
        assert!(batch.iter().all(|o| o.pulls >= 1 && o.pulls <= 120));
    }

    #[test]
    fn zero_trials_is_an_empty_batch() {
        assert!(run_monte_carlo(&endfield(), 0, 5).is_empty());
        let params = SimParams::new(endfield(), 0);
        assert!(engine(1).run(&params, 5).unwrap().is_empty());
    }

    #[test]
    fn pooled_run_matches_sequential_run() {
        let params = SimParams::new(endfield(), 1_000);
        let sequential = run_monte_carlo(&params.config, params.sim_count, 77);
        let one = engine(1).run(&params, 77).unwrap();
        let four = engine(4).run(&params, 77).unwrap();
        assert_eq!(sequential, one);
        assert_eq!(sequential, four);
    }

    #[test]
    fn different_seeds_give_different_batches() {
        let a = run_monte_carlo(&endfield(), 500, 1);
        let b = run_monte_carlo(&endfield(), 500, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn cancelled_run_reports_cancellation() {
        let params = SimParams::new(endfield(), 10_000);
        let cancel = AtomicBool::new(true);
        let result = engine(2).run_cancellable(&params, 3, &cancel);
        assert!(matches!(result, Err(SimError::Cancelled)));
    }

    #[test]
    fn degenerate_zero_rate_banner_still_terminates() {
        let config = GachaSystemConfig {
            base_rate: 0.0,
            soft_pity_start: 1,
            soft_pity_increment: 0.0,
            hard_pity: 5,
            featured_guarantee: 5,
            has_fifty_fifty: false,
        };
        let batch = run_monte_carlo(&config, 100, 9);
        assert!(batch.iter().all(|o| o.pulls == 5));
    }
}
