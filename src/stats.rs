use crate::distribution::round_to;
use crate::engine::SimulationBatch;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LuckTier {
    InsaneLuck,
    Lucky,
    Average,
    Unlucky,
    Cursed,
}

impl LuckTier {
    pub fn label(&self) -> &'static str {
        match self {
            LuckTier::InsaneLuck => "Top 10% (Insane Luck)",
            LuckTier::Lucky => "Top 25% (Lucky)",
            LuckTier::Average => "50% (Average)",
            LuckTier::Unlucky => "Bottom 25% (Unlucky)",
            LuckTier::Cursed => "Bottom 10% (Cursed)",
        }
    }
}

pub const PERCENTILES: [(f64, LuckTier); 5] = [
    (0.10, LuckTier::InsaneLuck),
    (0.25, LuckTier::Lucky),
    (0.50, LuckTier::Average),
    (0.75, LuckTier::Unlucky),
    (0.90, LuckTier::Cursed),
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PercentileBracket {
    pub percentile: f64,
    pub pulls: u32,
    pub tier: LuckTier,
}

/// Headline numbers for a batch. Percentages are 0-100.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryStats {
    pub avg: f64,
    pub max: u32,
    pub min: u32,
    pub guarantee_rate: f64,
    pub current_confidence: f64,
    pub avg_cost: f64,
    pub max_cost: f64,
    pub percentiles: Vec<PercentileBracket>,
    /// Number of trials these stats were computed from.
    pub sample_size: usize,
}

/// Nearest-rank brackets: value at `floor((n - 1) * p)` of the sorted pulls.
pub fn percentile_brackets(pulls: &[u32]) -> Vec<PercentileBracket> {
    if pulls.is_empty() {
        return Vec::new();
    }
    let mut sorted = pulls.to_vec();
    sorted.sort_unstable();
    let last = (sorted.len() - 1) as f64;
    PERCENTILES
        .iter()
        .map(|&(percentile, tier)| PercentileBracket {
            percentile,
            pulls: sorted[(last * percentile).floor() as usize],
            tier,
        })
        .collect()
}

/// Unrounded percentage of trials finished within `stash` pulls.
pub fn success_rate_within(batch: &SimulationBatch, stash: u32) -> Option<f64> {
    if batch.is_empty() {
        return None;
    }
    let hits = batch.iter().filter(|o| o.pulls <= stash).count();
    Some(100.0 * hits as f64 / batch.len() as f64)
}

fn mean_pulls(batch: &SimulationBatch) -> f64 {
    let total: u64 = batch.iter().map(|o| u64::from(o.pulls)).sum();
    total as f64 / batch.len() as f64
}

/// Full summary for a batch, or `None` when the batch is empty.
pub fn compute_summary(batch: &SimulationBatch, stash: u32, cost_per_pull: f64) -> Option<SummaryStats> {
    let min = batch.iter().map(|o| o.pulls).min()?;
    let max = batch.iter().map(|o| o.pulls).max()?;
    let guaranteed = batch.iter().filter(|o| o.won_at_guarantee).count();

    let base = SummaryStats {
        avg: round_to(mean_pulls(batch), 1),
        max,
        min,
        guarantee_rate: round_to(100.0 * guaranteed as f64 / batch.len() as f64, 1),
        current_confidence: 0.0,
        avg_cost: 0.0,
        max_cost: 0.0,
        percentiles: percentile_brackets(&batch.pulls()),
        sample_size: batch.len(),
    };
    Some(base.with_budget(batch, stash, cost_per_pull))
}

impl SummaryStats {
    /// Recomputes only the stash- and cost-dependent fields against the
    /// batch these stats came from. Never touches the engine.
    ///
    /// `avg_cost` is the unrounded mean times `cost_per_pull`, not the
    /// displayed one-decimal `avg` times it, so it can differ from `avg * C`
    /// in the second decimal.
    pub fn with_budget(&self, batch: &SimulationBatch, stash: u32, cost_per_pull: f64) -> SummaryStats {
        debug_assert_eq!(
            batch.len(),
            self.sample_size,
            "budget recompute against a different batch than the summary came from"
        );
        let mut next = self.clone();
        let Some(confidence) = success_rate_within(batch, stash) else {
            return next;
        };
        next.current_confidence = round_to(confidence, 1);
        next.avg_cost = round_to(mean_pulls(batch) * cost_per_pull, 2);
        next.max_cost = round_to(f64::from(self.max) * cost_per_pull, 2);
        next
    }
}
