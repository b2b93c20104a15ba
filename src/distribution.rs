use serde::Serialize;
use std::collections::BTreeMap;

/// Number of trials that finished in exactly `pull_count` pulls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionPoint {
    pub pull_count: u32,
    pub count: usize,
}

/// Percentage (0-100, two decimals) of trials finished by `pull_count`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub pull_count: u32,
    pub probability: f64,
}

/// Empirical PDF and CDF, both ascending by pull count.
///
/// Pull counts nobody finished on are omitted, not zero-filled.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub pdf: Vec<DistributionPoint>,
    pub cdf: Vec<CumulativePoint>,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub fn build_pdf(pulls: &[u32]) -> Vec<DistributionPoint> {
    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for &p in pulls {
        *histogram.entry(p).or_insert(0) += 1;
    }
    histogram
        .into_iter()
        .map(|(pull_count, count)| DistributionPoint { pull_count, count })
        .collect()
}

/// Running total over `pdf`, as a percentage of `total` trials.
pub fn build_cdf(pdf: &[DistributionPoint], total: usize) -> Vec<CumulativePoint> {
    if total == 0 {
        return Vec::new();
    }
    let mut running_total = 0usize;
    pdf.iter()
        .map(|point| {
            running_total += point.count;
            CumulativePoint {
                pull_count: point.pull_count,
                probability: round_to(100.0 * running_total as f64 / total as f64, 2),
            }
        })
        .collect()
}

pub fn build_distribution(pulls: &[u32]) -> Distribution {
    let pdf = build_pdf(pulls);
    let cdf = build_cdf(&pdf, pulls.len());
    Distribution { pdf, cdf }
}

impl Distribution {
    /// Smallest pull count whose cumulative probability reaches `percent`.
    pub fn pulls_for_probability(&self, percent: f64) -> Option<u32> {
        self.cdf
            .iter()
            .find(|point| point.probability >= percent)
            .map(|point| point.pull_count)
    }

    pub fn total_count(&self) -> usize {
        self.pdf.iter().map(|point| point.count).sum()
    }
}
