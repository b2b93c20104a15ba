use crate::config::{GachaSystemConfig, SimParams};
use crate::distribution::{CumulativePoint, Distribution, DistributionPoint};
use crate::error::Result;
use crate::i18n::{I18n, Language};
use crate::presets::GAME_PRESETS;
use crate::stats::SummaryStats;
use colored::*;
use serde::Serialize;
use std::time::Duration;

const CDF_MILESTONES: [f64; 5] = [25.0, 50.0, 75.0, 90.0, 99.0];
const BAR_WIDTH: usize = 40;

pub struct RunInfo<'a> {
    pub banner_name: Option<&'a str>,
    pub params: &'a SimParams,
    pub seed: u64,
    pub threads: usize,
    pub elapsed: Duration,
}

fn rules_line(lang: Language, config: &GachaSystemConfig) -> String {
    let fifty = if config.has_fifty_fifty { "on" } else { "off" };
    format!(
        "{} {:.1}% | {} {} (+{:.1}% {}) | {} {} | {} {} | {}: {}",
        I18n::get(lang, "lbl_base_rate"),
        config.base_rate * 100.0,
        I18n::get(lang, "lbl_soft_pity"),
        config.soft_pity_start,
        config.soft_pity_increment * 100.0,
        I18n::get(lang, "lbl_per_pull"),
        I18n::get(lang, "lbl_hard_pity"),
        config.hard_pity,
        I18n::get(lang, "lbl_featured_guarantee"),
        config.featured_guarantee,
        I18n::get(lang, "lbl_fifty_fifty"),
        I18n::get(lang, fifty),
    )
}

pub fn render_header(lang: Language, run: &RunInfo<'_>) -> String {
    let config = &run.params.config;
    let name = run
        .banner_name
        .map(str::to_string)
        .unwrap_or_else(|| I18n::get(lang, "custom_banner"));

    let mut lines = vec![
        I18n::get(lang, "header_title"),
        format!("{}: {}", I18n::get(lang, "lbl_banner"), name.bold()),
        rules_line(lang, config),
    ];
    let issues = config.ordering_issues();
    if !issues.is_empty() {
        lines.push(I18n::get(lang, "warn_ordering"));
        lines.extend(issues.iter().map(|issue| format!("  - {}", issue)));
    }
    lines.push(format!(
        "{}: {} ({} {}, {} {}, {:.2?})",
        I18n::get(lang, "lbl_trials"),
        run.params.sim_count,
        I18n::get(lang, "lbl_seed"),
        run.seed,
        run.threads,
        I18n::get(lang, "lbl_threads"),
        run.elapsed,
    ));
    lines.join("\n")
}

/// Stat cards plus the luck table. `None` renders as not available.
pub fn render_summary(lang: Language, stats: Option<&SummaryStats>, stash: u32) -> String {
    let Some(stats) = stats else {
        return I18n::get(lang, "not_available").yellow().to_string();
    };
    let pulls = I18n::get(lang, "unit_pulls");

    let confidence = format!("{:.1}%", stats.current_confidence);
    let confidence = if stats.current_confidence > 80.0 {
        confidence.green().bold()
    } else {
        confidence.bold()
    };

    let mut lines = vec![
        String::new(),
        format!("{:<22} {:>10.1}", I18n::get(lang, "card_avg"), stats.avg),
        format!("{:<22} {:>10}", I18n::get(lang, "card_min"), stats.min.to_string().green()),
        format!("{:<22} {:>10}", I18n::get(lang, "card_max"), stats.max.to_string().red()),
        format!(
            "{:<22} {:>9.1}%",
            I18n::get(lang, "card_guarantee"),
            stats.guarantee_rate
        ),
        format!(
            "{:<22} {:>10} ({}: ${:.2})",
            I18n::get(lang, "card_cost"),
            format!("${:.2}", stats.avg_cost),
            I18n::get(lang, "lbl_max"),
            stats.max_cost
        ),
        format!(
            "{} ({} {}): {}",
            I18n::get(lang, "card_confidence"),
            stash,
            pulls,
            confidence
        ),
        I18n::get(lang, "luck_header"),
    ];
    lines.extend(stats.percentiles.iter().map(|bracket| {
        format!(
            "  {:<26} {:>5} {}",
            I18n::tier(lang, bracket.tier),
            bracket.pulls,
            pulls
        )
    }));
    lines.join("\n")
}

fn bucket_width(max_pull: u32) -> u32 {
    if max_pull <= 150 {
        10
    } else {
        20
    }
}

/// Groups the sparse PDF into fixed-width pull ranges for a text chart.
pub fn bucket_pdf(pdf: &[DistributionPoint]) -> Vec<(u32, u32, usize)> {
    let Some(last) = pdf.last() else {
        return Vec::new();
    };
    let width = bucket_width(last.pull_count);
    let mut buckets: Vec<(u32, u32, usize)> = Vec::new();
    for point in pdf {
        let lo = (point.pull_count.saturating_sub(1) / width) * width + 1;
        match buckets.last_mut() {
            Some(bucket) if bucket.0 == lo => bucket.2 += point.count,
            _ => buckets.push((lo, lo + width - 1, point.count)),
        }
    }
    buckets
}

pub fn render_distribution(lang: Language, dist: &Distribution, stash: u32) -> String {
    if dist.pdf.is_empty() {
        return String::new();
    }
    let mut lines = vec![I18n::get(lang, "cdf_header")];
    for milestone in CDF_MILESTONES {
        if let Some(pull) = dist.pulls_for_probability(milestone) {
            lines.push(format!(
                "  {:>5.1}% {} {:>5}",
                milestone,
                I18n::get(lang, "lbl_by_pull"),
                pull
            ));
        }
    }

    lines.push(I18n::get(lang, "pdf_header"));
    let buckets = bucket_pdf(&dist.pdf);
    let peak = buckets.iter().map(|b| b.2).max().unwrap_or(1).max(1);
    for (lo, hi, count) in buckets {
        let len = (count * BAR_WIDTH + peak - 1) / peak;
        let bar = "█".repeat(len);
        let bar = if lo <= stash && stash <= hi {
            bar.yellow()
        } else {
            bar.normal()
        };
        lines.push(format!("  {:>4}-{:<4} {:>7} {}", lo, hi, count, bar));
    }
    lines.join("\n")
}

pub fn render_presets(lang: Language) -> String {
    let mut lines = vec![I18n::get(lang, "presets_header")];
    for (i, preset) in GAME_PRESETS.iter().enumerate() {
        lines.push(format!("{:>2}. {}", i + 1, preset.name.bold()));
        lines.push(format!("    {}", rules_line(lang, &preset.config)));
    }
    lines.join("\n")
}

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub banner: Option<&'a str>,
    pub config: &'a GachaSystemConfig,
    pub sim_count: usize,
    pub seed: u64,
    pub stash: u32,
    pub cost_per_pull: f64,
    pub summary: Option<&'a SummaryStats>,
    pub pdf: &'a [DistributionPoint],
    pub cdf: &'a [CumulativePoint],
}

impl JsonReport<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
