use crate::error::{Result, SimError};
use crate::presets;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

// --- Banner rules ---

/// Pity rules for one banner.
///
/// The engine assumes `soft_pity_start < hard_pity <= featured_guarantee` but
/// never enforces it; see [`GachaSystemConfig::ordering_issues`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GachaSystemConfig {
    /// Success probability at pull 1.
    pub base_rate: f64,
    /// Pity count after which the rate escalates.
    pub soft_pity_start: u32,
    /// Probability added per pull beyond `soft_pity_start`.
    pub soft_pity_increment: f64,
    /// Pity count at which a generic success is forced.
    pub hard_pity: u32,
    /// Cumulative pull count at which the featured outcome is forced.
    pub featured_guarantee: u32,
    /// Whether a generic success is only featured half of the time.
    pub has_fifty_fifty: bool,
}

impl Default for GachaSystemConfig {
    fn default() -> Self {
        presets::GAME_PRESETS[0].config.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingIssue {
    SoftPityNotBelowHardPity { soft_pity_start: u32, hard_pity: u32 },
    HardPityAboveFeaturedGuarantee { hard_pity: u32, featured_guarantee: u32 },
}

impl fmt::Display for OrderingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingIssue::SoftPityNotBelowHardPity { soft_pity_start, hard_pity } => write!(
                f,
                "soft pity start ({}) should be below hard pity ({})",
                soft_pity_start, hard_pity
            ),
            OrderingIssue::HardPityAboveFeaturedGuarantee { hard_pity, featured_guarantee } => write!(
                f,
                "hard pity ({}) should not exceed the featured guarantee ({})",
                hard_pity, featured_guarantee
            ),
        }
    }
}

impl GachaSystemConfig {
    /// Checks the "soft < hard <= featured guarantee" rule.
    ///
    /// Purely diagnostic: a config with issues still simulates, it just
    /// produces a degenerate distribution.
    pub fn ordering_issues(&self) -> Vec<OrderingIssue> {
        let mut issues = Vec::new();
        if self.soft_pity_start >= self.hard_pity {
            issues.push(OrderingIssue::SoftPityNotBelowHardPity {
                soft_pity_start: self.soft_pity_start,
                hard_pity: self.hard_pity,
            });
        }
        if self.hard_pity > self.featured_guarantee {
            issues.push(OrderingIssue::HardPityAboveFeaturedGuarantee {
                hard_pity: self.hard_pity,
                featured_guarantee: self.featured_guarantee,
            });
        }
        issues
    }
}

/// Banner rules plus the number of independent trials to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    #[serde(flatten)]
    pub config: GachaSystemConfig,
    pub sim_count: usize,
}

impl SimParams {
    pub fn new(config: GachaSystemConfig, sim_count: usize) -> Self {
        Self { config, sim_count }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sim_count == 0 {
            return Err(SimError::InvalidSampleSize);
        }
        Ok(())
    }
}

/// Accepts `cost` only when it is finite and not negative.
pub fn validate_cost_per_pull(cost: f64) -> Result<f64> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(cost)
    } else {
        Err(SimError::InvalidCostPerPull(cost))
    }
}

// --- Application config (data/config.json) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub banner: GachaSystemConfig,
    pub sim_count: usize,
    /// Pulls the player currently has saved up.
    pub stash: u32,
    pub cost_per_pull: f64,
    pub language: Option<String>,
    /// 0 means "all cores minus `worker_reserve_cores`".
    pub worker_max_threads: usize,
    pub worker_reserve_cores: usize,
    pub worker_stack_size_mb: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            banner: GachaSystemConfig::default(),
            sim_count: 10_000,
            stash: 120,
            cost_per_pull: 1.11,
            language: None,
            worker_max_threads: 0,
            worker_reserve_cores: 1,
            worker_stack_size_mb: 4,
        }
    }
}

impl AppConfig {
    /// Loads the JSON config at `path`, falling back to `../../path` (cargo
    /// target layout) and finally to defaults when neither exists.
    pub fn load(path: &Path) -> Result<Self> {
        let parent_path = Path::new("../..").join(path);
        for candidate in [path, parent_path.as_path()] {
            match fs::read_to_string(candidate) {
                Ok(contents) => {
                    let config = Self::from_json(&contents).map_err(|source| SimError::ConfigParse {
                        path: candidate.to_path_buf(),
                        source,
                    })?;
                    info!("Config loaded from {}", candidate.display());
                    return Ok(config);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(SimError::ConfigRead {
                        path: candidate.to_path_buf(),
                        source,
                    })
                }
            }
        }
        warn!("Config file {} not found, using built-in defaults", path.display());
        Ok(Self::default())
    }

    pub fn from_json(contents: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }
}
