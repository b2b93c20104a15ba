use crate::config::GachaSystemConfig;
use crate::error::{Result, SimError};

pub struct Preset {
    pub name: &'static str,
    pub config: GachaSystemConfig,
}

/// Built-in banner catalog. The first entry is the default banner.
pub static GAME_PRESETS: [Preset; 5] = [
    Preset {
        name: "Arknights: Endfield",
        config: GachaSystemConfig {
            base_rate: 0.008,
            soft_pity_start: 65,
            soft_pity_increment: 0.05,
            hard_pity: 80,
            featured_guarantee: 120,
            has_fifty_fifty: true,
        },
    },
    Preset {
        name: "Aggressive Slope (90 Cap)",
        config: GachaSystemConfig {
            base_rate: 0.006,
            soft_pity_start: 74,
            soft_pity_increment: 0.06,
            hard_pity: 90,
            featured_guarantee: 180,
            has_fifty_fifty: true,
        },
    },
    Preset {
        name: "High Base / Extended Floor",
        config: GachaSystemConfig {
            base_rate: 0.02,
            soft_pity_start: 50,
            soft_pity_increment: 0.02,
            hard_pity: 99,
            featured_guarantee: 300,
            has_fifty_fifty: true,
        },
    },
    // Ramp starts 5 pulls before the cap, so soft pity is effectively off.
    Preset {
        name: "Flat Rate / Direct Milestone",
        config: GachaSystemConfig {
            base_rate: 0.03,
            soft_pity_start: 195,
            soft_pity_increment: 0.7,
            hard_pity: 200,
            featured_guarantee: 200,
            has_fifty_fifty: false,
        },
    },
    Preset {
        name: "Low-Probability / Max Variance",
        config: GachaSystemConfig {
            base_rate: 0.01,
            soft_pity_start: 380,
            soft_pity_increment: 0.05,
            hard_pity: 400,
            featured_guarantee: 400,
            has_fifty_fifty: true,
        },
    },
];

/// Looks a preset up by case-insensitive name prefix or by 1-based index.
pub fn find_preset(query: &str) -> Result<&'static Preset> {
    let query = query.trim();
    if let Ok(idx) = query.parse::<usize>() {
        return idx
            .checked_sub(1)
            .and_then(|i| GAME_PRESETS.get(i))
            .ok_or_else(|| SimError::UnknownPreset(query.to_string()));
    }
    let lower = query.to_lowercase();
    GAME_PRESETS
        .iter()
        .find(|p| p.name.to_lowercase().starts_with(&lower))
        .ok_or_else(|| SimError::UnknownPreset(query.to_string()))
}
