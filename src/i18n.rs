use crate::config::AppConfig;
use crate::stats::LuckTier;
use colored::*;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Language {
    En,
    Cn,
}

impl Language {
    pub fn from_config(config: &AppConfig) -> Self {
        if let Some(lang_str) = &config.language {
            if let Some(lang) = Self::parse(lang_str) {
                return lang;
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        std::env::var("LANG")
            .ok()
            .and_then(|lang| Self::parse(&lang))
            .unwrap_or(Language::En)
    }

    fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower.contains("cn") || lower.contains("zh") {
            Some(Language::Cn)
        } else if lower.contains("en") {
            Some(Language::En)
        } else {
            None
        }
    }
}

pub struct I18n;

impl I18n {
    pub fn get(lang: Language, key: &str) -> String {
        match (lang, key) {
            // === Header ===
            (Language::En, "header_title") => format!("{}", "=== Gacha Pity Simulator ===".purple().bold()),
            (Language::Cn, "header_title") => format!("{}", "=== 抽卡保底模拟器 ===".purple().bold()),

            (Language::En, "lbl_banner") => "Banner".to_string(),
            (Language::Cn, "lbl_banner") => "卡池".to_string(),

            (Language::En, "custom_banner") => "Custom".to_string(),
            (Language::Cn, "custom_banner") => "自定义".to_string(),

            (Language::En, "lbl_base_rate") => "Base rate".to_string(),
            (Language::Cn, "lbl_base_rate") => "基础概率".to_string(),

            (Language::En, "lbl_soft_pity") => "Soft pity after".to_string(),
            (Language::Cn, "lbl_soft_pity") => "软保底起始".to_string(),

            (Language::En, "lbl_per_pull") => "per pull".to_string(),
            (Language::Cn, "lbl_per_pull") => "每抽".to_string(),

            (Language::En, "lbl_hard_pity") => "Hard pity".to_string(),
            (Language::Cn, "lbl_hard_pity") => "硬保底".to_string(),

            (Language::En, "lbl_featured_guarantee") => "Featured guarantee".to_string(),
            (Language::Cn, "lbl_featured_guarantee") => "大保底".to_string(),

            (Language::En, "lbl_fifty_fifty") => "50/50".to_string(),
            (Language::Cn, "lbl_fifty_fifty") => "50/50 歪".to_string(),

            (Language::En, "on") => "on".to_string(),
            (Language::Cn, "on") => "开启".to_string(),

            (Language::En, "off") => "off".to_string(),
            (Language::Cn, "off") => "关闭".to_string(),

            (Language::En, "warn_ordering") => format!("{}", "[Warning] Rule order should be Soft < Hard <= Featured Guarantee:".red()),
            (Language::Cn, "warn_ordering") => format!("{}", "[警告] 规则顺序应为 软保底 < 硬保底 <= 大保底:".red()),

            (Language::En, "lbl_trials") => "Trials".to_string(),
            (Language::Cn, "lbl_trials") => "模拟次数".to_string(),

            (Language::En, "lbl_seed") => "seed".to_string(),
            (Language::Cn, "lbl_seed") => "种子".to_string(),

            (Language::En, "lbl_threads") => "threads".to_string(),
            (Language::Cn, "lbl_threads") => "线程".to_string(),

            // === Stat cards ===
            (Language::En, "card_avg") => "Average Pulls".to_string(),
            (Language::Cn, "card_avg") => "平均抽数".to_string(),

            (Language::En, "card_min") => "Luckiest".to_string(),
            (Language::Cn, "card_min") => "最欧".to_string(),

            (Language::En, "card_max") => "Worst Case".to_string(),
            (Language::Cn, "card_max") => "最非".to_string(),

            (Language::En, "card_guarantee") => "Guarantee Rate".to_string(),
            (Language::Cn, "card_guarantee") => "大保底触发率".to_string(),

            (Language::En, "card_cost") => "Market Value".to_string(),
            (Language::Cn, "card_cost") => "预计花费".to_string(),

            (Language::En, "lbl_max") => "Max".to_string(),
            (Language::Cn, "lbl_max") => "最高".to_string(),

            (Language::En, "card_confidence") => "Success Rate With Available Pulls".to_string(),
            (Language::Cn, "card_confidence") => "现有抽数成功率".to_string(),

            (Language::En, "unit_pulls") => "pulls".to_string(),
            (Language::Cn, "unit_pulls") => "抽".to_string(),

            (Language::En, "not_available") => "N/A (no trials were run)".to_string(),
            (Language::Cn, "not_available") => "无数据 (未运行任何模拟)".to_string(),

            // === Tables ===
            (Language::En, "luck_header") => format!("\n{}", "Luck Distribution".cyan().bold()),
            (Language::Cn, "luck_header") => format!("\n{}", "运气分布".cyan().bold()),

            (Language::En, "tier_insane") => "Top 10% (Insane Luck)".to_string(),
            (Language::Cn, "tier_insane") => "前 10% (天选之人)".to_string(),

            (Language::En, "tier_lucky") => "Top 25% (Lucky)".to_string(),
            (Language::Cn, "tier_lucky") => "前 25% (欧皇)".to_string(),

            (Language::En, "tier_average") => "50% (Average)".to_string(),
            (Language::Cn, "tier_average") => "50% (平均)".to_string(),

            (Language::En, "tier_unlucky") => "Bottom 25% (Unlucky)".to_string(),
            (Language::Cn, "tier_unlucky") => "后 25% (非酋)".to_string(),

            (Language::En, "tier_cursed") => "Bottom 10% (Cursed)".to_string(),
            (Language::Cn, "tier_cursed") => "后 10% (受诅咒)".to_string(),

            (Language::En, "cdf_header") => format!("\n{}", "Cumulative Success".cyan().bold()),
            (Language::Cn, "cdf_header") => format!("\n{}", "累计成功率".cyan().bold()),

            (Language::En, "lbl_by_pull") => "by pull".to_string(),
            (Language::Cn, "lbl_by_pull") => "所需抽数".to_string(),

            (Language::En, "pdf_header") => format!("\n{}", "Probability Density".cyan().bold()),
            (Language::Cn, "pdf_header") => format!("\n{}", "概率分布".cyan().bold()),

            // === Presets ===
            (Language::En, "presets_header") => format!("{}", "Built-in presets:".purple().bold()),
            (Language::Cn, "presets_header") => format!("{}", "内置预设:".purple().bold()),

            // === Interactive Loop ===
            (Language::En, "prompt_stash") => format!("{}", "\nAvailable pulls (enter to keep, 'q' to quit): ".yellow()),
            (Language::Cn, "prompt_stash") => format!("{}", "\n现有抽数 (回车保持不变, 'q' 退出): ".yellow()),

            (Language::En, "prompt_cost") => format!("{}", "Cost per pull (enter to keep): ".yellow()),
            (Language::Cn, "prompt_cost") => format!("{}", "每抽价格 (回车保持不变): ".yellow()),

            (Language::En, "invalid_input") => "Invalid input, keeping the previous value.".red().to_string(),
            (Language::Cn, "invalid_input") => "无效输入，保持原值。".red().to_string(),

            (Language::En, "exit_msg") => "Exiting. Goodbye!".to_string(),
            (Language::Cn, "exit_msg") => "正在退出。再见！".to_string(),

            // Default fallback
            (_, k) => k.to_string(),
        }
    }

    pub fn tier(lang: Language, tier: LuckTier) -> String {
        let key = match tier {
            LuckTier::InsaneLuck => "tier_insane",
            LuckTier::Lucky => "tier_lucky",
            LuckTier::Average => "tier_average",
            LuckTier::Unlucky => "tier_unlucky",
            LuckTier::Cursed => "tier_cursed",
        };
        Self::get(lang, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_language_wins_over_env() {
        let config = AppConfig {
            language: Some("zh-CN".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(Language::from_config(&config), Language::Cn);
    }

    #[test]
    fn english_tier_labels_match_stats_labels() {
        for tier in [
            LuckTier::InsaneLuck,
            LuckTier::Lucky,
            LuckTier::Average,
            LuckTier::Unlucky,
            LuckTier::Cursed,
        ] {
            assert_eq!(I18n::tier(Language::En, tier), tier.label());
        }
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(I18n::get(Language::Cn, "no_such_key"), "no_such_key");
    }
}
