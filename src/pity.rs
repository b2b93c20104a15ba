use crate::config::GachaSystemConfig;

/// Success probability for the next pull given the current pity count.
///
/// Flat `base_rate` up to and including `soft_pity_start`, then linear in the
/// number of pulls past it. Not clamped to 1.0: hard pity and the featured
/// guarantee are what bound a trial, and a rate above 1.0 simply always hits.
pub fn pity_rate(pity_counter: u32, config: &GachaSystemConfig) -> f64 {
    if pity_counter <= config.soft_pity_start {
        config.base_rate
    } else {
        let over = (pity_counter - config.soft_pity_start) as f64;
        config.base_rate + over * config.soft_pity_increment
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

    #[test]
    fn flat_until_soft_pity() {
        let config = endfield();
        assert_eq!(pity_rate(1, &config), 0.008);
        assert_eq!(pity_rate(65, &config), 0.008);
    }

    #[test]
    fn linear_after_soft_pity() {
        let config = endfield();
        assert!((pity_rate(66, &config) - 0.058).abs() < 1e-12);
        assert!((pity_rate(75, &config) - 0.508).abs() < 1e-12);
    }

    #[test]
    fn rate_is_not_clamped() {
        let config = endfield();
        assert!(pity_rate(100, &config) > 1.0);
    }
}
