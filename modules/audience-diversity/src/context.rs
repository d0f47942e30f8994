use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::tables::{DomainTable, TopicTable};
use crate::urls::PlatformBlocklist;

/// Population mean of domain audience diversity.
pub const AD_MEAN: f64 = 4.86;
/// Population standard deviation of domain audience diversity.
pub const AD_STD: f64 = 1.64;
/// Population mean of topic audience diversity.
pub const TD_MEAN: f64 = 2.66;
/// Population standard deviation of topic audience diversity.
pub const TD_STD: f64 = 1.77;
/// Score for posts with neither a known domain nor a known topic.
pub const DEFAULT_SCORE: f64 = 0.0;

/// Fixed statistics used to standardize the two score sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub ad_mean: f64,
    pub ad_std: f64,
    pub td_mean: f64,
    pub td_std: f64,
    pub default_score: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            ad_mean: AD_MEAN,
            ad_std: AD_STD,
            td_mean: TD_MEAN,
            td_std: TD_STD,
            default_score: DEFAULT_SCORE,
        }
    }
}

impl Normalization {
    pub fn domain_z(&self, raw: f64) -> f64 {
        (raw - self.ad_mean) / self.ad_std
    }

    pub fn topic_z(&self, raw: f64) -> f64 {
        (raw - self.td_mean) / self.td_std
    }
}

/// Everything scoring reads and nothing it writes. Built once at startup and
/// shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct DiversityContext {
    pub domains: DomainTable,
    pub topics: TopicTable,
    pub blocklist: PlatformBlocklist,
    pub normalization: Normalization,
}

impl DiversityContext {
    pub fn new(domains: DomainTable, topics: TopicTable) -> Self {
        Self {
            domains,
            topics,
            ..Default::default()
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Load both tables from the paths in `config`.
    pub fn load(config: &Config) -> Result<Self> {
        let domains = DomainTable::load(&config.audience_diversity_file, config.min_domain_visitors)?;
        let topics = TopicTable::load(&config.topic_diversity_file)?;

        info!(
            domains = domains.len(),
            topics = topics.len(),
            "Diversity context ready"
        );

        Ok(Self::new(domains, topics).with_normalization(config.normalization))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_z_uses_domain_statistics() {
        let n = Normalization::default();
        assert_eq!(n.domain_z(6.5), (6.5 - 4.86) / 1.64);
        assert_eq!(n.domain_z(AD_MEAN), 0.0);
    }

    #[test]
    fn topic_z_uses_topic_statistics() {
        let n = Normalization::default();
        assert_eq!(n.topic_z(1.2), (1.2 - 2.66) / 1.77);
        assert!((n.topic_z(1.2) - -0.8249).abs() < 1e-3);
    }
}
