use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::context::Normalization;
use crate::error::{DiversityError, Result};
use crate::tables::DEFAULT_MIN_VISITORS;

/// Scorer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Static tables
    pub audience_diversity_file: PathBuf,
    pub topic_diversity_file: PathBuf,
    pub min_domain_visitors: u64,

    // Collaborators
    pub topic_service_url: Option<String>,
    pub topic_timeout_secs: u64,
    pub unshorten_timeout_secs: u64,

    pub normalization: Normalization,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Normalization::default();
        let normalization = Normalization {
            ad_mean: parsed_or(&lookup, "AD_MEAN", defaults.ad_mean)?,
            ad_std: parsed_or(&lookup, "AD_STD", defaults.ad_std)?,
            td_mean: parsed_or(&lookup, "TD_MEAN", defaults.td_mean)?,
            td_std: parsed_or(&lookup, "TD_STD", defaults.td_std)?,
            default_score: parsed_or(&lookup, "DEFAULT_SCORE", defaults.default_score)?,
        };
        if !(normalization.ad_std > 0.0) || !(normalization.td_std > 0.0) {
            return Err(DiversityError::Config(
                "AD_STD and TD_STD must be positive".to_string(),
            ));
        }

        Ok(Self {
            audience_diversity_file: required(&lookup, "AUDIENCE_DIVERSITY_FILE")?.into(),
            topic_diversity_file: required(&lookup, "TOPIC_DIVERSITY_FILE")?.into(),
            min_domain_visitors: parsed_or(&lookup, "MIN_DOMAIN_VISITORS", DEFAULT_MIN_VISITORS)?,
            topic_service_url: lookup("TOPIC_SERVICE_URL").filter(|v| !v.is_empty()),
            topic_timeout_secs: parsed_or(&lookup, "TOPIC_TIMEOUT_SECS", 60)?,
            unshorten_timeout_secs: parsed_or(&lookup, "UNSHORTEN_TIMEOUT_SECS", 10)?,
            normalization,
        })
    }

    /// Log the effective configuration. Service URLs are reduced to their host.
    pub fn log_redacted(&self) {
        info!(
            audience_diversity_file = %self.audience_diversity_file.display(),
            topic_diversity_file = %self.topic_diversity_file.display(),
            min_domain_visitors = self.min_domain_visitors,
            topic_service = self.topic_service_url.as_deref().map(host_only).unwrap_or("<unset>"),
            topic_timeout_secs = self.topic_timeout_secs,
            unshorten_timeout_secs = self.unshorten_timeout_secs,
            ad_mean = self.normalization.ad_mean,
            ad_std = self.normalization.ad_std,
            td_mean = self.normalization.td_mean,
            td_std = self.normalization.td_std,
            "Audience diversity config"
        );
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DiversityError::Config(format!("{key} environment variable is required")))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DiversityError::Config(format!("{key} has invalid value: {raw}"))),
        None => Ok(default),
    }
}

fn host_only(url: &str) -> &str {
    url.split('/').nth(2).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("AUDIENCE_DIVERSITY_FILE", "data/domains.csv"),
            ("TOPIC_DIVERSITY_FILE", "data/topics.json"),
        ]))
        .unwrap();

        assert_eq!(config.audience_diversity_file, PathBuf::from("data/domains.csv"));
        assert_eq!(config.min_domain_visitors, 10);
        assert_eq!(config.unshorten_timeout_secs, 10);
        assert_eq!(config.topic_timeout_secs, 60);
        assert_eq!(config.topic_service_url, None);
        assert_eq!(config.normalization, Normalization::default());
    }

    #[test]
    fn missing_table_path_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("TOPIC_DIVERSITY_FILE", "t.json")])).unwrap_err();
        assert!(err.to_string().contains("AUDIENCE_DIVERSITY_FILE"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("AUDIENCE_DIVERSITY_FILE", "d.csv"),
            ("TOPIC_DIVERSITY_FILE", "t.json"),
            ("TOPIC_SERVICE_URL", "http://topics.internal:8080"),
            ("AD_MEAN", "5.0"),
            ("MIN_DOMAIN_VISITORS", "25"),
            ("TOPIC_TIMEOUT_SECS", "120"),
        ]))
        .unwrap();

        assert_eq!(config.normalization.ad_mean, 5.0);
        assert_eq!(config.min_domain_visitors, 25);
        assert_eq!(config.topic_timeout_secs, 120);
        assert_eq!(config.topic_service_url.as_deref(), Some("http://topics.internal:8080"));
    }

    #[test]
    fn invalid_numbers_and_zero_std_are_rejected() {
        let base = [("AUDIENCE_DIVERSITY_FILE", "d.csv"), ("TOPIC_DIVERSITY_FILE", "t.json")];

        let mut pairs = base.to_vec();
        pairs.push(("UNSHORTEN_TIMEOUT_SECS", "soon"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = base.to_vec();
        pairs.push(("TD_STD", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn host_only_drops_path_and_scheme() {
        assert_eq!(host_only("http://topics.internal:8080/v1"), "topics.internal:8080");
        assert_eq!(host_only("topics"), "topics");
    }
}
