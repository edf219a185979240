//! General application configuration.

use serde::{Deserialize, Serialize};

const fn default_sample_size() -> u32 {
    100
}

const fn default_ping_interval_secs() -> u64 {
    600
}

const fn default_profile_cache_days() -> u32 {
    14
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Rows sampled when generating charts.
    #[serde(default = "default_sample_size")]
    pub default_sample_size: u32,

    /// Minimum spacing between backend warm-up pings.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// How long a cached profile is trusted without a refresh.
    #[serde(default = "default_profile_cache_days")]
    pub profile_cache_days: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_sample_size: default_sample_size(),
            ping_interval_secs: default_ping_interval_secs(),
            profile_cache_days: default_profile_cache_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_sample_size, 100);
        assert_eq!(config.ping_interval_secs, 600);
        assert_eq!(config.profile_cache_days, 14);
    }
}
