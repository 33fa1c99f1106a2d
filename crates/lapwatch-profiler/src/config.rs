//! Profiler configuration.

use crate::error::ConfigError;

/// Environment variable holding the threshold in seconds.
pub const THRESHOLD_ENV: &str = "LAPWATCH_THRESHOLD";

/// Environment variable holding the default report channel.
pub const CHANNEL_ENV: &str = "LAPWATCH_CHANNEL";

/// Channel used when none is configured.
pub const DEFAULT_CHANNEL: &str = "none";

/// Settings applied when a profiler is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilerConfig {
    /// Minimum timer duration in seconds; `0.0` reports everything.
    pub threshold: f64,
    /// Channel handed to the reporter by default.
    pub channel: String,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            channel: DEFAULT_CHANNEL.to_owned(),
        }
    }
}

impl ProfilerConfig {
    /// Read settings from `LAPWATCH_THRESHOLD` and `LAPWATCH_CHANNEL`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(THRESHOLD_ENV) {
            config.threshold = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: THRESHOLD_ENV,
                    value: raw.clone(),
                })?;
        }

        if let Some(channel) = lookup(CHANNEL_ENV) {
            let channel = channel.trim();
            if !channel.is_empty() {
                config.channel = channel.to_owned();
            }
        }

        Ok(config)
    }

    /// Set the threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the channel.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ProfilerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ProfilerConfig::default());
        assert_eq!(config.channel, "none");
    }

    #[test]
    fn reads_threshold_and_channel() {
        let config = ProfilerConfig::from_lookup(lookup_from(&[
            (THRESHOLD_ENV, " 0.25 "),
            (CHANNEL_ENV, "dump"),
        ]))
        .unwrap();

        assert_relative_eq!(config.threshold, 0.25);
        assert_eq!(config.channel, "dump");
    }

    #[test]
    fn negative_threshold_is_accepted() {
        let config =
            ProfilerConfig::from_lookup(lookup_from(&[(THRESHOLD_ENV, "-1.5")])).unwrap();
        assert_relative_eq!(config.threshold, -1.5);
    }

    #[test]
    fn rejects_unparsable_threshold() {
        let err = ProfilerConfig::from_lookup(lookup_from(&[(THRESHOLD_ENV, "fast")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: THRESHOLD_ENV,
                value: "fast".to_owned(),
            }
        );
    }

    #[test]
    fn blank_channel_keeps_default() {
        let config = ProfilerConfig::from_lookup(lookup_from(&[(CHANNEL_ENV, "  ")])).unwrap();
        assert_eq!(config.channel, DEFAULT_CHANNEL);
    }
}
