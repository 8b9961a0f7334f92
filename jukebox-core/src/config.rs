use std::{env, str::FromStr};

use chrono::Duration;

use crate::ConfigError;

/// The configuration of a space's sync engine
#[derive(Debug, Clone)]
pub struct Config {
    /// How many booths a space is created with
    pub booth_count: usize,
    /// How long clients get to pre-buffer a track before the clock starts
    pub seeking_grace_in_seconds: f32,
    /// The maximum amount of pending playlist items, if any
    pub max_queue_length: Option<usize>,
    /// How far a client may drift from the authoritative position before it re-seeks
    pub drift_tolerance_in_seconds: f32,
}

impl Config {
    pub const BOOTH_COUNT_VAR: &'static str = "JUKEBOX_BOOTH_COUNT";
    pub const SEEKING_GRACE_VAR: &'static str = "JUKEBOX_SEEKING_GRACE_MS";
    pub const MAX_QUEUE_LENGTH_VAR: &'static str = "JUKEBOX_MAX_QUEUE_LENGTH";
    pub const DRIFT_TOLERANCE_VAR: &'static str = "JUKEBOX_DRIFT_TOLERANCE_MS";

    /// Reads the configuration from the environment, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [Config::from_env], but with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(count) = parse_var::<usize, _>(&lookup, Self::BOOTH_COUNT_VAR)? {
            if count == 0 {
                return Err(ConfigError::Invalid {
                    variable: Self::BOOTH_COUNT_VAR,
                    value: count.to_string(),
                });
            }

            config.booth_count = count;
        }

        if let Some(millis) = parse_var::<u64, _>(&lookup, Self::SEEKING_GRACE_VAR)? {
            config.seeking_grace_in_seconds = millis as f32 / 1000.;
        }

        if let Some(max) = parse_var::<usize, _>(&lookup, Self::MAX_QUEUE_LENGTH_VAR)? {
            config.max_queue_length = Some(max);
        }

        if let Some(millis) = parse_var::<u64, _>(&lookup, Self::DRIFT_TOLERANCE_VAR)? {
            config.drift_tolerance_in_seconds = millis as f32 / 1000.;
        }

        Ok(config)
    }

    /// The grace period between entering seeking and committing a start time
    pub fn seeking_grace(&self) -> Duration {
        seconds_to_duration(self.seeking_grace_in_seconds)
    }

    /// How much drift is tolerated before a client corrects its position
    pub fn drift_tolerance(&self) -> Duration {
        seconds_to_duration(self.drift_tolerance_in_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            booth_count: 2,
            // Enough for most clients to fetch the first chunk of a track
            seeking_grace_in_seconds: 0.5,
            max_queue_length: None,
            // Perceptual sync, not sample accurate
            drift_tolerance_in_seconds: 0.75,
        }
    }
}

fn seconds_to_duration(seconds: f32) -> Duration {
    Duration::milliseconds((seconds.max(0.) * 1000.) as i64)
}

fn parse_var<T, F>(lookup: &F, variable: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { variable, value }),
    }
}
