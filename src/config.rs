//! Sampling configuration and environment-based settings for the binary.

use std::time::Duration;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30);
pub const DEFAULT_WINDOW_FREQUENCY: Duration = Duration::from_secs(1);
pub const DEFAULT_STREAM_FREQUENCY: Duration = Duration::from_secs(1);

pub const ENV_LISTEN_ADDR: &str = "PROCREC_LISTEN_ADDR";
pub const ENV_WINDOW: &str = "PROCREC_WINDOW";
pub const ENV_WINDOW_FREQUENCY: &str = "PROCREC_WINDOW_FREQUENCY";
pub const ENV_STREAM_FREQUENCY: &str = "PROCREC_STREAM_FREQUENCY";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SERVER_WINDOW: Duration = Duration::from_secs(120);
const DEFAULT_SERVER_STREAM_FREQUENCY: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid duration `{value}` for `{key}`: expected <n>ms, <n>s or <n>m")]
    InvalidDuration { key: &'static str, value: String },
    #[error("environment variable `{0}` is not valid unicode")]
    NotUnicode(&'static str),
}

/// Settings of the sliding window.
///
/// A zero field is replaced by its default when the config is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowConfig {
    /// Trailing duration kept in memory.
    pub window: Duration,
    /// Sampling period.
    pub frequency: Duration,
}

impl WindowConfig {
    pub fn new(window: Duration, frequency: Duration) -> Self {
        Self { window, frequency }
    }

    pub fn with_defaults(self) -> Self {
        Self {
            window: or_default(self.window, DEFAULT_WINDOW),
            frequency: or_default(self.frequency, DEFAULT_WINDOW_FREQUENCY),
        }
    }

    /// Number of records kept: `floor(window / frequency) + 1`.
    pub fn capacity(&self) -> usize {
        let config = self.with_defaults();
        let slots = config.window.as_nanos() / config.frequency.as_nanos();
        usize::try_from(slots).unwrap_or(usize::MAX - 1) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamConfig {
    pub frequency: Duration,
}

impl StreamConfig {
    pub fn new(frequency: Duration) -> Self {
        Self { frequency }
    }

    pub fn with_defaults(self) -> Self {
        Self {
            frequency: or_default(self.frequency, DEFAULT_STREAM_FREQUENCY),
        }
    }
}

fn or_default(value: Duration, default: Duration) -> Duration {
    if value.is_zero() { default } else { value }
}

/// Settings of the `procrec` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: String,
    pub window: WindowConfig,
    pub stream: StreamConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            window: WindowConfig::new(DEFAULT_SERVER_WINDOW, DEFAULT_WINDOW_FREQUENCY),
            stream: StreamConfig::new(DEFAULT_SERVER_STREAM_FREQUENCY),
        }
    }
}

impl Config {
    /// Reads the `PROCREC_*` environment variables, falling back to defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(Error::NotUnicode(key)),
        })
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<Option<String>, Error>,
    ) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_LISTEN_ADDR)? {
            config.listen_addr = addr;
        }
        if let Some(value) = lookup(ENV_WINDOW)? {
            config.window.window = parse_duration(ENV_WINDOW, &value)?;
        }
        if let Some(value) = lookup(ENV_WINDOW_FREQUENCY)? {
            config.window.frequency = parse_duration(ENV_WINDOW_FREQUENCY, &value)?;
        }
        if let Some(value) = lookup(ENV_STREAM_FREQUENCY)? {
            config.stream.frequency = parse_duration(ENV_STREAM_FREQUENCY, &value)?;
        }

        Ok(config)
    }
}

/// Parses `<n>ms`, `<n>s` or `<n>m`.
fn parse_duration(key: &'static str, value: &str) -> Result<Duration, Error> {
    let invalid = || Error::InvalidDuration {
        key,
        value: value.to_owned(),
    };
    let value = value.trim();

    let (number, millis_per_unit) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60_000)
    } else {
        return Err(invalid());
    };

    number
        .trim()
        .parse::<u64>()
        .map(|n| Duration::from_millis(n.saturating_mul(millis_per_unit)))
        .map_err(|_| invalid())
}
