//! Command-line configuration.
//!
//! [`Args`] is the raw clap surface; [`MonitorConfig::try_from`] validates
//! it. Any error here is fatal before monitoring starts.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::gpio::GpioBackend;
use crate::synthetic::MAX_EVENTS;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
const DEFAULT_SIMULATED_EVENTS: usize = 100;
const DEFAULT_SIMULATED_REPEAT: u32 = 3;

#[derive(Parser, Debug)]
#[command(name = "sumpwatchd")]
#[command(about = "Monitor the on/off switching of a sump pump")]
pub struct Args {
    /// GPIO pin connected to the pump
    pub pin: u32,

    /// ThingSpeak channel write key; new readings are pushed to the channel
    #[arg(
        long = "thingspeak",
        value_name = "API_KEY",
        env = "SUMPWATCH_THINGSPEAK_KEY",
        hide_env_values = true
    )]
    pub thingspeak_api_key: Option<String>,

    /// Healthchecks ping URL, pinged whenever the pump turns on
    #[arg(
        long = "healthchecks",
        value_name = "URL",
        env = "SUMPWATCH_HEALTHCHECKS_URL",
        hide_env_values = true
    )]
    pub healthchecks_url: Option<String>,

    /// GPIO access backend; without it no readings are taken
    #[arg(long = "gpio", value_name = "BACKEND")]
    pub gpio: Option<GpioBackend>,

    /// Treat a low line as pump on (sysfs only)
    #[arg(long)]
    pub active_low: bool,

    /// Location of the sysfs GPIO interface
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SYSFS_ROOT)]
    pub sysfs_root: PathBuf,

    /// How often the line is read, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Number of synthetic events to play back (simulated only)
    #[arg(long, value_name = "N", value_parser = parse_event_count)]
    pub simulate_events: Option<usize>,

    /// Consecutive reads reporting each synthetic event (simulated only)
    #[arg(long, value_name = "N")]
    pub simulate_repeat: Option<u32>,

    /// Play synthetic events at their own pace, sped up FACTOR times
    /// (simulated only); without it they follow one another at poll rate
    #[arg(long, value_name = "FACTOR")]
    pub simulate_time_scale: Option<f64>,

    /// Random seed for reproducible synthetic activity (simulated only)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("ThingSpeak API key is empty")]
    EmptyApiKey,

    #[error("invalid Healthchecks URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("{flag} requires --gpio {backend}")]
    RequiresBackend {
        flag: &'static str,
        backend: GpioBackend,
    },

    #[error("--simulate-repeat must be at least 1")]
    ZeroRepeat,

    #[error("--simulate-time-scale must be a positive number, got {0}")]
    InvalidTimeScale(f64),
}

/// Where readings come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// No hardware; every reading is unknown.
    Null,
    Sysfs {
        root: PathBuf,
        active_low: bool,
    },
    Simulated {
        events: usize,
        repeat: u32,
        /// Speed-up applied to the stream's timestamps; `None` plays one
        /// event after another at poll rate.
        time_scale: Option<f64>,
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub pin: u32,
    pub kind: SourceKind,
}

/// Remote sinks to register besides the console.
#[derive(Clone, Default, PartialEq)]
pub struct SinkConfig {
    pub thingspeak_api_key: Option<String>,
    pub healthchecks_url: Option<Url>,
}

// Both values are credentials.
impl fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkConfig")
            .field("thingspeak", &self.thingspeak_api_key.is_some())
            .field("healthchecks", &self.healthchecks_url.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub source: SourceConfig,
    pub sinks: SinkConfig,
    pub poll_interval: Duration,
}

/// Parse a synthetic stream length, capped at [`MAX_EVENTS`].
pub fn parse_event_count(raw: &str) -> Result<usize, String> {
    let count: usize = raw.parse::<usize>().map_err(|e| e.to_string())?;
    if count > MAX_EVENTS {
        return Err(format!("at most {MAX_EVENTS} events can be generated"));
    }
    Ok(count)
}

fn parse_ping_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

fn require_backend(
    present: bool,
    flag: &'static str,
    wanted: GpioBackend,
    actual: Option<GpioBackend>,
) -> Result<(), ConfigError> {
    if present && actual != Some(wanted) {
        return Err(ConfigError::RequiresBackend {
            flag,
            backend: wanted,
        });
    }
    Ok(())
}

impl TryFrom<Args> for MonitorConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        require_backend(args.active_low, "--active-low", GpioBackend::Sysfs, args.gpio)?;
        for (present, flag) in [
            (args.simulate_events.is_some(), "--simulate-events"),
            (args.simulate_repeat.is_some(), "--simulate-repeat"),
            (args.simulate_time_scale.is_some(), "--simulate-time-scale"),
            (args.seed.is_some(), "--seed"),
        ] {
            require_backend(present, flag, GpioBackend::Simulated, args.gpio)?;
        }

        let kind = match args.gpio {
            None => SourceKind::Null,
            Some(GpioBackend::Sysfs) => SourceKind::Sysfs {
                root: args.sysfs_root,
                active_low: args.active_low,
            },
            Some(GpioBackend::Simulated) => {
                let repeat = args.simulate_repeat.unwrap_or(DEFAULT_SIMULATED_REPEAT);
                if repeat == 0 {
                    return Err(ConfigError::ZeroRepeat);
                }
                match args.simulate_time_scale {
                    Some(scale) if !(scale.is_finite() && scale > 0.0) => {
                        return Err(ConfigError::InvalidTimeScale(scale));
                    }
                    _ => {}
                }
                SourceKind::Simulated {
                    events: args.simulate_events.unwrap_or(DEFAULT_SIMULATED_EVENTS),
                    repeat,
                    time_scale: args.simulate_time_scale,
                    seed: args.seed,
                }
            }
        };

        let thingspeak_api_key = match args.thingspeak_api_key {
            Some(key) if key.trim().is_empty() => return Err(ConfigError::EmptyApiKey),
            Some(key) => Some(key.trim().to_string()),
            None => None,
        };

        let healthchecks_url = args
            .healthchecks_url
            .as_deref()
            .map(parse_ping_url)
            .transpose()?;

        Ok(Self {
            source: SourceConfig {
                pin: args.pin,
                kind,
            },
            sinks: SinkConfig {
                thingspeak_api_key,
                healthchecks_url,
            },
            poll_interval: Duration::from_millis(args.poll_interval_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn parse(argv: &[&str]) -> Result<MonitorConfig, ConfigError> {
        let args = Args::try_parse_from(std::iter::once("sumpwatchd").chain(argv.iter().copied()))
            .expect("arguments should parse");
        MonitorConfig::try_from(args)
    }

    #[test]
    fn pin_alone_is_console_only_without_hardware() {
        let config = parse(&["17"]).unwrap();

        assert_eq!(config.source.pin, 17);
        assert_eq!(config.source.kind, SourceKind::Null);
        assert_eq!(config.sinks, SinkConfig::default());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn pin_is_required() {
        assert!(Args::try_parse_from(["sumpwatchd"]).is_err());
    }

    #[test]
    fn sysfs_backend() {
        let config = parse(&["17", "--gpio", "sysfs", "--active-low"]).unwrap();

        assert_eq!(
            config.source.kind,
            SourceKind::Sysfs {
                root: PathBuf::from(DEFAULT_SYSFS_ROOT),
                active_low: true,
            }
        );
    }

    #[test]
    fn simulated_backend_defaults() {
        let config = parse(&["17", "--gpio", "simulated"]).unwrap();

        assert_eq!(
            config.source.kind,
            SourceKind::Simulated {
                events: DEFAULT_SIMULATED_EVENTS,
                repeat: DEFAULT_SIMULATED_REPEAT,
                time_scale: None,
                seed: None,
            }
        );
    }

    #[test]
    fn simulated_backend_with_time_scale() {
        let config = parse(&["17", "--gpio", "simulated", "--simulate-time-scale", "60"]).unwrap();

        assert!(matches!(
            config.source.kind,
            SourceKind::Simulated { time_scale: Some(scale), .. } if scale == 60.0
        ));
    }

    #[test]
    fn remote_sinks() {
        let config = parse(&[
            "17",
            "--thingspeak",
            " WKEY ",
            "--healthchecks",
            "https://hc-ping.com/abc",
        ])
        .unwrap();

        assert_eq!(config.sinks.thingspeak_api_key.as_deref(), Some("WKEY"));
        assert_eq!(
            config.sinks.healthchecks_url.unwrap().as_str(),
            "https://hc-ping.com/abc"
        );
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = parse(&["17", "--thingspeak", "WKEY"]).unwrap();
        assert!(!format!("{config:?}").contains("WKEY"));
    }

    #[test_case(&["17", "--thingspeak", "  "], ConfigError::EmptyApiKey; "blank_api_key")]
    #[test_case(&["17", "--poll-interval-ms", "0"], ConfigError::ZeroPollInterval; "zero_poll")]
    #[test_case(
        &["17", "--active-low"],
        ConfigError::RequiresBackend { flag: "--active-low", backend: GpioBackend::Sysfs };
        "active_low_without_sysfs"
    )]
    #[test_case(
        &["17", "--gpio", "sysfs", "--seed", "3"],
        ConfigError::RequiresBackend { flag: "--seed", backend: GpioBackend::Simulated };
        "seed_with_sysfs"
    )]
    #[test_case(
        &["17", "--simulate-events", "5"],
        ConfigError::RequiresBackend { flag: "--simulate-events", backend: GpioBackend::Simulated };
        "events_without_simulation"
    )]
    #[test_case(&["17", "--gpio", "simulated", "--simulate-repeat", "0"], ConfigError::ZeroRepeat; "zero_repeat")]
    #[test_case(
        &["17", "--gpio", "simulated", "--simulate-time-scale", "0"],
        ConfigError::InvalidTimeScale(0.0);
        "zero_time_scale"
    )]
    #[test_case(
        &["17", "--gpio", "simulated", "--simulate-time-scale=-2"],
        ConfigError::InvalidTimeScale(-2.0);
        "negative_time_scale"
    )]
    #[test_case(
        &["17", "--simulate-time-scale", "60"],
        ConfigError::RequiresBackend { flag: "--simulate-time-scale", backend: GpioBackend::Simulated };
        "time_scale_without_simulation"
    )]
    fn rejects(argv: &[&str], expected: ConfigError) {
        assert_eq!(parse(argv).unwrap_err(), expected);
    }

    #[test_case("not a url"; "garbage")]
    #[test_case("ftp://hc-ping.com/abc"; "wrong_scheme")]
    fn rejects_bad_ping_url(url: &str) {
        let err = parse(&["17", "--healthchecks", url]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }), "{err}");
    }

    #[test_case("0", Ok(0); "zero")]
    #[test_case("1000000", Ok(MAX_EVENTS); "at_cap")]
    #[test_case("1000001", Err(()); "above_cap")]
    #[test_case("18446744073709551615", Err(()); "usize_max")]
    #[test_case("-1", Err(()); "negative")]
    fn event_count_bounds(raw: &str, expected: Result<usize, ()>) {
        assert_eq!(parse_event_count(raw).map_err(|_| ()), expected);
    }

    #[test]
    fn oversized_simulation_is_a_parse_error() {
        let argv = ["sumpwatchd", "17", "--gpio", "simulated", "--simulate-events", "99999999999"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(Args::try_parse_from(["sumpwatchd", "17", "--gpio", "wiringpi"]).is_err());
    }
}
