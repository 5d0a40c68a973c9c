//! Runtime configuration for the reaper.
//!
//! Everything is read from the environment once at startup and carried as an
//! explicit [`ReaperConfig`] value passed by parameter; the core never touches
//! process-wide state after construction. Every setting has a default, so a
//! missing or malformed variable is never fatal — bad values fall back to the
//! default with a warning.
//!
//! The two entry surfaces default differently: the on-demand check uses a
//! 24-hour safety window and always executes, while the triggered surface
//! uses a 2-hour window and defaults to dry run.

use std::str::FromStr;

/// Region used when `AWS_REGION` is not set.
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Applications evaluated when `SPINNAKER_APPLICATIONS` is not set.
pub const DEFAULT_APPLICATIONS: [&str; 3] = ["alpha", "beta", "preprod"];

/// Default safety window for the on-demand check surface.
pub const DEFAULT_MAX_AGE_HOURS_CHECK: i64 = 24;

/// Default safety window for the triggered surface.
pub const DEFAULT_MAX_AGE_HOURS_TRIGGERED: i64 = 2;

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Explicit configuration for one reaper process.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// AWS region the Auto Scaling client talks to.
    pub region: String,
    /// Application namespaces to evaluate, in order.
    pub applications: Vec<String>,
    /// A superseded cluster must be strictly older than this to be retired.
    pub max_cluster_age_hours: i64,
    /// When true, decisions are computed and reported but nothing is deleted.
    pub dry_run: bool,
    /// When set, the serve surface also runs a pass on this interval.
    pub interval_hours: Option<u64>,
    /// Console log format.
    pub log_format: LogFormat,
}

impl ReaperConfig {
    /// Configuration for the on-demand check surface.
    ///
    /// 24-hour default window; there is no dry-run concept on this surface,
    /// terminations always execute.
    pub fn check_from_env() -> Self {
        Self {
            region: env_string("AWS_REGION", DEFAULT_REGION),
            applications: env_applications(),
            max_cluster_age_hours: env_parsed("MAX_CLUSTER_AGE_HOURS", DEFAULT_MAX_AGE_HOURS_CHECK),
            dry_run: false,
            interval_hours: None,
            log_format: env_parsed("REAPER_LOG_FORMAT", LogFormat::Pretty),
        }
    }

    /// Configuration for the triggered/scheduled surface.
    ///
    /// 2-hour default window; dry run unless `DRY_RUN` is explicitly false.
    pub fn triggered_from_env() -> Self {
        Self {
            region: env_string("AWS_REGION", DEFAULT_REGION),
            applications: env_applications(),
            max_cluster_age_hours: env_parsed(
                "MAX_CLUSTER_AGE_HOURS",
                DEFAULT_MAX_AGE_HOURS_TRIGGERED,
            ),
            dry_run: env_bool("DRY_RUN", true),
            interval_hours: env_interval("REAPER_INTERVAL_HOURS"),
            log_format: env_parsed("REAPER_LOG_FORMAT", LogFormat::Json),
        }
    }
}

/// Read a variable, treating unset and blank the same way.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_string(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

fn env_applications() -> Vec<String> {
    match env_var("SPINNAKER_APPLICATIONS") {
        Some(value) => value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEFAULT_APPLICATIONS.iter().map(|s| s.to_string()).collect(),
    }
}

fn env_parsed<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env_var(name) {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(
                variable = name,
                value = %value,
                "Unparsable configuration value, using default"
            );
            default
        }),
        None => default,
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match env_var(name).map(|v| v.to_ascii_lowercase()) {
        Some(value) => match value.as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                tracing::warn!(
                    variable = name,
                    value = %value,
                    "Unparsable boolean, using default"
                );
                default
            }
        },
        None => default,
    }
}

/// Interval in hours; unset or zero disables the worker.
fn env_interval(name: &str) -> Option<u64> {
    match env_parsed::<u64>(name, 0) {
        0 => None,
        hours => Some(hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 6] = [
        "AWS_REGION",
        "SPINNAKER_APPLICATIONS",
        "MAX_CLUSTER_AGE_HOURS",
        "DRY_RUN",
        "REAPER_INTERVAL_HOURS",
        "REAPER_LOG_FORMAT",
    ];

    #[test]
    fn test_check_defaults() {
        temp_env::with_vars_unset(ALL_VARS, || {
            let config = ReaperConfig::check_from_env();
            assert_eq!(config.region, "eu-west-1");
            assert_eq!(config.applications, vec!["alpha", "beta", "preprod"]);
            assert_eq!(config.max_cluster_age_hours, 24);
            assert!(!config.dry_run);
            assert_eq!(config.interval_hours, None);
            assert_eq!(config.log_format, LogFormat::Pretty);
        });
    }

    #[test]
    fn test_triggered_defaults() {
        temp_env::with_vars_unset(ALL_VARS, || {
            let config = ReaperConfig::triggered_from_env();
            assert_eq!(config.max_cluster_age_hours, 2);
            assert!(config.dry_run);
            assert_eq!(config.interval_hours, None);
            assert_eq!(config.log_format, LogFormat::Json);
        });
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("AWS_REGION", Some("us-east-1")),
                ("SPINNAKER_APPLICATIONS", Some("gamma, delta ,")),
                ("MAX_CLUSTER_AGE_HOURS", Some("6")),
                ("DRY_RUN", Some("false")),
                ("REAPER_INTERVAL_HOURS", Some("4")),
                ("REAPER_LOG_FORMAT", Some("compact")),
            ],
            || {
                let config = ReaperConfig::triggered_from_env();
                assert_eq!(config.region, "us-east-1");
                assert_eq!(config.applications, vec!["gamma", "delta"]);
                assert_eq!(config.max_cluster_age_hours, 6);
                assert!(!config.dry_run);
                assert_eq!(config.interval_hours, Some(4));
                assert_eq!(config.log_format, LogFormat::Compact);
            },
        );
    }

    #[test]
    fn test_check_surface_ignores_dry_run() {
        temp_env::with_vars([("DRY_RUN", Some("true"))], || {
            let config = ReaperConfig::check_from_env();
            assert!(!config.dry_run);
        });
    }

    #[test]
    fn test_malformed_values_fall_back() {
        temp_env::with_vars(
            [
                ("MAX_CLUSTER_AGE_HOURS", Some("soon")),
                ("DRY_RUN", Some("maybe")),
                ("REAPER_LOG_FORMAT", Some("xml")),
            ],
            || {
                let config = ReaperConfig::triggered_from_env();
                assert_eq!(config.max_cluster_age_hours, 2);
                assert!(config.dry_run);
                assert_eq!(config.log_format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_zero_interval_disables_worker() {
        temp_env::with_vars([("REAPER_INTERVAL_HOURS", Some("0"))], || {
            let config = ReaperConfig::triggered_from_env();
            assert_eq!(config.interval_hours, None);
        });
    }

    #[test]
    fn test_blank_values_treated_as_unset() {
        temp_env::with_vars([("AWS_REGION", Some("  "))], || {
            let config = ReaperConfig::check_from_env();
            assert_eq!(config.region, "eu-west-1");
        });
    }
}
