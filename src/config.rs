use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::model::{HeightRule, ShelfBlueprint};
use crate::optimizer::{OrderingStrategy, PlanningConfig};

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub planner: PlannerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_string)
    }

    /// Creates a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api: ApiConfig::from_lookup(lookup),
            planner: PlannerConfig::from_lookup(lookup),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "SHELF_PLANNER_API_HOST";
    const PORT_VAR: &'static str = "SHELF_PLANNER_API_PORT";

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let host_value = lookup(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match lookup(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    eprintln!(
                        "⚠️ {} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    eprintln!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                        Self::PORT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Overrides the configured port (e.g. from a command-line flag).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Shelf set and ordering used when a request or command does not say otherwise.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    planning: PlanningConfig,
}

impl PlannerConfig {
    const SHELF_COUNT_VAR: &'static str = "SHELF_PLANNER_SHELF_COUNT";
    const SHELF_LENGTH_VAR: &'static str = "SHELF_PLANNER_SHELF_LENGTH";
    const SHELF_HEIGHT_VAR: &'static str = "SHELF_PLANNER_SHELF_HEIGHT";
    const ORDERING_VAR: &'static str = "SHELF_PLANNER_ORDERING";
    const ENFORCE_HEIGHT_VAR: &'static str = "SHELF_PLANNER_ENFORCE_SHELF_HEIGHT";

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let count = match lookup(Self::SHELF_COUNT_VAR) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(value) if value <= ShelfBlueprint::MAX_COUNT => value,
                Ok(_) => {
                    eprintln!(
                        "⚠️ {} contains invalid value '{}': must be at most {}. Using {}.",
                        Self::SHELF_COUNT_VAR,
                        raw,
                        ShelfBlueprint::MAX_COUNT,
                        ShelfBlueprint::DEFAULT_COUNT
                    );
                    ShelfBlueprint::DEFAULT_COUNT
                }
                Err(err) => {
                    eprintln!(
                        "⚠️ Could not parse {} ('{}') as count: {}. Using {}.",
                        Self::SHELF_COUNT_VAR,
                        raw,
                        err,
                        ShelfBlueprint::DEFAULT_COUNT
                    );
                    ShelfBlueprint::DEFAULT_COUNT
                }
            },
            None => ShelfBlueprint::DEFAULT_COUNT,
        };

        let length = load_f64_with_warning(
            lookup,
            Self::SHELF_LENGTH_VAR,
            ShelfBlueprint::DEFAULT_LENGTH,
            |value| value > 0.0 && value.is_finite(),
            "must be a positive number",
        );

        let height = load_f64_with_warning(
            lookup,
            Self::SHELF_HEIGHT_VAR,
            ShelfBlueprint::DEFAULT_HEIGHT,
            |value| value > 0.0 && value.is_finite(),
            "must be a positive number",
        );

        let ordering = match lookup(Self::ORDERING_VAR) {
            Some(raw) => raw.parse::<OrderingStrategy>().unwrap_or_else(|err| {
                eprintln!(
                    "⚠️ {}: {}. Using {}.",
                    Self::ORDERING_VAR,
                    err,
                    OrderingStrategy::default()
                );
                OrderingStrategy::default()
            }),
            None => OrderingStrategy::default(),
        };

        let enforce_height = lookup(Self::ENFORCE_HEIGHT_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ENFORCE_HEIGHT_VAR))
            .unwrap_or(true);
        let height_rule = if enforce_height {
            HeightRule::Enforce
        } else {
            println!(
                "⚠️ Shelf height is not enforced: over-tall games may start stacks ({} = false).",
                Self::ENFORCE_HEIGHT_VAR
            );
            HeightRule::Permissive
        };

        let shelves = ShelfBlueprint {
            count,
            length,
            height,
            height_rule,
        };

        Self {
            planning: PlanningConfig::builder()
                .shelves(shelves)
                .ordering(ordering)
                .build(),
        }
    }

    /// Returns the configured PlanningConfig.
    pub fn planning_config(&self) -> PlanningConfig {
        self.planning
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            eprintln!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn load_f64_with_warning(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    match lookup(var_name) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if validator(value) => value,
            Ok(_) => {
                eprintln!(
                    "⚠️ {} contains invalid value '{}': {}. Using {}.",
                    var_name, raw, invalid_hint, default
                );
                default
            }
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
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
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_parse_bool_true_values() {
        assert_eq!(parse_bool("1", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("true", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("yes", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("y", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("on", "TEST_VAR"), Some(true));

        // Test case insensitivity
        assert_eq!(parse_bool("TRUE", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("Yes", "TEST_VAR"), Some(true));

        // Test with whitespace
        assert_eq!(parse_bool(" true ", "TEST_VAR"), Some(true));
    }

    #[test]
    fn test_parse_bool_false_and_invalid_values() {
        assert_eq!(parse_bool("0", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("false", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("OFF", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("maybe", "TEST_VAR"), None);
        assert_eq!(parse_bool("", "TEST_VAR"), None);
    }

    #[test]
    fn defaults_match_the_reference_bookcase() {
        let config = AppConfig::from_lookup(&lookup_from(&[]));
        let planning = config.planner.planning_config();

        assert_eq!(planning.shelves.count, 14);
        assert_eq!(planning.shelves.length, 13.125);
        assert_eq!(planning.shelves.height, 13.125);
        assert_eq!(planning.shelves.height_rule, HeightRule::Enforce);
        assert_eq!(planning.ordering, OrderingStrategy::WidthThenHeight);
        assert_eq!(config.api.port(), 8080);
        assert!(config.api.binds_to_all_interfaces());
        assert!(config.api.uses_default_host());
    }

    #[test]
    fn reads_overrides_from_lookup() {
        let config = AppConfig::from_lookup(&lookup_from(&[
            ("SHELF_PLANNER_API_HOST", "127.0.0.1"),
            ("SHELF_PLANNER_API_PORT", "9090"),
            ("SHELF_PLANNER_SHELF_COUNT", "4"),
            ("SHELF_PLANNER_SHELF_LENGTH", "30"),
            ("SHELF_PLANNER_SHELF_HEIGHT", "12.5"),
            ("SHELF_PLANNER_ORDERING", "area"),
            ("SHELF_PLANNER_ENFORCE_SHELF_HEIGHT", "no"),
        ]));
        let planning = config.planner.planning_config();

        assert_eq!(config.api.socket_addr().to_string(), "127.0.0.1:9090");
        assert!(!config.api.binds_to_all_interfaces());
        assert_eq!(planning.shelves.count, 4);
        assert_eq!(planning.shelves.length, 30.0);
        assert_eq!(planning.shelves.height, 12.5);
        assert_eq!(planning.shelves.height_rule, HeightRule::Permissive);
        assert_eq!(planning.ordering, OrderingStrategy::Area);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(&lookup_from(&[
            ("SHELF_PLANNER_API_HOST", "not-an-ip"),
            ("SHELF_PLANNER_API_PORT", "0"),
            ("SHELF_PLANNER_SHELF_COUNT", "-2"),
            ("SHELF_PLANNER_SHELF_LENGTH", "-1"),
            ("SHELF_PLANNER_SHELF_HEIGHT", "tall"),
            ("SHELF_PLANNER_ORDERING", "random"),
            ("SHELF_PLANNER_ENFORCE_SHELF_HEIGHT", "sometimes"),
        ]));
        let planning = config.planner.planning_config();

        assert_eq!(config.api.port(), 8080);
        assert!(config.api.uses_default_host());
        assert_eq!(planning.shelves.count, 14);
        assert_eq!(planning.shelves.length, 13.125);
        assert_eq!(planning.shelves.height, 13.125);
        assert_eq!(planning.ordering, OrderingStrategy::WidthThenHeight);
        assert_eq!(planning.shelves.height_rule, HeightRule::Enforce);
    }

    #[test]
    fn shelf_count_above_limit_falls_back_to_default() {
        let config = AppConfig::from_lookup(&lookup_from(&[(
            "SHELF_PLANNER_SHELF_COUNT",
            "18446744073709551615",
        )]));
        let planning = config.planner.planning_config();

        assert_eq!(planning.shelves.count, ShelfBlueprint::DEFAULT_COUNT);
        assert!(planning.shelves.instantiate().is_ok());
    }
}
