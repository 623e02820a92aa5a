// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Duration;

pub const STACK_VAR: &str = "SMTC_STACK";
pub const I2C_BUS_VAR: &str = "SMTC_I2C_BUS";
pub const INTERVAL_VAR: &str = "SMTC_INTERVAL_MS";
pub const DUMMY_VAR: &str = "SMTC_DUMMY";

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid value {value:?} for {name}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Runtime settings of the logger.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Stack level of the board to read.
    pub stack: u8,
    /// I2C bus device the board sits on.
    pub i2c_bus: PathBuf,
    /// Delay between two passes over the channels.
    pub sample_interval: Duration,
    /// Use the recorded dummy board instead of the bus.
    pub dummy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack: 0,
            i2c_bus: PathBuf::from("/dev/i2c-1"),
            sample_interval: Duration::from_secs(1),
            dummy: false,
        }
    }
}

impl Config {
    /// Default settings overridden by the `SMTC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(STACK_VAR) {
            config.stack = parse(STACK_VAR, &value)?;
        }
        if let Some(value) = lookup(I2C_BUS_VAR) {
            config.i2c_bus = PathBuf::from(value);
        }
        if let Some(value) = lookup(INTERVAL_VAR) {
            config.sample_interval = Duration::from_millis(parse(INTERVAL_VAR, &value)?);
        }
        if let Some(value) = lookup(DUMMY_VAR) {
            config.dummy = match value.trim() {
                "" | "0" | "false" => false,
                "1" | "true" => true,
                _ => return Err(invalid(DUMMY_VAR, &value)),
            };
        }

        log::debug!("Configuration: {config:?}");
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(name, value))
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError {
        name,
        value: value.to_string(),
    }
}

#[cfg(test)]
fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: std::collections::HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_defaults_without_variables() {
    let config = Config::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.sample_interval, Duration::from_secs(1));
}

#[test]
fn test_variables_override_defaults() {
    let config = Config::from_lookup(lookup(&[
        (STACK_VAR, "3"),
        (I2C_BUS_VAR, "/dev/i2c-0"),
        (INTERVAL_VAR, " 250 "),
        (DUMMY_VAR, "1"),
    ]))
    .unwrap();

    assert_eq!(
        config,
        Config {
            stack: 3,
            i2c_bus: PathBuf::from("/dev/i2c-0"),
            sample_interval: Duration::from_millis(250),
            dummy: true,
        }
    );
}

#[test]
fn test_malformed_values_are_rejected() {
    let err = Config::from_lookup(lookup(&[(STACK_VAR, "base")])).unwrap_err();
    assert_eq!(err.name, STACK_VAR);
    assert_eq!(err.to_string(), "invalid value \"base\" for SMTC_STACK");

    assert!(Config::from_lookup(lookup(&[(INTERVAL_VAR, "-5")])).is_err());
    assert!(Config::from_lookup(lookup(&[(DUMMY_VAR, "maybe")])).is_err());
}
