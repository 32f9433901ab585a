/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ElevatorError, ElevatorResult};

// Outside this range the runner cannot map wall time onto the simulation clock
pub const MIN_TIME_SCALE: f64 = 1e-3;
pub const MAX_TIME_SCALE: f64 = 1e6;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub elevator: ElevatorConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Building layout and car timings. All times are in milliseconds.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub n_cars: u8,
    pub n_floors: u8,
    pub travel_time_per_floor: u64,
    pub door_open_time: u64,
    pub door_close_time: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DispatcherConfig {
    pub queue_poll_interval: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    // Simulated seconds per wall-clock second
    pub time_scale: f64,
}

impl Default for ElevatorConfig {
    fn default() -> ElevatorConfig {
        ElevatorConfig {
            n_cars: 2,
            n_floors: 5,
            travel_time_per_floor: 2000,
            door_open_time: 3000,
            door_close_time: 2500,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> DispatcherConfig {
        DispatcherConfig {
            queue_poll_interval: 100,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> RunnerConfig {
        RunnerConfig { time_scale: 1.0 }
    }
}

impl ElevatorConfig {
    pub fn travel_time_per_floor(&self) -> Duration {
        Duration::from_millis(self.travel_time_per_floor)
    }

    pub fn door_open_time(&self) -> Duration {
        Duration::from_millis(self.door_open_time)
    }

    pub fn door_close_time(&self) -> Duration {
        Duration::from_millis(self.door_close_time)
    }
}

impl DispatcherConfig {
    pub fn queue_poll_interval(&self) -> Duration {
        Duration::from_millis(self.queue_poll_interval)
    }
}

impl Config {
    /// Rejects configurations the simulation cannot run with.
    pub fn validate(&self) -> ElevatorResult<()> {
        if self.elevator.n_cars == 0 {
            return Err(ElevatorError::InvalidConfiguration(
                "n_cars must be at least 1".into(),
            ));
        }
        if self.elevator.n_floors == 0 {
            return Err(ElevatorError::InvalidConfiguration(
                "n_floors must be at least 1".into(),
            ));
        }
        // The queue cycle re-arms itself while requests wait, so it needs to move time forward
        if self.dispatcher.queue_poll_interval == 0 {
            return Err(ElevatorError::InvalidConfiguration(
                "queue_poll_interval must be positive".into(),
            ));
        }
        if !(MIN_TIME_SCALE..=MAX_TIME_SCALE).contains(&self.runner.time_scale) {
            return Err(ElevatorError::InvalidConfiguration(format!(
                "time_scale must be between {} and {}, got {}",
                MIN_TIME_SCALE, MAX_TIME_SCALE, self.runner.time_scale
            )));
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> ElevatorResult<Config> {
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> ElevatorResult<Config> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

/***************************************/
/*             Unit tests              */
/***************************************/
