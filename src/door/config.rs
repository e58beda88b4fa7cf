use std::time::Duration;

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds, DurationSecondsWithFrac};

use super::identifier::Identifier;
use crate::{
  config::gpio::{GpioPin, Polarity},
  error::{GarageError, GarageResult},
};

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct DoorConfig {
  /// The name of the MQTT topic open/close commands are received on
  pub command_topic: String,

  /// The name of the MQTT topic state changes are sent on
  pub state_topic: String,

  /// The pin driving the relay wired to the opener's button input
  pub switch_pin: GpioPin,

  /// Which level presses the relay
  #[serde(default)]
  pub switch_polarity: Polarity,

  #[serde_as(as = "DurationSecondsWithFrac<f64>")]
  #[serde(default = "default_switch_press_time")]
  /// How long the relay is held pressed per trigger
  pub switch_press_time: Duration,

  /// The pin of the closed-position sensor, if fitted
  #[serde(default, alias = "door_sensor_pin")]
  pub closed_sensor_pin: Option<GpioPin>,

  #[serde(default)]
  pub closed_sensor_polarity: Polarity,

  /// The pin of the open-position sensor, if fitted
  #[serde(default)]
  pub open_sensor_pin: Option<GpioPin>,

  #[serde(default)]
  pub open_sensor_polarity: Polarity,

  #[serde_as(as = "DurationSecondsWithFrac<f64>")]
  #[serde(default = "default_poll_interval")]
  /// How often the sensors are polled
  pub poll_interval: Duration,

  #[serde_as(as = "Option<DurationSeconds<u64>>")]
  #[serde(default)]
  /// How long the door takes to travel fully open or closed.
  ///
  /// After a trigger, this is how long we wait before checking the door
  /// arrived. Required whenever a sensor is configured.
  pub opens_in: Option<Duration>,
}

impl DoorConfig {
  pub fn has_sensor(&self) -> bool {
    self.open_sensor_pin.is_some() || self.closed_sensor_pin.is_some()
  }

  pub fn validate(&self, identifier: &Identifier) -> GarageResult<()> {
    if self.has_sensor() && self.opens_in.is_none() {
      return Err(GarageError::InvalidDoorConfig {
        identifier: identifier.clone(),
        reason: "opens_in is required when a sensor is configured",
      });
    }
    Ok(())
  }
}

fn default_switch_press_time() -> Duration {
  Duration::from_millis(1000)
}

fn default_poll_interval() -> Duration {
  Duration::from_millis(4000)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_config_applies_defaults() {
    let config: DoorConfig = toml::from_str(
      r#"
        command_topic = "garage/door/command"
        state_topic = "garage/door/state"
        switch_pin = 23
      "#,
    )
    .unwrap();

    assert_eq!(config.switch_polarity, Polarity::ActiveHigh);
    assert_eq!(config.switch_press_time, Duration::from_millis(1000));
    assert_eq!(config.poll_interval, Duration::from_millis(4000));
    assert!(!config.has_sensor());
    assert!(config.opens_in.is_none());

    // sensorless doors don't need a travel time
    config.validate(&Identifier::from("door".to_string())).unwrap();
  }

  #[test]
  fn full_config_parses() {
    let config: DoorConfig = toml::from_str(
      r#"
        command_topic = "garage/door/command"
        state_topic = "garage/door/state"
        switch_pin = 23
        switch_polarity = "active-low"
        switch_press_time = 0.5
        closed_sensor_pin = 17
        closed_sensor_polarity = "active-low"
        open_sensor_pin = 27
        poll_interval = 2.0
        opens_in = 12
      "#,
    )
    .unwrap();

    assert_eq!(config.switch_polarity, Polarity::ActiveLow);
    assert_eq!(config.switch_press_time, Duration::from_millis(500));
    assert_eq!(config.poll_interval, Duration::from_secs(2));
    assert_eq!(config.opens_in, Some(Duration::from_secs(12)));
    config.validate(&Identifier::from("door".to_string())).unwrap();
  }

  #[test]
  fn door_sensor_pin_aliases_closed_sensor_pin() {
    let config: DoorConfig = toml::from_str(
      r#"
        command_topic = "garage/door/command"
        state_topic = "garage/door/state"
        switch_pin = 23
        door_sensor_pin = 17
        opens_in = 10
      "#,
    )
    .unwrap();

    assert_eq!(config.closed_sensor_pin.unwrap().bcm_number(), 17);
  }

  #[test]
  fn sensor_without_travel_time_fails_validation() {
    let config: DoorConfig = toml::from_str(
      r#"
        command_topic = "garage/door/command"
        state_topic = "garage/door/state"
        switch_pin = 23
        closed_sensor_pin = 17
      "#,
    )
    .unwrap();

    assert!(config.validate(&Identifier::from("door".to_string())).is_err());
  }

  #[test]
  fn numeric_polarity_is_rejected() {
    let result: Result<DoorConfig, _> = toml::from_str(
      r#"
        command_topic = "garage/door/command"
        state_topic = "garage/door/state"
        switch_pin = 23
        switch_polarity = 1
      "#,
    );

    assert!(result.is_err());
  }
}
