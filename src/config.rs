use std::collections::HashMap;

use serde::Deserialize;

use crate::{door, mqtt_client::MqttClientConfig};

pub mod gpio;

#[derive(Debug, Deserialize)]
pub struct Config {
  /// The MQTT configuration
  pub mqtt_client: MqttClientConfig,
  /// A list of all doors to control
  pub doors: HashMap<door::Identifier, door::DoorConfig>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn example_config_parses() {
    let config: Config = toml::from_str(
      r#"
        [mqtt_client]
        broker_domain = "homeassistant.local"
        broker_port = 1883
        client_id = "mqtt-garage-door"
        availability_topic = "garage/availability"
        online_availability = "online"
        offline_availability = "offline"

        [doors.main]
        command_topic = "garage/main/command"
        state_topic = "garage/main/state"
        switch_pin = 23
        closed_sensor_pin = 17
        open_sensor_pin = 27
        opens_in = 12
      "#,
    )
    .unwrap();

    assert_eq!(config.doors.len(), 1);
    let door = &config.doors[&door::Identifier::from("main".to_string())];
    assert!(door.has_sensor());
  }
}
