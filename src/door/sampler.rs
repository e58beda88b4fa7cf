#[cfg(feature = "arm")]
use rppal::gpio::{Gpio, InputPin};

use super::{config::DoorConfig, state::Position};
use crate::{
  config::gpio::{GpioPin, Polarity},
  error::GarageResult,
};
#[cfg(not(feature = "arm"))]
use crate::mock_gpio::{Gpio, InputPin};

/// A single position sensor: a pin plus the level that means "door is here"
#[derive(Debug)]
struct SensorInput {
  pin: InputPin,
  polarity: Polarity,
}

impl SensorInput {
  fn new(pin: GpioPin, polarity: Polarity) -> GarageResult<SensorInput> {
    let gpio = Gpio::new()?;
    let pin = gpio.get(pin.bcm_number())?.into_input_pullup();

    Ok(SensorInput { pin, polarity })
  }

  fn is_active(&self) -> bool {
    self.polarity.is_active(self.pin.is_high())
  }
}

/// Classifies the door's physical position from its configured sensors.
///
/// Once the pins are acquired, reads cannot fail; GPIO errors only surface
/// here at construction.
#[derive(Debug)]
pub struct PositionSampler {
  open_sensor: Option<SensorInput>,
  closed_sensor: Option<SensorInput>,
}

impl PositionSampler {
  /// Build the sampler for a door, or `None` if no sensor is configured and
  /// the door runs on remembered state alone.
  pub fn from_config(config: &DoorConfig) -> GarageResult<Option<PositionSampler>> {
    let open_sensor = config
      .open_sensor_pin
      .map(|pin| SensorInput::new(pin, config.open_sensor_polarity))
      .transpose()?;
    let closed_sensor = config
      .closed_sensor_pin
      .map(|pin| SensorInput::new(pin, config.closed_sensor_polarity))
      .transpose()?;

    if open_sensor.is_none() && closed_sensor.is_none() {
      return Ok(None);
    }

    Ok(Some(PositionSampler {
      open_sensor,
      closed_sensor,
    }))
  }

  /// Take a reading of the configured sensors
  pub fn sample(&self) -> Position {
    classify(
      self.open_sensor.as_ref().map(SensorInput::is_active),
      self.closed_sensor.as_ref().map(SensorInput::is_active),
    )
  }
}

/// The open sensor is checked first, so a contradictory reading where both
/// sensors are active classifies as open.
fn classify(open_active: Option<bool>, closed_active: Option<bool>) -> Position {
  if open_active == Some(true) {
    Position::Open
  }
  else if closed_active == Some(true) {
    Position::Closed
  }
  else {
    Position::InMotion
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn open_sensor_active_reads_open() {
    assert_eq!(classify(Some(true), Some(false)), Position::Open);
    assert_eq!(classify(Some(true), None), Position::Open);
  }

  #[test]
  fn closed_sensor_active_reads_closed() {
    assert_eq!(classify(Some(false), Some(true)), Position::Closed);
    assert_eq!(classify(None, Some(true)), Position::Closed);
  }

  #[test]
  fn neither_sensor_active_reads_in_motion() {
    assert_eq!(classify(Some(false), Some(false)), Position::InMotion);
    assert_eq!(classify(None, Some(false)), Position::InMotion);
    assert_eq!(classify(Some(false), None), Position::InMotion);
  }

  #[test]
  fn contradictory_reading_prefers_open() {
    assert_eq!(classify(Some(true), Some(true)), Position::Open);
  }
}
