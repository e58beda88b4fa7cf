use std::time::Duration;

use log::debug;
#[cfg(feature = "arm")]
use rppal::gpio::{Gpio, OutputPin};
use tokio::time::sleep;

use super::config::DoorConfig;
use crate::{config::gpio::Polarity, error::GarageResult};
#[cfg(not(feature = "arm"))]
use crate::mock_gpio::{Gpio, OutputPin};

/// The relay wired across the opener's wall-button terminals.
///
/// The opener only understands a momentary press, so the relay is pulsed:
/// driven active, held, then always driven back to its released level.
#[derive(Debug)]
pub struct DoorRelay {
  pin: OutputPin,
  polarity: Polarity,
  press_time: Duration,
}

impl DoorRelay {
  pub fn from_config(config: &DoorConfig) -> GarageResult<DoorRelay> {
    let gpio = Gpio::new()?;
    let pin = gpio.get(config.switch_pin.bcm_number())?.into_output();

    let mut relay = DoorRelay {
      pin,
      polarity: config.switch_polarity,
      press_time: config.switch_press_time,
    };
    // an active-low relay would otherwise sit pressed from power-on
    relay.release();
    Ok(relay)
  }

  fn press(&mut self) {
    match self.polarity {
      Polarity::ActiveHigh => self.pin.set_high(),
      Polarity::ActiveLow => self.pin.set_low(),
    }
  }

  fn release(&mut self) {
    match self.polarity {
      Polarity::ActiveHigh => self.pin.set_low(),
      Polarity::ActiveLow => self.pin.set_high(),
    }
  }

  /// Press and release the relay once to trigger the door motor
  pub async fn pulse(&mut self) {
    debug!("Pressing relay for {:?}", self.press_time);
    self.press();
    sleep(self.press_time).await;
    self.release();
    debug!("Released relay");
  }
}
