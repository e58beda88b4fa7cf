use serde::Deserialize;

/// A GPIO pin, identified by its BCM number.
/// See: https://pinout.xyz/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub struct GpioPin(u8);

/// The Pi header only breaks out BCM 0 through 27
const MAX_BCM_NUMBER: u8 = 27;

impl TryFrom<u8> for GpioPin {
  type Error = String;

  fn try_from(number: u8) -> Result<Self, Self::Error> {
    if number > MAX_BCM_NUMBER {
      Err(format!(
        "GPIO pin {} does not exist (BCM numbers go up to {})",
        number, MAX_BCM_NUMBER
      ))
    }
    else {
      Ok(GpioPin(number))
    }
  }
}

impl GpioPin {
  pub fn bcm_number(self) -> u8 {
    self.0
  }
}

/// Whether a pin treats high or low as its active level.
///
/// Spelled out in the config rather than a bare 0/1 so a mis-wired polarity
/// fails at startup instead of silently misreading the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Polarity {
  #[serde(rename = "active-high")]
  ActiveHigh,
  #[serde(rename = "active-low")]
  ActiveLow,
}

impl Default for Polarity {
  fn default() -> Self {
    Polarity::ActiveHigh
  }
}

impl Polarity {
  /// Whether a pin reading the given level counts as active
  pub fn is_active(self, is_high: bool) -> bool {
    match self {
      Polarity::ActiveHigh => is_high,
      Polarity::ActiveLow => !is_high,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pin_numbers_are_validated() {
    assert_eq!(GpioPin::try_from(0).unwrap().bcm_number(), 0);
    assert_eq!(GpioPin::try_from(27).unwrap().bcm_number(), 27);
    assert!(GpioPin::try_from(28).is_err());
  }

  #[test]
  fn polarity_maps_levels() {
    assert!(Polarity::ActiveHigh.is_active(true));
    assert!(!Polarity::ActiveHigh.is_active(false));
    assert!(Polarity::ActiveLow.is_active(false));
    assert!(!Polarity::ActiveLow.is_active(true));
  }
}
