use std::{fmt, str::FromStr};

use serde::Deserialize;

/// The state the door is trying to get to
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
  #[serde(rename = "OPEN")]
  Open,
  #[serde(rename = "CLOSED")]
  Closed,
}

impl FromStr for TargetState {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "OPEN" => Ok(TargetState::Open),
      "CLOSED" => Ok(TargetState::Closed),
      _ => Err(()),
    }
  }
}

impl fmt::Display for TargetState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TargetState::Open => write!(f, "OPEN"),
      TargetState::Closed => write!(f, "CLOSED"),
    }
  }
}

impl TargetState {
  /// The state the door is in while it travels towards this target
  pub fn travel_state(self) -> DoorState {
    match self {
      TargetState::Open => DoorState::Opening,
      TargetState::Closed => DoorState::Closing,
    }
  }
}

/// The state of the door as reported to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
  Open,
  Closed,
  Opening,
  Closing,
}

impl fmt::Display for DoorState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DoorState::Open => write!(f, "open"),
      DoorState::Closed => write!(f, "closed"),
      DoorState::Opening => write!(f, "opening"),
      DoorState::Closing => write!(f, "closing"),
    }
  }
}

impl From<TargetState> for DoorState {
  fn from(target_state: TargetState) -> Self {
    match target_state {
      TargetState::Open => DoorState::Open,
      TargetState::Closed => DoorState::Closed,
    }
  }
}

impl DoorState {
  /// The state this door will end up in if it completes its current motion
  /// (or stays put if it isn't moving)
  pub fn end_state(self) -> TargetState {
    match self {
      DoorState::Open | DoorState::Opening => TargetState::Open,
      DoorState::Closed | DoorState::Closing => TargetState::Closed,
    }
  }
}

/// The physical position of the door as classified from its sensors.
///
/// Sensors can only tell us the door is fully open or fully closed; anywhere
/// in between reads as `InMotion`, which covers a door that is travelling as
/// well as one that is stuck partway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
  Open,
  Closed,
  InMotion,
}

impl Position {
  /// The state reported to the bridge for this position.
  ///
  /// A door in motion (or stuck partway) is reported open: a stuck door must
  /// never be silently reported as closed.
  pub fn reported_state(self) -> DoorState {
    match self {
      Position::Open => DoorState::Open,
      Position::Closed => DoorState::Closed,
      Position::InMotion => DoorState::Open,
    }
  }

  /// True if this position already satisfies the given target
  pub fn satisfies(self, target: TargetState) -> bool {
    matches!(
      (self, target),
      (Position::Open, TargetState::Open) | (Position::Closed, TargetState::Closed)
    )
  }
}
