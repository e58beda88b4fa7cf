use std::fmt;

use serde::Deserialize;

/// An identifier for a door.
///
/// Defined by the door's configuration key, i.e. [doors.identifier-here]
#[derive(Debug, Deserialize, Hash, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl From<String> for Identifier {
  fn from(string: String) -> Self {
    Identifier(string)
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
