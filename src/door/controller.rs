use std::fmt;

use super::{
  identifier::Identifier,
  state::{DoorState, Position, TargetState},
};

/// What the controller is currently busy with.
///
/// `Commanded` and `RemoteMotion` are mutually exclusive by construction:
/// a motion is either one we triggered through the relay (resolved by the
/// completion check) or one somebody's remote triggered (resolved when the
/// sensors read a terminal position again).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
  Idle,
  /// We pulsed the relay and are waiting for the completion check
  Commanded { target: TargetState },
  /// The door is moving but we didn't start it
  RemoteMotion { target: TargetState },
}

/// A side effect the door driver must carry out after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  /// Publish the given state on the door's state topic
  PublishState(DoorState),
  /// Pulse the relay once to trigger the door motor
  PulseRelay,
  /// Start the travel-duration timer for a completion check
  ScheduleCompletionCheck,
}

/// The door control state machine.
///
/// Deliberately free of timers and hardware: every input (a command from the
/// bridge, a sensor poll, an elapsed completion deadline) arrives as a method
/// call carrying the sampled position, and every output is returned as a list
/// of [`Effect`]s for the driver to perform. This keeps the reconciliation
/// logic deterministic and testable without a runtime.
///
/// A `sampled position` of `None` means the door has no sensors configured;
/// the machine then trusts only its remembered state.
#[derive(Debug)]
pub struct DoorStateMachine {
  identifier: Identifier,
  current_state: DoorState,
  target_state: TargetState,
  last_position: Option<Position>,
  activity: Activity,
}

impl fmt::Display for DoorStateMachine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Door ({})", self.identifier)
  }
}

impl DoorStateMachine {
  /// Create a machine from the initially sampled position, or from nothing if
  /// the door has no sensors, in which case it is assumed closed.
  pub fn new(identifier: Identifier, initial_position: Option<Position>) -> DoorStateMachine {
    let current_state = match initial_position {
      Some(position) => position.reported_state(),
      None => DoorState::Closed,
    };

    DoorStateMachine {
      identifier,
      target_state: current_state.end_state(),
      current_state,
      last_position: initial_position,
      activity: Activity::Idle,
    }
  }

  pub fn current_state(&self) -> DoorState {
    self.current_state
  }

  pub fn target_state(&self) -> TargetState {
    self.target_state
  }

  /// The state answered to a bridge "get", derived from the last sampled
  /// position. In motion reads as open so a stuck door is never reported
  /// closed. Sensorless doors answer from memory.
  pub fn reported_state(&self) -> DoorState {
    match self.last_position {
      Some(position) => position.reported_state(),
      None => self.current_state,
    }
  }

  /// The bridge asked us to move the door to `requested`.
  ///
  /// The target is recorded even when nothing needs doing. The relay is not
  /// pulsed if a remote-triggered motion towards the same target is already
  /// under way (the app and a physical remote racing must not double-trigger),
  /// nor if the door is already where it was asked to go.
  pub fn handle_command(&mut self, requested: TargetState, position: Option<Position>) -> Vec<Effect> {
    self.target_state = requested;

    if let Activity::RemoteMotion { target } = self.activity {
      if target == requested {
        log::debug!("{} already moving to {} by remote, not triggering", self, requested);
        return Vec::new();
      }
    }

    let satisfied = match position {
      Some(position) => position.satisfies(requested),
      None => self.current_state == DoorState::from(requested),
    };
    if satisfied {
      log::debug!("{} is already {}, not triggering", self, requested);
      return Vec::new();
    }

    self.activity = Activity::Commanded { target: requested };
    self.current_state = requested.travel_state();
    log::debug!("{} commanded to {}, triggering relay", self, requested);

    vec![
      Effect::PublishState(self.current_state),
      Effect::ScheduleCompletionCheck,
      Effect::PulseRelay,
    ]
  }

  /// The travel duration elapsed after a commanded trigger.
  ///
  /// Reports the target state if the door arrived, otherwise leaves the
  /// transitional state in place and logs the discrepancy; no automatic
  /// retry. Either way the in-flight command is considered finished.
  pub fn handle_completion(&mut self, observed: Option<Position>) -> Vec<Effect> {
    let Activity::Commanded { target } = self.activity else {
      // a stale deadline, e.g. the command was superseded
      return Vec::new();
    };
    self.activity = Activity::Idle;

    let arrived = match observed {
      Some(position) => {
        self.last_position = Some(position);
        position.satisfies(target)
      }
      // without sensors we take it on faith that the door went where told
      None => true,
    };

    if arrived {
      self.current_state = target.into();
      log::debug!("{} reached {}", self, target);
      vec![Effect::PublishState(self.current_state)]
    }
    else {
      log::warn!("{} was told to {} but has not arrived, still {}", self, target, self.current_state);
      Vec::new()
    }
  }

  /// A scheduled sensor poll produced `position`.
  ///
  /// Detects remote-triggered motion: a door leaving a terminal position
  /// while no command is in flight can only have been moved by a physical
  /// remote, so the target is inferred from the direction. While a command
  /// is in flight all of this is suppressed; the completion check owns the
  /// outcome.
  pub fn handle_poll(&mut self, position: Position) -> Vec<Effect> {
    let previous = match self.last_position {
      Some(previous) if previous != position => previous,
      Some(_) => return Vec::new(),
      None => {
        self.last_position = Some(position);
        return Vec::new();
      }
    };
    self.last_position = Some(position);

    if let Activity::Commanded { .. } = self.activity {
      return Vec::new();
    }

    match (previous, position) {
      (Position::Open, Position::InMotion) => {
        self.activity = Activity::RemoteMotion {
          target: TargetState::Closed,
        };
        self.target_state = TargetState::Closed;
        self.current_state = DoorState::Closing;
        log::debug!("{} started closing by remote", self);
        vec![Effect::PublishState(self.current_state)]
      }
      (Position::Closed, Position::InMotion) => {
        self.activity = Activity::RemoteMotion {
          target: TargetState::Open,
        };
        self.target_state = TargetState::Open;
        self.current_state = DoorState::Opening;
        log::debug!("{} started opening by remote", self);
        vec![Effect::PublishState(self.current_state)]
      }
      (_, terminal) => {
        // the motion resolved (or the door jumped between terminal positions
        // inside one poll interval)
        self.activity = Activity::Idle;
        self.current_state = terminal.reported_state();
        self.target_state = self.current_state.end_state();
        log::debug!("{} settled as {} by remote", self, self.current_state);
        vec![Effect::PublishState(self.current_state)]
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn machine(initial_position: Option<Position>) -> DoorStateMachine {
    DoorStateMachine::new(Identifier::from("test-door".to_string()), initial_position)
  }

  #[test]
  fn remote_close_cycle_reports_closing_then_closed() {
    let mut machine = machine(Some(Position::Open));

    let effects = machine.handle_poll(Position::InMotion);
    assert_eq!(effects, vec![Effect::PublishState(DoorState::Closing)]);
    assert_eq!(machine.target_state(), TargetState::Closed);

    let effects = machine.handle_poll(Position::Closed);
    assert_eq!(effects, vec![Effect::PublishState(DoorState::Closed)]);
    assert_eq!(machine.current_state(), DoorState::Closed);
    assert_eq!(machine.target_state(), TargetState::Closed);
  }

  #[test]
  fn command_ignored_when_position_already_satisfies() {
    let mut machine = machine(Some(Position::Closed));

    let effects = machine.handle_command(TargetState::Closed, Some(Position::Closed));
    assert_eq!(effects, Vec::new());
    assert_eq!(machine.target_state(), TargetState::Closed);

    // nothing in flight, so a later remote motion is still recognised
    let effects = machine.handle_poll(Position::InMotion);
    assert_eq!(effects, vec![Effect::PublishState(DoorState::Opening)]);
  }

  #[test]
  fn command_open_from_closed_pulses_once_and_completes() {
    let mut machine = machine(Some(Position::Closed));

    let effects = machine.handle_command(TargetState::Open, Some(Position::Closed));
    assert_eq!(
      effects,
      vec![
        Effect::PublishState(DoorState::Opening),
        Effect::ScheduleCompletionCheck,
        Effect::PulseRelay,
      ]
    );
    assert_eq!(machine.current_state(), DoorState::Opening);

    let effects = machine.handle_completion(Some(Position::Open));
    assert_eq!(effects, vec![Effect::PublishState(DoorState::Open)]);
    assert_eq!(machine.current_state(), DoorState::Open);
  }

  #[test]
  fn failed_completion_leaves_state_transitional() {
    let mut machine = machine(Some(Position::Closed));
    machine.handle_command(TargetState::Open, Some(Position::Closed));

    // the door never moved
    let effects = machine.handle_completion(Some(Position::Closed));
    assert_eq!(effects, Vec::new());
    assert_eq!(machine.current_state(), DoorState::Opening);

    // the command is no longer in flight, a fresh command triggers again
    let effects = machine.handle_command(TargetState::Open, Some(Position::Closed));
    assert!(effects.contains(&Effect::PulseRelay));
  }

  #[test]
  fn stale_completion_deadline_is_ignored() {
    let mut machine = machine(Some(Position::Closed));
    machine.handle_command(TargetState::Open, Some(Position::Closed));
    machine.handle_completion(Some(Position::Open));

    assert_eq!(machine.handle_completion(Some(Position::Open)), Vec::new());
    assert_eq!(machine.current_state(), DoorState::Open);
  }

  #[test]
  fn remote_motion_suppressed_while_command_in_flight() {
    let mut machine = machine(Some(Position::Closed));
    machine.handle_command(TargetState::Open, Some(Position::Closed));

    // expected motion from our own trigger; not a remote
    let effects = machine.handle_poll(Position::InMotion);
    assert_eq!(effects, Vec::new());
    assert_eq!(machine.target_state(), TargetState::Open);
    assert_eq!(machine.current_state(), DoorState::Opening);
  }

  #[test]
  fn command_matching_remote_motion_does_not_double_trigger() {
    let mut machine = machine(Some(Position::Open));
    machine.handle_poll(Position::InMotion);

    // the app asks for the close that the remote already started
    let effects = machine.handle_command(TargetState::Closed, Some(Position::InMotion));
    assert_eq!(effects, Vec::new());
    assert_eq!(machine.current_state(), DoorState::Closing);
  }

  #[test]
  fn command_against_remote_motion_triggers() {
    let mut machine = machine(Some(Position::Open));
    machine.handle_poll(Position::InMotion);

    let effects = machine.handle_command(TargetState::Open, Some(Position::InMotion));
    assert!(effects.contains(&Effect::PulseRelay));
    assert_eq!(machine.current_state(), DoorState::Opening);
  }

  #[test]
  fn sensorless_door_assumes_closed_and_trusts_memory() {
    let mut machine = machine(None);
    assert_eq!(machine.reported_state(), DoorState::Closed);

    let effects = machine.handle_command(TargetState::Open, None);
    assert!(effects.contains(&Effect::PulseRelay));

    // no sensors to consult, completion is assumed
    let effects = machine.handle_completion(None);
    assert_eq!(effects, vec![Effect::PublishState(DoorState::Open)]);
    assert_eq!(machine.reported_state(), DoorState::Open);

    // already open per our memory, no second trigger
    assert_eq!(machine.handle_command(TargetState::Open, None), Vec::new());
  }

  #[test]
  fn reported_state_is_stable_between_polls() {
    let mut machine = machine(Some(Position::Closed));
    assert_eq!(machine.reported_state(), DoorState::Closed);
    assert_eq!(machine.reported_state(), DoorState::Closed);

    machine.handle_poll(Position::InMotion);
    // in motion reads as open, never as closed
    assert_eq!(machine.reported_state(), DoorState::Open);
    assert_eq!(machine.reported_state(), DoorState::Open);
  }

  #[test]
  fn unchanged_poll_is_a_no_op() {
    let mut machine = machine(Some(Position::Open));
    assert_eq!(machine.handle_poll(Position::Open), Vec::new());
    assert_eq!(machine.handle_poll(Position::Open), Vec::new());
  }
}
