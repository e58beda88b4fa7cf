use std::{fmt, pin::Pin, str::FromStr, time::Duration};

pub use config::DoorConfig;
pub use identifier::Identifier;
use log::{debug, info};
use rumqttc::QoS;
use tokio::{
  select,
  time::{self, Sleep},
};

use self::{
  controller::{DoorStateMachine, Effect},
  relay::DoorRelay,
  sampler::PositionSampler,
  state::{DoorState, TargetState},
};
use crate::{
  error::{GarageError, GarageResult},
  mqtt_client::{receiver::PublishReceiver, sender::PublishSender, MqttPublish},
};

pub mod config;
pub mod controller;
pub mod identifier;
pub mod relay;
pub mod sampler;
pub mod state;

/// A single garage door: the state machine plus the hardware and MQTT
/// plumbing it drives.
///
/// Everything that can touch the door's state happens inside [`Door::listen`],
/// one event at a time, so the machine is never re-entered concurrently.
#[derive(Debug)]
pub struct Door {
  identifier: Identifier,
  machine: DoorStateMachine,
  sampler: Option<PositionSampler>,
  relay: DoorRelay,
  poll_interval: Duration,
  travel_duration: Option<Duration>,
  state_topic: String,
  mqtt_tx: PublishSender,
}

impl fmt::Display for Door {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Door ({})", self.identifier)
  }
}

impl Door {
  pub fn with_config(identifier: Identifier, config: DoorConfig, mqtt_tx: PublishSender) -> GarageResult<Door> {
    config.validate(&identifier)?;

    let sampler = PositionSampler::from_config(&config)?;
    let relay = DoorRelay::from_config(&config)?;
    let initial_position = sampler.as_ref().map(|sampler| sampler.sample());
    let machine = DoorStateMachine::new(identifier.clone(), initial_position);

    Ok(Door {
      identifier,
      machine,
      sampler,
      relay,
      poll_interval: config.poll_interval,
      travel_duration: config.opens_in,
      state_topic: config.state_topic,
      mqtt_tx,
    })
  }

  /// Run the door until the MQTT connection goes away.
  ///
  /// `command_rx` carries publishes on this door's command topic.
  pub async fn listen(mut self, mut command_rx: PublishReceiver) -> GarageResult<()> {
    info!("{} initialised with state: {}", &self, self.machine.current_state());
    self.publish_state(self.machine.current_state())?;

    let mut poll = time::interval(self.poll_interval);
    // a pending completion check, if a command is in flight
    let mut completion: Option<Pin<Box<Sleep>>> = None;

    loop {
      select! {
        _ = poll.tick(), if self.sampler.is_some() => {
          if let Some(sampler) = &self.sampler {
            let position = sampler.sample();
            let effects = self.machine.handle_poll(position);
            self.run_effects(effects, &mut completion).await?;
          }
        }

        Some(()) = completion_elapsed(&mut completion) => {
          completion = None;
          let observed = self.sampler.as_ref().map(|sampler| sampler.sample());
          let effects = self.machine.handle_completion(observed);
          self.run_effects(effects, &mut completion).await?;
        }

        publish = command_rx.recv() => {
          let Some(publish) = publish else {
            return Err(GarageError::MqttClosed);
          };
          match TargetState::from_str(&publish.payload) {
            Ok(target_state) => {
              debug!("{} got told to move to state: {:?}", &self, &target_state);
              let position = self.sampler.as_ref().map(|sampler| sampler.sample());
              let effects = self.machine.handle_command(target_state, position);
              self.run_effects(effects, &mut completion).await?;
            }
            Err(()) => debug!("{} ignoring unrecognised command payload: {:?}", &self, &publish.payload),
          }
        }
      }
    }
  }

  async fn run_effects(&mut self, effects: Vec<Effect>, completion: &mut Option<Pin<Box<Sleep>>>) -> GarageResult<()> {
    for effect in effects {
      match effect {
        Effect::PublishState(state) => self.publish_state(state)?,
        Effect::ScheduleCompletionCheck => {
          // without a travel time the commanded state is assumed as soon as
          // the relay has been pulsed
          let travel = self.travel_duration.unwrap_or(Duration::ZERO);
          *completion = Some(Box::pin(time::sleep(travel)));
        }
        Effect::PulseRelay => self.relay.pulse().await,
      }
    }
    Ok(())
  }

  fn publish_state(&self, state: DoorState) -> GarageResult<()> {
    self
      .mqtt_tx
      .send(MqttPublish {
        topic: self.state_topic.clone(),
        qos: QoS::AtLeastOnce,
        retain: true,
        payload: state.to_string(),
      })
      .map_err(|_| GarageError::MqttClosed)
  }
}

async fn completion_elapsed(completion: &mut Option<Pin<Box<Sleep>>>) -> Option<()> {
  match completion {
    Some(sleep) => {
      sleep.as_mut().await;
      Some(())
    }
    None => None,
  }
}
