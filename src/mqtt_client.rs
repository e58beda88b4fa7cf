use rumqttc::{AsyncClient, LastWill, MqttOptions, QoS};
use serde::Deserialize;
use tokio::sync::mpsc;

use self::{
  receiver::MqttReceiver,
  sender::{MqttSender, PublishSender},
};

pub mod receiver;
pub mod sender;

#[derive(Debug, Deserialize)]
pub struct MqttClientConfig {
  pub broker_domain: String,
  pub broker_port: u16,
  pub client_id: String,
  /// The topic our availability is announced on
  pub availability_topic: String,
  /// The payload sent (retained) on the availability topic when we connect
  pub online_availability: String,
  /// The payload the broker publishes for us if we drop off
  pub offline_availability: String,
}

/// A message to be published to (or received from) the broker
#[derive(Debug, Clone)]
pub struct MqttPublish {
  pub topic: String,
  pub qos: QoS,
  pub retain: bool,
  pub payload: String,
}

pub struct MqttClient {
  pub receiver: MqttReceiver,
  pub sender: MqttSender,
}

impl MqttClient {
  /// Create the client, returning the channel doors publish their state
  /// changes into alongside the receiver/sender halves.
  pub fn with_config(config: MqttClientConfig) -> (PublishSender, MqttClient) {
    let mut options = MqttOptions::new(&config.client_id, &config.broker_domain, config.broker_port);
    options.set_last_will(LastWill::new(
      &config.availability_topic,
      config.offline_availability.clone().into_bytes(),
      QoS::AtLeastOnce,
      true,
    ));

    let (client, event_loop) = AsyncClient::new(options, 10);
    let (send_channel, receive_channel) = mpsc::unbounded_channel();

    let client = MqttClient {
      receiver: MqttReceiver::new(client.clone(), event_loop),
      sender: MqttSender::new(
        client,
        receive_channel,
        config.availability_topic,
        config.online_availability,
      ),
    };

    (send_channel, client)
  }
}
