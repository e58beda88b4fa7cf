use rumqttc::{AsyncClient, QoS};
use tokio::sync::mpsc;

use super::MqttPublish;
use crate::error::GarageResult;

pub type PublishSender = mpsc::UnboundedSender<MqttPublish>;

pub struct MqttSender {
  client: AsyncClient,
  /// The channel with which messages to send to MQTT are received on
  send_channel: mpsc::UnboundedReceiver<MqttPublish>,
  availability_topic: String,
  online_availability: String,
}

impl MqttSender {
  pub fn new(
    client: AsyncClient,
    send_channel: mpsc::UnboundedReceiver<MqttPublish>,
    availability_topic: String,
    online_availability: String,
  ) -> MqttSender {
    MqttSender {
      client,
      send_channel,
      availability_topic,
      online_availability,
    }
  }

  /// Announce our availability
  pub async fn announce(&self) -> GarageResult<()> {
    self
      .client
      .publish(self.availability_topic.clone(), QoS::AtLeastOnce, true, self.online_availability.clone())
      .await
      .map_err(|err| err.into())
  }

  pub async fn send_messages(&mut self) -> GarageResult<()> {
    self.announce().await?;

    loop {
      if let Some(publish) = self.send_channel.recv().await {
        self
          .client
          .publish(publish.topic, publish.qos, publish.retain, publish.payload)
          .await?;
      }
      else {
        return Ok(());
      }
    }
  }
}
