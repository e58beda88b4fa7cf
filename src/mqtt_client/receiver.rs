use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::sync::mpsc;

use super::MqttPublish;
use crate::error::{GarageError, GarageResult};

pub type PublishReceiver = mpsc::UnboundedReceiver<MqttPublish>;

/// Drives the MQTT event loop and fans incoming publishes out to whoever
/// subscribed to their topic.
pub struct MqttReceiver {
  client: AsyncClient,
  event_loop: EventLoop,
  subscriptions: Vec<(String, mpsc::UnboundedSender<MqttPublish>)>,
}

impl MqttReceiver {
  pub fn new(client: AsyncClient, event_loop: EventLoop) -> MqttReceiver {
    MqttReceiver {
      client,
      event_loop,
      subscriptions: Vec::new(),
    }
  }

  /// Subscribe to a topic, returning the channel its publishes arrive on
  pub async fn subscribe(&mut self, topic: String, qos: QoS) -> GarageResult<PublishReceiver> {
    self.client.subscribe(topic.clone(), qos).await?;
    let (send_channel, receive_channel) = mpsc::unbounded_channel();
    self.subscriptions.push((topic, send_channel));
    Ok(receive_channel)
  }

  /// Run the event loop forever, or until the connection fails
  pub async fn receive_messages(&mut self) -> GarageResult<()> {
    loop {
      let event = self.event_loop.poll().await?;
      if let Event::Incoming(Packet::Publish(publish)) = event {
        let Ok(payload) = String::from_utf8(publish.payload.to_vec()) else {
          log::warn!("Discarding non-UTF-8 payload on topic '{}'", publish.topic);
          continue;
        };
        for (topic, send_channel) in &self.subscriptions {
          if topic == &publish.topic {
            send_channel
              .send(MqttPublish {
                topic: publish.topic.clone(),
                qos: publish.qos,
                retain: publish.retain,
                payload: payload.clone(),
              })
              .map_err(|_| GarageError::MqttClosed)?;
          }
        }
      }
    }
  }
}
