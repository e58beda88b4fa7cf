#![warn(rust_2018_idioms)]

use std::{fs, time::Duration};

use mqtt_garage_door::{config::Config, door::Door, error::GarageError, mqtt_client::MqttClient};
use rumqttc::QoS;
use simple_logger::SimpleLogger;
use tokio::{self, time::sleep};

#[tokio::main]
async fn main() {
  SimpleLogger::new()
    .with_module_level("rumqttc", log::LevelFilter::Warn)
    .init()
    .unwrap();

  loop {
    let err = run().await;
    log::error!("Error occurred, restarting in 5 seconds: {:?}", err);
    // wait some time for the broker to come back online
    sleep(Duration::from_secs(5)).await;
  }
}

/// Start every configured door and run the MQTT receiver and sender.
/// Runs forever unless an error occurs
async fn run() -> GarageError {
  let config = fs::read_to_string("garage-config.toml").expect("unable to read garage-config.toml");
  let config: Config = toml::from_str(&config).expect("unable to parse garage-config.toml");

  let (send_channel, mut client) = MqttClient::with_config(config.mqtt_client);

  for (identifier, door_config) in config.doors {
    let command_rx = match client
      .receiver
      .subscribe(door_config.command_topic.clone(), QoS::AtLeastOnce)
      .await
    {
      Ok(command_rx) => command_rx,
      Err(err) => return err,
    };

    let door = match Door::with_config(identifier, door_config, send_channel.clone()) {
      Ok(door) => door,
      Err(err) => return err,
    };

    tokio::spawn(async move {
      // doors only stop listening if the MQTT channels go away, which the
      // receiver/sender tasks below will notice too
      if let Err(err) = door.listen(command_rx).await {
        log::error!("Door listener stopped: {:?}", err);
      }
    });
  }

  let mut receiver = client.receiver;
  let receive = tokio::spawn(async move { receiver.receive_messages().await.unwrap() });

  let mut sender = client.sender;
  let send = tokio::spawn(async move { sender.send_messages().await.unwrap() });

  // the two tasks will only end if an error occurs (most likely MQTT broker disconnection)
  tokio::try_join!(receive, send).unwrap_err().into()
}
