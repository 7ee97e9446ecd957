use super::{Qos, Transport};
use crate::error::{LoraSimError, Result};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use log::{debug, info, trace, warn};
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PORT: u16 = 1883;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl FromStr for BrokerAddress {
    type Err = LoraSimError;

    /// Accepts `mqtt://host:port`, `tcp://host:port` or a bare `host[:port]`.
    fn from_str(url: &str) -> Result<Self> {
        let rest = match url.split_once("://") {
            Some(("mqtt", rest)) | Some(("tcp", rest)) => rest,
            Some((scheme, _)) => {
                return Err(LoraSimError::InvalidConfig(format!(
                    "unsupported broker scheme {:?}",
                    scheme
                )))
            }
            None => url,
        };
        let rest = rest.trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    LoraSimError::InvalidConfig(format!("bad broker port {:?}: {}", port, e))
                })?;
                (host, port)
            }
            None => (rest, DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(LoraSimError::InvalidConfig(format!(
                "broker url {:?} has no host",
                url
            )));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug)]
pub struct ConnectOptions {
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
    pub capacity: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            keep_alive: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            capacity: 64,
        }
    }
}

/// MQTT publisher backed by a rumqttc client whose event loop runs on its own task.
pub struct MqttTransport {
    client: AsyncClient,
    driver: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl MqttTransport {
    /// Connects and waits for the broker's CONNACK. Transient failures are retried
    /// until `connect_timeout` elapses; a refused connection is returned at once.
    pub async fn connect(
        address: &BrokerAddress,
        client_id: &str,
        options: ConnectOptions,
    ) -> Result<Self> {
        let mut mqtt_options = MqttOptions::new(client_id, &address.host, address.port);
        mqtt_options.set_keep_alive(options.keep_alive);
        mqtt_options.set_clean_session(true);

        let (client, mut event_loop) = AsyncClient::new(mqtt_options, options.capacity);

        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_max_interval(Duration::from_secs(2))
            .with_max_elapsed_time(Some(options.connect_timeout))
            .build();

        info!("Connecting to MQTT broker {} as {}", address, client_id);
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    debug!("CONNACK received: {:?}", ack);
                    break;
                }
                Ok(event) => trace!("MQTT event before CONNACK: {:?}", event),
                Err(ConnectionError::ConnectionRefused(code)) => {
                    return Err(LoraSimError::ConnectionRefused(code));
                }
                Err(e) => match backoff.next_backoff() {
                    Some(delay) => {
                        warn!("Connecting to {} failed: {}; retrying in {:?}", address, e, delay);
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e.into()),
                },
            }
        }
        info!("Connected to MQTT broker {}", address);

        let cancel = CancellationToken::new();
        let driver = tokio::spawn(drive(event_loop, cancel.clone()));

        Ok(Self {
            client,
            driver: Mutex::new(Some(driver)),
            cancel,
        })
    }
}

async fn drive(mut event_loop: EventLoop, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = event_loop.poll() => match event {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    debug!("DISCONNECT sent");
                    break;
                }
                Ok(event) => trace!("MQTT event: {:?}", event),
                Err(ConnectionError::RequestsDone) => break,
                Err(e) => {
                    warn!("MQTT event loop error: {}", e);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Transport for MqttTransport {
    /// Queues without waiting; a full request queue is reported as a failed publish.
    async fn publish(
        &self,
        topic: &str,
        qos: Qos,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<()> {
        self.client.try_publish(topic, qos.into(), retain, payload)?;
        Ok(())
    }

    async fn disconnect(&self, drain_timeout: Duration) -> Result<()> {
        let Some(mut driver) = self.driver.lock().await.take() else {
            return Ok(());
        };

        // DISCONNECT is queued behind every pending publish.
        if let Err(e) = self.client.try_disconnect() {
            warn!("Could not queue DISCONNECT: {}", e);
        }

        match tokio::time::timeout(drain_timeout, &mut driver).await {
            Ok(_) => info!("Disconnected from MQTT broker"),
            Err(_) => {
                warn!("Drain did not finish within {:?}; dropping connection", drain_timeout);
                self.cancel.cancel();
                driver.abort();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const CONNECT: u8 = 1;
    const PUBLISH: u8 = 3;
    const DISCONNECT: u8 = 14;
    const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
    const CONNACK_NOT_AUTHORIZED: [u8; 4] = [0x20, 0x02, 0x00, 0x05];

    /// Reads one packet and returns its control packet type, or `None` once the peer hangs up.
    async fn read_packet_type(stream: &mut TcpStream) -> Option<u8> {
        let header = stream.read_u8().await.ok()?;
        let mut remaining = 0usize;
        let mut shift = 0;
        loop {
            let byte = stream.read_u8().await.ok()?;
            remaining |= ((byte & 0x7f) as usize) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        let mut body = vec![0; remaining];
        stream.read_exact(&mut body).await.ok()?;
        Some(header >> 4)
    }

    /// Single-connection broker: answers CONNECT with `connack` and records every
    /// packet type received afterwards until DISCONNECT or hang-up.
    async fn local_broker(connack: [u8; 4]) -> (BrokerAddress, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let broker = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            assert_eq!(read_packet_type(&mut stream).await, Some(CONNECT));
            stream.write_all(&connack).await.unwrap();

            let mut received = Vec::new();
            while let Some(packet_type) = read_packet_type(&mut stream).await {
                received.push(packet_type);
                if packet_type == DISCONNECT {
                    break;
                }
            }
            received
        });
        let address = BrokerAddress {
            host: "127.0.0.1".into(),
            port,
        };
        (address, broker)
    }

    #[test]
    fn test_broker_address_forms() {
        let address: BrokerAddress = "mqtt://localhost:1883".parse().unwrap();
        assert_eq!(address, BrokerAddress { host: "localhost".into(), port: 1883 });

        let address: BrokerAddress = "tcp://10.0.0.5:11883/".parse().unwrap();
        assert_eq!(address.host, "10.0.0.5");
        assert_eq!(address.port, 11883);

        let address: BrokerAddress = "broker.campus".parse().unwrap();
        assert_eq!(address.port, DEFAULT_PORT);
        assert_eq!(address.to_string(), "broker.campus:1883");
    }

    #[test]
    fn test_broker_address_rejects_bad_input() {
        assert!("ws://localhost:9001".parse::<BrokerAddress>().is_err());
        assert!("mqtt://localhost:notaport".parse::<BrokerAddress>().is_err());
        assert!("mqtt://:1883".parse::<BrokerAddress>().is_err());
    }

    #[tokio::test]
    async fn test_connect_gives_up_when_broker_unreachable() {
        let address = BrokerAddress {
            host: "127.0.0.1".into(),
            port: 1,
        };
        let options = ConnectOptions {
            connect_timeout: Duration::from_millis(500),
            ..ConnectOptions::default()
        };
        let result = MqttTransport::connect(&address, "lorasim-test", options).await;
        assert!(matches!(result, Err(LoraSimError::MqttConnectionError(_))));
    }

    #[tokio::test]
    async fn test_disconnect_drains_queued_publishes() {
        let (address, broker) = local_broker(CONNACK_ACCEPTED).await;
        let transport = MqttTransport::connect(&address, "lorasim-test", ConnectOptions::default())
            .await
            .unwrap();

        for n in 0..4u8 {
            transport
                .publish("application/17/node/test/rx", Qos::AtMostOnce, false, vec![n])
                .await
                .unwrap();
        }
        transport.disconnect(Duration::from_millis(250)).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), broker)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, vec![PUBLISH, PUBLISH, PUBLISH, PUBLISH, DISCONNECT]);

        // A second disconnect is a no-op.
        transport.disconnect(Duration::from_millis(250)).await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_retried() {
        let (address, broker) = local_broker(CONNACK_NOT_AUTHORIZED).await;
        let options = ConnectOptions {
            connect_timeout: Duration::from_secs(10),
            ..ConnectOptions::default()
        };

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            MqttTransport::connect(&address, "lorasim-test", options),
        )
        .await
        .unwrap();

        assert!(matches!(
            result,
            Err(LoraSimError::ConnectionRefused(
                rumqttc::ConnectReturnCode::NotAuthorized
            ))
        ));
        assert!(broker.await.unwrap().is_empty());
    }
}
