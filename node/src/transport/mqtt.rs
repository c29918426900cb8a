// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::{Duration, Instant};

use consumption_kernel::types::id::MachineId;
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};

use crate::config::MqttSettings;
use crate::errors::TransportError;
use crate::platform::{Delivery, Transport};

/// Publishes each aggregate with QoS 1 on a short-lived session and waits
/// for the broker's PUBACK.
#[derive(Debug, Clone)]
pub struct MqttTransport {
    settings: MqttSettings,
}

impl MqttTransport {
    pub fn new(settings: MqttSettings) -> Self {
        Self { settings }
    }

    pub fn topic_for(&self, machine_id: MachineId) -> String {
        format!(
            "{}/consumption/{}",
            self.settings.topic_base.trim_end_matches('/'),
            machine_id.0
        )
    }

    fn options(&self) -> MqttOptions {
        let mut opts = MqttOptions::new(
            self.settings.client_id.clone(),
            self.settings.host.clone(),
            self.settings.port,
        );
        opts.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (&self.settings.username, &self.settings.password) {
            opts.set_credentials(username, password);
        }
        opts
    }
}

impl Transport for MqttTransport {
    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError> {
        let topic = self.topic_for(delivery.machine_id);
        let (client, mut connection) = Client::new(self.options(), 10);

        client
            .publish(topic.clone(), QoS::AtLeastOnce, false, delivery.payload.to_vec())
            .map_err(|e| TransportError::Mqtt(e.to_string()))?;

        let deadline = Instant::now() + Duration::from_millis(self.settings.timeout_ms);
        let result = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break Err(TransportError::Timeout);
            }
            match connection.recv_timeout(remaining) {
                Ok(Ok(Event::Incoming(Packet::PubAck(_)))) => break Ok(()),
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => break Err(TransportError::Connect(e.to_string())),
                Err(_) => break Err(TransportError::Timeout),
            }
        };

        let _ = client.disconnect();
        if result.is_ok() {
            tracing::debug!("Published {} bytes to {}", delivery.payload.len(), topic);
        }
        result
    }
}
