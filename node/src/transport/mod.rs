// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod http;
pub mod mqtt;

use crate::config::TransportConfig;
use crate::errors::TransportError;
use crate::platform::Transport;

pub use http::HttpTransport;
pub use mqtt::MqttTransport;

/// Builds the transport named by `config`. `TransportConfig::None` yields
/// no transport at all.
pub fn from_config(config: &TransportConfig) -> Result<Option<Box<dyn Transport>>, TransportError> {
    let transport: Box<dyn Transport> = match config {
        TransportConfig::None => return Ok(None),
        TransportConfig::Https(settings) => Box::new(HttpTransport::new(settings)?),
        TransportConfig::Mqtt(settings) => Box::new(MqttTransport::new(settings.clone())),
    };
    Ok(Some(transport))
}
