// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::config::HttpSettings;
use crate::errors::TransportError;
use crate::platform::{Delivery, Transport};

/// POSTs the JSON payload to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(settings.user_agent.clone());

        if let Some(path) = &settings.ca_cert_path {
            let pem = std::fs::read(path)
                .map_err(|e| TransportError::Tls(format!("cannot read {}: {}", path.display(), e)))?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| TransportError::Tls(e.to_string()))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| TransportError::Tls(e.to_string()))?;
        Ok(Self { client })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Http(e.to_string())
    }
}

impl Transport for HttpTransport {
    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError> {
        let mut request = self
            .client
            .post(delivery.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(delivery.payload.to_vec());
        if !delivery.credential.is_empty() {
            request = request.bearer_auth(delivery.credential);
        }

        let resp = request.send().map_err(classify)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}
