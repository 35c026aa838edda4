// ============================================================================
// Hostel Infrastructure - HTTP SMS Gateway Client
// File: crates/hostel-infrastructure/src/notification/sms.rs
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use hostel_core::domain::DeliveryError;
use hostel_core::services::notification::SmsSender;
use hostel_shared::config::SmsSettings;
use hostel_shared::utils::mask_phone;

/// Sends text messages through a JSON-over-HTTP gateway.
pub struct HttpSmsSender {
    client: Client,
    gateway_url: String,
    api_key: String,
    sender_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsRequest<'a> {
    to: &'a str,
    message: &'a str,
    sender_id: &'a str,
}

impl HttpSmsSender {
    pub fn new(settings: &SmsSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            gateway_url: settings.gateway_url.clone(),
            api_key: settings.api_key.clone(),
            sender_id: settings.sender_id.clone(),
        })
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, phone: &str, body: &str) -> Result<(), DeliveryError> {
        if phone.trim().is_empty() {
            return Err(DeliveryError::InvalidRecipient("empty phone number".to_string()));
        }

        let request = SmsRequest {
            to: phone,
            message: body,
            sender_id: &self.sender_id,
        };

        let response = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!("SMS accepted by gateway for {}", mask_phone(phone));
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        warn!("SMS gateway returned {} for {}: {}", status, mask_phone(phone), detail);

        if status.is_client_error() {
            Err(DeliveryError::Rejected(format!("{}: {}", status, detail)))
        } else {
            Err(DeliveryError::Transport(format!("gateway returned {}", status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> SmsSettings {
        SmsSettings {
            enabled: true,
            gateway_url: format!("{}/send", server.uri()),
            api_key: "test-key".to_string(),
            sender_id: "HOSTEL".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn posts_message_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({
                "to": "+255700000001",
                "message": "Room allocated",
                "senderId": "HOSTEL"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sender = HttpSmsSender::new(&settings(&server)).unwrap();
        sender.send("+255700000001", "Room allocated").await.unwrap();
    }

    #[tokio::test]
    async fn client_errors_are_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid number"))
            .mount(&server)
            .await;

        let sender = HttpSmsSender::new(&settings(&server)).unwrap();
        let err = sender.send("+255700000001", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected(msg) if msg.contains("invalid number")));
    }

    #[tokio::test]
    async fn server_errors_are_transport_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let sender = HttpSmsSender::new(&settings(&server)).unwrap();
        let err = sender.send("+255700000001", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }

    #[tokio::test]
    async fn blank_phone_never_reaches_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sender = HttpSmsSender::new(&settings(&server)).unwrap();
        let err = sender.send("  ", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidRecipient(_)));
    }
}
