//! iProg SMS gateway client.
//!
//! One JSON POST per message, no retries. Callers decide what a failure means.

use crate::error::ChannelError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_IPROG_URL: &str = "https://www.iprogsms.com/api/v1/sms_messages";

/// What the gateway reported for an accepted message
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub message_id: Option<String>,
    pub body: serde_json::Value,
}

/// Anything that can push one text message to a phone number
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, phone_number: &str, message: &str)
    -> Result<DeliveryReceipt, ChannelError>;
}

/// iProg gateway settings
#[derive(Clone)]
pub struct IprogSettings {
    pub api_url: String,
    pub api_token: String,
    pub sender_id: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for IprogSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IprogSettings")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("sender_id", &self.sender_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, serde::Serialize)]
struct SmsPayload<'a> {
    api_token: &'a str,
    phone_number: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_id: Option<&'a str>,
}

pub struct IprogSmsClient {
    client: reqwest::Client,
    settings: IprogSettings,
}

impl IprogSmsClient {
    pub fn new(settings: IprogSettings) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl NotificationChannel for IprogSmsClient {
    async fn send(
        &self,
        phone_number: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let payload = SmsPayload {
            api_token: &self.settings.api_token,
            phone_number,
            message,
            sender_id: self.settings.sender_id.as_deref(),
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body: truncate_error(&body).to_string(),
            });
        }

        parse_receipt(status.as_u16(), &body)
    }
}

/// The gateway can answer HTTP 200 while reporting a failure in the body's
/// `status` field, so that field wins when present.
fn parse_receipt(http_status: u16, body: &str) -> Result<DeliveryReceipt, ChannelError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ChannelError::InvalidResponse(format!("{}: {}", e, truncate_error(body))))?;

    let status = match json.get("status").and_then(|s| s.as_u64()) {
        Some(s) => u16::try_from(s).unwrap_or(u16::MAX),
        None => http_status,
    };

    if !(200..300).contains(&status) {
        let detail = json
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| truncate_error(body).to_string());
        return Err(ChannelError::Rejected {
            status,
            body: detail,
        });
    }

    let message_id = json
        .get("message_id")
        .or_else(|| json.get("data").and_then(|d| d.get("message_id")))
        .and_then(|id| match id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Ok(DeliveryReceipt {
        status,
        message_id,
        body: json,
    })
}

fn truncate_error(s: &str) -> &str {
    match s.char_indices().nth(200) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(url: String, timeout: Duration) -> IprogSettings {
        IprogSettings {
            api_url: url,
            api_token: "test-token".to_string(),
            sender_id: Some("MedicalAlert".to_string()),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_send_posts_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sms_messages"))
            .and(body_json(serde_json::json!({
                "api_token": "test-token",
                "phone_number": "639171234567",
                "message": "Take your meds",
                "sender_id": "MedicalAlert",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 200,
                "message": "SMS successfully queued for delivery.",
                "message_id": "iSms-abc123",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = IprogSmsClient::new(settings(
            format!("{}/api/v1/sms_messages", server.uri()),
            Duration::from_secs(5),
        ))
        .unwrap();

        let receipt = client.send("639171234567", "Take your meds").await.unwrap();
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.message_id.as_deref(), Some("iSms-abc123"));
    }

    #[tokio::test]
    async fn test_sender_id_omitted_when_unset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "api_token": "test-token",
                "phone_number": "639171234567",
                "message": "hi",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 200})))
            .expect(1)
            .mount(&server)
            .await;

        let mut s = settings(server.uri(), Duration::from_secs(5));
        s.sender_id = None;
        let client = IprogSmsClient::new(s).unwrap();
        assert!(client.send("639171234567", "hi").await.is_ok());
    }

    #[tokio::test]
    async fn test_http_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api token"))
            .mount(&server)
            .await;

        let client = IprogSmsClient::new(settings(server.uri(), Duration::from_secs(5))).unwrap();
        match client.send("639171234567", "hi").await {
            Err(ChannelError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api token");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_gateway_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": 200}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client =
            IprogSmsClient::new(settings(server.uri(), Duration::from_millis(200))).unwrap();
        let result = client.send("639171234567", "hi").await;
        assert!(matches!(result, Err(ChannelError::Timeout)));
    }

    #[test]
    fn test_body_status_overrides_http_status() {
        let err = parse_receipt(200, r#"{"status":500,"message":"Insufficient credits"}"#)
            .unwrap_err();
        match err {
            ChannelError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Insufficient credits");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_is_invalid() {
        assert!(matches!(
            parse_receipt(200, "<html>ok</html>"),
            Err(ChannelError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_numeric_message_id() {
        let receipt = parse_receipt(200, r#"{"data":{"message_id":42}}"#).unwrap();
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.message_id.as_deref(), Some("42"));
    }
}
