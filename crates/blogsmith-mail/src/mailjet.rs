//! Mailjet v3.1 send API transport
//!
//! Author: hephaex@gmail.com

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use blogsmith_core::{BlogError, MailConfig, Result};
use reqwest::Client;
use serde::Serialize;

use crate::{MailReceipt, Mailer, OutgoingMail};

/// Mailjet client authenticated with an API key pair
pub struct MailjetMailer {
    client: Client,
    api_url: String,
    public_key: String,
    private_key: String,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendRequest<'a> {
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Message<'a> {
    from: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    text_part: &'a str,
    #[serde(rename = "HTMLPart")]
    html_part: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<MailAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailAttachment<'a> {
    content_type: &'a str,
    filename: &'a str,
    base64_content: String,
}

impl MailjetMailer {
    /// Create a new Mailjet client
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        let defaults = MailConfig::default();
        Self {
            client: Client::new(),
            api_url: defaults.api_url,
            public_key: public_key.into(),
            private_key: private_key.into(),
            from_email: defaults.from_email,
            from_name: defaults.from_name,
        }
    }

    /// Create from config
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let (public_key, private_key) = match (&config.public_key, &config.private_key) {
            (Some(public), Some(private)) if config.is_configured() => (public, private),
            _ => {
                return Err(BlogError::Config(
                    "Mailjet API keys required (MJ_APIKEY_PUBLIC, MJ_APIKEY_PRIVATE)".to_string(),
                ))
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            public_key: public_key.clone(),
            private_key: private_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    /// Set the send endpoint
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn request_body<'a>(&'a self, mail: &'a OutgoingMail) -> SendRequest<'a> {
        SendRequest {
            messages: vec![Message {
                from: Contact {
                    email: &self.from_email,
                    name: Some(self.from_name.as_str()),
                },
                to: vec![Contact {
                    email: &mail.to,
                    name: None,
                }],
                subject: &mail.subject,
                text_part: &mail.text,
                html_part: &mail.html,
                attachments: mail
                    .attachments
                    .iter()
                    .map(|a| MailAttachment {
                        content_type: &a.content_type,
                        filename: &a.filename,
                        base64_content: STANDARD.encode(&a.data),
                    })
                    .collect(),
            }],
        }
    }
}

/// First `MessageID` reported for the first recipient
fn message_id(body: &serde_json::Value) -> Option<String> {
    let id = body
        .get("Messages")?
        .get(0)?
        .get("To")?
        .get(0)?
        .get("MessageID")?;
    match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Mailer for MailjetMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<MailReceipt> {
        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.public_key, Some(&self.private_key))
            .json(&self.request_body(mail))
            .send()
            .await
            .map_err(|e| BlogError::Mail(format!("Mailjet request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(BlogError::Mail(format!("Mailjet error ({status}): {text}")));
        }

        let body: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
        let receipt = MailReceipt {
            status: status.as_u16(),
            message_id: message_id(&body),
        };
        tracing::info!(
            to = %mail.to,
            status = receipt.status,
            message_id = ?receipt.message_id,
            "Mailjet accepted message"
        );
        Ok(receipt)
    }

    fn name(&self) -> &str {
        "mailjet"
    }
}
