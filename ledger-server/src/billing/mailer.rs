//! Receipt dispatch
//!
//! `Mailer` is the outbound seam of the billing pipeline. Production
//! posts to an HTTP mail API; development without a gateway logs the
//! mail instead; tests script the trait.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use std::time::Duration;

use super::BillingError;

/// A document attached to an outgoing mail.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One outgoing mail, fully composed by the pipeline.
#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<(), BillingError>;
}

// =============================================================================
// HTTP mail API client
// =============================================================================

#[derive(Serialize)]
struct WireAttachment {
    filename: String,
    content_type: String,
    content_base64: String,
}

#[derive(Serialize)]
struct WireMail {
    from: String,
    to: String,
    subject: String,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<WireAttachment>,
}

/// Posts mail as JSON to a gateway endpoint, attachment base64-encoded.
/// Every call carries the configured request timeout.
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
}

impl HttpMailer {
    pub fn new(url: String, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, url }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), BillingError> {
        let wire = WireMail {
            from: mail.from.clone(),
            to: mail.to.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            attachment: mail.attachment.as_ref().map(|a| WireAttachment {
                filename: a.filename.clone(),
                content_type: a.content_type.clone(),
                content_base64: BASE64.encode(&a.bytes),
            }),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&wire)
            .send()
            .await
            .map_err(|e| BillingError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BillingError::Dispatch(format!(
                "mail API returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Logs the mail and reports success. Stands in when no mail gateway is
/// configured so receipts still get rendered and persisted.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), BillingError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            attachment = mail.attachment.as_ref().map(|a| a.filename.as_str()),
            "Mail dispatch skipped (no gateway configured)"
        );
        Ok(())
    }
}
