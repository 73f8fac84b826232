//! Welcome-email dispatch on first-time activation.
//!
//! Sends via the Resend API. Delivery is fire-and-forget: the send runs on
//! a spawned task so mail-provider latency never sits on the redemption
//! critical path, and failures are logged, never surfaced to the caller.
//! No retries; a lost welcome email is acceptable.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Outcome of a send attempt, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// No API key configured, or the identity is not an email address.
    Skipped,
}

#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
    html: String,
}

pub struct Mailer {
    api_key: Option<String>,
    from_email: String,
    http_client: Client,
}

impl Mailer {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            http_client: Client::new(),
        }
    }

    /// Queue a welcome email for a freshly activated identity. Returns
    /// immediately; the actual send happens on a background task.
    pub fn spawn_welcome(
        self: &Arc<Self>,
        identity: String,
        display_name: Option<String>,
        license_key: String,
    ) {
        // IP-bound licenses have nothing to mail.
        if !identity.contains('@') {
            tracing::debug!(identity = %identity, "Identity is not an email, skipping welcome mail");
            return;
        }

        let mailer = Arc::clone(self);
        tokio::spawn(async move {
            match mailer
                .send_welcome(&identity, display_name.as_deref(), &license_key)
                .await
            {
                Ok(SendOutcome::Sent) => {
                    tracing::info!(to = %identity, "Welcome email sent");
                }
                Ok(SendOutcome::Skipped) => {}
                Err(e) => {
                    tracing::error!(to = %identity, error = %e, "Welcome email failed");
                }
            }
        });
    }

    async fn send_welcome(
        &self,
        to_email: &str,
        display_name: Option<&str>,
        license_key: &str,
    ) -> Result<SendOutcome, reqwest::Error> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("No Resend API key configured, skipping welcome email");
            return Ok(SendOutcome::Skipped);
        };

        let name = display_name.unwrap_or("there");
        let subject = "Your ebook license is active".to_string();
        let text = format!(
            "Hi {}!\n\nThanks for registering. Your license key is: {}\n\nKeep it somewhere safe; you will need it to access the ebook from a new device.\n\nIf you have any questions, just reply to this email.",
            name, license_key
        );
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
<h2 style="color: #0056b3;">Hi {}!</h2>
<p>Thanks for registering. Your license key is:</p>
<p style="background: #f5f5f5; padding: 12px; border-radius: 6px; text-align: center;"><strong>{}</strong></p>
<p>Keep it somewhere safe; you will need it to access the ebook from a new device.</p>
<p>If you have any questions, just reply to this email.</p>
</div>"#,
            name, license_key
        );

        let request = ResendEmailRequest {
            from: &self.from_email,
            to: vec![to_email],
            subject,
            text,
            html,
        };

        let response = self
            .http_client
            .post(RESEND_API_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        if let Err(e) = response.error_for_status_ref() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(error = %e, body = %body, "Resend API rejected welcome email");
            return Err(e);
        }

        Ok(SendOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_skips_without_error() {
        let mailer = Mailer::new(None, "licenses@localhost".into());
        let outcome = mailer
            .send_welcome("alice@x.com", Some("Alice"), "KEY-1")
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Skipped);
    }
}
