//! Transactional email delivery.

use std::future::Future;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;

use crate::config::MailerConfig;

/// Request body of the email API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid email API key")]
    InvalidApiKey,
}

pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Client for the Resend `POST /emails` endpoint.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl ResendMailer {
    /// `Ok(None)` when no API key is configured: sending is disabled.
    pub fn from_config(config: &MailerConfig) -> Result<Option<Self>, MailError> {
        match config.api_key() {
            Some(key) => Self::with_client(reqwest::Client::new(), &config.base_url, key).map(Some),
            None => Ok(None),
        }
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
    ) -> Result<Self, MailError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| MailError::InvalidApiKey)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            endpoint: format!("{}/emails", base_url.trim_end_matches('/')),
            headers,
        })
    }
}

impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = ?email.to, "email accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let mailer =
            ResendMailer::with_client(reqwest::Client::new(), "https://mail.test/", "k").unwrap();
        assert_eq!(mailer.endpoint, "https://mail.test/emails");
    }

    #[test]
    fn missing_key_disables_the_mailer() {
        assert!(ResendMailer::from_config(&MailerConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn key_with_newline_is_rejected() {
        let err = ResendMailer::with_client(reqwest::Client::new(), "https://mail.test", "a\nb")
            .unwrap_err();
        assert!(matches!(err, MailError::InvalidApiKey));
    }
}
