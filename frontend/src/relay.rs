//! Client side of the mail relay.
//!
//! The bundle posts a composed message to the site's own relay endpoint; the
//! relay holds the transactional-mail credential and forwards the message.

use gloo_net::http::Request;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub sender: Mailbox,
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    pub reply_to: Mailbox,
    pub headers: MessageHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageHeaders {
    #[serde(rename = "X-Mailer")]
    pub mailer: String,
}

/// Error body returned by the relay on a non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub struct RelayErrorBody {
    pub code: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RelayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("relay is misconfigured")]
    Configuration,
    #[error("sending quota exceeded")]
    QuotaExceeded,
    #[error("address rejected")]
    InvalidAddress,
    #[error("relay rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("could not encode message: {0}")]
    Encode(String),
}

impl RelayError {
    /// Classifies a failed response. An explicit `code` wins; otherwise the
    /// HTTP status decides.
    pub fn from_response(status: u16, body: RelayErrorBody) -> Self {
        match body.code.as_deref() {
            Some("configuration") => return Self::Configuration,
            Some("quota_exceeded") => return Self::QuotaExceeded,
            Some("invalid_address") => return Self::InvalidAddress,
            _ => {}
        }
        match status {
            401 | 403 => Self::Configuration,
            429 => Self::QuotaExceeded,
            422 => Self::InvalidAddress,
            _ => Self::Rejected {
                status,
                message: body
                    .error
                    .or(body.message)
                    .unwrap_or_else(|| "Failed to send email".to_string()),
            },
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration => "Server configuration error. Please contact the website administrator.",
            Self::QuotaExceeded => "Message quota exceeded. Please try again later.",
            Self::InvalidAddress => "Invalid email configuration. Please check your email address.",
            Self::Network(_) | Self::Rejected { .. } | Self::Encode(_) => {
                "Failed to send message. Please try again."
            }
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait MailRelay {
    async fn send(&self, message: &EmailMessage) -> Result<(), RelayError>;
}

/// Relay reached over HTTP with `gloo-net`.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    endpoint: String,
}

impl HttpRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }
}

impl Default for HttpRelay {
    fn default() -> Self {
        Self::new(config::mail_relay_url())
    }
}

impl MailRelay for HttpRelay {
    async fn send(&self, message: &EmailMessage) -> Result<(), RelayError> {
        let request = Request::post(&self.endpoint)
            .json(message)
            .map_err(|e| RelayError::Encode(e.to_string()))?;
        let response = request.send().await.map_err(|e| {
            error!("Email relay unreachable: {}", e);
            RelayError::Network(e.to_string())
        })?;

        if response.ok() {
            debug!("Email relay accepted message");
            return Ok(());
        }
        let status = response.status();
        let body = response.json::<RelayErrorBody>().await.unwrap_or_default();
        let err = RelayError::from_response(status, body);
        error!("Email relay failed: {}", err);
        Err(err)
    }
}
