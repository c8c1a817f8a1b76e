//! Application-wide error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote endpoint answered with a status the channel does not accept.
    #[error("{channel} request failed with HTTP status {status}: {body}")]
    HttpStatus {
        channel: &'static str,
        status: u16,
        body: String,
    },

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid mail message: {0}")]
    MailMessage(#[from] lettre::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn http_status(channel: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            channel,
            status,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message_embeds_status_and_body() {
        let err = Error::http_status("workweixin", 500, "bad");
        let message = err.to_string();
        assert!(message.contains("workweixin"));
        assert!(message.contains("500"));
        assert!(message.contains("bad"));
    }
}
