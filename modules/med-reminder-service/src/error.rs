//! Error types for intake, the SMS channel, and startup configuration.

use thiserror::Error;

/// A reminder submission was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

/// An outbound SMS could not be delivered to the gateway
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("SMS gateway request failed: {0}")]
    Transport(String),
    #[error("SMS gateway timed out")]
    Timeout,
    #[error("SMS gateway error ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid SMS gateway response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ChannelError::Timeout
        } else {
            ChannelError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
