//! Client error model and mapping helpers.
//! One flat enum covers every failure a command can surface: transport
//! problems, non-success HTTP statuses, unusable payloads, and bad local input.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientError {
    /// Connection, DNS, TLS, or timeout failure before a status was read.
    Transport { message: String },
    /// Any non-2xx response. `detail` carries the body's detail field when
    /// the server provided one, else a fixed generic message.
    Status { status: u16, detail: String },
    /// Response arrived but its shape was unusable.
    Payload { message: String },
    /// Locally detectable bad input (malformed id, unreadable file, ...).
    Input { message: String },
}

impl ClientError {
    pub fn transport<S: Into<String>>(msg: S) -> Self { ClientError::Transport { message: msg.into() } }
    pub fn status<S: Into<String>>(status: u16, detail: S) -> Self { ClientError::Status { status, detail: detail.into() } }
    pub fn payload<S: Into<String>>(msg: S) -> Self { ClientError::Payload { message: msg.into() } }
    pub fn input<S: Into<String>>(msg: S) -> Self { ClientError::Input { message: msg.into() } }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Transport { message }
            | ClientError::Payload { message }
            | ClientError::Input { message } => message.as_str(),
            ClientError::Status { detail, .. } => detail.as_str(),
        }
    }

    /// True for the one status the session layer reacts to: a rejected token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Status { status: 401, .. })
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport { message } => write!(f, "transport: {}", message),
            ClientError::Status { status, detail } => write!(f, "HTTP {}: {}", status, detail),
            ClientError::Payload { message } => write!(f, "payload: {}", message),
            ClientError::Input { message } => write!(f, "input: {}", message),
        }
    }
}

impl std::error::Error for ClientError {}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport { message: err.to_string() }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Payload { message: err.to_string() }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Input { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_probe() {
        assert!(ClientError::status(401, "no").is_unauthorized());
        assert!(!ClientError::status(403, "no").is_unauthorized());
        assert!(!ClientError::status(500, "boom").is_unauthorized());
        assert!(!ClientError::transport("refused").is_unauthorized());
    }

    #[test]
    fn display_forms() {
        assert_eq!(ClientError::status(402, "Insufficient credits. Please top up.").to_string(),
                   "HTTP 402: Insufficient credits. Please top up.");
        assert_eq!(ClientError::transport("connection refused").to_string(), "transport: connection refused");
        assert_eq!(ClientError::input("malformed batch id").to_string(), "input: malformed batch id");
    }

    #[test]
    fn message_accessor() {
        assert_eq!(ClientError::status(500, "oops").message(), "oops");
        assert_eq!(ClientError::payload("bad shape").message(), "bad shape");
    }
}
