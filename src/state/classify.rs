//! Closed classification tables
//!
//! Status codes and transport failures are looked up in fixed tables.
//! A status code missing from the table is an error, not a default.

use crate::ScanError;
use serde::Serialize;
use std::fmt;

/// Terminal outcome of a verified link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Redirect,
    ClientError,
    ServerError,
    TransportFailure,
}

impl Outcome {
    /// Returns true for outcomes that indicate a broken link
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ClientError | Self::ServerError | Self::TransportFailure
        )
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Redirect => "redirect",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::TransportFailure => "transport_failure",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "redirect" => Some(Self::Redirect),
            "client_error" => Some(Self::ClientError),
            "server_error" => Some(Self::ServerError),
            "transport_failure" => Some(Self::TransportFailure),
            _ => None,
        }
    }

    /// Returns all outcomes, in report order
    pub fn all() -> [Self; 5] {
        [
            Self::Success,
            Self::Redirect,
            Self::ClientError,
            Self::ServerError,
            Self::TransportFailure,
        ]
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Transport failures the verification phase knows how to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Tls,
    InvalidUrl,
    Connect,
    UnreadableResponse,
    ConnectTimeout,
    ReadTimeout,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Tls => "ERR: SSL Error",
            Self::InvalidUrl => "ERR: URL Invalid",
            Self::Connect => "ERR: Couldn't connect",
            Self::UnreadableResponse => "ERR: Unreadable response",
            Self::ConnectTimeout => "ERR: Timed out",
            Self::ReadTimeout => "ERR: Read timed out",
        }
    }
}

/// A classified verification result, ready to be applied to scan results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    pub status_code: Option<u16>,
    pub message: String,
    /// URL the link resolved to, when it redirected
    pub final_url: Option<String>,
    pub critical: bool,
}

/// Classifies an HTTP status code
///
/// `target` is the URL the request finally resolved to; redirect messages
/// name it.
///
/// # Errors
///
/// [`ScanError::UnknownDictEntry`] for any code outside the table.
pub fn classify_status(status_code: u16, target: &str) -> crate::Result<Classification> {
    let (outcome, message) = match status_code {
        200 => (Outcome::Success, "OK: All Good!".to_string()),
        201 => (Outcome::Success, "OK: Created".to_string()),
        202 => (Outcome::Success, "OK: Accepted".to_string()),
        301 => (Outcome::Redirect, format!("WRN: Moved permanently to {}", target)),
        302 => (Outcome::Redirect, format!("WRN: Redirected to {}", target)),
        400 => (Outcome::ClientError, "ERR: Bad Request".to_string()),
        401 => (Outcome::ClientError, "ERR: Unauthorized".to_string()),
        403 => (Outcome::ClientError, "ERR: Forbidden".to_string()),
        404 => (Outcome::ClientError, "ERR: Not Found".to_string()),
        405 => (Outcome::ClientError, "ERR: GET not allowed".to_string()),
        406 => (Outcome::ClientError, "ERR: Unacceptable request".to_string()),
        429 => (Outcome::ClientError, "CRIT: Too many requests".to_string()),
        500 => (Outcome::ServerError, "ERR: Internal Server Error".to_string()),
        502 => (Outcome::ServerError, "ERR: Bad Gateway".to_string()),
        503 => (Outcome::ServerError, "ERR: Service Unavailable".to_string()),
        other => {
            return Err(ScanError::UnknownDictEntry(format!(
                "HTTP status code {}",
                other
            )))
        }
    };

    Ok(Classification {
        outcome,
        status_code: Some(status_code),
        message,
        final_url: None,
        critical: status_code == 429,
    })
}

/// Classifies a transport failure
pub fn classify_failure(kind: FailureKind) -> Classification {
    Classification {
        outcome: Outcome::TransportFailure,
        status_code: None,
        message: kind.message().to_string(),
        final_url: None,
        critical: false,
    }
}
