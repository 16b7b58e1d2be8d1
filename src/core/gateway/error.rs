use std::error::Error;
use std::fmt;

/// Failure of a single backend attempt. Always retried by the gateway.
#[derive(Debug)]
pub enum BackendError {
    /// Connection, TLS, timeout or body read failure.
    Transport(reqwest::Error),
    /// Non-2xx status with a one-line summary of the body.
    Status { status: u16, summary: String },
    /// 2xx body that is not a `generateContent` response.
    Decode(serde_json::Error),
    /// Well-formed response without any text.
    EmptyResponse { reason: Option<String> },
    /// Failure raised by a non-HTTP backend.
    Other(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(err) => write!(f, "request failed: {err}"),
            BackendError::Status { status, summary } => {
                write!(f, "API returned {status}: {summary}")
            }
            BackendError::Decode(err) => write!(f, "malformed API response: {err}"),
            BackendError::EmptyResponse { reason: Some(reason) } => {
                write!(f, "Empty response received from the API ({reason})")
            }
            BackendError::EmptyResponse { reason: None } => {
                write!(f, "Empty response received from the API")
            }
            BackendError::Other(message) => f.write_str(message),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BackendError::Transport(err) => Some(err),
            BackendError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err)
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err)
    }
}

/// Terminal outcome of [`ModelGateway::respond`](super::ModelGateway::respond).
#[derive(Debug)]
pub enum GatewayError {
    /// Prompt was blank; no request was made.
    EmptyPrompt,
    /// The pool holds no credentials, so no attempt could be made.
    KeysExhausted,
    /// Every credential was tried once and the last attempt failed.
    Exhausted { attempts: usize, last: BackendError },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::EmptyPrompt => f.write_str("Prompt cannot be empty"),
            GatewayError::KeysExhausted => f.write_str("All API keys exhausted"),
            GatewayError::Exhausted { last, .. } => fmt::Display::fmt(last, f),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::Exhausted { last, .. } => Some(last),
            _ => None,
        }
    }
}
