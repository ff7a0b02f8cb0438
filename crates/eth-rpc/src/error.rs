use serde_json::Value;
use thiserror::Error;

/// JSON-RPC client errors.
///
/// Node-side errors keep the `code`, `message` and `data` exactly as the
/// node returned them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),
}

impl RpcError {
    /// JSON-RPC error code, when the node returned one.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rpc_error_keeps_node_message() {
        let err = RpcError::Rpc {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
            data: None,
        };
        assert_eq!(
            err.to_string(),
            "RPC error -32000: insufficient funds for gas * price + value"
        );
        assert_eq!(err.code(), Some(-32000));
    }

    #[test]
    fn display_transport_and_status() {
        assert_eq!(
            RpcError::Transport("connection refused".into()).to_string(),
            "transport error: connection refused"
        );
        let status = RpcError::HttpStatus {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(status.to_string(), "HTTP status 429: rate limited");
        assert_eq!(status.code(), None);
    }

    #[test]
    fn serde_errors_become_decode() {
        let err: RpcError = serde_json::from_str::<u64>("\"x\"").unwrap_err().into();
        assert!(matches!(err, RpcError::Decode(_)));
    }
}
