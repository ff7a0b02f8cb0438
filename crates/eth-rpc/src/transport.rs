//! JSON-RPC 2.0 transports.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Result, RpcError};

/// `Send + Sync` on native targets, nothing on wasm32 where futures and
/// JS handles are single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// Sends one JSON-RPC request and returns its `result` member.
///
/// A JSON `null` result is returned as `Value::Null`; node errors come back
/// as [`RpcError::Rpc`].
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport: MaybeSendSync + fmt::Debug {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Validates an RPC endpoint. Only the syntax is checked; nothing is dialed.
pub fn parse_rpc_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| RpcError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(RpcError::InvalidUrl(format!(
            "{url}: unsupported scheme {other:?}"
        ))),
    }
}

/// JSON-RPC over HTTP(S) POST.
pub struct HttpTransport {
    url: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Uses a caller-configured `reqwest` client (timeouts, proxies, headers).
    pub fn with_client(url: &str, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            url: parse_rpc_url(url)?,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url.as_str())
            .finish()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, id, "sending JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        // Some nodes attach a JSON-RPC error body to 4xx/5xx responses.
        match decode_response(&body) {
            Ok(value) => Ok(value),
            Err(RpcError::Decode(_)) if !status.is_success() => Err(RpcError::HttpStatus {
                status: status.as_u16(),
                body,
            }),
            Err(err) => Err(err),
        }
    }
}

/// Extracts `result` from a JSON-RPC response body.
pub(crate) fn decode_response(body: &str) -> Result<Value> {
    let response: JsonRpcResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    Ok(response.result.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_chainId",
            params: json!([]),
            id: 7,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "method": "eth_chainId", "params": [], "id": 7})
        );
    }

    #[test]
    fn decode_result() {
        let value = decode_response(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#).unwrap();
        assert_eq!(value, json!("0x1"));
    }

    #[test]
    fn decode_null_result() {
        let value = decode_response(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn decode_node_error_verbatim() {
        let err = decode_response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient funds for gas * price + value","data":"0x"}}"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            RpcError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".into(),
                data: Some(json!("0x")),
            }
        );
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        assert!(matches!(
            decode_response("<html>bad gateway</html>"),
            Err(RpcError::Decode(_))
        ));
    }

    #[test]
    fn rpc_url_validation() {
        assert!(parse_rpc_url("https://eth.llamarpc.com").is_ok());
        assert!(parse_rpc_url("http://localhost:8545").is_ok());
        assert!(matches!(
            parse_rpc_url("not a url"),
            Err(RpcError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_rpc_url("ftp://example.com"),
            Err(RpcError::InvalidUrl(_))
        ));
    }

    #[test]
    fn http_transport_debug_shows_url_only() {
        let transport = HttpTransport::new("https://eth.llamarpc.com").unwrap();
        assert_eq!(transport.url().as_str(), "https://eth.llamarpc.com/");
        assert!(format!("{transport:?}").contains("eth.llamarpc.com"));
    }
}
