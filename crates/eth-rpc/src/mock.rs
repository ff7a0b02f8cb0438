//! Scripted in-memory transport for tests.
//!
//! Responses are queued per method. Each call consumes the front of the
//! queue, except that the last queued response is repeated for any further
//! calls. Unscripted methods fail with JSON-RPC code `-32601`.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Result, RpcError};
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful `result` for `method`.
    pub fn push_result(&self, method: &str, result: Value) -> &Self {
        self.push(method, Ok(result))
    }

    /// Queues a node error for `method`.
    pub fn push_error(&self, method: &str, error: RpcError) -> &Self {
        self.push(method, Err(error))
    }

    fn push(&self, method: &str, response: Result<Value>) -> &Self {
        self.responses
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Every `(method, params)` pair seen so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    /// Method names in call order.
    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Params of each call to `method`, in order.
    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == method).count()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Transport for MockTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.calls.lock().push((method.to_string(), params));

        let mut responses = self.responses.lock();
        let queue = responses.get_mut(method).filter(|q| !q.is_empty());
        match queue {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(RpcError::Decode("empty mock queue".into()))),
            Some(queue) => queue[0].clone(),
            None => Err(RpcError::Rpc {
                code: -32601,
                message: format!("the method {method} does not exist/is not available"),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn last_response_repeats() {
        let mock = MockTransport::new();
        mock.push_result("eth_chainId", json!("0x1"))
            .push_result("eth_chainId", json!("0x2"));

        assert_eq!(mock.request("eth_chainId", json!([])).await.unwrap(), json!("0x1"));
        assert_eq!(mock.request("eth_chainId", json!([])).await.unwrap(), json!("0x2"));
        assert_eq!(mock.request("eth_chainId", json!([])).await.unwrap(), json!("0x2"));
        assert_eq!(mock.call_count("eth_chainId"), 3);
    }

    #[tokio::test]
    async fn unscripted_method_is_not_found() {
        let mock = MockTransport::new();
        let err = mock.request("eth_foo", json!([])).await.unwrap_err();
        assert_eq!(err.code(), Some(-32601));
    }

    #[tokio::test]
    async fn errors_and_calls_are_recorded() {
        let mock = MockTransport::new();
        mock.push_error(
            "eth_sendRawTransaction",
            RpcError::Rpc {
                code: -32000,
                message: "nonce too low".into(),
                data: None,
            },
        );

        let err = mock
            .request("eth_sendRawTransaction", json!(["0x02"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nonce too low"));
        assert_eq!(mock.methods(), vec!["eth_sendRawTransaction".to_string()]);
        assert_eq!(mock.params_of("eth_sendRawTransaction"), vec![json!(["0x02"])]);
    }
}
