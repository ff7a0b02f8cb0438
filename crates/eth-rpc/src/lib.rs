//! Minimal Ethereum JSON-RPC client.
//!
//! A [`Transport`] moves JSON-RPC 2.0 envelopes; [`Provider`] layers the typed
//! `eth_*` methods the wallet needs on top of it. The HTTP transport runs on
//! `reqwest`, which uses `fetch` when compiled to wasm32.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
pub mod quantity;
pub mod transport;
pub mod types;

pub use error::RpcError;
pub use provider::Provider;
pub use transport::{parse_rpc_url, HttpTransport, Transport};
pub use types::{Block, BlockNumberOrTag, CallRequest, Log, LogFilter, TransactionReceipt};
