//! chainclassify-rpc — read-only chain access for the classification pipeline.
//!
//! # Layers
//! - [`request`]: JSON-RPC 2.0 wire types
//! - [`transport`]: the object-safe [`RpcTransport`] trait
//! - [`http`]: a `reqwest`-backed [`HttpRpcClient`]
//! - [`client`]: the [`BlockchainClient`] capability the pipeline consumes and
//!   [`EvmRpcClient`], its implementation over any transport

pub mod client;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use client::{BlockInfo, BlockchainClient, EvmRpcClient, ReceiptInfo, TransactionInfo};
pub use error::TransportError;
pub use http::{HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use transport::RpcTransport;
