// Chain bindings over Ethereum JSON-RPC

pub mod rpc;

pub use rpc::{JsonRpcBindings, JsonRpcTokenContract};
