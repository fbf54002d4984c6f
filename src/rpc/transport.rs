// Transport seam between the workflow and a node

use crate::rpc::RpcError;
use bitcoincore_rpc::jsonrpc;
use bitcoincore_rpc::RpcApi;
use serde_json::Value;
use std::time::Duration;

/// Where a node (or one of its wallets) answers RPC calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
    /// Wallet the endpoint is scoped to, `None` for the general endpoint
    pub wallet: Option<String>,
}

impl Endpoint {
    /// URL without credentials; they travel in the auth header
    pub fn url(&self) -> String {
        match &self.wallet {
            Some(name) => format!("http://{}:{}/wallet/{}", self.host, self.port, name),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    /// Derive the endpoint scoped to `name`
    pub fn for_wallet(&self, name: &str) -> Self {
        Self {
            wallet: Some(name.to_string()),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// One JSON-RPC request/response round-trip
pub trait Transport {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError>;
}

/// Opens transports for endpoints
pub trait Connect {
    type Transport: Transport;

    fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport, RpcError>;
}

/// Connects over HTTP with `bitcoincore-rpc`
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connect for HttpConnector {
    type Transport = HttpTransport;

    fn connect(&self, endpoint: &Endpoint) -> Result<HttpTransport, RpcError> {
        let transport = jsonrpc::simple_http::SimpleHttpTransport::builder()
            .url(&endpoint.url())
            .map_err(|e| RpcError::Transport(format!("Invalid RPC URL {}: {}", endpoint, e)))?
            .auth(endpoint.user.as_str(), Some(endpoint.password.as_str()))
            .timeout(endpoint.timeout)
            .build();

        log::debug!("Connected RPC client to {}", endpoint);

        Ok(HttpTransport {
            client: bitcoincore_rpc::Client::from_jsonrpc(jsonrpc::Client::with_transport(transport)),
        })
    }
}

/// HTTP transport for one endpoint
pub struct HttpTransport {
    client: bitcoincore_rpc::Client,
}

impl Transport for HttpTransport {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        log::debug!("-> {} {:?}", method, params);
        self.client
            .call::<Value>(method, params)
            .map_err(|e| map_client_error(method, e))
    }
}

fn map_client_error(method: &str, err: bitcoincore_rpc::Error) -> RpcError {
    match err {
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(e)) => RpcError::node(e.code, e.message),
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Transport(e)) => {
            if is_timeout(e.as_ref()) {
                RpcError::Timeout { method: method.to_string() }
            } else {
                RpcError::Transport(e.to_string())
            }
        }
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Json(e)) | bitcoincore_rpc::Error::Json(e) => {
            RpcError::Decode {
                method: method.to_string(),
                reason: e.to_string(),
            }
        }
        other => RpcError::Transport(other.to_string()),
    }
}

// Walk the source chain looking for a socket timeout
fn is_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(io.kind(), std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock) {
                return true;
            }
        }
        current = e.source();
    }
    false
}
