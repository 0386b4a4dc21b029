// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::{
        http::{
            reqwest::{
                header::{HeaderMap, HeaderValue, AUTHORIZATION},
                Client,
            },
            Http,
        },
        ws::{WebSocketConfig, WsConnect},
        Authorization,
    },
};
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use tracing::{debug, info};
use whales_config::{ChainConfig, RpcAuth, RPC};

/// Large enough for an aggregated call over a full balance batch
const MAX_WS_MESSAGE: usize = 16 * 1024 * 1024;

pub trait AuthConversions {
    fn to_header_value(&self) -> Option<HeaderValue>;
    fn to_ws_auth(&self) -> Option<Authorization>;
}

impl AuthConversions for RpcAuth {
    fn to_header_value(&self) -> Option<HeaderValue> {
        let value = match self {
            RpcAuth::None => return None,
            RpcAuth::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            RpcAuth::Bearer(token) => format!("Bearer {token}"),
        };
        HeaderValue::from_str(&value).ok()
    }

    fn to_ws_auth(&self) -> Option<Authorization> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => Some(Authorization::basic(username, password)),
            RpcAuth::Bearer(token) => Some(Authorization::bearer(token)),
        }
    }
}

/// A read-only provider that answered for the expected chain
#[derive(Clone)]
pub struct EthProvider<P> {
    provider: Arc<P>,
    chain_id: u64,
}

impl<P: Provider + Clone> EthProvider<P> {
    /// Wrap `provider` after checking it serves `expected_chain_id`. Balances and bytecode
    /// from one chain cannot be paired with logs searched on another.
    pub async fn verified(provider: P, expected_chain_id: u64) -> Result<Self> {
        let chain_id = provider
            .get_chain_id()
            .await
            .context("RPC endpoint did not answer eth_chainId")?;
        if chain_id != expected_chain_id {
            bail!(
                "RPC endpoint serves chain {chain_id} but `chain.chain_id` is {expected_chain_id}"
            );
        }
        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Handle shared between the pipeline stages
    pub fn shared(&self) -> Arc<P> {
        Arc::clone(&self.provider)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Everything needed to open a connection to the configured chain
pub struct ProviderConfig {
    rpc: RPC,
    auth: RpcAuth,
    chain_id: u64,
}

impl ProviderConfig {
    pub fn new(rpc: RPC, auth: RpcAuth, chain_id: u64) -> Self {
        Self {
            rpc,
            auth,
            chain_id,
        }
    }

    pub fn from_chain(chain: &ChainConfig) -> Result<Self> {
        Ok(Self::new(
            chain.rpc()?,
            chain.rpc_auth.clone(),
            chain.chain_id,
        ))
    }

    pub async fn create_readonly_provider(&self) -> Result<EthProvider<impl Provider + Clone>> {
        debug!(websocket = self.rpc.is_websocket(), "Connecting to RPC");
        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .connect_ws(self.ws_connect())
                .await
                .with_context(|| format!("Could not open websocket to {}", self.rpc.url()))?
        } else {
            ProviderBuilder::new().connect_client(self.http_client()?)
        };

        let provider = EthProvider::verified(provider, self.chain_id).await?;
        info!(chain_id = provider.chain_id(), "Connected to chain");
        Ok(provider)
    }

    fn ws_connect(&self) -> WsConnect {
        let config = WebSocketConfig::default()
            .max_frame_size(Some(MAX_WS_MESSAGE))
            .max_message_size(Some(MAX_WS_MESSAGE));

        let connect = WsConnect::new(self.rpc.url().as_str()).with_config(config);
        match self.auth.to_ws_auth() {
            Some(auth) => connect.with_auth(auth),
            None => connect,
        }
    }

    fn http_client(&self) -> Result<RpcClient> {
        let mut headers = HeaderMap::new();
        if let Some(value) = self.auth.to_header_value() {
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(RpcClient::new(
            Http::with_client(client, self.rpc.as_http_url()?),
            false,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_values() {
        assert!(RpcAuth::None.to_header_value().is_none());

        let basic = RpcAuth::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(
            basic.to_header_value(),
            Some(HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        );

        let bearer = RpcAuth::Bearer("token".to_string());
        assert_eq!(
            bearer.to_header_value(),
            Some(HeaderValue::from_static("Bearer token"))
        );
    }

    #[test]
    fn test_ws_auth() {
        assert!(RpcAuth::None.to_ws_auth().is_none());
        assert!(RpcAuth::Bearer("token".to_string()).to_ws_auth().is_some());
    }

    #[test]
    fn test_from_chain_requires_rpc_url() {
        assert!(ProviderConfig::from_chain(&ChainConfig::default()).is_err());

        let chain = ChainConfig {
            rpc_url: "wss://polygon.example/ws".to_string(),
            ..ChainConfig::default()
        };
        assert!(ProviderConfig::from_chain(&chain).is_ok());
    }
}
