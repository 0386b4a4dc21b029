// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcProtocol {
    Http,
    Https,
    Ws,
    Wss,
}

impl RpcProtocol {
    pub fn is_websocket(&self) -> bool {
        matches!(self, RpcProtocol::Ws | RpcProtocol::Wss)
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, RpcProtocol::Https | RpcProtocol::Wss)
    }
}

/// A validated chain RPC endpoint
#[derive(Clone, Debug)]
pub struct RPC {
    protocol: RpcProtocol,
    url: Url,
}

impl RPC {
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).context("Invalid URL format")?;
        let protocol = match parsed.scheme() {
            "http" => RpcProtocol::Http,
            "https" => RpcProtocol::Https,
            "ws" => RpcProtocol::Ws,
            "wss" => RpcProtocol::Wss,
            _ => bail!("Invalid protocol. Expected: http://, https://, ws://, wss://"),
        };

        if parsed.host_str().is_none() {
            bail!("URL must contain a host");
        }

        Ok(RPC {
            protocol,
            url: parsed,
        })
    }

    pub fn protocol(&self) -> RpcProtocol {
        self.protocol
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_websocket(&self) -> bool {
        self.protocol.is_websocket()
    }

    /// The same endpoint over http(s). Batched reads go over plain requests even when a
    /// websocket url is configured.
    pub fn as_http_url(&self) -> Result<Url> {
        if !self.protocol.is_websocket() {
            return Ok(self.url.clone());
        }
        let mut parsed = self.url.clone();
        let scheme = if self.protocol.is_secure() {
            "https"
        } else {
            "http"
        };
        parsed
            .set_scheme(scheme)
            .map_err(|_| anyhow!("http(s) are valid schemes"))?;
        Ok(parsed)
    }

    /// Scheme, host and port only. Hosted providers put the project key in the path or query.
    pub fn redacted(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        let port = self.url.port().map(|p| format!(":{p}")).unwrap_or_default();
        let hidden = self.url.path() != "/"
            || self.url.query().is_some()
            || !self.url.username().is_empty()
            || self.url.password().is_some();
        if hidden {
            format!("{}://{host}{port}/<redacted>", self.url.scheme())
        } else {
            format!("{}://{host}{port}/", self.url.scheme())
        }
    }
}

/// Credentials attached to every RPC request
#[derive(Debug, Hash, Eq, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(tag = "type", content = "credentials")]
pub enum RpcAuth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer(String),
}
