//! Service configuration.
//!
//! Read once from the environment at startup:
//!
//! - `KATAD_HOST`: listen address, default `127.0.0.1`
//! - `KATAD_PORT`: listen port, default `3001`
//! - `KATAD_ALLOWED_ORIGIN`: CORS allowed origin, default `*`

use std::{
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use axum::http::HeaderValue;

use crate::prelude::*;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

/// Listen address and CORS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Sent as `Access-Control-Allow-Origin`. Restrict it in production.
    pub allowed_origin: HeaderValue,
}

impl Config {
    /// Create the configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = match lookup("KATAD_HOST") {
            Some(host) => host
                .parse()
                .map_err(|_| Error::Config(format!("KATAD_HOST '{host}' is not an IP address")))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = match lookup("KATAD_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| Error::Config(format!("KATAD_PORT '{port}' is not a port")))?,
            None => DEFAULT_PORT,
        };
        let origin = lookup("KATAD_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.into());
        let allowed_origin = HeaderValue::from_str(&origin).map_err(|_| {
            Error::Config(format!("KATAD_ALLOWED_ORIGIN '{origin}' is not a header value"))
        })?;

        Ok(Self {
            host,
            port,
            allowed_origin,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (allowed origin {:?})",
            self.socket_addr(),
            self.allowed_origin
        )
    }
}
