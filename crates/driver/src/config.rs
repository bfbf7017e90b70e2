use std::env;
use std::time::Duration;

use url::Url;

use crate::error::DriverError;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Full URL that replaces host/port/path when set.
    pub endpoint_override: Option<String>,
    pub session_timeout: Duration,
    pub close_grace: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            path: "/ws".to_string(),
            endpoint_override: None,
            session_timeout: Duration::from_secs(5),
            close_grace: Duration::from_millis(1000),
        }
    }
}

impl DriverConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = DriverConfig::default();

        if let Some(v) = lookup("DASH_WS_HOST") {
            if !v.is_empty() {
                cfg.host = v;
            }
        }
        if let Some(v) = lookup("DASH_WS_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                cfg.port = p;
            }
        }
        if let Some(v) = lookup("DASH_WS_PATH") {
            if !v.is_empty() {
                cfg.path = v;
            }
        }
        if let Some(v) = lookup("DASH_WS_TIMEOUT_SECS") {
            if let Ok(s) = v.parse::<u64>() {
                cfg.session_timeout = Duration::from_secs(s);
            }
        }
        if let Some(v) = lookup("DASH_WS_CLOSE_GRACE_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                cfg.close_grace = Duration::from_millis(ms);
            }
        }

        cfg
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_override = Some(url.into());
        self
    }

    pub fn endpoint(&self) -> Result<Url, DriverError> {
        let raw = match &self.endpoint_override {
            Some(url) => url.clone(),
            None if self.path.starts_with('/') => format!("ws://{}:{}{}", self.host, self.port, self.path),
            None => format!("ws://{}:{}/{}", self.host, self.port, self.path),
        };
        let url = Url::parse(&raw).map_err(|e| DriverError::InvalidEndpoint {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(DriverError::InvalidEndpoint {
                url: raw,
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(DriverError::InvalidEndpoint { url: raw, reason: "missing host".to_string() });
        }
        Ok(url)
    }
}
