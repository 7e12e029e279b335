use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use cashdesk_core::error::{CashDeskError, Result};
use cashdesk_core::protocol::requests::CashierLoginRequest;

use crate::obs::DiagnosticSink;

/// Reassembly buffers never start smaller than this.
pub const MIN_RECEIVE_BUFFER_BYTES: usize = 4 * 1024;

const MAX_RECEIVE_BUFFER_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CashDeskConfig {
    pub version: u32,

    pub client: ClientConfig,

    /// Credentials the demo binary logs in with.
    #[serde(default)]
    pub cashier: Option<CashierCredentials>,
}

impl CashDeskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CashDeskError::UnsupportedVersion);
        }
        self.client.validate()?;
        if let Some(cashier) = &self.cashier {
            cashier.to_login_request().validate()?;
        }
        Ok(())
    }
}

/// Connection settings consumed by the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// `ws://` or `wss://` endpoint, e.g. `wss://api.example.com/ws/cashdesk`.
    pub endpoint: String,

    /// Keep-alive ping interval; 0 disables pings.
    #[serde(default = "default_keep_alive_ms")]
    pub keep_alive_ms: u64,

    #[serde(default = "default_receive_buffer_bytes")]
    pub receive_buffer_bytes: usize,

    /// Extra handshake headers (case-insensitive keys).
    #[serde(default)]
    pub headers: Headers,

    #[serde(skip)]
    pub diagnostics: Option<DiagnosticSink>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            keep_alive_ms: default_keep_alive_ms(),
            receive_buffer_bytes: default_receive_buffer_bytes(),
            headers: Headers::default(),
            diagnostics: None,
        }
    }

    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_receive_buffer(mut self, bytes: usize) -> Self {
        self.receive_buffer_bytes = bytes;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_diagnostics(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.diagnostics = Some(DiagnosticSink::new(sink));
        self
    }

    /// `None` when pings are disabled.
    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_ms > 0).then(|| Duration::from_millis(self.keep_alive_ms))
    }

    /// Configured size raised to the 4 KiB floor.
    pub fn effective_receive_buffer(&self) -> usize {
        self.receive_buffer_bytes.max(MIN_RECEIVE_BUFFER_BYTES)
    }

    pub fn validate(&self) -> Result<()> {
        let rest = self
            .endpoint
            .strip_prefix("wss://")
            .or_else(|| self.endpoint.strip_prefix("ws://"))
            .ok_or_else(|| {
                CashDeskError::Config(format!(
                    "client.endpoint must start with ws:// or wss:// (got {})",
                    self.endpoint
                ))
            })?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(CashDeskError::Config("client.endpoint has no host".into()));
        }

        if self.keep_alive_ms != 0 && !(1000..=600000).contains(&self.keep_alive_ms) {
            return Err(CashDeskError::Config(
                "client.keep_alive_ms must be 0 or between 1000 and 600000".into(),
            ));
        }
        if self.receive_buffer_bytes > MAX_RECEIVE_BUFFER_BYTES {
            return Err(CashDeskError::Config(
                "client.receive_buffer_bytes must not exceed 16 MiB".into(),
            ));
        }
        for (name, _) in self.headers.iter() {
            let valid = !name.is_empty()
                && name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
            if !valid {
                return Err(CashDeskError::Config(format!("invalid header name: {name:?}")));
            }
        }
        Ok(())
    }
}

fn default_keep_alive_ms() -> u64 {
    30000
}
fn default_receive_buffer_bytes() -> usize {
    32 * 1024
}

/// Handshake headers with case-insensitive keys.
///
/// Inserting a key that differs from an existing one only by case replaces
/// that entry; the latest spelling wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut headers = Headers::default();
        for (k, v) in map {
            headers.insert(k, v);
        }
        headers
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CashierCredentials {
    pub account_id: String,
    pub user_name: String,
    pub password: String,
}

impl CashierCredentials {
    pub fn to_login_request(&self) -> CashierLoginRequest {
        CashierLoginRequest::new(&self.account_id, &self.user_name, &self.password)
    }
}

impl fmt::Debug for CashierCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CashierCredentials")
            .field("account_id", &self.account_id)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}
