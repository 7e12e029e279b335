//! Client config loader (strict parsing).

pub mod schema;

use std::fs;

use cashdesk_core::error::{CashDeskError, Result};

pub use schema::{
    CashDeskConfig, CashierCredentials, ClientConfig, Headers, MIN_RECEIVE_BUFFER_BYTES,
};

pub fn load_from_file(path: &str) -> Result<CashDeskConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| CashDeskError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CashDeskConfig> {
    let cfg: CashDeskConfig = serde_yaml::from_str(s)
        .map_err(|e| CashDeskError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
