//! `{type, payload}` envelopes.
//!
//! Outbound envelopes borrow their payload and are serialized exactly once.
//! Inbound envelopes keep `payload` as `RawValue` so it is only parsed into a
//! concrete shape when a handler for `type` exists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{CashDeskError, Result};

use super::message_type::MessageType;

/// Outbound envelope (Text frame).
#[derive(Debug, Serialize)]
pub struct OutgoingEnvelope<'a, T: Serialize> {
    /// Message type (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub msg_type: &'a str,
    pub payload: &'a T,
}

/// Inbound envelope (Text frame).
#[derive(Debug, Deserialize)]
pub struct IncomingEnvelope {
    /// Message type (field name is `type` in JSON).
    #[serde(rename = "type", default)]
    pub msg_type: String,
    /// Payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

impl IncomingEnvelope {
    /// Known message type, if the discriminator is one of the registry strings.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_wire(&self.msg_type)
    }

    /// Decode the raw payload into `T`. A missing payload decodes as `null`.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        let raw = self.payload.as_deref().map(RawValue::get).unwrap_or("null");
        serde_json::from_str(raw)
    }
}

/// Serialize `{type, payload}` into the text of one frame.
pub fn encode_outgoing<T: Serialize>(msg_type: MessageType, payload: &T) -> Result<String> {
    let env = OutgoingEnvelope {
        msg_type: msg_type.as_str(),
        payload,
    };
    serde_json::to_string(&env)
        .map_err(|e| CashDeskError::Encode(format!("{msg_type} envelope: {e}")))
}

/// Decode one complete message. Fails on malformed JSON or a blank `type`.
pub fn decode_incoming(bytes: &[u8]) -> Result<IncomingEnvelope> {
    let env: IncomingEnvelope = serde_json::from_slice(bytes)
        .map_err(|e| CashDeskError::Protocol(format!("invalid envelope json: {e}")))?;
    if env.msg_type.trim().is_empty() {
        return Err(CashDeskError::Protocol("envelope type is blank".into()));
    }
    Ok(env)
}
