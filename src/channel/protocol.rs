//! Socket.IO v5 packet codec over Engine.IO v4 text frames.
//!
//! Every WebSocket text frame carries one Engine.IO packet. Engine.IO
//! `message` packets carry one Socket.IO packet:
//!
//! ```text
//! <type>[<namespace>,][<ack id>][<json data>]
//! 42/notifications,["notification",{"id":"n1","message":"hi"}]
//! ```
//!
//! Binary attachments are not supported.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Namespace used when a packet carries none
pub const DEFAULT_NAMESPACE: &str = "/";

/// Payload of the Engine.IO `open` packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

impl OpenHandshake {
    /// Longest silence tolerated before the server is considered gone
    pub fn heartbeat_deadline(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> AppResult<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| AppError::protocol("empty Engine.IO packet"))?;
        let body = chars.as_str();

        match kind {
            '0' => {
                let handshake = serde_json::from_str(body).map_err(|e| {
                    AppError::protocol(format!("invalid Engine.IO open payload: {}", e))
                })?;
                Ok(EnginePacket::Open(handshake))
            }
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => Ok(EnginePacket::Message(body.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(AppError::protocol(format!(
                "unknown Engine.IO packet type '{}'",
                other
            ))),
        }
    }

    /// Text frame for packets a client sends
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{}", data),
            EnginePacket::Pong(data) => format!("3{}", data),
            EnginePacket::Message(data) => format!("4{}", data),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
}

impl PacketKind {
    fn code(self) -> char {
        match self {
            PacketKind::Connect => '0',
            PacketKind::Disconnect => '1',
            PacketKind::Event => '2',
            PacketKind::Ack => '3',
            PacketKind::ConnectError => '4',
        }
    }

    fn from_code(code: char) -> AppResult<Self> {
        match code {
            '0' => Ok(PacketKind::Connect),
            '1' => Ok(PacketKind::Disconnect),
            '2' => Ok(PacketKind::Event),
            '3' => Ok(PacketKind::Ack),
            '4' => Ok(PacketKind::ConnectError),
            '5' | '6' => Err(AppError::protocol("binary Socket.IO packets are not supported")),
            other => Err(AppError::protocol(format!(
                "unknown Socket.IO packet type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: PacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    pub fn new(kind: PacketKind, namespace: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            ack_id: None,
            data,
        }
    }

    /// Namespace CONNECT carrying the auth object
    pub fn connect(namespace: &str, auth: Value) -> Self {
        Self::new(PacketKind::Connect, namespace, Some(auth))
    }

    pub fn disconnect(namespace: &str) -> Self {
        Self::new(PacketKind::Disconnect, namespace, None)
    }

    pub fn decode(payload: &str) -> AppResult<Self> {
        let mut chars = payload.chars();
        let code = chars
            .next()
            .ok_or_else(|| AppError::protocol("empty Socket.IO packet"))?;
        let kind = PacketKind::from_code(code)?;
        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            match rest.find(',') {
                Some(idx) => {
                    let ns = &rest[..idx];
                    rest = &rest[idx + 1..];
                    ns.to_string()
                }
                None => {
                    let ns = rest.to_string();
                    rest = "";
                    ns
                }
            }
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack_id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| AppError::protocol(format!("invalid ack id: {}", e)))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest).map_err(|e| {
                AppError::protocol(format!("invalid Socket.IO payload: {}", e))
            })?)
        };

        Ok(Self {
            kind,
            namespace,
            ack_id,
            data,
        })
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.code());
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Event name and first argument of an EVENT packet
    pub fn event(&self) -> Option<(&str, Option<&Value>)> {
        if self.kind != PacketKind::Event {
            return None;
        }
        let args = self.data.as_ref()?.as_array()?;
        let name = args.first()?.as_str()?;
        Some((name, args.get(1)))
    }

    /// Server-provided reason of a CONNECT_ERROR packet
    pub fn error_message(&self) -> Option<&str> {
        match self.data.as_ref()? {
            Value::String(message) => Some(message.as_str()),
            other => other.get("message")?.as_str(),
        }
    }
}
