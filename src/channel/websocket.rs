//! Socket.IO connector over a plain WebSocket transport.
//!
//! The client skips the HTTP long-poll phase and opens
//! `ws(s)://host/socket.io/?EIO=4&transport=websocket` directly. The bearer
//! token travels both as an `Authorization` header on the upgrade request and
//! in the namespace CONNECT auth object.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::protocol::{EnginePacket, PacketKind, SocketPacket};
use super::transport::{Connector, EventStream};
use crate::config::ChannelConfig;
use crate::error::{AppError, AppResult};
use crate::notifications::NotificationEvent;
use crate::session::Credential;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the Engine.IO WebSocket endpoint from a server base URL
pub fn socket_io_endpoint(base_url: &str) -> AppResult<Url> {
    let mut url = Url::parse(base_url).map_err(|e| AppError::Validation {
        field: "channel.url".to_string(),
        reason: format!("Invalid URL '{}': {}", base_url, e),
    })?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(AppError::Validation {
                field: "channel.url".to_string(),
                reason: format!("Unsupported scheme '{}'", other),
            });
        }
    };
    url.set_scheme(scheme).map_err(|_| AppError::Validation {
        field: "channel.url".to_string(),
        reason: format!("Cannot switch '{}' to {}", base_url, scheme),
    })?;

    let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket");

    Ok(url)
}

/// Connects to a Socket.IO namespace and yields one named event
#[derive(Debug, Clone)]
pub struct SocketIoConnector {
    endpoint: Url,
    namespace: String,
    event: String,
}

impl SocketIoConnector {
    pub fn new(
        base_url: &str,
        namespace: impl Into<String>,
        event: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            endpoint: socket_io_endpoint(base_url)?,
            namespace: namespace.into(),
            event: event.into(),
        })
    }

    pub fn from_config(config: &ChannelConfig) -> AppResult<Self> {
        Self::new(&config.url, config.namespace.clone(), config.event.clone())
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint
    }

    async fn handshake(&self, ws: &mut WsStream, credential: &Credential) -> AppResult<Duration> {
        let heartbeat = match next_engine_packet(ws).await {
            Some(Ok(EnginePacket::Open(open))) => {
                tracing::debug!(
                    sid = %open.sid,
                    ping_interval = open.ping_interval,
                    ping_timeout = open.ping_timeout,
                    "Engine.IO session opened"
                );
                open.heartbeat_deadline()
            }
            Some(Ok(other)) => {
                return Err(AppError::protocol(format!(
                    "expected Engine.IO open packet, got {:?}",
                    other
                )));
            }
            Some(Err(e)) => return Err(e),
            None => return Err(AppError::connection("closed before Engine.IO open")),
        };

        let auth = json!({ "token": credential.expose() });
        let connect = SocketPacket::connect(&self.namespace, auth);
        send_packet(ws, EnginePacket::Message(connect.encode())).await?;

        loop {
            let payload = match next_engine_packet(ws).await {
                Some(Ok(EnginePacket::Message(payload))) => payload,
                Some(Ok(EnginePacket::Ping(data))) => {
                    send_packet(ws, EnginePacket::Pong(data)).await?;
                    continue;
                }
                Some(Ok(EnginePacket::Close)) | None => {
                    return Err(AppError::connection("closed during namespace handshake"));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e),
            };

            let packet = match SocketPacket::decode(&payload) {
                Ok(packet) => packet,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed packet during handshake");
                    continue;
                }
            };
            if packet.namespace != self.namespace {
                continue;
            }

            match packet.kind {
                PacketKind::Connect => return Ok(heartbeat),
                PacketKind::ConnectError => {
                    let reason = packet.error_message().unwrap_or("connection refused");
                    return Err(if reason.contains("Invalid namespace") {
                        AppError::connection(reason)
                    } else {
                        AppError::unauthorized(reason)
                    });
                }
                _ => continue,
            }
        }
    }
}

#[async_trait]
impl Connector for SocketIoConnector {
    async fn connect(&self, credential: &Credential) -> AppResult<Box<dyn EventStream>> {
        let mut request = self.endpoint.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
            .map_err(|_| AppError::unauthorized("credential is not a valid header value"))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (mut ws, _) = connect_async(request).await?;
        let heartbeat = self.handshake(&mut ws, credential).await?;

        Ok(Box::new(SocketIoStream {
            ws,
            namespace: self.namespace.clone(),
            event: self.event.clone(),
            heartbeat,
        }))
    }

    fn endpoint(&self) -> String {
        format!("{} ({})", self.endpoint, self.namespace)
    }
}

/// Open Socket.IO namespace connection
pub struct SocketIoStream {
    ws: WsStream,
    namespace: String,
    event: String,
    heartbeat: Duration,
}

impl SocketIoStream {
    fn accept(&self, packet: SocketPacket) -> Option<NotificationEvent> {
        let (name, payload) = packet.event()?;
        if name != self.event {
            tracing::debug!(event = name, "Ignoring unrelated event");
            return None;
        }
        let Some(payload) = payload else {
            tracing::warn!(event = name, "Event arrived without payload");
            return None;
        };
        match NotificationEvent::from_payload(payload) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed notification");
                None
            }
        }
    }
}

#[async_trait]
impl EventStream for SocketIoStream {
    async fn next_event(&mut self) -> Option<AppResult<NotificationEvent>> {
        loop {
            let next = tokio::time::timeout(self.heartbeat, next_engine_packet(&mut self.ws));
            let packet = match next.await {
                Err(_) => {
                    return Some(Err(AppError::Timeout {
                        operation: "server heartbeat".to_string(),
                    }));
                }
                Ok(None) => return None,
                Ok(Some(Err(e))) => return Some(Err(e)),
                Ok(Some(Ok(packet))) => packet,
            };

            let payload = match packet {
                EnginePacket::Message(payload) => payload,
                EnginePacket::Ping(data) => {
                    if let Err(e) = send_packet(&mut self.ws, EnginePacket::Pong(data)).await {
                        return Some(Err(e));
                    }
                    continue;
                }
                EnginePacket::Close => return None,
                _ => continue,
            };

            let packet = match SocketPacket::decode(&payload) {
                Ok(packet) if packet.namespace == self.namespace => packet,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed packet");
                    continue;
                }
            };

            match packet.kind {
                PacketKind::Disconnect => return None,
                PacketKind::Event => {
                    if let Some(event) = self.accept(packet) {
                        return Some(Ok(event));
                    }
                }
                _ => {}
            }
        }
    }

    async fn close(&mut self) {
        let disconnect = SocketPacket::disconnect(&self.namespace);
        let frame = EnginePacket::Message(disconnect.encode());
        if let Err(e) = send_packet(&mut self.ws, frame).await {
            tracing::debug!(error = %e, "Disconnect packet not delivered");
        }
        if let Err(e) = self.ws.close(None).await {
            tracing::debug!(error = %e, "WebSocket close failed");
        }
    }
}

async fn send_packet(ws: &mut WsStream, packet: EnginePacket) -> AppResult<()> {
    ws.send(Message::Text(packet.encode())).await?;
    Ok(())
}

/// Next decodable Engine.IO packet, `None` once the socket is closed
async fn next_engine_packet(ws: &mut WsStream) -> Option<AppResult<EnginePacket>> {
    while let Some(frame) = ws.next().await {
        match frame {
            Ok(Message::Text(text)) => match EnginePacket::decode(&text) {
                Ok(packet) => return Some(Ok(packet)),
                Err(e) => tracing::warn!(error = %e, "Ignoring malformed frame"),
            },
            Ok(Message::Close(_)) => return None,
            Ok(Message::Binary(_)) => {
                tracing::warn!("Ignoring binary frame");
            }
            Ok(_) => {}
            Err(e) => return Some(Err(e.into())),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_http() {
        let url = socket_io_endpoint("http://localhost:3000").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3000/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let url = socket_io_endpoint("https://review.example.com/api/").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://review.example.com/api/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn test_endpoint_rejects_other_schemes() {
        assert!(socket_io_endpoint("ftp://review.example.com").is_err());
        assert!(socket_io_endpoint("localhost:3000").is_err());
    }

    #[test]
    fn test_connector_from_config() {
        let connector = SocketIoConnector::from_config(&ChannelConfig::default()).unwrap();
        assert_eq!(
            connector.endpoint(),
            "ws://localhost:3000/socket.io/?EIO=4&transport=websocket (/notifications)"
        );
    }
}
