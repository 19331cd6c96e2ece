//! End-to-end checks of the Socket.IO connector and channel against an
//! in-process WebSocket server speaking Engine.IO v4.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

use review_notify::channel::{
    ConnectionStatus, Connector, NotificationChannel, ReconnectPolicy, SocketIoConnector,
};
use review_notify::error::AppError;
use review_notify::notifications::{InMemoryNotificationStore, NotificationDispatcher};
use review_notify::session::Credential;

const OPEN: &str =
    r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

#[derive(Clone, Copy)]
enum Behaviour {
    Accept,
    Reject,
}

struct ServerReport {
    authorization: Option<String>,
    received: Vec<String>,
}

async fn send(ws: &mut WebSocketStream<tokio::net::TcpStream>, text: &str) {
    ws.send(Message::Text(text.to_string())).await.unwrap();
}

async fn spawn_server(behaviour: Behaviour) -> (String, JoinHandle<ServerReport>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut authorization = None;
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            authorization = request
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(response)
        };
        let mut ws = accept_hdr_async(tcp, callback).await.unwrap();

        send(&mut ws, OPEN).await;

        let mut received = Vec::new();
        let connect = ws.next().await.unwrap().unwrap().into_text().unwrap();
        received.push(connect);

        match behaviour {
            Behaviour::Reject => {
                send(&mut ws, r#"44/notifications,{"message":"Not authorized"}"#).await;
            }
            Behaviour::Accept => {
                send(&mut ws, r#"40/notifications,{"sid":"ns-1"}"#).await;
                send(&mut ws, "2").await;
                send(
                    &mut ws,
                    r#"42/notifications,["notification",{"id":"n1","message":"Ciclo encerrando","cycleId":7}]"#,
                )
                .await;
                send(&mut ws, r#"42/notifications,["presence",{"online":3}]"#).await;
                send(&mut ws, r#"42/notifications,["notification",{"message":"sem id"}]"#).await;
                send(
                    &mut ws,
                    r#"42/notifications,["notification",{"id":2,"message":"Segundo"}]"#,
                )
                .await;

                while let Some(Ok(frame)) = ws.next().await {
                    if let Message::Text(text) = frame {
                        let done = text.starts_with("41");
                        received.push(text);
                        if done {
                            break;
                        }
                    }
                }
            }
        }

        ServerReport {
            authorization,
            received,
        }
    });

    (base_url, handle)
}

fn connector(base_url: &str) -> SocketIoConnector {
    SocketIoConnector::new(base_url, "/notifications", "notification").unwrap()
}

#[tokio::test]
async fn connector_receives_events_in_order() {
    let (base_url, server) = spawn_server(Behaviour::Accept).await;
    let credential = Credential::new("jwt-123").unwrap();

    let mut stream = connector(&base_url).connect(&credential).await.unwrap();

    let first = stream.next_event().await.unwrap().unwrap();
    assert_eq!(first.id, "n1");
    assert_eq!(first.message, "Ciclo encerrando");
    assert_eq!(first.extra["cycleId"], 7);

    // The unrelated event and the payload without id are skipped
    let second = stream.next_event().await.unwrap().unwrap();
    assert_eq!(second.id, "2");
    assert_eq!(second.message, "Segundo");

    stream.close().await;
    let report = server.await.unwrap();

    assert_eq!(report.authorization.as_deref(), Some("Bearer jwt-123"));
    assert_eq!(report.received[0], r#"40/notifications,{"token":"jwt-123"}"#);
    assert!(report.received.iter().any(|f| f == "3"), "pong expected");
    assert_eq!(report.received.last().unwrap(), "41/notifications,");
}

#[tokio::test]
async fn connector_maps_connect_error_to_unauthorized() {
    let (base_url, server) = spawn_server(Behaviour::Reject).await;
    let credential = Credential::new("expired").unwrap();

    let err = match connector(&base_url).connect(&credential).await {
        Ok(_) => panic!("connect should be rejected"),
        Err(e) => e,
    };
    assert!(matches!(err, AppError::Unauthorized { .. }), "{err:?}");
    assert!(err.is_auth_failure());

    server.await.unwrap();
}

#[tokio::test]
async fn connector_reports_refused_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let credential = Credential::new("jwt").unwrap();
    let result = connector(&format!("http://{}", addr))
        .connect(&credential)
        .await;
    assert!(matches!(result, Err(AppError::Connection { .. })));
}

#[tokio::test]
async fn channel_delivers_pushed_notifications_to_store() {
    let (base_url, server) = spawn_server(Behaviour::Accept).await;
    let store = Arc::new(InMemoryNotificationStore::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(store.clone()));
    let mut bus = dispatcher.bus().subscribe();

    let channel = NotificationChannel::new(
        Arc::new(connector(&base_url)),
        dispatcher,
        Credential::new("jwt-123"),
    )
    .with_policy(ReconnectPolicy::new(
        0,
        Duration::from_millis(10),
        Duration::from_millis(10),
    ));

    assert!(channel.connect());

    let first = tokio::time::timeout(Duration::from_secs(5), bus.recv())
        .await
        .unwrap()
        .unwrap();
    let second = tokio::time::timeout(Duration::from_secs(5), bus.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!((first.id.as_str(), second.id.as_str()), ("n1", "2"));
    assert_eq!(channel.status(), ConnectionStatus::Connected);

    let stored: Vec<_> = store.list().into_iter().map(|n| n.event.id).collect();
    assert_eq!(stored, vec!["n1", "2"]);

    channel.teardown().await;
    assert_eq!(channel.status(), ConnectionStatus::Disconnected);

    let report = server.await.unwrap();
    assert_eq!(report.received.last().unwrap(), "41/notifications,");
}
