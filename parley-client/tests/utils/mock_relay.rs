use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use bytes::Bytes;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const MASTER_KEY: &str = "__master__";
const CLIENT_ID_PARAM: &str = "X-Amz-ClientId";

struct RelayInner {
    peers: DashMap<String, mpsc::UnboundedSender<Message>>,
}

/// In-process single-master relay.
///
/// Viewers connect with `X-Amz-ClientId`; everything they send is stamped
/// with `senderClientId` and forwarded to the master. The master connects
/// without a client id; its frames go to `recipientClientId`.
#[derive(Clone)]
pub struct MockRelay {
    inner: Arc<RelayInner>,
    pub addr: SocketAddr,
}

impl MockRelay {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind relay");
        let addr = listener.local_addr().expect("relay addr");

        let inner = Arc::new(RelayInner {
            peers: DashMap::new(),
        });
        let app = Router::new()
            .route("/", get(ws_handler))
            .with_state(inner.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        info!("Mock relay listening on {}", addr);
        Self { inner, addr }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/", self.addr)
    }

    pub fn has_master(&self) -> bool {
        self.inner.peers.contains_key(MASTER_KEY)
    }

    pub fn has_viewer(&self, client_id: &str) -> bool {
        self.inner.peers.contains_key(client_id)
    }

    /// Wait until the master socket is registered.
    pub async fn wait_for_master(&self, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if self.has_master() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Push a raw text frame to the master, bypassing routing.
    pub fn send_to_master(&self, text: impl Into<String>) {
        let text: String = text.into();
        self.send_raw(MASTER_KEY, Message::Text(text.into()));
    }

    pub fn send_binary_to_master(&self, data: &'static [u8]) {
        self.send_raw(MASTER_KEY, Message::Binary(Bytes::from_static(data)));
    }

    /// Close every connected socket from the relay side.
    pub fn close_all(&self) {
        for peer in self.inner.peers.iter() {
            let _ = peer.value().send(Message::Close(None));
        }
    }

    fn send_raw(&self, key: &str, msg: Message) {
        match self.inner.peers.get(key) {
            Some(peer) => {
                let _ = peer.send(msg);
            }
            None => warn!("[MockRelay] no socket for {}", key),
        }
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(relay): State<Arc<RelayInner>>,
) -> impl IntoResponse {
    let key = params
        .get(CLIENT_ID_PARAM)
        .cloned()
        .unwrap_or_else(|| MASTER_KEY.to_owned());

    ws.on_upgrade(move |socket| handle_socket(socket, key, relay))
}

async fn handle_socket(socket: WebSocket, key: String, relay: Arc<RelayInner>) {
    debug!("[MockRelay] {} connected", key);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    relay.peers.insert(key.clone(), tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = relay.clone();
        let key = key.clone();
        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => route(&relay, &key, text.as_str()),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    relay.peers.remove(&key);
    debug!("[MockRelay] {} disconnected", key);
}

fn route(relay: &RelayInner, from: &str, text: &str) {
    let mut frame = match serde_json::from_str::<Value>(text) {
        Ok(frame) if frame.is_object() => frame,
        _ => {
            warn!("[MockRelay] unparseable frame from {}", from);
            return;
        }
    };

    let target = if from == MASTER_KEY {
        match frame.get("recipientClientId").and_then(Value::as_str) {
            Some(recipient) => recipient.to_owned(),
            None => {
                warn!("[MockRelay] master frame without recipient");
                return;
            }
        }
    } else {
        frame["senderClientId"] = Value::String(from.to_owned());
        MASTER_KEY.to_owned()
    };

    match relay.peers.get(&target) {
        Some(peer) => {
            let _ = peer.send(Message::Text(frame.to_string().into()));
        }
        None => debug!("[MockRelay] dropping frame for absent {}", target),
    }
}

/// Accepts TCP connections and never answers the WebSocket upgrade.
pub struct SilentRelay {
    pub addr: SocketAddr,
    accept_task: tokio::task::JoinHandle<()>,
}

impl SilentRelay {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind silent relay");
        let addr = listener.local_addr().expect("silent relay addr");

        let accept_task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, peer)) = listener.accept().await {
                debug!("[SilentRelay] holding connection from {}", peer);
                held.push(socket);
            }
        });

        Self { addr, accept_task }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/", self.addr)
    }
}

impl Drop for SilentRelay {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
