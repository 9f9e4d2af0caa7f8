use crate::error::TransportError;
use crate::signaling::SignalingOutput;
use crate::transport::TransportEvent;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parley_core::NegotiationMessage;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

const DISCONNECT_GRACE: Duration = Duration::from_secs(2);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One WebSocket connection to the relay. Pure I/O: frames in, frames out,
/// no retry. Whoever owns it decides what a disconnect means.
pub struct RelayTransport {
    url: String,
    connect_timeout: Duration,
    events: mpsc::Sender<TransportEvent>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl RelayTransport {
    pub fn new(url: impl Into<String>, events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            events,
            outbound: Mutex::new(None),
            driver: Mutex::new(None),
        }
    }

    /// Bounds the TCP connect plus the WebSocket upgrade.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Opens the socket. Failure is reported both as the returned error and
    /// as a [`TransportEvent::Disconnected`].
    pub async fn connect(&self) -> Result<(), TransportError> {
        let mut driver = self.driver.lock().await;
        if driver.is_some() {
            debug!("Relay transport already connected");
            return Ok(());
        }

        info!("Connecting to relay: {}", self.url);
        let attempt = tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()));
        let ws_stream = match attempt.await {
            Ok(Ok((stream, _))) => stream,
            Ok(Err(e)) => return self.connect_failed(e.to_string()).await,
            Err(_) => {
                let reason = format!("handshake timed out after {:?}", self.connect_timeout);
                return self.connect_failed(reason).await;
            }
        };

        let (mut sender, mut receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        *self.outbound.lock().await = Some(tx);

        let _ = self.events.send(TransportEvent::Connected).await;

        let events = self.events.clone();
        *driver = Some(tokio::spawn(async move {
            let mut send_task = tokio::spawn(async move {
                while let Some(msg) = rx.recv().await {
                    if let Err(e) = sender.send(msg).await {
                        return format!("send failed: {e}");
                    }
                }
                let _ = sender.close().await;
                "closed locally".to_owned()
            });

            let mut recv_task = tokio::spawn({
                let events = events.clone();
                async move {
                    while let Some(frame) = receiver.next().await {
                        match frame {
                            Ok(Message::Text(text)) => {
                                let _ = events
                                    .send(TransportEvent::Text(text.as_str().to_owned()))
                                    .await;
                            }
                            Ok(Message::Binary(data)) => {
                                let _ = events.send(TransportEvent::Binary(data)).await;
                            }
                            Ok(Message::Close(frame)) => {
                                return frame
                                    .map(|f| f.reason.as_str().to_owned())
                                    .filter(|r| !r.is_empty())
                                    .unwrap_or_else(|| "closed by relay".to_owned());
                            }
                            Ok(_) => {}
                            Err(e) => return format!("socket error: {e}"),
                        }
                    }
                    "relay stream ended".to_owned()
                }
            });

            let reason = tokio::select! {
                r = (&mut send_task) => {
                    recv_task.abort();
                    r.unwrap_or_else(|e| e.to_string())
                }
                r = (&mut recv_task) => {
                    send_task.abort();
                    r.unwrap_or_else(|e| e.to_string())
                }
            };

            info!("Relay disconnected: {}", reason);
            let _ = events.send(TransportEvent::Disconnected(reason)).await;
        }));

        Ok(())
    }

    async fn connect_failed(&self, reason: String) -> Result<(), TransportError> {
        error!("Relay connection failed: {}", reason);
        let _ = self
            .events
            .send(TransportEvent::Disconnected(reason.clone()))
            .await;
        Err(TransportError::ConnectFailed(reason))
    }

    /// Closes the socket and waits briefly for the connection tasks to end.
    pub async fn disconnect(&self) {
        if let Some(tx) = self.outbound.lock().await.take() {
            let _ = tx.send(Message::Close(None));
        }

        let Some(mut handle) = self.driver.lock().await.take() else {
            return;
        };
        if tokio::time::timeout(DISCONNECT_GRACE, &mut handle)
            .await
            .is_err()
        {
            warn!("Relay connection did not close in time, aborting");
            handle.abort();
        }
    }

    /// Queues a text frame. Never waits on the network.
    pub async fn send(&self, text: String) -> Result<(), TransportError> {
        let outbound = self.outbound.lock().await;
        let tx = outbound.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(Message::Text(text.into()))
            .map_err(|_| TransportError::NotConnected)
    }
}

#[async_trait]
impl SignalingOutput for RelayTransport {
    async fn send_message(&self, msg: NegotiationMessage) {
        let kind = msg.kind();
        let text = parley_core::encode(&msg);
        if let Err(e) = self.send(text).await {
            warn!("Dropping outgoing {}: {}", kind, e);
        }
    }
}
