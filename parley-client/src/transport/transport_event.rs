use bytes::Bytes;

/// Events the relay socket produces for the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,

    /// Connection lost or refused. Also emitted after a local `disconnect()`.
    Disconnected(String),

    Text(String),

    /// The signaling protocol is text only; binary frames are surfaced so
    /// the receiver can log and drop them.
    Binary(Bytes),
}
