use bytes::Bytes;
use parley_core::IceCandidate;

/// Peer connection state as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events the media engine emits for the session loop.
#[derive(Debug, Clone)]
pub enum MediaEvent {
    /// A local ICE candidate was gathered and must reach the remote peer.
    LocalCandidate(IceCandidate),

    ConnectionStateChanged(ConnectionState),

    /// Payload received on the data channel.
    DataReceived(Bytes),
}
