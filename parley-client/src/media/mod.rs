mod media_config;
mod media_event;
mod webrtc_engine;

pub use media_config::*;
pub use media_event::*;
pub use webrtc_engine::*;

use crate::error::MediaEngineError;
use async_trait::async_trait;
use parley_core::{IceCandidate, IceServerConfig, Role, SdpKind};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The single peer connection of a call, as seen by negotiation.
///
/// Asynchronous notifications (local candidates, state changes, inbound
/// data) are not callbacks on this trait: the engine pushes [`MediaEvent`]s
/// into the channel it was created with.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    async fn create_offer(&self) -> Result<String, MediaEngineError>;

    async fn create_answer(&self) -> Result<String, MediaEngineError>;

    async fn set_local_description(&self, kind: SdpKind, sdp: String)
    -> Result<(), MediaEngineError>;

    async fn set_remote_description(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), MediaEngineError>;

    /// Re-adding a candidate that is already applied must be harmless.
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), MediaEngineError>;

    async fn close(&self) -> Result<(), MediaEngineError>;
}

/// Builds the media engine for one call once the channel's ICE servers are known.
#[async_trait]
pub trait MediaEngineFactory: Send + Sync {
    async fn create(
        &self,
        role: Role,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<MediaEvent>,
    ) -> Result<Arc<dyn MediaEngine>, MediaEngineError>;
}
