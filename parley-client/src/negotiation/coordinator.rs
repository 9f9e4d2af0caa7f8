//! Per-call negotiation state.
//!
//! Two sources feed the coordinator concurrently: messages decoded from the
//! relay, and the media engine's local events. Every operation runs under one
//! lock over [`CoordinatorState`], so a candidate that races with
//! finalization is either buffered before the drain or applied after it,
//! never both and never neither.

use crate::error::{NegotiationError, ProtocolViolation};
use crate::media::MediaEngine;
use crate::negotiation::PeerState;
use crate::signaling::SignalingOutput;
use parley_core::{IceCandidate, NegotiationMessage, PeerIdentity, Role, SdpKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Default)]
struct CoordinatorState {
    /// Remote participant the call negotiates with. First writer wins.
    remote_identity: Option<PeerIdentity>,
    /// Identities bound to the call's peer connection.
    active: HashMap<PeerIdentity, Arc<dyn MediaEngine>>,
    /// Candidates that arrived before their identity was finalized.
    pending: HashMap<PeerIdentity, HashSet<IceCandidate>>,
    /// Candidates with no sender that arrived before any remote identity.
    unattributed: HashSet<IceCandidate>,
    awaiting_since: HashMap<PeerIdentity, Instant>,
    shut_down: bool,
}

impl CoordinatorState {
    /// Records the call's remote identity and hands it every candidate that
    /// could not be attributed so far.
    fn bind_remote(&mut self, remote: PeerIdentity) {
        if !self.unattributed.is_empty() {
            debug!(
                "Attributing {} early candidates to {}",
                self.unattributed.len(),
                remote
            );
            let early = std::mem::take(&mut self.unattributed);
            self.pending.entry(remote.clone()).or_default().extend(early);
        }
        self.remote_identity = Some(remote);
    }

    fn mark_awaiting(&mut self, identity: &PeerIdentity) {
        if !self.active.contains_key(identity) {
            self.awaiting_since
                .entry(identity.clone())
                .or_insert_with(Instant::now);
        }
    }
}

pub struct NegotiationCoordinator {
    role: Role,
    self_identity: PeerIdentity,
    engine: Arc<dyn MediaEngine>,
    output: Arc<dyn SignalingOutput>,
    state: Mutex<CoordinatorState>,
}

impl NegotiationCoordinator {
    pub fn new(
        role: Role,
        self_identity: PeerIdentity,
        engine: Arc<dyn MediaEngine>,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            role,
            self_identity,
            engine,
            output,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Pre-sets the remote identity. A viewer uses this for its master, whose
    /// client id the relay never reveals.
    pub fn with_remote_identity(mut self, remote: PeerIdentity) -> Self {
        self.state.get_mut().bind_remote(remote);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// A local description has been created and set on the engine.
    ///
    /// A viewer sends it as an offer to the master. A master sends it as an
    /// answer to the remote identity and then finalizes that identity.
    pub async fn on_local_description_ready(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), NegotiationError> {
        let mut state = self.state.lock().await;
        if state.shut_down {
            return Err(NegotiationError::ShutDown);
        }

        match (self.role, kind) {
            (Role::Viewer, SdpKind::Offer) => {
                info!("Sending offer as {}", self.self_identity);
                if let Some(remote) = state.remote_identity.clone() {
                    state.mark_awaiting(&remote);
                }
                self.output
                    .send_message(NegotiationMessage::Offer {
                        sdp,
                        sender_id: self.self_identity.clone(),
                    })
                    .await;
                Ok(())
            }
            (Role::Master, SdpKind::Answer) => self.send_answer(&mut state, sdp).await,
            (role, kind) => Err(ProtocolViolation::UnexpectedDescription { role, kind }.into()),
        }
    }

    /// Applies one decoded relay message.
    ///
    /// Errors are scoped to this message; the coordinator stays usable except
    /// after [`NegotiationError::Media`], which the owner treats as a failed call.
    pub async fn on_remote_message(&self, msg: NegotiationMessage) -> Result<(), NegotiationError> {
        let mut state = self.state.lock().await;
        if state.shut_down {
            debug!("Discarding {} after shutdown", msg.kind());
            return Err(NegotiationError::ShutDown);
        }

        match msg {
            NegotiationMessage::Offer { sdp, sender_id } => {
                if self.role != Role::Master {
                    return Err(ProtocolViolation::UnexpectedMessage("offer").into());
                }

                match state.remote_identity.clone() {
                    None => {
                        info!("Received offer from {}", sender_id);
                        state.bind_remote(sender_id.clone());
                    }
                    // The call belongs to the first offerer.
                    Some(active) if active != sender_id => {
                        return Err(ProtocolViolation::ForeignOffer {
                            sender: sender_id,
                            active,
                        }
                        .into());
                    }
                    Some(_) => info!("Received repeated offer from {}", sender_id),
                }
                state.mark_awaiting(&sender_id);

                self.engine
                    .set_remote_description(SdpKind::Offer, sdp)
                    .await?;
                let answer = self.engine.create_answer().await?;
                self.engine
                    .set_local_description(SdpKind::Answer, answer.clone())
                    .await?;

                self.send_answer(&mut state, answer).await
            }

            NegotiationMessage::Answer { sdp, .. } => {
                if self.role != Role::Viewer {
                    return Err(ProtocolViolation::UnexpectedMessage("answer").into());
                }
                let remote = state
                    .remote_identity
                    .clone()
                    .ok_or(ProtocolViolation::NoRemoteIdentity("answer"))?;

                info!("Received answer from {}", remote);
                state.mark_awaiting(&remote);
                self.engine
                    .set_remote_description(SdpKind::Answer, sdp)
                    .await?;

                self.finalize_locked(&mut state, remote).await;
                Ok(())
            }

            NegotiationMessage::Candidate {
                candidate,
                sender_id,
                ..
            } => {
                // A viewer has a single counterpart; a master keys by sender.
                let identity = match self.role {
                    Role::Master => sender_id
                        .filter(|id| !id.is_empty())
                        .or_else(|| state.remote_identity.clone()),
                    Role::Viewer => state.remote_identity.clone(),
                };

                match identity {
                    Some(identity) => self.submit_locked(&mut state, identity, candidate).await,
                    None => {
                        debug!("Holding candidate until the remote identity is known");
                        state.unattributed.insert(candidate);
                    }
                }
                Ok(())
            }
        }
    }

    /// Applies `candidate` now if `identity` is finalized, otherwise buffers it.
    pub async fn submit_candidate(&self, identity: PeerIdentity, candidate: IceCandidate) {
        let mut state = self.state.lock().await;
        if state.shut_down {
            debug!("Discarding candidate for {} after shutdown", identity);
            return;
        }
        self.submit_locked(&mut state, identity, candidate).await;
    }

    /// Binds `identity` to the peer connection and drains its buffered
    /// candidates. Idempotent.
    pub async fn finalize_peer_connection(&self, identity: PeerIdentity) {
        let mut state = self.state.lock().await;
        if state.shut_down {
            return;
        }
        self.finalize_locked(&mut state, identity).await;
    }

    /// Routes a locally gathered candidate to the remote identity.
    pub async fn on_local_candidate_generated(
        &self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        let state = self.state.lock().await;
        if state.shut_down {
            return Err(NegotiationError::ShutDown);
        }

        let Some(remote) = state.remote_identity.clone() else {
            warn!("Dropping local candidate: no remote identity known yet");
            return Err(ProtocolViolation::NoRemoteIdentity("local candidate").into());
        };

        let msg = match self.role {
            Role::Master => NegotiationMessage::Candidate {
                candidate,
                is_master: true,
                recipient_id: Some(remote),
                sender_id: Some(self.self_identity.clone()),
            },
            Role::Viewer => NegotiationMessage::Candidate {
                candidate,
                is_master: false,
                recipient_id: None,
                sender_id: Some(self.self_identity.clone()),
            },
        };
        self.output.send_message(msg).await;
        Ok(())
    }

    /// Drops all negotiation state and closes the peer connection. Every
    /// later call is a no-op.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if state.shut_down {
            return;
        }

        state.shut_down = true;
        state.remote_identity = None;
        state.active.clear();
        state.pending.clear();
        state.unattributed.clear();
        state.awaiting_since.clear();

        info!("Negotiation coordinator shut down");
        if let Err(e) = self.engine.close().await {
            warn!("Failed to close peer connection: {}", e);
        }
    }

    pub async fn peer_state(&self, identity: &PeerIdentity) -> PeerState {
        let state = self.state.lock().await;
        if state.active.contains_key(identity) {
            PeerState::Finalized
        } else if state.awaiting_since.contains_key(identity) {
            PeerState::AwaitingFinalize
        } else {
            PeerState::Unknown
        }
    }

    pub async fn remote_identity(&self) -> Option<PeerIdentity> {
        self.state.lock().await.remote_identity.clone()
    }

    pub async fn pending_candidates(&self, identity: &PeerIdentity) -> usize {
        self.state
            .lock()
            .await
            .pending
            .get(identity)
            .map_or(0, HashSet::len)
    }

    /// Candidates held back because no remote identity was known yet.
    pub async fn unattributed_candidates(&self) -> usize {
        self.state.lock().await.unattributed.len()
    }

    pub async fn is_shut_down(&self) -> bool {
        self.state.lock().await.shut_down
    }

    /// The remote identity, if it has been awaiting finalization for longer
    /// than `timeout`.
    pub async fn stalled_remote(&self, timeout: Duration) -> Option<PeerIdentity> {
        let state = self.state.lock().await;
        let remote = state.remote_identity.as_ref()?;
        let since = state.awaiting_since.get(remote)?;
        (since.elapsed() >= timeout).then(|| remote.clone())
    }

    async fn send_answer(
        &self,
        state: &mut CoordinatorState,
        sdp: String,
    ) -> Result<(), NegotiationError> {
        let remote = state
            .remote_identity
            .clone()
            .ok_or(ProtocolViolation::NoRemoteIdentity("answer"))?;

        info!("Sending answer to {}", remote);
        self.output
            .send_message(NegotiationMessage::Answer {
                sdp,
                recipient_id: Some(remote.clone()),
            })
            .await;

        self.finalize_locked(state, remote).await;
        Ok(())
    }

    async fn submit_locked(
        &self,
        state: &mut CoordinatorState,
        identity: PeerIdentity,
        candidate: IceCandidate,
    ) {
        if let Some(handle) = state.active.get(&identity).cloned() {
            debug!("Adding candidate for {}: {}", identity, candidate.candidate);
            if let Err(e) = handle.add_ice_candidate(candidate).await {
                warn!("Failed to add candidate for {}: {}", identity, e);
            }
            return;
        }

        debug!("Buffering candidate for {}: {}", identity, candidate.candidate);
        state.mark_awaiting(&identity);
        state.pending.entry(identity).or_default().insert(candidate);
    }

    async fn finalize_locked(&self, state: &mut CoordinatorState, identity: PeerIdentity) {
        let handle = Arc::clone(
            state
                .active
                .entry(identity.clone())
                .or_insert_with(|| Arc::clone(&self.engine)),
        );
        state.awaiting_since.remove(&identity);

        let Some(pending) = state.pending.remove(&identity) else {
            debug!("Peer connection finalized for {}", identity);
            return;
        };

        info!(
            "Peer connection finalized for {}, applying {} buffered candidates",
            identity,
            pending.len()
        );
        for candidate in pending {
            if let Err(e) = handle.add_ice_candidate(candidate).await {
                warn!("Failed to add buffered candidate for {}: {}", identity, e);
            }
        }
    }
}
