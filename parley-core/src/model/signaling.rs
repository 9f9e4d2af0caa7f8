use crate::model::peer::PeerIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdpKind {
    Offer,
    Answer,
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpKind::Offer => f.write_str("offer"),
            SdpKind::Answer => f.write_str("answer"),
        }
    }
}

/// A single ICE candidate. Equality and hashing cover every field, so two
/// deliveries of the same candidate collapse in a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: String,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: u16,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>, sdp_mid: impl Into<String>, sdp_m_line_index: u16) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: sdp_mid.into(),
            sdp_m_line_index,
        }
    }
}

/// Negotiation data exchanged through the relay.
///
/// Offers come from a viewer and carry no recipient: the relay routes them
/// to the channel's single master. Answers and master-sent candidates name
/// their recipient.
///
/// Only messages for which [`is_wire_valid`](Self::is_wire_valid) holds
/// survive an encode/decode round trip unchanged:
/// - identities are non-empty (an empty id is sent as absent);
/// - a candidate's `is_master` equals `recipient_id.is_some()`, since the
///   flag itself is not transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationMessage {
    Offer {
        sdp: String,
        sender_id: PeerIdentity,
    },
    Answer {
        sdp: String,
        recipient_id: Option<PeerIdentity>,
    },
    Candidate {
        candidate: IceCandidate,
        is_master: bool,
        recipient_id: Option<PeerIdentity>,
        sender_id: Option<PeerIdentity>,
    },
}

impl NegotiationMessage {
    /// Whether this message can be carried by the relay envelope without
    /// losing information.
    pub fn is_wire_valid(&self) -> bool {
        let present = |id: &Option<PeerIdentity>| id.as_ref().is_none_or(|id| !id.is_empty());
        match self {
            NegotiationMessage::Offer { sender_id, .. } => !sender_id.is_empty(),
            NegotiationMessage::Answer { recipient_id, .. } => present(recipient_id),
            NegotiationMessage::Candidate {
                is_master,
                recipient_id,
                sender_id,
                ..
            } => {
                present(recipient_id)
                    && present(sender_id)
                    && *is_master == recipient_id.is_some()
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationMessage::Offer { .. } => "offer",
            NegotiationMessage::Answer { .. } => "answer",
            NegotiationMessage::Candidate { .. } => "candidate",
        }
    }
}
