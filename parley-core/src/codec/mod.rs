//! Relay wire format.
//!
//! ```text
//! { "action": "SDP_OFFER" | "SDP_ANSWER" | "ICE_CANDIDATE",
//!   "recipientClientId": "..."?, "senderClientId": "..."?,
//!   "messagePayload": base64(inner json) }
//! ```
//!
//! Inner payloads are `{"type","sdp"}` for descriptions and
//! `{"candidate","sdpMid","sdpMLineIndex"}` for candidates.

mod envelope;
mod error;

pub use error::DecodeError;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::model::{IceCandidate, NegotiationMessage, PeerIdentity, SdpKind};
use envelope::{
    CandidatePayload, Envelope, ICE_CANDIDATE, SDP_ANSWER, SDP_OFFER, SessionDescriptionPayload,
};

pub fn encode(msg: &NegotiationMessage) -> String {
    let envelope = match msg {
        NegotiationMessage::Offer { sdp, sender_id } => Envelope {
            action: Some(SDP_OFFER.to_owned()),
            recipient_client_id: None,
            sender_client_id: Some(sender_id.to_string()),
            message_payload: Some(pack(&description(SdpKind::Offer, sdp))),
        },
        NegotiationMessage::Answer { sdp, recipient_id } => Envelope {
            action: Some(SDP_ANSWER.to_owned()),
            recipient_client_id: recipient_id.as_ref().map(ToString::to_string),
            sender_client_id: None,
            message_payload: Some(pack(&description(SdpKind::Answer, sdp))),
        },
        NegotiationMessage::Candidate {
            candidate,
            recipient_id,
            sender_id,
            ..
        } => Envelope {
            action: Some(ICE_CANDIDATE.to_owned()),
            recipient_client_id: recipient_id.as_ref().map(ToString::to_string),
            sender_client_id: sender_id.as_ref().map(ToString::to_string),
            message_payload: Some(pack(&CandidatePayload {
                candidate: Some(candidate.candidate.clone()),
                sdp_mid: Some(candidate.sdp_mid.clone()),
                sdp_m_line_index: Some(candidate.sdp_m_line_index),
            })),
        },
    };

    // Envelope only holds strings; serialization cannot fail.
    serde_json::to_string(&envelope).unwrap_or_default()
}

pub fn decode(text: &str) -> Result<NegotiationMessage, DecodeError> {
    let envelope: Envelope = serde_json::from_str(text.trim())
        .map_err(|e| DecodeError::MalformedEnvelope(e.to_string()))?;

    let action = envelope.action.ok_or(DecodeError::MissingField("action"))?;
    let recipient_id = non_empty(envelope.recipient_client_id);
    let sender_id = non_empty(envelope.sender_client_id);

    match action.as_str() {
        SDP_OFFER | SDP_ANSWER | ICE_CANDIDATE => {}
        _ => return Err(DecodeError::UnknownAction(action)),
    }

    let payload = envelope
        .message_payload
        .ok_or(DecodeError::MissingField("messagePayload"))?;
    let inner = unpack(&payload)?;

    match action.as_str() {
        SDP_OFFER => {
            let sdp = session_description(&inner, SdpKind::Offer)?;
            let sender_id = sender_id.ok_or(DecodeError::MissingField("senderClientId"))?;
            Ok(NegotiationMessage::Offer { sdp, sender_id })
        }
        SDP_ANSWER => {
            let sdp = session_description(&inner, SdpKind::Answer)?;
            Ok(NegotiationMessage::Answer { sdp, recipient_id })
        }
        _ => {
            let payload: CandidatePayload = serde_json::from_slice(&inner)
                .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;
            let candidate = IceCandidate {
                candidate: payload.candidate.ok_or(DecodeError::MissingField("candidate"))?,
                sdp_mid: payload.sdp_mid.ok_or(DecodeError::MissingField("sdpMid"))?,
                sdp_m_line_index: payload
                    .sdp_m_line_index
                    .ok_or(DecodeError::MissingField("sdpMLineIndex"))?,
            };
            Ok(NegotiationMessage::Candidate {
                candidate,
                is_master: recipient_id.is_some(),
                recipient_id,
                sender_id,
            })
        }
    }
}

fn description(kind: SdpKind, sdp: &str) -> SessionDescriptionPayload {
    SessionDescriptionPayload {
        kind: Some(kind.to_string()),
        sdp: Some(sdp.to_owned()),
    }
}

fn session_description(inner: &[u8], expected: SdpKind) -> Result<String, DecodeError> {
    let payload: SessionDescriptionPayload = serde_json::from_slice(inner)
        .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;

    if let Some(kind) = payload.kind.as_deref() {
        if kind != expected.to_string() {
            return Err(DecodeError::MalformedPayload(format!(
                "expected {expected} description, got `{kind}`"
            )));
        }
    }

    payload.sdp.ok_or(DecodeError::MissingField("sdp"))
}

fn pack<T: Serialize>(inner: &T) -> String {
    let json = serde_json::to_vec(inner).unwrap_or_default();
    STANDARD.encode(json)
}

fn unpack(payload: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::MalformedPayload(e.to_string()))
}

fn non_empty(id: Option<String>) -> Option<PeerIdentity> {
    id.filter(|s| !s.is_empty()).map(PeerIdentity::from)
}
