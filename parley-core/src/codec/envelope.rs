use serde::{Deserialize, Serialize};

pub(crate) const SDP_OFFER: &str = "SDP_OFFER";
pub(crate) const SDP_ANSWER: &str = "SDP_ANSWER";
pub(crate) const ICE_CANDIDATE: &str = "ICE_CANDIDATE";

/// Outer frame as it travels over the relay socket. The payload is the
/// base64 text of an inner JSON object, opaque to the relay.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_payload: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SessionDescriptionPayload {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub sdp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CandidatePayload {
    pub candidate: Option<String>,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
}
