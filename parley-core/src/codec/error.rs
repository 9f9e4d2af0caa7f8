use thiserror::Error;

/// Why an inbound relay frame could not be turned into a [`NegotiationMessage`].
///
/// [`NegotiationMessage`]: crate::NegotiationMessage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown action `{0}`")]
    UnknownAction(String),
}
