use async_trait::async_trait;
use parley_core::NegotiationMessage;

/// Where the negotiation coordinator puts the messages it produces.
/// Delivery is fire-and-forget: failures are logged by the implementation.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_message(&self, msg: NegotiationMessage);
}
