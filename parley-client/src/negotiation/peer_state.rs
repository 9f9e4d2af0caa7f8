/// Negotiation progress of one remote identity within a call.
///
/// `Unknown -> AwaitingFinalize -> Finalized`; `Finalized` holds until shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Unknown,
    /// Seen an offer, answer or candidate, but no peer connection bound yet.
    AwaitingFinalize,
    /// Bound to the peer connection; candidates apply immediately.
    Finalized,
}
