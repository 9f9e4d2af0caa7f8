use parley_core::{IceServerConfig, PeerIdentity, Role};

pub const CHANNEL_QUERY_PARAM: &str = "X-Amz-ChannelARN";
pub const CLIENT_ID_QUERY_PARAM: &str = "X-Amz-ClientId";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEndpoints {
    pub channel_id: String,
    pub signaling_url: String,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ChannelEndpoints {
    /// Relay URL for this endpoint. Only viewers identify themselves: the
    /// relay addresses the master implicitly.
    pub fn connect_url(&self, role: Role, self_identity: &PeerIdentity) -> String {
        let separator = if self.signaling_url.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{}{}={}",
            self.signaling_url, separator, CHANNEL_QUERY_PARAM, self.channel_id
        );
        if role == Role::Viewer {
            url.push_str(&format!("&{}={}", CLIENT_ID_QUERY_PARAM, self_identity));
        }
        url
    }
}
