use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the single-master channel this endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Answers offers; may serve several viewers over time but negotiates one call.
    Master,
    /// Sends the offer; the relay routes everything it sends to the master.
    Viewer,
}

impl Role {
    pub fn is_master(self) -> bool {
        matches!(self, Role::Master)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Master => f.write_str("MASTER"),
            Role::Viewer => f.write_str("VIEWER"),
        }
    }
}
