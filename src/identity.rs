//! Authenticated principal handed to tessera by the upstream gateway.

use std::fmt;
use uuid::Uuid;

/// Reference to an already-authenticated user.
///
/// Built once per request by the transport layer and only read afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    user_id: Uuid,
}

impl Identity {
    #[must_use]
    pub const fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_id)
    }
}
