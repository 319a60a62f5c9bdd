//! Per-connection authenticated sessions.
//!
//! Sessions are ephemeral: created by a successful `auth` message, dropped
//! when the connection unregisters. Keyed by the explicit connection id, not
//! by object identity.

use dashmap::DashMap;
use std::sync::Arc;

use crate::ws::ConnectionId;

/// Binary role tag. Anything that is not recognizably an admin is a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Authenticated identity attached to a live connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub role: Role,
    pub name: String,
}

/// Side table mapping connection ids to their sessions. A connection may be
/// registered but absent here (admitted, not yet authenticated).
pub type SessionMap = Arc<DashMap<ConnectionId, Session>>;

pub fn new_session_map() -> SessionMap {
    Arc::new(DashMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("user"), Role::User);
    }

    #[test]
    fn unknown_role_defaults_to_user() {
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }
}
