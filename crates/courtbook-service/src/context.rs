//! Request context carrying the authenticated caller.

use serde::{Deserialize, Serialize};

use courtbook_core::types::id::UserId;
use courtbook_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Produced by the identity layer outside this core and passed into
/// service methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role as asserted by the identity provider.
    pub role: UserRole,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns whether the caller may act on records owned by others.
    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}
