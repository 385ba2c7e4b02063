//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use shopdesk_core::AdminRole;

/// Session-stored admin identity.
///
/// The bootstrap super admin from the environment has no database row, so
/// the session keys on the username rather than an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub username: String,
    pub role: AdminRole,
}

impl CurrentAdmin {
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self.role, AdminRole::SuperAdmin)
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
