/*
 * Responsibility
 * - The authenticated caller as handlers see it
 * - Filled by the access middleware from a verified token
 *
 * Notes
 * - Roles are coarse-grained; ownership is checked in the services
 */

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl AuthCtx {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}
