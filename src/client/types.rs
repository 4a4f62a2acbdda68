//! Wire types of the admin API.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Pending,
    Blocked,
}

/// Owner of a registration request, as embedded by the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUser {
    pub email: String,
}

/// A signup awaiting (or past) review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub id: String,
    /// Upstream status string, e.g. `PENDING`, `APPROVED`, `REJECTED`.
    pub status: String,
    #[serde(default)]
    pub ip: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub user: Option<RequestUser>,
}

impl RegistrationRequest {
    pub fn email(&self) -> &str {
        self.user.as_ref().map(|u| u.email.as_str()).unwrap_or("unknown")
    }

    pub fn ip(&self) -> &str {
        self.ip.as_deref().unwrap_or("unknown")
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: String,
    /// Signup address; the upstream sends `null` for accounts created before
    /// it was recorded.
    #[serde(default)]
    pub ip: Option<String>,
}

impl User {
    pub fn ip(&self) -> &str {
        self.ip.as_deref().unwrap_or("")
    }
}

/// Partial update of a user; absent fields are left unchanged upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.role.is_none()
    }
}

/// List envelope used by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Items<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Result of a user update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedUser {
    pub ok: bool,
    pub user: User,
}
