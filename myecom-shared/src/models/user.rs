use serde::{Deserialize, Serialize};
use strum::Display;

/// Primary key of a user account.
pub type UserId = u64;

/// Account role carried on a user's profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display)]
pub enum Role {
    Admin,
    Supplier,
    #[default]
    Client,
}

/// Role and approval state attached to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Profile {
    /// The account role.
    pub role: Role,

    /// Approval flag; only meaningful for suppliers.
    #[serde(default)]
    pub is_approved: bool,

    /// Age supplied with a supplier request.
    #[serde(default)]
    pub age: Option<u32>,
}

/// Identity record returned by `users/me/` and the admin user list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique identifier for the user.
    pub id: UserId,

    /// The user's username.
    pub username: String,

    /// The user's email address.
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub is_staff: bool,

    #[serde(default)]
    pub is_superuser: bool,

    /// Role profile; absent for accounts created outside the storefront.
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl User {
    /// Role from the profile, if the user has one.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|profile| profile.role)
    }

    /// `true` for a supplier account still waiting on admin approval.
    #[must_use]
    pub fn is_pending_supplier(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|profile| profile.role == Role::Supplier && !profile.is_approved)
    }
}

/// Request body for `users/register/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Confirmation; the server rejects the request when it differs from `password`.
    pub password2: String,
}

/// Request body for `users/me/update/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProfileUpdateRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for ProfileUpdateRequest {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Request body for `users/change-password/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Request body for `users/request-supplier/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplierRequest {
    pub age: u32,
}

/// Request body for `users/workers/register/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerRegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Decision sent to `users/workers/{id}/approve/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

/// Request body for `users/workers/{id}/approve/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerApprovalRequest {
    pub action: ApprovalAction,
}

/// Plain acknowledgement body (`{"detail": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailResponse {
    pub detail: String,
}
