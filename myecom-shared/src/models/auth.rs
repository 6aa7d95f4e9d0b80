use serde::{Deserialize, Serialize};

/// Credentials posted to `auth/token/`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Access/refresh pair issued by `auth/token/`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenPair { .. }")
    }
}

/// Body posted to `auth/token/refresh/`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshRequest {
    pub refresh: String,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshRequest { .. }")
    }
}

/// New access token returned by `auth/token/refresh/`.
///
/// Servers that rotate refresh tokens also send a new `refresh`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl std::fmt::Debug for RefreshedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshedToken { .. }")
    }
}
