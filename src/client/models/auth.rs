//! Authentication models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of the IDMC v3 login endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub products: Vec<Product>,

    pub user_info: UserInfo,
}

/// Product entry advertised by the login response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub base_api_url: Option<String>,
}

/// Logged-in user details
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub session_id: String,

    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub org_id: String,

    #[serde(default)]
    pub org_name: String,
}

/// IDMC session created by a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub session_id: String,
    pub user_id: String,
    pub org_id: String,
    pub org_name: String,
}

impl From<UserInfo> for LoginSession {
    fn from(info: UserInfo) -> Self {
        Self {
            session_id: info.session_id,
            user_id: info.id,
            org_id: info.org_id,
            org_name: info.org_name,
        }
    }
}

/// JWT authentication token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtToken {
    /// The JWT token string
    pub token: String,

    /// Token expiration time
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Everything a CDGC request needs: bearer token plus org identity
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub org_id: String,
    pub org_name: String,
    pub user_id: String,
}

impl Session {
    pub fn new(login: &LoginSession, jwt: JwtToken) -> Self {
        Self {
            token: jwt.token,
            expires_at: jwt.expires_at,
            org_id: login.org_id.clone(),
            org_name: login.org_name.clone(),
            user_id: login.user_id.clone(),
        }
    }
}
