//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::{JwtToken, LoginSession};
use crate::error::Result;

/// Authentication operations against the IDMC identity services
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Log in with username and password, creating an IDMC session
    async fn login(&self, username: &str, password: &str) -> Result<LoginSession>;

    /// Exchange an IDMC session for a CDGC JWT
    async fn generate_jwt(&self, session: &LoginSession) -> Result<JwtToken>;
}
