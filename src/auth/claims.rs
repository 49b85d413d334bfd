use serde::{Deserialize, Serialize};

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, opaque string)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// User email - optional
    #[serde(default)]
    pub email: Option<String>,

    /// Display name - optional
    #[serde(default)]
    pub name: Option<String>,
}
