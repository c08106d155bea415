use serde::{Deserialize, Serialize};

/// JWT payload issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // principal id
    pub exp: usize,  // expires at (unix timestamp)
    #[serde(default)]
    pub iat: Option<usize>, // issued at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}
