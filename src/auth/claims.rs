use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bearer token payload. Clients see the encoded token only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
    pub jti: Uuid,   // token ID, unique per issue
}
