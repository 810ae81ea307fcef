use chrono::{Duration, Utc};
use epic_server_app::{
    domain::UserId,
    ports::authentication::{AuthenticationPort, Identity, UserRole},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// HS256 bearer tokens signed with a shared secret. Issuing is only used by
/// operators and tests; the server itself only verifies.
pub struct JwtAuthentication {
    keys: Keys,
}

impl JwtAuthentication {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            keys: Keys::new(secret),
        }
    }

    pub fn issue_token(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            role: identity.role.as_str().to_string(),
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.keys.encoding)?)
    }

    fn decode(&self, token: &str) -> Option<Identity> {
        let claims = match decode::<Claims>(token, &self.keys.decoding, &Validation::default()) {
            Ok(data) => data.claims,
            Err(e) => {
                log::debug!("Rejected bearer token: {}", e);
                return None;
            }
        };
        if claims.sub.trim().is_empty() {
            return None;
        }
        // Unknown roles get the least privilege.
        let role = claims.role.parse().unwrap_or(UserRole::Member);
        Some(Identity::new(UserId::new(claims.sub), claims.email, role))
    }
}

#[async_trait::async_trait]
impl AuthenticationPort for JwtAuthentication {
    async fn verify_token(&self, token: &str) -> Option<Identity> {
        self.decode(token)
    }
}
