//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hostel_core::{Actor, Role};
use hostel_shared::EntityId;

const ACCESS_TOKEN: &str = "access";

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: EntityId,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostel_id: Option<EntityId>,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

impl Claims {
    /// Caller identity carried by the token. The role string is parsed
    /// leniently (`SUPER_ADMIN`, `super-admin`, ...).
    pub fn to_actor(&self) -> Result<Actor, JwtError> {
        if self.token_type != ACCESS_TOKEN {
            return Err(JwtError::InvalidClaims(format!("unexpected token type {}", self.token_type)));
        }
        let role: Role = self
            .role
            .parse()
            .map_err(|_| JwtError::InvalidClaims(format!("unknown role {}", self.role)))?;
        if self.hostel_id.is_none() && role != Role::SuperAdmin {
            return Err(JwtError::InvalidClaims(format!("{} token without a hostel", role)));
        }
        Ok(Actor::new(self.user_id, role, self.hostel_id))
    }
}

pub struct JwtService {
    secret: String,
    access_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, access_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
        }
    }

    pub fn generate_access_token(&self, actor: &Actor) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor.user_id.to_string(),
            user_id: actor.user_id,
            role: actor.role.as_str().to_string(),
            hostel_id: actor.hostel_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            token_type: ACCESS_TOKEN.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::ValidationError(e.to_string()),
        })
    }

    /// Validates `token` and returns the caller it identifies.
    pub fn authenticate(&self, token: &str) -> Result<Actor, JwtError> {
        self.validate_token(token)?.to_actor()
    }
}
