//! Identity and authorization context
//!
//! Provides:
//! - The `UserContext` passed explicitly into every workflow operation
//! - Role parsing and capability checks
//! - JWT bearer-token validation (issued by the external identity service)
//!
//! There is no process-wide "current user"; the acting user is always an
//! explicit argument, extracted once per request at the transport boundary.

use crate::errors::{AppError, Result};
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

/// Role granted by the external identity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Author,
    Reviewer,
    Editor,
    Admin,
}

impl Role {
    /// Editors and admins hold editorial powers (status changes, assignments)
    pub fn is_editorial(&self) -> bool {
        matches!(self, Role::Editor | Role::Admin)
    }

    /// Roles eligible to be bound to a paper as reviewer
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Reviewer | Role::Editor | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Author => "AUTHOR",
            Role::Reviewer => "REVIEWER",
            Role::Editor => "EDITOR",
            Role::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AUTHOR" => Ok(Role::Author),
            "REVIEWER" => Ok(Role::Reviewer),
            "EDITOR" => Ok(Role::Editor),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AppError::InvalidFormat {
                message: format!("Unknown role: {}", other),
            }),
        }
    }
}

/// The acting user, resolved once per request and passed into every
/// workflow operation
#[derive(Debug, Clone)]
pub struct UserContext {
    /// User ID (subject of the identity token)
    pub id: Uuid,

    /// Role at request time
    pub role: Role,

    /// Request ID for tracing
    pub request_id: String,
}

impl UserContext {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Require editorial powers (editor or admin)
    pub fn require_editorial(&self) -> Result<()> {
        if self.role.is_editorial() {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                message: "Editor or admin role required".to_string(),
            })
        }
    }

    /// Require that the acting user is the given owner, or an admin
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<()> {
        if self.id == owner_id || self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                message: "Only the paper owner or an admin may perform this action".to_string(),
            })
        }
    }
}

/// JWT claims structure issued by the identity service
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Role granted at issuance
    pub role: Role,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Generate a new JWT token (service tokens, local development)
    pub fn generate_token(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }
}

static JWT_MANAGER: OnceLock<JwtManager> = OnceLock::new();

/// Install the process-wide token validator. Called once at startup.
pub fn init_jwt(secret: &str, expiration_secs: u64) {
    let _ = JWT_MANAGER.set(JwtManager::new(secret, expiration_secs));
}

/// The installed token validator, if configured
pub fn jwt_manager() -> Option<&'static JwtManager> {
    JWT_MANAGER.get()
}

/// Extract bearer token from Authorization header
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Axum extractor for UserContext
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        // Extract request ID
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = extract_bearer(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Authorization header must be a Bearer token".to_string(),
        })?;

        let manager = jwt_manager().ok_or_else(|| AppError::Configuration {
            message: "Identity validation is not configured".to_string(),
        })?;

        let claims = manager.validate_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        Ok(UserContext {
            id: user_id,
            role: claims.role,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("EDITOR".parse::<Role>().unwrap(), Role::Editor);
        assert!("JANITOR".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.is_editorial());
        assert!(Role::Editor.is_editorial());
        assert!(!Role::Reviewer.is_editorial());
        assert!(!Role::Author.can_review());
        assert!(Role::Reviewer.can_review());
    }

    #[test]
    fn test_jwt_round_trip() {
        let manager = JwtManager::new("test-secret", 3600);
        let user_id = Uuid::new_v4();

        let token = manager.generate_token(user_id, Role::Reviewer).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, Role::Reviewer);
    }

    #[test]
    fn test_jwt_rejects_garbage() {
        let manager = JwtManager::new("test-secret", 3600);
        assert!(matches!(
            manager.validate_token("not-a-token"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_ownership_check() {
        let owner = Uuid::new_v4();
        let ctx = UserContext::new(owner, Role::Author);
        assert!(ctx.require_owner_or_admin(owner).is_ok());

        let other = UserContext::new(Uuid::new_v4(), Role::Editor);
        assert!(other.require_owner_or_admin(owner).is_err());

        let admin = UserContext::new(Uuid::new_v4(), Role::Admin);
        assert!(admin.require_owner_or_admin(owner).is_ok());
    }
}
