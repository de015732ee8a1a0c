/// HTTP authentication for story-service
///
/// Bearer tokens are HS256 JWTs whose `sub` is the caller's user id. Handlers
/// that need a caller take an [`AuthenticatedUser`] argument; the extractor
/// resolves it against the [`JwtValidator`] registered as app data.
use crate::error::AppError;
use crate::models::StoryOwner;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: usize,  // Expiration time
    pub iat: usize,  // Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Validates (and, for tooling and tests, issues) HS256 tokens.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        username: Option<&str>,
        ttl: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl.num_seconds()) as usize,
            iat: now as usize,
            username: username.map(str::to_string),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Resolve an `Authorization` header value to a caller.
    ///
    /// No usable token is `Unauthorized`; a token that fails verification is `Forbidden`.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedUser, AppError> {
        let token = header
            .and_then(|h| h.split_whitespace().nth(1))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

        let claims = self.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AppError::Forbidden("Invalid or expired token".into())
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Forbidden("Invalid or expired token".into()))?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username,
        })
    }
}

/// Caller identity for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: Option<String>,
}

impl AuthenticatedUser {
    /// Owner profile asserted by the token, if it carries a username.
    pub fn as_owner(&self) -> Option<StoryOwner> {
        self.username
            .as_deref()
            .map(|name| StoryOwner::new(self.user_id, name))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(validator) = req.app_data::<web::Data<JwtValidator>>() else {
            return ready(Err(AppError::Internal("JWT validator not configured".into())));
        };

        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        ready(validator.authenticate(header))
    }
}
