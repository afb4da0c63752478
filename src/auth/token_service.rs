use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub website_url: String,
    pub token_duration_min: i64,
    pub jwt_algorithm: Algorithm,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| Error::EnvVarError("JWT_SECRET not found".to_string()))?;
        if jwt_secret.trim().is_empty() {
            return Err(Error::ConfigInvalid {
                key: "JWT_SECRET".to_string(),
            });
        }

        Ok(Self {
            jwt_secret,
            website_url: env::var("WEBSITE_URL").unwrap_or_else(|_| "goonj".to_string()),
            token_duration_min: env::var("TOKEN_DURATION_MIN")
                .unwrap_or_else(|_| "1440".to_string())
                .parse::<i64>()
                .unwrap_or(1440),
            jwt_algorithm: Algorithm::HS256,
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
        })
    }

    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            website_url: "goonj".to_string(),
            token_duration_min: 1440,
            jwt_algorithm: Algorithm::HS256,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("website_url", &self.website_url)
            .field("token_duration_min", &self.token_duration_min)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user_id)
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
    pub nbf: usize,  // not before
    pub iss: String, // issuer
    pub aud: String, // audience
    pub jti: String, // jwt id
}

impl Claims {
    pub fn new(sub: String, config: &AuthConfig) -> Self {
        let iat = Utc::now();
        let exp = iat + Duration::minutes(config.token_duration_min);

        Self {
            sub,
            exp: exp.timestamp() as usize,
            iat: iat.timestamp() as usize,
            nbf: iat.timestamp() as usize,
            iss: config.website_url.to_string(),
            aud: config.website_url.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

pub struct TokenService;

impl TokenService {
    pub fn create_token(sub: String, config: &AuthConfig) -> Result<String> {
        let claims = Claims::new(sub, config);
        let token = encode(
            &Header::new(config.jwt_algorithm),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|_| Error::TokenCreationError)?;
        Ok(token)
    }

    pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims> {
        let mut validation = Validation::new(config.jwt_algorithm);
        validation.set_audience(&[config.website_url.to_string()]);
        validation.set_issuer(&[config.website_url.to_string()]);

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| Error::InvalidToken)?;
        Ok(decoded.claims)
    }
}
