use crate::{
    auth::{
        models::{AuthResponse, LoginPayload, RegisterPayload},
        password_service,
        token_service::{AuthConfig, TokenService},
    },
    error::{Error, Result},
    helpers::thing_helpers::{thing_to_id, USER_TABLE},
    models::user::{User, UserRecord},
};
use chrono::Utc;
use lazy_regex::regex_is_match;
use surrealdb::sql::Datetime;
use surrealdb::{engine::any::Any, Surreal};

fn required(value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingFields)
}

pub struct AuthService;

impl AuthService {
    async fn find_user_by(
        db: &Surreal<Any>,
        field: &'static str,
        value: String,
    ) -> Result<Option<UserRecord>> {
        let sql = format!("SELECT * FROM user WHERE {field} = $value LIMIT 1");
        let user: Option<UserRecord> = db.query(sql).bind(("value", value)).await?.take(0)?;
        Ok(user)
    }

    fn issue_token(user: &UserRecord, config: &AuthConfig) -> Result<AuthResponse> {
        let user_id = user.id.as_ref().map(thing_to_id).ok_or(Error::TokenCreationError)?;
        let token = TokenService::create_token(user_id, config)?;

        Ok(AuthResponse {
            token,
            user: User::from(user),
        })
    }

    pub async fn register_user(
        db: &Surreal<Any>,
        config: &AuthConfig,
        payload: RegisterPayload,
    ) -> Result<AuthResponse> {
        let username = required(payload.username)?;
        let email = required(payload.email)?.to_lowercase();
        let password = payload
            .password
            .filter(|p| !p.is_empty())
            .ok_or(Error::MissingFields)?;

        if username.len() > 30 || username.contains(char::is_whitespace) {
            return Err(Error::InvalidInput {
                reason: "Username must be at most 30 characters without spaces".to_string(),
            });
        }
        if !regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", &email) {
            return Err(Error::InvalidInput {
                reason: "Email address is not valid".to_string(),
            });
        }

        if Self::find_user_by(db, "username", username.clone())
            .await?
            .is_some()
        {
            return Err(Error::UsernameTaken { username });
        }
        if Self::find_user_by(db, "email", email.clone()).await?.is_some() {
            return Err(Error::EmailTaken { email });
        }

        let new_user = UserRecord {
            id: None,
            username,
            email,
            password_hash: password_service::hash_password(&password, config.bcrypt_cost)?,
            created_at: Datetime::from(Utc::now()),
        };

        let created: UserRecord = db
            .create(USER_TABLE)
            .content(new_user)
            .await?
            .ok_or(Error::DbError("Could not create user".into()))?;

        tracing::info!(username = %created.username, "user registered");
        Self::issue_token(&created, config)
    }

    pub async fn login_user(
        db: &Surreal<Any>,
        config: &AuthConfig,
        payload: LoginPayload,
    ) -> Result<AuthResponse> {
        let email = required(payload.email)?.to_lowercase();
        let password = payload
            .password
            .filter(|p| !p.is_empty())
            .ok_or(Error::MissingFields)?;

        let user = Self::find_user_by(db, "email", email)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !password_service::verify_password(&password, &user.password_hash)? {
            tracing::debug!(username = %user.username, "login rejected: wrong password");
            return Err(Error::InvalidCredentials);
        }

        Self::issue_token(&user, config)
    }
}
