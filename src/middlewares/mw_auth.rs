use crate::auth::token_service::{Claims, TokenService};
use crate::error::{Error, Result};
use crate::helpers::thing_helpers::create_user_thing;
use crate::{models::user::UserRecord, AppState};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Authenticated caller, inserted into request extensions by [`mw_auth`].
#[derive(Debug, Clone)]
pub struct Ctx {
    pub user_id: String,
    pub exp: usize,
    pub user: UserRecord,
}

impl Ctx {
    pub fn new(user_id: String, exp: usize, user: UserRecord) -> Self {
        Self { user_id, exp, user }
    }
}

pub async fn mw_auth(
    State(app_state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|str| str.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(Error::AuthFailNoAuthToken)?;

    let claims: Claims = TokenService::validate_token(token, &app_state.auth_config)?;

    let user: Option<UserRecord> = app_state
        .db
        .query("SELECT * FROM $user_thing")
        .bind(("user_thing", create_user_thing(&claims.sub)))
        .await?
        .take(0)?;

    // A valid signature for a user that no longer exists is still a bad token.
    let user = user.ok_or(Error::InvalidToken)?;

    let ctx = Ctx::new(claims.sub, claims.exp, user);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
