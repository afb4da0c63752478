use super::{
    api::ApiClient,
    error::{Error, Result},
    storage::{LocalStore, TOKEN_KEY, USER_KEY},
};
use crate::{
    auth::models::{AuthResponse, LoginPayload, RegisterPayload},
    models::user::User,
};

/// Signed-in state, passed explicitly to whatever needs the bearer token.
#[derive(Clone)]
pub struct AuthSession {
    store: LocalStore,
    token: Option<String>,
    user: Option<User>,
}

impl AuthSession {
    pub fn signed_out(store: LocalStore) -> Self {
        Self {
            store,
            token: None,
            user: None,
        }
    }

    /// Restores a previous sign-in. Both the token and the profile must be
    /// present, otherwise the session starts signed out.
    pub async fn restore(store: LocalStore) -> Self {
        let token = store.get(TOKEN_KEY).await;
        let user: Option<User> = store.get_json(USER_KEY).await;

        match (token, user) {
            (Some(token), Some(user)) => {
                tracing::debug!(username = %user.username, "restored auth session");
                Self {
                    store,
                    token: Some(token),
                    user: Some(user),
                }
            }
            _ => Self::signed_out(store),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn bearer(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::NotAuthenticated)
    }

    pub async fn sign_in(&mut self, auth: AuthResponse) -> Result<()> {
        self.store.set(TOKEN_KEY, auth.token.clone()).await?;
        self.store.set_json(USER_KEY, &auth.user).await?;
        self.token = Some(auth.token);
        self.user = Some(auth.user);
        Ok(())
    }

    pub async fn sign_out(&mut self) -> Result<()> {
        self.token = None;
        self.user = None;
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await?;
        Ok(())
    }

    pub async fn login(&mut self, api: &ApiClient, payload: &LoginPayload) -> Result<()> {
        let auth = api.login(payload).await?;
        self.sign_in(auth).await
    }

    pub async fn register(&mut self, api: &ApiClient, payload: &RegisterPayload) -> Result<()> {
        let auth = api.register(payload).await?;
        self.sign_in(auth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_response() -> AuthResponse {
        AuthResponse {
            token: "header.payload.sig".to_string(),
            user: User {
                id: "u1".to_string(),
                username: "mridul".to_string(),
                email: "mridul@example.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_restores() {
        let store = LocalStore::in_memory();
        let mut session = AuthSession::signed_out(store.clone());
        assert_eq!(session.bearer(), Err(Error::NotAuthenticated));

        session.sign_in(auth_response()).await.unwrap();
        assert_eq!(session.bearer().unwrap(), "header.payload.sig");

        let restored = AuthSession::restore(store.clone()).await;
        assert!(restored.is_signed_in());
        assert_eq!(restored.user().map(|u| u.username.as_str()), Some("mridul"));

        session.sign_out().await.unwrap();
        let restored = AuthSession::restore(store).await;
        assert!(!restored.is_signed_in());
    }

    #[tokio::test]
    async fn test_token_without_profile_is_signed_out() {
        let store = LocalStore::in_memory();
        store.set(TOKEN_KEY, "orphan").await.unwrap();
        assert!(!AuthSession::restore(store).await.is_signed_in());
    }
}
