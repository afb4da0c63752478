//! Client core: HTTP access to the API, device-local state and the
//! playback session.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod favorites;
pub mod media;
pub mod screens;
pub mod session;
pub mod storage;

pub use self::error::{Error, Result};

use self::{
    api::ApiClient, auth::AuthSession, config::ClientConfig, favorites::Favorites,
    storage::LocalStore,
};
use crate::models::song::{Song, SongQuery};

/// State gathered when the app starts.
pub struct Bootstrap {
    pub songs: Result<Vec<Song>>,
    pub favorites: Favorites,
    pub auth: AuthSession,
}

pub async fn open_store(config: &ClientConfig) -> Result<LocalStore> {
    match &config.store_path {
        Some(path) => LocalStore::open(path).await,
        None => Ok(LocalStore::in_memory()),
    }
}

/// Fetches the catalogue while local state is read. A failed fetch is kept in
/// [`Bootstrap::songs`] so the caller can show it; local state still loads.
pub async fn bootstrap(api: &ApiClient, store: &LocalStore) -> Bootstrap {
    let query = SongQuery::default();
    let (songs, favorites, auth) = tokio::join!(
        api.list_songs(&query),
        Favorites::load(store.clone()),
        AuthSession::restore(store.clone()),
    );

    if let Err(e) = &songs {
        tracing::error!(url = api.base_url(), error = %e, "song fetch failed");
    }

    Bootstrap {
        songs,
        favorites,
        auth,
    }
}
