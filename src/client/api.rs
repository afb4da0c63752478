use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, de::IgnoredAny, Serialize};

use super::{
    config::ClientConfig,
    error::{Error, Result},
};
use crate::{
    auth::models::{AuthResponse, LoginPayload, RegisterPayload},
    models::{
        api_response::ApiResponse,
        playlist::{AddSongRequest, CreatePlaylistRequest, Playlist, PlaylistSong},
        song::{CreateSongRequest, Song, SongQuery},
    },
};

/// Thin typed wrapper over the REST API. Every call is a single request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_url.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<()> {
        let envelope: ApiResponse<IgnoredAny> = send(self.http.get(self.url("/health"))).await?;
        tracing::debug!(message = ?envelope.message, "api healthy");
        Ok(())
    }

    /// Lists songs, dropping entries that fail validation.
    pub async fn list_songs(&self, query: &SongQuery) -> Result<Vec<Song>> {
        let songs: Vec<Song> = data(send(self.http.get(self.url("/songs")).query(query)).await?)?;
        let total = songs.len();

        let valid: Vec<Song> = songs
            .into_iter()
            .filter(|song| match song.validate() {
                Ok(()) => true,
                Err(reason) => {
                    tracing::warn!(%reason, "skipping invalid song");
                    false
                }
            })
            .collect();

        tracing::debug!(total, kept = valid.len(), "songs fetched");
        Ok(valid)
    }

    pub async fn get_song(&self, song_id: &str) -> Result<Song> {
        let song: Song = data(send(self.http.get(self.url(&format!("/songs/{song_id}")))).await?)?;
        song.validate().map_err(Error::InvalidPayload)?;
        Ok(song)
    }

    pub async fn create_song(&self, request: &CreateSongRequest) -> Result<Song> {
        data(send(self.http.post(self.url("/songs")).json(request)).await?)
    }

    pub async fn delete_song(&self, song_id: &str) -> Result<()> {
        let _: ApiResponse<IgnoredAny> =
            send(self.http.delete(self.url(&format!("/songs/{song_id}")))).await?;
        Ok(())
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse> {
        data(send(self.http.post(self.url("/auth/register")).json(payload)).await?)
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse> {
        data(send(self.http.post(self.url("/auth/login")).json(payload)).await?)
    }

    pub async fn my_playlists(&self, token: &str) -> Result<Vec<Playlist>> {
        data(send(self.http.get(self.url("/playlists")).bearer_auth(token)).await?)
    }

    pub async fn create_playlist(
        &self,
        token: &str,
        title: &str,
        is_public: bool,
    ) -> Result<Playlist> {
        let body = CreatePlaylistRequest {
            title: Some(title.to_string()),
            is_public: Some(is_public),
        };
        self.authed_post("/playlists", token, &body).await
    }

    pub async fn add_song_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<PlaylistSong> {
        let body = AddSongRequest {
            playlist_id: Some(playlist_id.to_string()),
            song_id: Some(song_id.to_string()),
        };
        self.authed_post("/playlists/add-song", token, &body).await
    }

    async fn authed_post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T> {
        data(
            send(
                self.http
                    .post(self.url(path))
                    .bearer_auth(token)
                    .json(body),
            )
            .await?,
        )
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<ApiResponse<T>> {
    let response = request.send().await?;
    decode(response).await
}

/// Unwraps the `{status, data|message}` envelope, turning error envelopes and
/// non-2xx statuses into [`Error::Api`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiResponse<IgnoredAny>>(&bytes)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        tracing::debug!(status = status.as_u16(), %message, "api call rejected");
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidPayload(e.to_string()))?;

    if !envelope.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        });
    }

    Ok(envelope)
}

fn data<T>(envelope: ApiResponse<T>) -> Result<T> {
    envelope
        .data
        .ok_or_else(|| Error::InvalidPayload("response carried no data".to_string()))
}
