use std::collections::BTreeSet;

use super::{
    error::Result,
    storage::{LocalStore, FAVORITES_KEY},
};
use crate::models::song::Song;

/// Set of favourite song ids kept only on this device.
#[derive(Clone)]
pub struct Favorites {
    store: LocalStore,
    ids: BTreeSet<String>,
}

impl Favorites {
    pub async fn load(store: LocalStore) -> Self {
        let ids: BTreeSet<String> = store
            .get_json::<Vec<String>>(FAVORITES_KEY)
            .await
            .unwrap_or_default()
            .into_iter()
            .collect();

        Self { store, ids }
    }

    pub fn contains(&self, song_id: &str) -> bool {
        self.ids.contains(song_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Adds or removes `song_id` and persists the set. Returns whether the
    /// song is a favourite afterwards. On a failed write the set is left
    /// unchanged.
    pub async fn toggle(&mut self, song_id: &str) -> Result<bool> {
        let mut next = self.ids.clone();
        let now_favorite = if next.remove(song_id) {
            false
        } else {
            next.insert(song_id.to_string());
            true
        };

        self.persist(&next).await?;
        self.ids = next;
        Ok(now_favorite)
    }

    pub async fn save(&self) -> Result<()> {
        self.persist(&self.ids).await
    }

    async fn persist(&self, ids: &BTreeSet<String>) -> Result<()> {
        let ids: Vec<&String> = ids.iter().collect();
        self.store.set_json(FAVORITES_KEY, &ids).await
    }

    /// Favourite songs present in `songs`, in list order. Ids that no longer
    /// match a known song are skipped.
    pub fn visible_songs<'a>(&self, songs: &'a [Song]) -> Vec<&'a Song> {
        songs.iter().filter(|song| self.contains(&song.id)).collect()
    }
}
