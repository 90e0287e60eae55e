//! Endpoint functions related to playlists

use tokio_util::sync::CancellationToken;

use crate::client::*;
use crate::diagnostics::Event;
use crate::model::playlist::*;
use crate::model::track::Track;
use crate::model::Page;

pub struct Playlists<'a>(pub &'a Spotify);

impl Playlists<'_> {
    /// Playlist metadata. The embedded track list may be truncated.
    pub async fn get(&self, id: &str) -> ClientResult<Playlist> {
        let url = format!("/playlists/{}", id);
        self.0.get(&url, &[]).await
    }

    /// One page of the current user's playlists. The service caps `limit` at 50.
    pub async fn user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> ClientResult<Page<SimplifiedPlaylist>> {
        self.0.page("/me/playlists", limit, offset).await
    }

    pub async fn all_user_playlists(&self) -> ClientResult<Partial<SimplifiedPlaylist>> {
        self.0
            .collect_pages("/me/playlists", &CancellationToken::new())
            .await
    }

    /// One page of playlist rows, removed tracks included as `track: None`.
    pub async fn tracks(&self, id: &str, limit: u32, offset: u32) -> ClientResult<Page<PlaylistItem>> {
        let url = format!("/playlists/{}/tracks", id);
        self.0.page(&url, limit, offset).await
    }

    /// Every track of the playlist, in playlist order.
    pub async fn all_tracks(&self, id: &str) -> ClientResult<Partial<Track>> {
        self.all_tracks_until(id, &CancellationToken::new()).await
    }

    pub async fn all_tracks_until(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<Partial<Track>> {
        let url = format!("/playlists/{}/tracks", id);
        let items = self.0.collect_pages::<PlaylistItem>(&url, cancel).await?;
        Ok(items.map(|item| item.track))
    }

    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> ClientResult<CreatedPlaylist> {
        let url = format!("/users/{}/playlists", owner_id);
        let payload = NewPlaylist {
            name,
            description,
            public,
        };
        self.0.post(&url, &payload).await
    }

    /// Appends `uris` in caller order, one request per chunk of at most 100.
    ///
    /// Chunks go out one after the other and writing stops at the first chunk
    /// that fails, so the playlist always ends with a prefix of `uris`. When
    /// nothing was written the error is returned as is.
    pub async fn add_tracks(&self, id: &str, uris: &[String]) -> ClientResult<AddedTracks> {
        self.add_tracks_until(id, uris, &CancellationToken::new()).await
    }

    pub async fn add_tracks_until(
        &self,
        id: &str,
        uris: &[String],
        cancel: &CancellationToken,
    ) -> ClientResult<AddedTracks> {
        let url = format!("/playlists/{}/tracks", id);
        let chunk_size = self.0.config().track_chunk_size;
        let mut snapshot_ids: Vec<String> = Vec::new();
        let mut written: usize = 0;

        for (index, chunk) in uris.chunks(chunk_size).enumerate() {
            if index > 0 && !self.0.pause(self.0.config().chunk_delay, cancel).await {
                self.0.emit(Event::Cancelled { path: url.clone() });
                let cancelled = ClientError::Cancelled;
                return AddedTracks::stopped(snapshot_ids, uris, written, cancelled);
            }

            let payload = AddTracks { uris: chunk };
            let request = self.0.post::<_, Snapshot>(&url, &payload);
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ClientError::Cancelled),
                result = request => result,
            };

            match result {
                Ok(snapshot) => {
                    self.0.emit(Event::ChunkCompleted {
                        path: url.clone(),
                        index,
                        size: chunk.len(),
                    });
                    snapshot_ids.push(snapshot.snapshot_id);
                    written += chunk.len();
                }
                Err(ClientError::Cancelled) => {
                    self.0.emit(Event::Cancelled { path: url.clone() });
                    let cancelled = ClientError::Cancelled;
                    return AddedTracks::stopped(snapshot_ids, uris, written, cancelled);
                }
                Err(err) => {
                    self.0.emit(Event::ChunkFailed {
                        path: url.clone(),
                        index,
                        size: chunk.len(),
                        reason: err.to_string(),
                    });
                    return AddedTracks::stopped(snapshot_ids, uris, written, err);
                }
            }
        }

        Ok(AddedTracks {
            snapshot_ids,
            written,
            unsent: Vec::new(),
            error: None,
        })
    }

    /// Creates a playlist and fills it with `uris`.
    ///
    /// Once the playlist exists it is always handed back, together with the
    /// outcome of adding the tracks.
    pub async fn create_from(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
        uris: &[String],
    ) -> ClientResult<(CreatedPlaylist, ClientResult<AddedTracks>)> {
        let playlist = self.create(owner_id, name, description, public).await?;
        let added = self.add_tracks(&playlist.id, uris).await;
        Ok((playlist, added))
    }
}

/// Outcome of appending tracks to a playlist.
#[derive(Debug)]
pub struct AddedTracks {
    /// Snapshot id after each written chunk, in order.
    pub snapshot_ids: Vec<String>,
    /// Number of leading URIs written.
    pub written: usize,
    /// URIs not written, in caller order. Send them again to resume.
    pub unsent: Vec<String>,
    /// Why writing stopped early.
    pub error: Option<ClientError>,
}

impl AddedTracks {
    fn stopped(
        snapshot_ids: Vec<String>,
        uris: &[String],
        written: usize,
        error: ClientError,
    ) -> ClientResult<Self> {
        if written == 0 {
            return Err(error);
        }
        Ok(Self {
            snapshot_ids,
            written,
            unsent: uris[written..].to_vec(),
            error: Some(error),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.unsent.is_empty()
    }

    pub fn missing(&self) -> usize {
        self.unsent.len()
    }

    /// Snapshot of the playlist after the last successful write.
    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot_ids.last().map(String::as_str)
    }
}
