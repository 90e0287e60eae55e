// Use 3rd party
use serde::{Deserialize, Serialize};

// Use local
use crate::model::track::Track;
use crate::model::user::PublicUser;
use crate::model::{ExternalUrls, Image, Page};

/// Full playlist object. `tracks` holds only the first page the service chose
/// to embed; use the paginated track calls for the complete list.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    pub owner: Option<PublicUser>,
    pub snapshot_id: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub tracks: Page<PlaylistItem>,
}

/// Playlist as listed by `GET /me/playlists`.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    pub owner: Option<PublicUser>,
    pub snapshot_id: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub tracks: TracksRef,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct TracksRef {
    pub href: Option<String>,
    #[serde(default)]
    pub total: u32,
}

/// One row of a playlist. `track` is null when the item was removed from the catalog.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<Track>,
}

/// What `POST /users/{id}/playlists` hands back that callers care about.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub name: String,
    pub uri: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl CreatedPlaylist {
    pub fn external_url(&self) -> Option<&str> {
        self.external_urls.spotify.as_deref()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewPlaylist<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddTracks<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct Snapshot {
    pub snapshot_id: String,
}
