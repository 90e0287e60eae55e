pub mod audio_features;
pub mod library;
pub mod playlists;
pub mod users;

use crate::client::Spotify;
use crate::endpoints::audio_features::*;
use crate::endpoints::library::*;
use crate::endpoints::playlists::*;
use crate::endpoints::users::*;

// Endpoint function namespaces

impl Spotify {
    pub const fn audio_features(&self) -> AudioFeaturesApi<'_> {
        AudioFeaturesApi(self)
    }

    pub const fn library(&self) -> Library<'_> {
        Library(self)
    }

    pub const fn playlists(&self) -> Playlists<'_> {
        Playlists(self)
    }

    pub const fn users(&self) -> Users<'_> {
        Users(self)
    }
}
