//! Endpoint functions related to the user's saved tracks

use tokio_util::sync::CancellationToken;

use crate::client::{ClientResult, Partial, Spotify};
use crate::model::track::{SavedTrack, Track};
use crate::model::Page;

const SAVED_TRACKS: &str = "/me/tracks";

pub struct Library<'a>(pub &'a Spotify);

impl Library<'_> {
    pub async fn saved_tracks(&self, limit: u32, offset: u32) -> ClientResult<Page<SavedTrack>> {
        self.0.page(SAVED_TRACKS, limit, offset).await
    }

    pub async fn all_saved_tracks(&self) -> ClientResult<Partial<Track>> {
        self.all_saved_tracks_until(&CancellationToken::new()).await
    }

    pub async fn all_saved_tracks_until(
        &self,
        cancel: &CancellationToken,
    ) -> ClientResult<Partial<Track>> {
        let saved = self.0.collect_pages::<SavedTrack>(SAVED_TRACKS, cancel).await?;
        Ok(saved.map(|saved| Some(saved.track)))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{client, page_body, page_query, track_json};
    use mockito::Server;
    use serde_json::{json, Value};

    fn saved(n: usize) -> Value {
        json!({"added_at": "2024-01-01T00:00:00Z", "track": track_json(n)})
    }

    #[tokio::test]
    async fn saved_tracks_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/me/tracks")
            .match_query(page_query(20, 40))
            .with_body(page_body((40..45).map(saved).collect(), 45, 20, 40))
            .create_async()
            .await;

        let page = client(&server).library().saved_tracks(20, 40).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, 45);
        assert_eq!(page.items[0].track.id.as_deref(), Some("track40"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn all_saved_tracks_walks_pages() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/me/tracks")
            .match_query(page_query(50, 0))
            .with_body(page_body((0..50).map(saved).collect(), 60, 50, 0))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/me/tracks")
            .match_query(page_query(50, 50))
            .with_body(page_body((50..60).map(saved).collect(), 60, 50, 50))
            .expect(1)
            .create_async()
            .await;

        let tracks = client(&server).library().all_saved_tracks().await.unwrap();
        assert!(tracks.is_complete());
        assert_eq!(tracks.items.len(), 60);
        assert_eq!(tracks.items[59].id.as_deref(), Some("track59"));
        first.assert_async().await;
        second.assert_async().await;
    }
}
