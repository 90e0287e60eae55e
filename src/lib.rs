//! Playlyzer is a wrapper for the Spotify Web API focused on playlist analysis:
//! fetch a playlist's tracks and their audio features, filter them by musical
//! attributes, and write the result back as a new playlist.
//!
//! ## Configuration
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! playlyzer = "0.1.0"
//! ```
//!
//! Playlyzer is asynchronous and runs on `tokio`. Requests are issued one at a
//! time; paginated and batched calls pause between requests
//! ([`ClientConfig`](config::ClientConfig)) and retry transient failures
//! ([`RetryPolicy`](config::RetryPolicy)).
//!
//! ## Authorization
//!
//! Every call needs a user access token. Playlyzer does not run the OAuth flow
//! or refresh tokens: obtain one elsewhere and hand it to
//! [`SpotifyCredentials`](auth::SpotifyCredentials). When it expires calls fail
//! with [`ClientError::Unauthorized`](client::ClientError::Unauthorized); build a
//! new client with a fresh token.
//!
//! ### Examples
//!
//! ```no_run
//! use playlyzer::analysis::{analyze, FeatureMap, FilterCriteria, Range};
//! use playlyzer::auth::SpotifyCredentials;
//! use playlyzer::client::Spotify;
//! use dotenv::dotenv;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     dotenv().ok();
//!
//!     // Reads SPOTIFY_ACCESS_TOKEN
//!     let client = Spotify::new(SpotifyCredentials::from_env()?)?;
//!     let me = client.users().me().await?;
//!
//!     let tracks = client.playlists().all_tracks("3cEYpjA9oz9GiPac4AsH4n").await?;
//!     let ids: Vec<String> = tracks.items.iter().filter_map(|t| t.id.clone()).collect();
//!     let lookup = client.audio_features().get_many(&ids).await?;
//!
//!     let annotated = FeatureMap::new().merge(lookup.features).annotate(&tracks.items);
//!     let criteria = FilterCriteria::default().tempo(Range::between(120.0, 130.0));
//!     let analysis = analyze(&annotated, &criteria);
//!     println!(
//!         "{} tracks, {}, avg {:.1} BPM",
//!         analysis.stats.count,
//!         analysis.stats.total_duration(),
//!         analysis.stats.avg_tempo
//!     );
//!
//!     let (playlist, added) = client
//!         .playlists()
//!         .create_from(&me.id, "120-130 BPM", "", false, &analysis.uris())
//!         .await?;
//!     let added = added?;
//!     if !added.is_complete() {
//!         eprintln!("{} tracks not added: {:?}", added.missing(), added.error);
//!     }
//!     println!("{:?}", playlist.external_url());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod auth;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod endpoints;
pub mod model;
