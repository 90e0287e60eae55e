//! Endpoint functions related to audio features
//!
//! Applications on restricted permission tiers get `403` from the feature
//! endpoints. The first such answer is remembered by the client and every later
//! lookup short-circuits to [`FeatureAvailability::Unavailable`].

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

// Use built-in library
use std::collections::HashSet;

use crate::client::*;
use crate::diagnostics::Event;
use crate::model::audio_features::{AudioFeatures, AudioFeaturesResponse};

const AUDIO_FEATURES: &str = "/audio-features";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAvailability {
    Available,
    /// The service refuses feature lookups for this application.
    Unavailable,
}

/// Outcome of a batched feature lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLookup {
    /// Features found, in no particular order. Look them up by id.
    pub features: Vec<AudioFeatures>,
    /// Ids the service has no features for. Expected, not an error.
    pub without_features: Vec<String>,
    /// Ids whose request failed or never went out.
    pub failed: Vec<String>,
    pub availability: FeatureAvailability,
}

impl FeatureLookup {
    fn unavailable(ids: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            without_features: ids,
            failed: Vec::new(),
            availability: FeatureAvailability::Unavailable,
        }
    }

    /// Number of ids that could not be retrieved because of request failures.
    pub fn missing(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.availability == FeatureAvailability::Available
    }
}

fn denied(err: &ClientError) -> bool {
    err.status() == Some(StatusCode::FORBIDDEN)
}

fn unique_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(AsRef::as_ref)
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_owned)
        .collect()
}

pub struct AudioFeaturesApi<'a>(pub &'a Spotify);

impl AudioFeaturesApi<'_> {
    /// Features of a single track, `None` when the service has none.
    pub async fn get(&self, id: &str) -> ClientResult<Option<AudioFeatures>> {
        if self.0.features_denied() {
            return Ok(None);
        }
        let url = format!("{}/{}", AUDIO_FEATURES, id);
        let terminal = [StatusCode::NOT_FOUND, StatusCode::FORBIDDEN];
        match self.0.get_or_stop_on::<AudioFeatures>(&url, &[], &terminal).await {
            Ok(features) => Ok(Some(features)),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(err) if denied(&err) => {
                self.0.deny_features();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get_many<S: AsRef<str>>(&self, ids: &[S]) -> ClientResult<FeatureLookup> {
        self.get_many_until(ids, &CancellationToken::new()).await
    }

    /// Looks features up in chunks of `feature_chunk_size`, one request per chunk.
    pub async fn get_many_until<S: AsRef<str>>(
        &self,
        ids: &[S],
        cancel: &CancellationToken,
    ) -> ClientResult<FeatureLookup> {
        let ids = unique_ids(ids);
        if self.0.features_denied() {
            return Ok(FeatureLookup::unavailable(ids));
        }

        let chunk_size = self.0.config().feature_chunk_size;
        let mut features: Vec<AudioFeatures> = Vec::new();
        let mut failed: Vec<String> = Vec::new();
        let mut answered = false;
        let mut availability = FeatureAvailability::Available;
        let mut last_error: Option<ClientError> = None;

        for (index, chunk) in ids.chunks(chunk_size).enumerate() {
            let pending = &ids[index * chunk_size..];
            if index > 0 && !self.0.pause(self.0.config().chunk_delay, cancel).await {
                return self.stop(&ids, features, failed, pending, answered);
            }

            let query = [("ids", chunk.join(","))];
            let request = self.0.get_or_stop_on::<AudioFeaturesResponse>(
                AUDIO_FEATURES,
                &query,
                &[StatusCode::FORBIDDEN],
            );
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.stop(&ids, features, failed, pending, answered);
                }
                result = request => result,
            };

            match result {
                Ok(response) => {
                    answered = true;
                    let requested: HashSet<&str> = chunk.iter().map(String::as_str).collect();
                    features.extend(
                        response
                            .audio_features
                            .into_iter()
                            .flatten()
                            .filter(|features| requested.contains(features.id.as_str())),
                    );
                    self.0.emit(Event::ChunkCompleted {
                        path: AUDIO_FEATURES.to_owned(),
                        index,
                        size: chunk.len(),
                    });
                }
                Err(err @ ClientError::Unauthorized) => return Err(err),
                Err(err) if denied(&err) => {
                    self.0.deny_features();
                    availability = FeatureAvailability::Unavailable;
                    if !answered {
                        return Ok(FeatureLookup::unavailable(ids.clone()));
                    }
                    failed.extend(pending.iter().cloned());
                    break;
                }
                Err(err) => {
                    self.0.emit(Event::ChunkFailed {
                        path: AUDIO_FEATURES.to_owned(),
                        index,
                        size: chunk.len(),
                        reason: err.to_string(),
                    });
                    failed.extend(chunk.iter().cloned());
                    last_error = Some(err);
                }
            }
        }

        if let Some(err) = last_error {
            if !answered {
                return Err(err);
            }
        }

        Ok(Self::lookup(&ids, features, failed, availability))
    }

    fn lookup(
        ids: &[String],
        features: Vec<AudioFeatures>,
        failed: Vec<String>,
        availability: FeatureAvailability,
    ) -> FeatureLookup {
        let without_features = {
            let found: HashSet<&str> = features.iter().map(|f| f.id.as_str()).collect();
            let failed: HashSet<&str> = failed.iter().map(String::as_str).collect();
            ids.iter()
                .filter(|id| !found.contains(id.as_str()) && !failed.contains(id.as_str()))
                .cloned()
                .collect()
        };
        FeatureLookup {
            features,
            without_features,
            failed,
            availability,
        }
    }

    fn stop(
        &self,
        ids: &[String],
        features: Vec<AudioFeatures>,
        mut failed: Vec<String>,
        pending: &[String],
        answered: bool,
    ) -> ClientResult<FeatureLookup> {
        self.0.emit(Event::Cancelled {
            path: AUDIO_FEATURES.to_owned(),
        });
        if !answered {
            return Err(ClientError::Cancelled);
        }
        failed.extend(pending.iter().cloned());
        Ok(Self::lookup(ids, features, failed, FeatureAvailability::Available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{cancelling_client, client, fast_config, recording_client};
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    fn features_json(id: &str) -> Value {
        json!({
            "id": id, "tempo": 120.0, "key": 0, "mode": 1, "energy": 0.8,
            "danceability": 0.7, "valence": 0.6, "acousticness": 0.1,
            "instrumentalness": 0.0, "liveness": 0.2, "speechiness": 0.05,
            "loudness": -5.5, "time_signature": 4
        })
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|n| format!("track{}", n)).collect()
    }

    #[tokio::test]
    async fn chunks_120_ids_into_two_requests() {
        let mut server = Server::new_async().await;
        let ids = ids(0..120);
        let mut mocks = Vec::new();
        for chunk in ids.chunks(100) {
            let body: Vec<Value> = chunk.iter().map(|id| features_json(id)).collect();
            mocks.push(
                server
                    .mock("GET", "/audio-features")
                    .match_query(Matcher::UrlEncoded("ids".into(), chunk.join(",")))
                    .with_body(json!({ "audio_features": body }).to_string())
                    .expect(1)
                    .create_async()
                    .await,
            );
        }

        let (client, sink) = recording_client(&server);
        let lookup = client.audio_features().get_many(&ids).await.unwrap();

        assert!(lookup.is_complete());
        assert_eq!(lookup.features.len(), 120);
        assert!(lookup.without_features.is_empty());
        for mock in mocks {
            mock.assert_async().await;
        }
        let sizes: Vec<usize> = sink
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::ChunkCompleted { size, .. } => Some(size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![100, 20]);
    }

    #[tokio::test]
    async fn null_entries_are_reported_without_features() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::UrlEncoded("ids".into(), "a,b,c".into()))
            .with_body(json!({ "audio_features": [features_json("a"), null, features_json("c")] }).to_string())
            .create_async()
            .await;

        let lookup = client(&server)
            .audio_features()
            .get_many(&["a", "b", "c"])
            .await
            .unwrap();
        assert_eq!(lookup.features.len(), 2);
        assert_eq!(lookup.without_features, vec!["b"]);
        assert_eq!(lookup.missing(), 0);
        assert!(lookup.is_complete());
    }

    #[tokio::test]
    async fn ignores_features_that_were_not_requested() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::Any)
            .with_body(json!({ "audio_features": [features_json("a"), features_json("zzz")] }).to_string())
            .create_async()
            .await;

        let lookup = client(&server)
            .audio_features()
            .get_many(&["a", "a", "b"])
            .await
            .unwrap();
        let found: Vec<&str> = lookup.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(found, vec!["a"]);
        assert_eq!(lookup.without_features, vec!["b"]);
    }

    #[tokio::test]
    async fn failed_chunk_is_partial() {
        let mut server = Server::new_async().await;
        let ids = ids(0..150);
        let _first = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::UrlEncoded("ids".into(), ids[..100].join(",")))
            .with_status(500)
            .create_async()
            .await;
        let body: Vec<Value> = ids[100..].iter().map(|id| features_json(id)).collect();
        let _second = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::UrlEncoded("ids".into(), ids[100..].join(",")))
            .with_body(json!({ "audio_features": body }).to_string())
            .create_async()
            .await;

        let lookup = client(&server).audio_features().get_many(&ids).await.unwrap();
        assert_eq!(lookup.features.len(), 50);
        assert_eq!(lookup.missing(), 100);
        assert!(lookup.without_features.is_empty());
        assert!(!lookup.is_complete());
    }

    #[tokio::test]
    async fn cancelled_between_chunks_reports_pending_ids() {
        let mut server = Server::new_async().await;
        let ids = ids(0..250);
        let body: Vec<Value> = ids[..100].iter().map(|id| features_json(id)).collect();
        let first = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::UrlEncoded("ids".into(), ids[..100].join(",")))
            .with_body(json!({ "audio_features": body }).to_string())
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::UrlEncoded("ids".into(), ids[100..200].join(",")))
            .expect(0)
            .create_async()
            .await;

        let config = fast_config(&server).chunk_delay(Duration::from_secs(30));
        let (client, cancel) =
            cancelling_client(config, |event| matches!(event, Event::ChunkCompleted { .. }));
        let started = Instant::now();
        let lookup = client
            .audio_features()
            .get_many_until(&ids, &cancel)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(lookup.features.len(), 100);
        assert_eq!(lookup.failed, ids[100..].to_vec());
        assert_eq!(lookup.missing(), 150);
        assert!(lookup.without_features.is_empty());
        assert_eq!(lookup.availability, FeatureAvailability::Available);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_is_remembered_for_the_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/audio-features")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"status": 403, "message": "Forbidden"}}"#)
            .expect(1)
            .create_async()
            .await;

        let (client, sink) = recording_client(&server);
        let first = client.audio_features().get_many(&["a", "b"]).await.unwrap();
        let second = client.audio_features().get_many(&["c"]).await.unwrap();
        let single = client.audio_features().get("d").await.unwrap();

        assert_eq!(first.availability, FeatureAvailability::Unavailable);
        assert_eq!(first.without_features, vec!["a", "b"]);
        assert_eq!(second.availability, FeatureAvailability::Unavailable);
        assert!(single.is_none());
        mock.assert_async().await;

        let notices = sink
            .events()
            .iter()
            .filter(|event| **event == Event::FeaturesUnavailable)
            .count();
        assert_eq!(notices, 1);
    }

    #[tokio::test]
    async fn single_lookup() {
        let mut server = Server::new_async().await;
        let _found = server
            .mock("GET", "/audio-features/a")
            .with_body(features_json("a").to_string())
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/audio-features/b")
            .with_status(404)
            .create_async()
            .await;

        let client = client(&server);
        let found = client.audio_features().get("a").await.unwrap();
        assert_eq!(found.map(|f| f.tempo), Some(120.0));
        assert!(client.audio_features().get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_input_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let lookup = client(&server)
            .audio_features()
            .get_many::<String>(&[])
            .await
            .unwrap();
        assert!(lookup.features.is_empty());
        assert!(lookup.is_complete());
        mock.assert_async().await;
    }
}
