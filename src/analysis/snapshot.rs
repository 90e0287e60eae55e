// Use built-in library
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::audio_features::AudioFeatures;
use crate::model::track::Track;

/// A track paired with its audio features, if any arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTrack {
    pub track: Track,
    pub features: Option<AudioFeatures>,
}

impl AnnotatedTrack {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            features: None,
        }
    }

    pub fn has_features(&self) -> bool {
        self.features.is_some()
    }
}

/// Immutable id → features lookup. Merging produces a new map and leaves the
/// old one untouched, so readers holding an earlier snapshot never see it change.
#[derive(Debug, Clone, Default)]
pub struct FeatureMap {
    inner: Arc<HashMap<String, AudioFeatures>>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn merge<I>(&self, features: I) -> Self
    where
        I: IntoIterator<Item = AudioFeatures>,
    {
        let mut next = HashMap::clone(&self.inner);
        next.extend(features.into_iter().map(|f| (f.id.clone(), f)));
        Self {
            inner: Arc::new(next),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AudioFeatures> {
        self.inner.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Pairs every track with its features, preserving track order.
    pub fn annotate(&self, tracks: &[Track]) -> Vec<AnnotatedTrack> {
        tracks
            .iter()
            .map(|track| AnnotatedTrack {
                features: track.id.as_deref().and_then(|id| self.get(id)).cloned(),
                track: track.clone(),
            })
            .collect()
    }

    /// Ids of `tracks` that have no entry yet, in track order.
    pub fn pending_ids(&self, tracks: &[Track]) -> Vec<String> {
        tracks
            .iter()
            .filter_map(|track| track.id.as_deref())
            .filter(|id| !self.inner.contains_key(*id))
            .map(str::to_owned)
            .collect()
    }
}

impl FromIterator<AudioFeatures> for FeatureMap {
    fn from_iter<I: IntoIterator<Item = AudioFeatures>>(iter: I) -> Self {
        FeatureMap::new().merge(iter)
    }
}
