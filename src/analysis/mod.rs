//! Filtering and summary statistics over a playlist's tracks.
//!
//! Everything here is synchronous and pure: feed it the latest snapshot of
//! tracks and criteria, get back the matching subset and its statistics.
//!
//! ```
//! use playlyzer::analysis::{analyze, FeatureMap, FilterCriteria, Range};
//! use playlyzer::model::track::Track;
//!
//! let tracks = vec![Track { id: Some("a".to_owned()), popularity: 80, ..Default::default() }];
//! let annotated = FeatureMap::new().annotate(&tracks);
//! let criteria = FilterCriteria::default().popularity(Range::at_least(50));
//! let analysis = analyze(&annotated, &criteria);
//! assert_eq!(analysis.stats.count, 1);
//! assert!(!analysis.stats.has_audio_features);
//! ```

pub mod criteria;
pub mod filter;
pub mod snapshot;
pub mod stats;

pub use criteria::{FilterCriteria, MissingFeatures, Range};
pub use filter::{filter_tracks, matches};
pub use snapshot::{AnnotatedTrack, FeatureMap};
pub use stats::{format_duration, AggregateStats};

/// A filtered view over annotated tracks plus its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis<'a> {
    pub tracks: Vec<&'a AnnotatedTrack>,
    pub stats: AggregateStats,
}

impl Analysis<'_> {
    /// URIs of the matching tracks in order, ready for playlist creation.
    pub fn uris(&self) -> Vec<String> {
        self.tracks
            .iter()
            .map(|annotated| annotated.track.uri.clone())
            .filter(|uri| !uri.is_empty())
            .collect()
    }
}

pub fn analyze<'a>(tracks: &'a [AnnotatedTrack], criteria: &FilterCriteria) -> Analysis<'a> {
    let tracks = filter_tracks(tracks, criteria);
    let stats = AggregateStats::compute(tracks.iter().copied());
    Analysis { tracks, stats }
}
