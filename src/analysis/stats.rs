use crate::analysis::snapshot::AnnotatedTrack;

/// Summary of a set of tracks.
///
/// Feature means are taken over the tracks that have features only, and are
/// `0.0` when none do. Popularity and duration cover every track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    pub count: usize,
    pub tracks_with_features: usize,
    pub has_audio_features: bool,
    pub total_duration_ms: u64,
    pub avg_popularity: f64,
    pub avg_tempo: f64,
    pub avg_energy: f64,
    pub avg_danceability: f64,
    pub avg_valence: f64,
    pub avg_acousticness: f64,
    pub avg_instrumentalness: f64,
    pub avg_liveness: f64,
    pub avg_speechiness: f64,
    pub avg_loudness: f64,
}

#[derive(Default)]
struct Sums {
    tempo: f64,
    energy: f64,
    danceability: f64,
    valence: f64,
    acousticness: f64,
    instrumentalness: f64,
    liveness: f64,
    speechiness: f64,
    loudness: f64,
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl AggregateStats {
    pub fn compute<'a, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'a AnnotatedTrack>,
    {
        let mut count = 0usize;
        let mut with_features = 0usize;
        let mut total_duration_ms = 0u64;
        let mut popularity = 0u64;
        let mut sums = Sums::default();

        for annotated in tracks {
            count += 1;
            total_duration_ms += u64::from(annotated.track.duration_ms);
            popularity += u64::from(annotated.track.popularity);

            if let Some(features) = &annotated.features {
                with_features += 1;
                sums.tempo += f64::from(features.tempo);
                sums.energy += f64::from(features.energy);
                sums.danceability += f64::from(features.danceability);
                sums.valence += f64::from(features.valence);
                sums.acousticness += f64::from(features.acousticness);
                sums.instrumentalness += f64::from(features.instrumentalness);
                sums.liveness += f64::from(features.liveness);
                sums.speechiness += f64::from(features.speechiness);
                sums.loudness += f64::from(features.loudness);
            }
        }

        Self {
            count,
            tracks_with_features: with_features,
            has_audio_features: with_features > 0,
            total_duration_ms,
            avg_popularity: mean(popularity as f64, count),
            avg_tempo: mean(sums.tempo, with_features),
            avg_energy: mean(sums.energy, with_features),
            avg_danceability: mean(sums.danceability, with_features),
            avg_valence: mean(sums.valence, with_features),
            avg_acousticness: mean(sums.acousticness, with_features),
            avg_instrumentalness: mean(sums.instrumentalness, with_features),
            avg_liveness: mean(sums.liveness, with_features),
            avg_speechiness: mean(sums.speechiness, with_features),
            avg_loudness: mean(sums.loudness, with_features),
        }
    }

    /// Share of tracks with features, in `[0, 1]`.
    pub fn feature_coverage(&self) -> f64 {
        mean(self.tracks_with_features as f64, self.count)
    }

    pub fn total_duration(&self) -> String {
        format_duration(self.total_duration_ms)
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_duration(duration_ms: u64) -> String {
    let seconds = duration_ms / 1000;
    let (hours, minutes, seconds) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
