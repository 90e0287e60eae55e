use crate::analysis::criteria::{FilterCriteria, MissingFeatures};
use crate::analysis::snapshot::AnnotatedTrack;

/// Whether one track satisfies every constraint in `criteria`.
pub fn matches(annotated: &AnnotatedTrack, criteria: &FilterCriteria) -> bool {
    let track = &annotated.track;

    let features_pass = match &annotated.features {
        Some(features) => {
            criteria.tempo.contains(features.tempo)
                && criteria.energy.contains(features.energy)
                && criteria.danceability.contains(features.danceability)
                && criteria.valence.contains(features.valence)
                && criteria
                    .key
                    .map_or(true, |key| features.pitch_class() == Some(key))
                && criteria.mode.map_or(true, |mode| features.mode == mode)
        }
        None => match criteria.missing_features {
            MissingFeatures::Pass => true,
            MissingFeatures::Exclude => !criteria.has_feature_constraints(),
        },
    };

    let explicit_pass = if track.explicit {
        criteria.include_explicit
    } else {
        criteria.include_clean
    };

    features_pass
        && explicit_pass
        && criteria.popularity.contains(track.popularity)
        && criteria.duration_ms.contains(track.duration_ms)
}

/// Tracks that satisfy `criteria`, in input order.
pub fn filter_tracks<'a>(
    tracks: &'a [AnnotatedTrack],
    criteria: &FilterCriteria,
) -> Vec<&'a AnnotatedTrack> {
    tracks
        .iter()
        .filter(|annotated| matches(annotated, criteria))
        .collect()
}
