use crate::model::audio_features::{Key, Mode};

/// Inclusive bounds, each end optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub const fn any() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub const fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn at_most(max: T) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Bounds are checked independently; an inverted range matches nothing.
    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// What feature constraints do with a track that has no audio features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFeatures {
    /// Feature constraints are skipped for the track.
    #[default]
    Pass,
    /// The track is dropped as soon as any feature constraint is set.
    Exclude,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub tempo: Range<f32>,
    pub energy: Range<f32>,
    pub danceability: Range<f32>,
    pub valence: Range<f32>,
    pub key: Option<Key>,
    pub mode: Option<Mode>,
    pub popularity: Range<u8>,
    pub duration_ms: Range<u32>,
    pub include_explicit: bool,
    pub include_clean: bool,
    pub missing_features: MissingFeatures,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            tempo: Range::any(),
            energy: Range::any(),
            danceability: Range::any(),
            valence: Range::any(),
            key: None,
            mode: None,
            popularity: Range::any(),
            duration_ms: Range::any(),
            include_explicit: true,
            include_clean: true,
            missing_features: MissingFeatures::Pass,
        }
    }
}

impl FilterCriteria {
    pub fn tempo(mut self, range: Range<f32>) -> Self {
        self.tempo = range;
        self
    }

    pub fn energy(mut self, range: Range<f32>) -> Self {
        self.energy = range;
        self
    }

    pub fn danceability(mut self, range: Range<f32>) -> Self {
        self.danceability = range;
        self
    }

    pub fn valence(mut self, range: Range<f32>) -> Self {
        self.valence = range;
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn popularity(mut self, range: Range<u8>) -> Self {
        self.popularity = range;
        self
    }

    pub fn duration_ms(mut self, range: Range<u32>) -> Self {
        self.duration_ms = range;
        self
    }

    pub fn explicit(mut self, include_explicit: bool, include_clean: bool) -> Self {
        self.include_explicit = include_explicit;
        self.include_clean = include_clean;
        self
    }

    pub fn missing_features(mut self, policy: MissingFeatures) -> Self {
        self.missing_features = policy;
        self
    }

    /// True when any constraint needs audio features to be evaluated.
    pub fn has_feature_constraints(&self) -> bool {
        !self.tempo.is_unbounded()
            || !self.energy.is_unbounded()
            || !self.danceability.is_unbounded()
            || !self.valence.is_unbounded()
            || self.key.is_some()
            || self.mode.is_some()
    }
}
