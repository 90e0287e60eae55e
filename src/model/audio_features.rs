// Use 3rd party
use serde::{Deserialize, Serialize};

// Use built-in library
use std::fmt;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C♯/D♭", "D", "D♯/E♭", "E", "F", "F♯/G♭", "G", "G♯/A♭", "A", "A♯/B♭", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Mode {
    Minor,
    Major,
}

impl From<u8> for Mode {
    fn from(value: u8) -> Self {
        if value == 0 {
            Mode::Minor
        } else {
            Mode::Major
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Minor => 0,
            Mode::Major => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Minor => write!(f, "minor"),
            Mode::Major => write!(f, "major"),
        }
    }
}

/// Pitch class in standard notation, 0 = C through 11 = B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u8);

impl Key {
    pub fn new(pitch_class: u8) -> Option<Self> {
        (pitch_class < 12).then(|| Key(pitch_class))
    }

    pub fn pitch_class(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        PITCH_CLASSES[self.0 as usize]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Audio analysis descriptors for one track (`GET /audio-features`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub tempo: f32,
    /// -1 when no key was detected.
    pub key: i8,
    pub mode: Mode,
    pub energy: f32,
    pub danceability: f32,
    pub valence: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
    pub liveness: f32,
    pub speechiness: f32,
    pub loudness: f32,
    #[serde(default = "default_time_signature")]
    pub time_signature: u8,
    pub duration_ms: Option<u32>,
    pub uri: Option<String>,
}

fn default_time_signature() -> u8 {
    4
}

impl AudioFeatures {
    pub fn pitch_class(&self) -> Option<Key> {
        u8::try_from(self.key).ok().and_then(Key::new)
    }

    /// e.g. "A minor", or `None` when the key is unknown.
    pub fn key_signature(&self) -> Option<String> {
        self.pitch_class()
            .map(|key| format!("{} {}", key, self.mode))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}
