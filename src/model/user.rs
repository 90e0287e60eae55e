// Use 3rd party
use serde::{Deserialize, Serialize};

// Use local
use crate::model::{ExternalUrls, Image};

/// The profile behind the access token (`GET /me`).
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Owner as embedded in playlist objects.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub display_name: Option<String>,
    pub uri: Option<String>,
}
