// Use 3rd party
use serde::{Deserialize, Serialize};

// Use local
use crate::model::ExternalUrls;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    pub uri: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}
