//! Endpoint functions related to users

use crate::client::{ClientResult, Spotify};
use crate::model::user::User;

pub struct Users<'a>(pub &'a Spotify);

impl Users<'_> {
    /// Profile of the token's owner.
    pub async fn me(&self) -> ClientResult<User> {
        self.0.get("/me", &[]).await
    }
}
