use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api::user;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Notification {
    pub id: Id,
    pub title: String,
    pub message: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub seen: bool,
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
pub struct Id(i64);

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Message addressed to one user.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct New {
    pub title: String,
    pub message: String,
    pub receiver_id: user::Id,
}
