use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api::{component, User};

pub use crate::lifecycle::{Personalization, Status};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RepairRequest {
    pub id: Id,
    pub owner: User,
    #[serde(default)]
    pub master: Option<User>,
    pub device_model: String,
    pub issue_type: IssueType,
    pub problem_area: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub components: Vec<component::Allocation>,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
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

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    #[display("hardware")]
    Hardware,
    #[display("software")]
    Software,
    #[display("other")]
    Other,
}

/// Submission form of a new repair request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct New {
    pub device_model: String,
    pub issue_type: IssueType,
    pub problem_area: String,
    pub description: String,
    pub location: String,
}
