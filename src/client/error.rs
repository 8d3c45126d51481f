use derive_more::{Display, From};
use itertools::Itertools as _;
use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    api::repair_request::{self, Status},
    lifecycle,
    session::store,
};

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    #[from]
    Lifecycle(lifecycle::Error),

    #[display("not signed in")]
    Unauthenticated,

    #[display("forbidden: {_0}")]
    Forbidden(String),

    #[display("not found: {_0}")]
    NotFound(String),

    #[display("conflict: {_0}")]
    Conflict(String),

    #[display(
        "repair request {id} is {actual} now, the action expected it \
         to be {expected}"
    )]
    StatusChanged {
        id: repair_request::Id,
        expected: Status,
        actual: Status,
    },

    #[display("invalid input: {_0}")]
    Validation(String),

    #[display("server answered {status}: {detail}")]
    Api { status: StatusCode, detail: String },

    #[display("request failed: {_0}")]
    #[from]
    Transport(reqwest::Error),

    #[display("malformed payload: {_0}")]
    #[from]
    Json(serde_json::Error),

    #[display("{_0}")]
    #[from]
    Storage(store::Error),
}

/// User-facing category of an [`Error`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    /// Session is gone, sign in again.
    Unauthenticated,

    /// Signed in with a role that may not do this.
    Forbidden,

    /// Ticket or stock changed under the caller.
    Conflict,

    /// Input is missing or malformed, or the transition is not allowed.
    Validation,

    NotFound,

    Network,

    Server,
}

impl Error {
    pub fn kind(&self) -> Kind {
        use lifecycle::Error as L;

        match self {
            Self::Unauthenticated => Kind::Unauthenticated,
            Self::Forbidden(_) => Kind::Forbidden,
            Self::NotFound(_) => Kind::NotFound,
            Self::Conflict(_) | Self::StatusChanged { .. } => Kind::Conflict,
            Self::Validation(_) => Kind::Validation,
            Self::Api { .. } | Self::Json(_) | Self::Storage(_) => {
                Kind::Server
            }
            Self::Transport(_) => Kind::Network,
            Self::Lifecycle(e) => match e {
                L::WrongRole { .. }
                | L::NotOwner(_)
                | L::NotAssignedMaster(_) => Kind::Forbidden,
                L::InsufficientStock { .. } => Kind::Conflict,
                L::InvalidTransition { .. }
                | L::MasterNotAssigned(_)
                | L::MissingPrice(_)
                | L::MissingEndTime(_)
                | L::InvalidPrice(_)
                | L::EndDateNotInFuture(_)
                | L::ZeroQuantity(_)
                | L::UnknownComponent(_) => Kind::Validation,
            },
        }
    }

    /// Maps a non-success response onto the taxonomy.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = detail(body).unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("request failed").to_owned()
        });
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            StatusCode::FORBIDDEN => Self::Forbidden(detail),
            StatusCode::NOT_FOUND => Self::NotFound(detail),
            StatusCode::CONFLICT => Self::Conflict(detail),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(detail)
            }
            status => Self::Api { status, detail },
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lifecycle(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// Extracts the human-readable message of an error body.
///
/// Understands `detail`, `details` and `message` fields holding a string,
/// an object with a `message`, or a list of `{msg}` entries.
fn detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    ["detail", "details", "message"]
        .iter()
        .filter_map(|key| value.get(key))
        .find_map(message)
}

fn message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("message").and_then(message),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg").and_then(Value::as_str).or(item.as_str())
                })
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}
