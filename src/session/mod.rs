//! Authenticated identity and its renewal.
//!
//! A [`Manager`] owns the only mutable copy of the session. Requests read
//! the bearer token from it and report a rejected token back through
//! [`Manager::on_unauthorized`], which renews it with at most one refresh
//! call in flight at a time.

pub mod store;

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use derive_more::Display;
use futures::{
    future::{BoxFuture, Shared},
    FutureExt as _,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::User;

pub use self::store::{FileStore, MemoryStore, Record, Store};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Outcome of a successful refresh call.
#[derive(Clone, Debug)]
pub struct Renewed {
    pub token: String,

    /// Rotated refresh credential, if the server issued a new one.
    pub refresh_token: Option<String>,
}

/// Exchanges a refresh credential for a new access token.
#[async_trait]
pub trait Refresh: Send + Sync {
    async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<Renewed, RefreshError>;
}

#[derive(Clone, Debug, Display, PartialEq)]
pub enum RefreshError {
    #[display("not signed in")]
    NoSession,

    #[display("refresh rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[display("refresh failed: {_0}")]
    Transport(String),

    #[display("session changed while refreshing")]
    Superseded,
}

impl std::error::Error for RefreshError {}

type InFlight = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

#[derive(Clone)]
pub struct Manager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Box<dyn Store>,
    refresher: Box<dyn Refresh>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    session: Option<Session>,
    refresh_token: Option<String>,

    /// Bumped whenever the session is replaced or torn down, so that a
    /// refresh started for an older session cannot write into a newer one.
    epoch: u64,

    in_flight: Option<InFlight>,
}

impl Manager {
    /// Restores whatever session `store` holds.
    ///
    /// An unreadable record is discarded and the manager starts signed out.
    pub async fn load(
        store: impl Store + 'static,
        refresher: impl Refresh + 'static,
    ) -> Result<Self, store::Error> {
        let record = match store.load().await {
            Ok(record) => record,
            Err(store::Error::Format(e)) => {
                tracing::warn!("discarding unreadable session: {e}");
                store.clear().await?;
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(record) = &record {
            tracing::debug!(
                user = %record.session.user.id,
                "restored session"
            );
        }
        let (session, refresh_token) = match record {
            Some(r) => (Some(r.session), r.refresh_token),
            None => (None, None),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                refresher: Box::new(refresher),
                state: Mutex::new(State {
                    session,
                    refresh_token,
                    ..State::default()
                }),
            }),
        })
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.state.lock().await.session.clone()
    }

    pub async fn token(&self) -> Option<String> {
        let state = self.inner.state.lock().await;
        state.session.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<User> {
        let state = self.inner.state.lock().await;
        state.session.as_ref().map(|s| s.user.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.state.lock().await.refresh_token.clone()
    }

    /// Replaces the session after a successful sign-in.
    pub async fn establish(
        &self,
        session: Session,
        refresh_token: Option<String>,
    ) -> Result<(), store::Error> {
        let mut state = self.inner.state.lock().await;
        state.epoch += 1;
        state.in_flight = None;
        state.session = Some(session.clone());
        state.refresh_token = refresh_token.clone();
        self.inner
            .store
            .save(&Record {
                session,
                refresh_token,
            })
            .await
    }

    /// Tears the session down if its token is still `token`.
    ///
    /// Returns whether the session was cleared.
    pub async fn discard(&self, token: &str) -> Result<bool, store::Error> {
        let mut state = self.inner.state.lock().await;
        if state.session.as_ref().map(|s| s.token.as_str()) != Some(token) {
            return Ok(false);
        }
        state.epoch += 1;
        state.in_flight = None;
        state.session = None;
        state.refresh_token = None;
        self.inner.store.clear().await?;
        Ok(true)
    }

    /// Tears the session down.
    pub async fn clear(&self) -> Result<(), store::Error> {
        let mut state = self.inner.state.lock().await;
        state.epoch += 1;
        state.in_flight = None;
        state.session = None;
        state.refresh_token = None;
        self.inner.store.clear().await
    }

    /// Renews the session after the server rejected `rejected`.
    ///
    /// Callers reporting the same token share one refresh call. A caller
    /// whose token was already replaced gets the current token back without
    /// a new refresh. On failure the session is cleared.
    pub async fn on_unauthorized(
        &self,
        rejected: &str,
    ) -> Result<String, RefreshError> {
        let flight = {
            let mut state = self.inner.state.lock().await;
            let current = match &state.session {
                Some(session) => session.token.clone(),
                None => return Err(RefreshError::NoSession),
            };
            if current != rejected {
                return Ok(current);
            }
            match &state.in_flight {
                Some(flight) => flight.clone(),
                None => {
                    let flight = refresh(
                        Arc::downgrade(&self.inner),
                        state.epoch,
                        state.refresh_token.clone(),
                    )
                    .boxed()
                    .shared();
                    state.in_flight = Some(flight.clone());
                    flight
                }
            }
        };
        flight.await
    }
}

async fn refresh(
    inner: Weak<Inner>,
    epoch: u64,
    refresh_token: Option<String>,
) -> Result<String, RefreshError> {
    let inner = inner.upgrade().ok_or(RefreshError::Superseded)?;

    tracing::debug!("refreshing access token");
    let result = inner.refresher.refresh(refresh_token).await;

    let mut state = inner.state.lock().await;
    if state.epoch != epoch {
        return Err(RefreshError::Superseded);
    }
    state.in_flight = None;

    match result {
        Ok(renewed) => {
            let Some(session) = state.session.as_mut() else {
                return Err(RefreshError::NoSession);
            };
            session.token = renewed.token.clone();
            let session = session.clone();
            if renewed.refresh_token.is_some() {
                state.refresh_token = renewed.refresh_token;
            }
            let record = Record {
                session,
                refresh_token: state.refresh_token.clone(),
            };
            if let Err(e) = inner.store.save(&record).await {
                tracing::warn!("failed to persist refreshed session: {e}");
            }
            tracing::info!(
                user = %record.session.user.id,
                "access token refreshed"
            );
            Ok(renewed.token)
        }
        Err(e) => {
            tracing::warn!("token refresh failed, signing out: {e}");
            state.epoch += 1;
            state.session = None;
            state.refresh_token = None;
            if let Err(e) = inner.store.clear().await {
                tracing::warn!("failed to clear persisted session: {e}");
            }
            Err(e)
        }
    }
}
