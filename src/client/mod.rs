//! REST client of the repair-service API.
//!
//! Every authenticated call goes through one pipeline: the session's bearer
//! token is attached, and a `401 Unauthorized` answer triggers a single
//! session refresh followed by exactly one retry of the original call.

mod auth;
mod component;
mod error;
mod notification;
mod refresh;
mod repair_request;
mod user;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    api::User,
    config,
    session::{self, Store},
};

pub use self::{
    error::{Error, Kind},
    refresh::RefreshEndpoint,
};

/// Name of the cookie carrying the refresh credential.
pub const REFRESH_COOKIE: &str = "refresh_token";

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    session: session::Manager,
    refresh: RefreshEndpoint,
}

impl Client {
    /// Builds a client and restores the session persisted in `store`.
    pub async fn new(
        config: &config::Api,
        store: impl Store + 'static,
    ) -> Result<Self, Error> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            http = http.connect_timeout(timeout);
        }
        let http = http.build()?;

        let base_url = config.base_url.trim_end_matches('/').to_owned();
        let refresh = RefreshEndpoint::new(
            http.clone(),
            format!("{base_url}/auth/refresh-token"),
        );
        let session = session::Manager::load(store, refresh.clone()).await?;

        Ok(Self {
            http,
            base_url,
            session,
            refresh,
        })
    }

    pub fn session(&self) -> &session::Manager {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn signed_in(&self) -> Result<User, Error> {
        self.session.user().await.ok_or(Error::Unauthenticated)
    }

    async fn send<T: DeserializeOwned>(&self, call: Call) -> Result<T, Error> {
        Ok(self.execute(call).await?.json::<T>().await?)
    }

    async fn send_unit(&self, call: Call) -> Result<(), Error> {
        self.execute(call).await.map(drop)
    }

    async fn execute(&self, call: Call) -> Result<Response, Error> {
        let token = self.session.token().await;
        let response = self.dispatch(&call, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return error_for_status(response).await;
        }

        let Some(rejected) = token else {
            return Err(Error::Unauthenticated);
        };
        let token =
            self.session.on_unauthorized(&rejected).await.map_err(|e| {
                tracing::debug!(path = %call.path, "giving up after 401: {e}");
                Error::Unauthenticated
            })?;

        let response = self.dispatch(&call, Some(&token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            if self.session.discard(&token).await? {
                tracing::warn!(
                    path = %call.path,
                    "renewed token rejected, signing out"
                );
            }
            return Err(Error::Unauthenticated);
        }
        error_for_status(response).await
    }

    async fn dispatch(
        &self,
        call: &Call,
        token: Option<&str>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self
            .http
            .request(call.method.clone(), self.url(&call.path))
            .query(&call.query);
        request = attach_token(request, token);
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        request.send().await
    }
}

/// Injects `Authorization: Bearer <token>` when there is a token.
pub fn attach_token(
    request: RequestBuilder,
    token: Option<&str>,
) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn error_for_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::from_response(status, &body))
}

/// Replayable description of an API call.
struct Call {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl Call {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}
