use async_trait::async_trait;
use reqwest::{header::COOKIE, Response};
use serde::Deserialize;

use crate::session::{Refresh, RefreshError, Renewed};

use super::REFRESH_COOKIE;

/// `POST /auth/refresh-token`, authenticated by the refresh cookie rather
/// than by the expired bearer token.
#[derive(Clone, Debug)]
pub struct RefreshEndpoint {
    http: reqwest::Client,
    url: String,
}

impl RefreshEndpoint {
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl Refresh for RefreshEndpoint {
    async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<Renewed, RefreshError> {
        let mut request = self.http.post(&self.url);
        if let Some(credential) = &refresh_token {
            let cookie = format!("{REFRESH_COOKIE}={credential}");
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let rotated = refresh_cookie(&response);
        let TokenResponse { access_token } = response
            .json()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        Ok(Renewed {
            token: access_token,
            refresh_token: rotated,
        })
    }
}

#[derive(Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
}

/// Value of the refresh cookie set by `response`, if any.
pub(super) fn refresh_cookie(response: &Response) -> Option<String> {
    response
        .cookies()
        .find(|c| c.name() == REFRESH_COOKIE)
        .map(|c| c.value().to_owned())
}
