use reqwest::header::COOKIE;

use crate::{
    api::{user::Registration, User},
    session::{Refresh as _, Session},
};

use super::{
    attach_token, error_for_status,
    refresh::{refresh_cookie, TokenResponse},
    Call, Client, Error, REFRESH_COOKIE,
};

impl Client {
    /// Signs in with e-mail and password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let refresh_token = refresh_cookie(&response);
        let TokenResponse { access_token } = response.json().await?;
        self.establish(access_token, refresh_token).await
    }

    /// Asks the server to e-mail a one-time sign-in link.
    pub async fn send_auth_link(&self, email: &str) -> Result<(), Error> {
        let response = self
            .http
            .post(self.url("/auth/send-auth-link"))
            .form(&[("email", email)])
            .send()
            .await?;
        error_for_status(response).await.map(drop)
    }

    /// Signs in with the token of a one-time link.
    ///
    /// Verification only yields the refresh credential, the access token is
    /// obtained by refreshing right away.
    pub async fn verify_link(&self, token: &str) -> Result<Session, Error> {
        let response = self
            .http
            .post(self.url(&format!("/auth/verify/{token}")))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let credential =
            refresh_cookie(&response).ok_or(Error::Unauthenticated)?;

        let renewed = self
            .refresh
            .refresh(Some(credential.clone()))
            .await
            .map_err(|e| {
                tracing::warn!("refresh after link verification failed: {e}");
                Error::Unauthenticated
            })?;
        self.establish(
            renewed.token,
            renewed.refresh_token.or(Some(credential)),
        )
        .await
    }

    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<(), Error> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(registration)
            .send()
            .await?;
        error_for_status(response).await.map(drop)
    }

    /// Current user as the server sees it.
    pub async fn me(&self) -> Result<User, Error> {
        self.send(Call::get("/auth/me")).await
    }

    /// Signs out. The local session is destroyed even if the server
    /// cannot be reached.
    pub async fn logout(&self) -> Result<(), Error> {
        if let Some(credential) = self.session.refresh_token().await {
            let result = self
                .http
                .post(self.url("/auth/logout"))
                .header(COOKIE, format!("{REFRESH_COOKIE}={credential}"))
                .send()
                .await;
            match result {
                Ok(r) if r.status().is_success() => {}
                Ok(r) => tracing::warn!(
                    status = %r.status(),
                    "server refused logout"
                ),
                Err(e) => tracing::warn!("logout request failed: {e}"),
            }
        }
        self.session.clear().await?;
        tracing::info!("signed out");
        Ok(())
    }

    async fn establish(
        &self,
        token: String,
        refresh_token: Option<String>,
    ) -> Result<Session, Error> {
        let response =
            attach_token(self.http.get(self.url("/auth/me")), Some(&token))
                .send()
                .await?;
        let user = error_for_status(response).await?.json::<User>().await?;

        let session = Session { user, token };
        self.session
            .establish(session.clone(), refresh_token)
            .await?;
        tracing::info!(
            user = %session.user.id,
            role = %session.user.role,
            "signed in"
        );
        Ok(session)
    }
}
