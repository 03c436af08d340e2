//! Session-holding client for the qBittorrent Web API.

use async_trait::async_trait;
use qbstop_config::{Credentials, ManagerEndpoint};
use qbstop_torrent_core::{ManagerError, ManagerResult, TorrentManager, TorrentSnapshot};
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::error::BuildError;
use crate::session::Session;

const LOGIN_PATH: &str = "api/v2/auth/login";
const LOGOUT_PATH: &str = "api/v2/auth/logout";
const TORRENTS_INFO_PATH: &str = "api/v2/torrents/info";
const TORRENTS_PAUSE_PATH: &str = "api/v2/torrents/pause";
// Web API 2.11 (qBittorrent 5) renamed `pause` to `stop`.
const TORRENTS_STOP_PATH: &str = "api/v2/torrents/stop";

#[derive(Debug, Clone)]
struct Endpoints {
    login: Url,
    logout: Url,
    torrents_info: Url,
    torrents_pause: Url,
    torrents_stop: Url,
}

impl Endpoints {
    fn new(base: &Url) -> Result<Self, BuildError> {
        let join = |path: &'static str| {
            base.join(path)
                .map_err(|source| BuildError::Endpoint { path, source })
        };
        Ok(Self {
            login: join(LOGIN_PATH)?,
            logout: join(LOGOUT_PATH)?,
            torrents_info: join(TORRENTS_INFO_PATH)?,
            torrents_pause: join(TORRENTS_PAUSE_PATH)?,
            torrents_stop: join(TORRENTS_STOP_PATH)?,
        })
    }
}

/// qBittorrent API client that owns the login session.
///
/// No request timeout is configured: a hung manager stalls the caller until
/// the transport gives up.
#[derive(Debug)]
pub struct QbitClient {
    http: Client,
    endpoints: Endpoints,
    credentials: Credentials,
    session: Option<Session>,
    use_stop_route: bool,
}

impl QbitClient {
    /// Build a client with a default HTTP stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the endpoint
    /// paths cannot be joined onto the base URL.
    pub fn new(endpoint: &ManagerEndpoint, credentials: Credentials) -> Result<Self, BuildError> {
        let http = Client::builder()
            .build()
            .map_err(|source| BuildError::HttpClient { source })?;
        Self::with_http_client(http, endpoint, credentials)
    }

    /// Build a client around an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint paths cannot be joined onto the base URL.
    pub fn with_http_client(
        http: Client,
        endpoint: &ManagerEndpoint,
        credentials: Credentials,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            http,
            endpoints: Endpoints::new(endpoint.base_url())?,
            credentials,
            session: None,
            use_stop_route: false,
        })
    }

    /// Whether a session is currently held.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }

    fn cookie(&self, operation: &'static str) -> ManagerResult<String> {
        self.session
            .as_ref()
            .map(|session| session.cookie_header().to_string())
            .ok_or(ManagerError::SessionExpired { operation })
    }

    fn check_status(&mut self, operation: &'static str, status: StatusCode) -> ManagerResult<()> {
        if matches!(status, StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED) {
            self.session = None;
            debug!(operation, status = status.as_u16(), "session rejected");
            return Err(ManagerError::SessionExpired { operation });
        }
        if !status.is_success() {
            return Err(ManagerError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn post_stop_request(
        &self,
        url: Url,
        cookie: &str,
        hash: &str,
    ) -> ManagerResult<StatusCode> {
        let response = self
            .http
            .post(url)
            .header(COOKIE, cookie)
            .form(&[("hashes", hash)])
            .send()
            .await
            .map_err(transport("pause"))?;
        Ok(response.status())
    }
}

fn transport(operation: &'static str) -> impl FnOnce(reqwest::Error) -> ManagerError {
    move |source| ManagerError::Transport {
        operation,
        source: Box::new(source),
    }
}

#[async_trait]
impl TorrentManager for QbitClient {
    async fn login(&mut self) -> ManagerResult<()> {
        const OPERATION: &str = "login";
        self.session = None;

        let response = self
            .http
            .post(self.endpoints.login.clone())
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(transport(OPERATION))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::UnexpectedStatus {
                operation: OPERATION,
                status: status.as_u16(),
            });
        }

        let session = Session::from_headers(response.headers()).ok_or_else(|| {
            ManagerError::InvalidCredentials {
                username: self.credentials.username.clone(),
            }
        })?;
        self.session = Some(session);
        Ok(())
    }

    async fn logout(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("no session held; skipping logout");
            return;
        };

        match self
            .http
            .post(self.endpoints.logout.clone())
            .header(COOKIE, session.cookie_header())
            .send()
            .await
        {
            Ok(response) => debug!(status = response.status().as_u16(), "logout completed"),
            Err(err) => debug!(error = %err, "logout request failed"),
        }
    }

    async fn list_seeding(&mut self) -> ManagerResult<Vec<TorrentSnapshot>> {
        const OPERATION: &str = "list";
        let cookie = self.cookie(OPERATION)?;

        let response = self
            .http
            .get(self.endpoints.torrents_info.clone())
            .query(&[("filter", "seeding")])
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(transport(OPERATION))?;
        self.check_status(OPERATION, response.status())?;

        let torrents = response
            .json::<Vec<TorrentSnapshot>>()
            .await
            .map_err(|source| ManagerError::Decode {
                operation: OPERATION,
                source: Box::new(source),
            })?;
        debug!(count = torrents.len(), "fetched seeding torrents");
        Ok(torrents)
    }

    async fn pause(&mut self, hash: &str) -> ManagerResult<()> {
        const OPERATION: &str = "pause";
        let cookie = self.cookie(OPERATION)?;

        let url = if self.use_stop_route {
            self.endpoints.torrents_stop.clone()
        } else {
            self.endpoints.torrents_pause.clone()
        };
        let mut status = self.post_stop_request(url, &cookie, hash).await?;

        if status == StatusCode::NOT_FOUND && !self.use_stop_route {
            debug!("pause endpoint missing; switching to stop endpoint");
            self.use_stop_route = true;
            let url = self.endpoints.torrents_stop.clone();
            status = self.post_stop_request(url, &cookie, hash).await?;
        }

        self.check_status(OPERATION, status)
    }
}
