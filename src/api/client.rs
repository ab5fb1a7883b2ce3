/// HTTP client for the ChezFlora REST backend
use crate::{
    api::{
        comments::CommentBoard, content::ContentStore, newsletter::NewsletterList,
        settings::SettingsStore, users::UserDirectory, UserScope,
    },
    auth::{Credentials, LoginRequest, Session},
    config::ApiConfig,
    error::{AdminError, AdminResult, RemoteErrorBody},
    models::User,
};
use reqwest::{multipart::Form, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// Response bodies arrive either bare or wrapped in `{"data": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Body of every status-change call
#[derive(Debug, Serialize)]
pub(crate) struct StatusBody<S: Serialize> {
    pub status: S,
}

/// Authenticated REST client
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl RestClient {
    /// Create a new client bound to a session
    pub fn new(config: &ApiConfig, session: Session) -> AdminResult<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdminError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn users(&self, scope: UserScope) -> UserDirectory {
        UserDirectory::new(self.clone(), scope)
    }

    pub fn comments(&self) -> CommentBoard {
        CommentBoard::new(self.clone())
    }

    pub fn newsletter(&self) -> NewsletterList {
        NewsletterList::new(self.clone())
    }

    pub fn content(&self) -> ContentStore {
        ContentStore::new(self.clone())
    }

    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(self.clone())
    }

    /// Sign in and store the returned credentials in the session
    pub async fn login(&self, email: &str, password: &str) -> AdminResult<User> {
        let body = LoginRequest {
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        };
        let request = self.http.post(self.url("/auth/login")).json(&body);
        let response = self.execute(request, &Method::POST, "/auth/login").await?;
        let credentials: Credentials = decode_body(response).await?;

        let user = credentials.user.clone();
        self.session.establish(credentials).await?;
        Ok(user)
    }

    /// Drop the session locally
    pub async fn logout(&self) -> AdminResult<()> {
        if let Some(user) = self.session.current_user().await {
            debug!("Signing out {}", user.email);
        }
        self.session.clear().await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> AdminResult<T> {
        let request = self.authorized(Method::GET, path).await?;
        let response = self.execute(request, &Method::GET, path).await?;
        decode_body(response).await
    }

    /// Send a request whose response body is ignored
    pub(crate) async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> AdminResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut request = self.authorized(method.clone(), path).await?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, &method, path).await?;
        Ok(())
    }

    pub(crate) async fn send_multipart(&self, method: Method, path: &str, form: Form) -> AdminResult<()> {
        let request = self.authorized(method.clone(), path).await?.multipart(form);
        self.execute(request, &method, path).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, method: Method, path: &str) -> AdminResult<RequestBuilder> {
        let token = self.session.token().await.ok_or_else(|| {
            AdminError::Authentication("Session expirée, veuillez vous reconnecter".to_string())
        })?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn execute(&self, request: RequestBuilder, method: &Method, path: &str) -> AdminResult<Response> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("remote_call", %method, path, %request_id);

        async move {
            debug!("Sending request");
            let response = request
                .header("X-Request-Id", request_id.to_string())
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                debug!(status = status.as_u16(), "Request succeeded");
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RemoteErrorBody>(&body)
                .ok()
                .and_then(RemoteErrorBody::into_message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            warn!(status = status.as_u16(), "Request failed: {}", message);

            match status {
                StatusCode::UNAUTHORIZED => {
                    if let Err(e) = self.session.clear().await {
                        warn!("Failed to clear rejected session: {}", e);
                    }
                    Err(AdminError::Authentication(message))
                }
                StatusCode::NOT_FOUND => Err(AdminError::NotFound(message)),
                _ => Err(AdminError::Remote(message)),
            }
        }
        .instrument(span)
        .await
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> AdminResult<T> {
    let bytes = response.bytes().await?;
    let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
    Ok(envelope.into_inner())
}

/// Path segment for a content key
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
