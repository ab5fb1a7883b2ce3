/// Session context for authenticated calls
///
/// Holds the bearer token returned at login and the admin it belongs to.
/// The session is created explicitly, handed to the `RestClient`, and its
/// lifecycle is tied to login/logout; persistence to disk is optional.
use crate::error::{AdminError, AdminResult};
use crate::models::User;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Login form payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token and account returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

impl Credentials {
    /// Expiry from the token's `exp` claim
    ///
    /// The signature is checked by the backend; only the claim is read here.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(&self.token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        data.claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Tokens without a readable `exp` are treated as valid
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |expires_at| expires_at <= now)
    }

    /// Only admins and superadmins may hold a dashboard session
    pub fn ensure_staff(&self) -> AdminResult<()> {
        if self.user.role.is_staff() {
            Ok(())
        } else {
            Err(AdminError::Authentication(
                "Accès réservé aux administrateurs".to_string(),
            ))
        }
    }
}

/// Shared session handle
#[derive(Debug, Clone, Default)]
pub struct Session {
    credentials: Arc<RwLock<Option<Credentials>>>,
    file: Option<PathBuf>,
}

impl Session {
    /// Session kept in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Session persisted to `file`, starting empty
    pub fn persisted(file: PathBuf) -> Self {
        Self {
            credentials: Arc::new(RwLock::new(None)),
            file: Some(file),
        }
    }

    /// Reload credentials saved by a previous run
    ///
    /// A missing, unreadable or expired file yields an empty session.
    pub async fn restore(file: Option<PathBuf>) -> AdminResult<Self> {
        let Some(path) = file else {
            return Ok(Self::in_memory());
        };
        let session = Self::persisted(path.clone());

        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Credentials>(&bytes) {
                Ok(credentials) if credentials.is_expired_at(Utc::now()) => {
                    info!("Saved session for {} has expired", credentials.user.email);
                    session.clear().await?;
                }
                Ok(credentials) => {
                    debug!("Restored session for {}", credentials.user.email);
                    *session.credentials.write().await = Some(credentials);
                }
                Err(e) => warn!("Ignoring corrupt session file {}: {}", path.display(), e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AdminError::Io(e)),
        }

        Ok(session)
    }

    /// Bearer token for the next request, if the session is still valid
    pub async fn token(&self) -> Option<String> {
        let guard = self.credentials.read().await;
        guard
            .as_ref()
            .filter(|credentials| !credentials.is_expired_at(Utc::now()))
            .map(|credentials| credentials.token.clone())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|credentials| credentials.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    /// Store credentials after a successful login
    pub async fn establish(&self, credentials: Credentials) -> AdminResult<()> {
        credentials.ensure_staff()?;

        if let Some(path) = &self.file {
            write_credentials(path, &credentials).await?;
        }

        info!("Signed in as {} ({})", credentials.user.email, credentials.user.role);
        *self.credentials.write().await = Some(credentials);
        Ok(())
    }

    /// Forget credentials (logout, or a 401 from the backend)
    pub async fn clear(&self) -> AdminResult<()> {
        self.credentials.write().await.take();

        if let Some(path) = &self.file {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(AdminError::Io(e)),
            }
        }
        Ok(())
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

async fn write_credentials(path: &Path, credentials: &Credentials) -> AdminResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(credentials)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
