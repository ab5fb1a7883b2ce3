/// In-process backend with the same semantics as the REST routes
///
/// Every call is recorded, and the backend can be switched offline (every
/// call fails) or stalled (every call hangs) to exercise failure and
/// cancellation paths.
use crate::{
    api::{
        users::check_scope, ContentApi, CreateApi, ListApi, RemoveApi, SettingsApi, StatusApi,
        UpdateApi, UserScope,
    },
    error::{AdminError, AdminResult},
    models::{
        Comment, ContentEntry, ContentUpdate, NewContent, NewUser, Role, Subscriber,
        SubscriptionStatus, User, UserStatus, UserUpdate,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    comments: Vec<Comment>,
    subscribers: Vec<Subscriber>,
    content: Vec<ContentEntry>,
    settings: BTreeMap<String, String>,
    next_id: i64,
    offline: bool,
    stalled: bool,
    calls: Vec<String>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self, scope: UserScope) -> MemoryUsers {
        MemoryUsers {
            backend: self.clone(),
            scope,
        }
    }

    pub fn comments(&self) -> MemoryComments {
        MemoryComments {
            backend: self.clone(),
        }
    }

    pub fn newsletter(&self) -> MemoryNewsletter {
        MemoryNewsletter {
            backend: self.clone(),
        }
    }

    pub fn content(&self) -> MemoryContent {
        MemoryContent {
            backend: self.clone(),
        }
    }

    pub fn settings(&self) -> MemorySettings {
        MemorySettings {
            backend: self.clone(),
        }
    }

    /// Make every subsequent call fail
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Make every subsequent call hang until dropped
    pub async fn set_stalled(&self, stalled: bool) {
        self.state.lock().await.stalled = stalled;
    }

    /// Calls received so far, e.g. `"users.set_status 3 blocked"`
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn seed_user(&self, name: &str, email: &str, role: Role, status: UserStatus) -> User {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let user = User {
            id: state.allocate_id(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            status,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.users.push(user.clone());
        user
    }

    pub async fn seed_comment(&self, post_id: i64, user_id: i64, content: &str) -> Comment {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let comment = Comment {
            id: state.allocate_id(),
            post_id,
            user_id,
            content: content.to_string(),
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        comment
    }

    pub async fn seed_subscriber(&self, email: &str, status: SubscriptionStatus) -> Subscriber {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let subscriber = Subscriber {
            id: state.allocate_id(),
            email: email.to_string(),
            status,
            created_at: now,
            updated_at: now,
        };
        state.subscribers.push(subscriber.clone());
        subscriber
    }

    pub async fn seed_content(&self, key: &str, value: &str) -> ContentEntry {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let entry = ContentEntry {
            key: key.to_string(),
            value: value.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.content.push(entry.clone());
        entry
    }

    pub async fn seed_setting(&self, key: &str, value: &str) {
        self.state
            .lock()
            .await
            .settings
            .insert(key.to_string(), value.to_string());
    }

    /// Record a call and hand out the state, honouring offline/stalled modes
    async fn enter(&self, call: String) -> AdminResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock().await;
        debug!("memory backend: {}", call);
        state.calls.push(call);

        if state.stalled {
            drop(state);
            std::future::pending::<()>().await;
            return Err(AdminError::Cancelled);
        }
        if state.offline {
            return Err(AdminError::Remote("Service indisponible".to_string()));
        }
        Ok(state)
    }
}

/// Accounts of one scope
#[derive(Debug, Clone)]
pub struct MemoryUsers {
    backend: MemoryBackend,
    scope: UserScope,
}

#[async_trait]
impl ListApi for MemoryUsers {
    type Record = User;

    async fn list_all(&self) -> AdminResult<Vec<User>> {
        let state = self.backend.enter(format!("{}.list", self.scope.label())).await?;
        Ok(state
            .users
            .iter()
            .filter(|user| self.scope.contains(user.role))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CreateApi for MemoryUsers {
    type Draft = NewUser;

    async fn create(&self, draft: &NewUser) -> AdminResult<()> {
        let mut state = self
            .backend
            .enter(format!("{}.create {} {}", self.scope.label(), draft.email, draft.role))
            .await?;

        if state.users.iter().any(|user| user.email.eq_ignore_ascii_case(&draft.email)) {
            return Err(AdminError::Remote("Email déjà utilisé".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: state.allocate_id(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            role: draft.role,
            status: UserStatus::Verification,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.users.push(user);
        Ok(())
    }
}

#[async_trait]
impl UpdateApi for MemoryUsers {
    type Patch = UserUpdate;

    async fn update(&self, id: &i64, patch: &UserUpdate) -> AdminResult<()> {
        let mut state = self
            .backend
            .enter(format!("{}.update {}", self.scope.label(), id))
            .await?;
        check_scope(self.scope, &state.users, *id)?;
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == *id)
            .ok_or_else(|| AdminError::NotFound(format!("Utilisateur {} introuvable", id)))?;

        patch.apply_to(user);
        user.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl RemoveApi for MemoryUsers {
    async fn remove(&self, id: &i64) -> AdminResult<()> {
        let mut state = self
            .backend
            .enter(format!("{}.remove {}", self.scope.label(), id))
            .await?;
        check_scope(self.scope, &state.users, *id)?;
        state.users.retain(|user| user.id != *id);
        Ok(())
    }
}

#[async_trait]
impl StatusApi for MemoryUsers {
    type Status = UserStatus;

    async fn set_status(&self, id: &i64, status: UserStatus) -> AdminResult<()> {
        let mut state = self
            .backend
            .enter(format!("{}.set_status {} {}", self.scope.label(), id, status))
            .await?;
        check_scope(self.scope, &state.users, *id)?;
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == *id)
            .ok_or_else(|| AdminError::NotFound(format!("Utilisateur {} introuvable", id)))?;
        user.status = status;
        user.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Blog comments
#[derive(Debug, Clone)]
pub struct MemoryComments {
    backend: MemoryBackend,
}

#[async_trait]
impl ListApi for MemoryComments {
    type Record = Comment;

    async fn list_all(&self) -> AdminResult<Vec<Comment>> {
        let state = self.backend.enter("comments.list".to_string()).await?;
        Ok(state.comments.clone())
    }
}

#[async_trait]
impl RemoveApi for MemoryComments {
    async fn remove(&self, id: &i64) -> AdminResult<()> {
        let mut state = self.backend.enter(format!("comments.remove {}", id)).await?;
        let before = state.comments.len();
        state.comments.retain(|comment| comment.id != *id);
        if state.comments.len() == before {
            return Err(AdminError::NotFound(format!("Commentaire {} introuvable", id)));
        }
        Ok(())
    }
}

/// Newsletter subscribers
#[derive(Debug, Clone)]
pub struct MemoryNewsletter {
    backend: MemoryBackend,
}

#[async_trait]
impl ListApi for MemoryNewsletter {
    type Record = Subscriber;

    async fn list_all(&self) -> AdminResult<Vec<Subscriber>> {
        let state = self.backend.enter("newsletter.list".to_string()).await?;
        Ok(state.subscribers.clone())
    }
}

#[async_trait]
impl RemoveApi for MemoryNewsletter {
    async fn remove(&self, id: &i64) -> AdminResult<()> {
        let mut state = self.backend.enter(format!("newsletter.remove {}", id)).await?;
        let before = state.subscribers.len();
        state.subscribers.retain(|subscriber| subscriber.id != *id);
        if state.subscribers.len() == before {
            return Err(AdminError::NotFound(format!("Abonné {} introuvable", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl StatusApi for MemoryNewsletter {
    type Status = SubscriptionStatus;

    async fn set_status(&self, id: &i64, status: SubscriptionStatus) -> AdminResult<()> {
        let mut state = self
            .backend
            .enter(format!("newsletter.set_status {} {}", id, status))
            .await?;
        let subscriber = state
            .subscribers
            .iter_mut()
            .find(|subscriber| subscriber.id == *id)
            .ok_or_else(|| AdminError::NotFound(format!("Abonné {} introuvable", id)))?;
        subscriber.status = status;
        subscriber.updated_at = Utc::now();
        Ok(())
    }
}

/// Site content
#[derive(Debug, Clone)]
pub struct MemoryContent {
    backend: MemoryBackend,
}

#[async_trait]
impl ListApi for MemoryContent {
    type Record = ContentEntry;

    async fn list_all(&self) -> AdminResult<Vec<ContentEntry>> {
        let state = self.backend.enter("content.list".to_string()).await?;
        Ok(state.content.clone())
    }
}

#[async_trait]
impl CreateApi for MemoryContent {
    type Draft = NewContent;

    async fn create(&self, draft: &NewContent) -> AdminResult<()> {
        let mut state = self.backend.enter(format!("content.create {}", draft.key)).await?;
        if state.content.iter().any(|entry| entry.key == draft.key) {
            return Err(AdminError::Remote(format!("La clé {} existe déjà", draft.key)));
        }
        let now = Utc::now();
        let entry = ContentEntry {
            key: draft.key.clone(),
            value: draft.value.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.content.push(entry);
        Ok(())
    }
}

#[async_trait]
impl RemoveApi for MemoryContent {
    async fn remove(&self, key: &String) -> AdminResult<()> {
        let mut state = self.backend.enter(format!("content.remove {}", key)).await?;
        let before = state.content.len();
        state.content.retain(|entry| &entry.key != key);
        if state.content.len() == before {
            return Err(AdminError::NotFound(format!("Contenu {} introuvable", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentApi for MemoryContent {
    async fn update_content(&self, key: &str, update: &ContentUpdate) -> AdminResult<()> {
        let call = match update {
            ContentUpdate::Text(_) => format!("content.update_text {}", key),
            ContentUpdate::File(upload) => format!("content.upload {} {}", key, upload.file_name),
        };
        let mut state = self.backend.enter(call).await?;
        update.check_key(key)?;

        let entry = state
            .content
            .iter_mut()
            .find(|entry| entry.key == key)
            .ok_or_else(|| AdminError::NotFound(format!("Contenu {} introuvable", key)))?;

        entry.value = match update {
            ContentUpdate::Text(value) => value.clone(),
            ContentUpdate::File(upload) => format!("/uploads/{}-{}", Uuid::new_v4(), upload.file_name),
        };
        entry.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Shop settings
#[derive(Debug, Clone)]
pub struct MemorySettings {
    backend: MemoryBackend,
}

#[async_trait]
impl SettingsApi for MemorySettings {
    async fn get_all(&self) -> AdminResult<BTreeMap<String, String>> {
        let state = self.backend.enter("settings.get_all".to_string()).await?;
        Ok(state.settings.clone())
    }

    async fn update_many(&self, values: &BTreeMap<String, String>) -> AdminResult<()> {
        let mut state = self
            .backend
            .enter(format!("settings.update_many {}", values.len()))
            .await?;
        state.settings.extend(values.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_users_are_scoped() {
        let backend = MemoryBackend::new();
        backend.seed_user("Awa", "awa@chezflora.com", Role::SuperAdmin, UserStatus::Active).await;
        backend.seed_user("Moussa", "moussa@chezflora.com", Role::Admin, UserStatus::Active).await;
        backend.seed_user("Fatou", "fatou@example.com", Role::Client, UserStatus::Active).await;

        assert_eq!(backend.users(UserScope::Admins).list_all().await.unwrap().len(), 2);
        assert_eq!(backend.users(UserScope::Clients).list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let backend = MemoryBackend::new();
        backend.seed_user("Fatou", "fatou@example.com", Role::Client, UserStatus::Active).await;

        let result = backend
            .users(UserScope::Clients)
            .create(&NewUser::new("Fatou bis", "FATOU@example.com", Role::Client))
            .await;
        assert!(matches!(result, Err(AdminError::Remote(_))));
    }

    #[tokio::test]
    async fn test_user_mutations_stay_in_scope() {
        let backend = MemoryBackend::new();
        let client = backend.seed_user("Fatou", "fatou@example.com", Role::Client, UserStatus::Active).await;
        let admins = backend.users(UserScope::Admins);

        assert!(matches!(admins.remove(&client.id).await, Err(AdminError::NotFound(_))));
        assert!(admins.set_status(&client.id, UserStatus::Blocked).await.is_err());
        let patch = UserUpdate {
            name: Some("Fatou S.".to_string()),
            ..Default::default()
        };
        assert!(admins.update(&client.id, &patch).await.is_err());

        let clients = backend.users(UserScope::Clients).list_all().await.unwrap();
        assert_eq!(clients, vec![client]);
    }

    #[tokio::test]
    async fn test_offline_calls_fail_and_are_recorded() {
        let backend = MemoryBackend::new();
        backend.set_offline(true).await;

        assert!(backend.comments().list_all().await.is_err());
        assert_eq!(backend.calls().await, vec!["comments.list".to_string()]);
    }

    #[tokio::test]
    async fn test_upload_stores_reference() {
        let backend = MemoryBackend::new();
        backend.seed_content("hero_image", "/uploads/old.png").await;
        let upload = crate::models::FileUpload::from_bytes(
            "bouquet.png",
            crate::models::content::fixtures::PNG_BYTES.to_vec(),
        )
        .unwrap();

        backend
            .content()
            .update_content("hero_image", &ContentUpdate::File(upload))
            .await
            .unwrap();
        let entry = backend.content().list_all().await.unwrap().remove(0);
        assert!(entry.value.starts_with("/uploads/"));
        assert!(entry.value.ends_with("-bouquet.png"));
    }

    #[tokio::test]
    async fn test_settings_update_merges() {
        let backend = MemoryBackend::new();
        backend.seed_setting("currency", "EUR").await;

        let mut values = BTreeMap::new();
        values.insert("delivery_price".to_string(), "6".to_string());
        backend.settings().update_many(&values).await.unwrap();

        let all = backend.settings().get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["delivery_price"], "6");
    }
}
