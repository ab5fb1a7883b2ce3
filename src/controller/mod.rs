/// List-resource controllers
///
/// A controller owns the local copy of one remote collection. Mutations are
/// never optimistic: local state changes only once the remote call has
/// succeeded, either by resyncing the whole collection or by patching the
/// single record the call is known to have changed. Failures never escape a
/// controller; they become notices and the last known good state stays.

pub mod content;
pub mod screen;
pub mod settings;

pub use content::ContentController;
pub use screen::{Messages, Prepare, Reconcile, ScreenKind};
pub use settings::SettingsController;

use crate::{
    api::{CreateApi, IdOf, ListApi, RemoveApi, StatusApi, UpdateApi},
    error::{AdminError, AdminResult},
    models::{Entity, HasStatus},
    notify::{Notice, Notifier},
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Await a remote call unless the owning view has been torn down
pub(crate) async fn run_cancellable<T, F>(cancel: &CancellationToken, call: F) -> AdminResult<T>
where
    F: Future<Output = AdminResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(AdminError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AdminError::Cancelled),
        result = call => result,
    }
}

/// Surface a failure as a notice; cancellations stay silent
pub(crate) fn report_failure(
    notifier: &dyn Notifier,
    label: &str,
    action: &str,
    error: &AdminError,
) {
    if matches!(error, AdminError::Cancelled) {
        debug!(screen = label, "{} dropped: view cancelled", action);
        return;
    }
    warn!(screen = label, "{}: {}", action, error);
    notifier.notify(Notice::error(format!("{} : {}", action, error.user_message())));
}

/// Local mirror of one remote collection
pub struct ListController<A: ListApi> {
    api: A,
    screen: ScreenKind,
    notifier: Arc<dyn Notifier>,
    records: Vec<A::Record>,
    loading: bool,
    cancel: CancellationToken,
}

impl<A: ListApi> ListController<A> {
    pub fn new(api: A, screen: ScreenKind, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            screen,
            notifier,
            records: Vec::new(),
            loading: false,
            cancel: CancellationToken::new(),
        }
    }

    pub fn records(&self) -> &[A::Record] {
        &self.records
    }

    /// Immutable copy for one render pass
    pub fn snapshot(&self) -> Arc<[A::Record]> {
        Arc::from(self.records.clone())
    }

    pub fn get(&self, id: &IdOf<A>) -> Option<&A::Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn screen(&self) -> ScreenKind {
        self.screen
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Token the view cancels when it goes away
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Replace local state with the remote collection
    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let result = run_cancellable(&self.cancel, self.api.list_all()).await;
        self.loading = false;

        match result {
            Ok(records) => {
                info!(screen = self.screen.label(), "Loaded {} records", records.len());
                self.records = records;
                true
            }
            Err(e) => {
                self.fail(self.screen.messages().load_failed, &e);
                false
            }
        }
    }

    pub(crate) fn succeed(&self, message: &str) {
        self.notifier.notify(Notice::success(message));
    }

    pub(crate) fn fail(&self, action: &str, error: &AdminError) {
        report_failure(self.notifier.as_ref(), self.screen.label(), action, error);
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn remove_local(&mut self, id: &IdOf<A>) {
        self.records.retain(|record| record.id() != id);
    }
}

impl<A> ListController<A>
where
    A: CreateApi,
    A::Draft: Prepare,
{
    /// Create a record, then resync
    pub async fn create(&mut self, draft: A::Draft) -> bool {
        let messages = self.screen.messages();
        let draft = match draft.prepare(self.screen) {
            Ok(draft) => draft,
            Err(e) => {
                self.fail(messages.create_failed, &e);
                return false;
            }
        };

        match run_cancellable(&self.cancel, self.api.create(&draft)).await {
            Ok(()) => {
                info!(screen = self.screen.label(), "Created record");
                self.succeed(messages.created);
                self.load().await;
                true
            }
            Err(e) => {
                self.fail(messages.create_failed, &e);
                false
            }
        }
    }
}

impl<A> ListController<A>
where
    A: UpdateApi,
    A::Patch: Prepare,
{
    /// Update a record, then resync
    pub async fn update(&mut self, id: &IdOf<A>, patch: A::Patch) -> bool {
        let messages = self.screen.messages();
        let patch = match patch.prepare(self.screen) {
            Ok(patch) => patch,
            Err(e) => {
                self.fail(messages.update_failed, &e);
                return false;
            }
        };

        match run_cancellable(&self.cancel, self.api.update(id, &patch)).await {
            Ok(()) => {
                info!(screen = self.screen.label(), %id, "Updated record");
                self.succeed(messages.updated);
                self.load().await;
                true
            }
            Err(e) => {
                self.fail(messages.update_failed, &e);
                false
            }
        }
    }
}

impl<A: RemoveApi> ListController<A> {
    /// Delete a record, then drop it locally or resync
    pub async fn delete(&mut self, id: &IdOf<A>) -> bool {
        let messages = self.screen.messages();

        match run_cancellable(&self.cancel, self.api.remove(id)).await {
            Ok(()) => {
                info!(screen = self.screen.label(), %id, "Deleted record");
                self.succeed(messages.deleted);
                match self.screen.on_delete() {
                    Reconcile::Patch => self.remove_local(id),
                    Reconcile::Resync => {
                        self.load().await;
                    }
                }
                true
            }
            Err(e) => {
                self.fail(messages.delete_failed, &e);
                false
            }
        }
    }
}

impl<A> ListController<A>
where
    A: StatusApi,
    A::Record: HasStatus<A::Status>,
{
    /// Change a record's status, then patch that record or resync
    pub async fn set_status(&mut self, id: &IdOf<A>, status: A::Status) -> bool {
        let messages = self.screen.messages();

        match run_cancellable(&self.cancel, self.api.set_status(id, status)).await {
            Ok(()) => {
                info!(screen = self.screen.label(), %id, %status, "Status changed");
                self.succeed(messages.status_changed);
                let patched = match self.screen.on_status() {
                    Reconcile::Patch => self
                        .records
                        .iter_mut()
                        .find(|record| record.id() == id)
                        .map(|record| record.set_status(status))
                        .is_some(),
                    Reconcile::Resync => false,
                };
                if !patched {
                    self.load().await;
                }
                true
            }
            Err(e) => {
                self.fail(messages.status_failed, &e);
                false
            }
        }
    }

    /// Parse a raw status against the closed set before changing it
    pub async fn set_status_str(&mut self, id: &IdOf<A>, raw: &str) -> bool {
        match raw.parse::<A::Status>() {
            Ok(status) => self.set_status(id, status).await,
            Err(e) => {
                self.fail(self.screen.messages().status_failed, &e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryBackend, UserScope};
    use crate::models::{NewUser, Role, SubscriptionStatus, User, UserStatus, UserUpdate};
    use crate::notify::RecordingNotifier;
    use async_trait::async_trait;
    use std::time::Duration;

    async fn seeded_admins() -> (MemoryBackend, ListController<crate::api::memory::MemoryUsers>, Arc<RecordingNotifier>) {
        let backend = MemoryBackend::new();
        backend.seed_user("Awa", "awa@chezflora.com", Role::SuperAdmin, UserStatus::Active).await;
        backend.seed_user("Moussa", "moussa@chezflora.com", Role::Admin, UserStatus::Active).await;
        backend.seed_user("Fatou", "fatou@example.com", Role::Client, UserStatus::Active).await;

        let notifier = Arc::new(RecordingNotifier::new());
        let controller = ListController::new(
            backend.users(UserScope::Admins),
            ScreenKind::Admins,
            notifier.clone(),
        );
        (backend, controller, notifier)
    }

    #[tokio::test]
    async fn test_load_mirrors_remote() {
        let (backend, mut controller, notifier) = seeded_admins().await;
        assert!(controller.load().await);
        assert!(!controller.is_loading());

        let remote = backend.users(UserScope::Admins).list_all().await.unwrap();
        assert_eq!(controller.records(), remote.as_slice());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_state() {
        let (backend, mut controller, notifier) = seeded_admins().await;
        controller.load().await;
        let before = controller.snapshot();

        backend.set_offline(true).await;
        assert!(!controller.load().await);
        assert!(!controller.is_loading());
        assert_eq!(&*controller.snapshot(), &*before);

        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Erreur lors du chargement des administrateurs"));
    }

    #[tokio::test]
    async fn test_create_forces_role_and_resyncs() {
        let (_backend, mut controller, _notifier) = seeded_admins().await;
        controller.load().await;
        let before = controller.records().len();

        assert!(controller.create(NewUser::new("X", "x@chezflora.com", Role::Client)).await);

        assert_eq!(controller.records().len(), before + 1);
        let created: Vec<&User> = controller
            .records()
            .iter()
            .filter(|user| user.email == "x@chezflora.com")
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_remote() {
        let (backend, mut controller, notifier) = seeded_admins().await;
        assert!(!controller.create(NewUser::new("X", "not-an-email", Role::Admin)).await);
        assert!(backend.calls().await.iter().all(|call| !call.contains("create")));
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_update_resyncs() {
        let (_backend, mut controller, _notifier) = seeded_admins().await;
        controller.load().await;
        let id = controller.records()[1].id;

        let patch = UserUpdate {
            name: Some("Moussa K.".to_string()),
            ..Default::default()
        };
        assert!(controller.update(&id, patch).await);
        assert_eq!(controller.get(&id).unwrap().name, "Moussa K.");
    }

    #[tokio::test]
    async fn test_delete_removes_id() {
        let (_backend, mut controller, _notifier) = seeded_admins().await;
        controller.load().await;
        let id = controller.records()[0].id;

        assert!(controller.delete(&id).await);
        assert!(controller.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_status_change_touches_one_record() {
        let (_backend, mut controller, _notifier) = seeded_admins().await;
        controller.load().await;
        let target = controller.records()[0].id;
        let others: Vec<(i64, UserStatus)> = controller
            .records()
            .iter()
            .filter(|user| user.id != target)
            .map(|user| (user.id, user.status))
            .collect();

        assert!(controller.set_status(&target, UserStatus::Blocked).await);
        assert_eq!(controller.get(&target).unwrap().status, UserStatus::Blocked);
        for (id, status) in others {
            assert_eq!(controller.get(&id).unwrap().status, status);
        }
    }

    #[tokio::test]
    async fn test_invalid_status_string_fails_without_mutation() {
        let (backend, mut controller, notifier) = seeded_admins().await;
        controller.load().await;
        let before = controller.snapshot();
        let target = before[0].id;
        let calls_before = backend.calls().await.len();

        assert!(!controller.set_status_str(&target, "suspended").await);
        assert_eq!(&*controller.snapshot(), &*before);
        assert_eq!(backend.calls().await.len(), calls_before);
        assert_eq!(notifier.errors().len(), 1);

        assert!(controller.set_status_str(&target, "deleted").await);
        assert_eq!(controller.get(&target).unwrap().status, UserStatus::Deleted);
    }

    #[tokio::test]
    async fn test_newsletter_status_is_patched_locally() {
        let backend = MemoryBackend::new();
        let first = backend.seed_subscriber("a@x.com", SubscriptionStatus::Active).await;
        backend.seed_subscriber("b@x.com", SubscriptionStatus::Active).await;
        let notifier = Arc::new(RecordingNotifier::new());
        let mut controller = ListController::new(backend.newsletter(), ScreenKind::Newsletter, notifier);
        controller.load().await;

        assert!(controller.set_status(&first.id, SubscriptionStatus::Unsubscribed).await);
        assert_eq!(controller.get(&first.id).unwrap().status, SubscriptionStatus::Unsubscribed);

        let lists = backend
            .calls()
            .await
            .into_iter()
            .filter(|call| call == "newsletter.list")
            .count();
        assert_eq!(lists, 1);
    }

    #[tokio::test]
    async fn test_comment_delete_calls_remote_then_removes_locally() {
        let backend = MemoryBackend::new();
        let comment = backend.seed_comment(1, 2, "Superbe bouquet").await;
        backend.seed_comment(1, 3, "Livraison rapide").await;
        let notifier = Arc::new(RecordingNotifier::new());
        let mut controller = ListController::new(backend.comments(), ScreenKind::Comments, notifier);
        controller.load().await;

        assert!(controller.delete(&comment.id).await);
        assert!(controller.get(&comment.id).is_none());
        assert_eq!(controller.records().len(), 1);
        assert!(backend.calls().await.contains(&format!("comments.remove {}", comment.id)));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_record() {
        let backend = MemoryBackend::new();
        let comment = backend.seed_comment(1, 2, "Superbe bouquet").await;
        let notifier = Arc::new(RecordingNotifier::new());
        let mut controller =
            ListController::new(backend.comments(), ScreenKind::Comments, notifier.clone());
        controller.load().await;

        backend.set_offline(true).await;
        assert!(!controller.delete(&comment.id).await);
        assert!(controller.get(&comment.id).is_some());
        assert_eq!(
            notifier.errors()[0].message,
            "Erreur lors de la suppression du commentaire : Service indisponible"
        );
    }

    #[tokio::test]
    async fn test_admins_screen_cannot_touch_clients() {
        let (backend, mut controller, notifier) = seeded_admins().await;
        controller.load().await;
        let client = backend.users(UserScope::Clients).list_all().await.unwrap().remove(0);

        assert!(!controller.delete(&client.id).await);
        assert!(!controller.set_status(&client.id, UserStatus::Blocked).await);

        let clients = backend.users(UserScope::Clients).list_all().await.unwrap();
        assert_eq!(clients, vec![client]);
        assert!(notifier.notices().iter().all(Notice::is_error));
        assert!(notifier.errors()[0]
            .message
            .starts_with("Erreur lors de la suppression de l'administrateur"));
    }

    struct NeverAnswers;

    #[async_trait]
    impl ListApi for NeverAnswers {
        type Record = User;

        async fn list_all(&self) -> AdminResult<Vec<User>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_load_applies_nothing() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut controller = ListController::new(NeverAnswers, ScreenKind::Admins, notifier.clone());
        let cancel = controller.cancel_handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        assert!(!controller.load().await);
        assert!(controller.is_cancelled());
        assert!(!controller.is_loading());
        assert!(controller.records().is_empty());
        assert!(notifier.notices().is_empty());

        // Later calls are refused outright
        assert!(!controller.load().await);
        assert!(notifier.notices().is_empty());
    }
}
