/// Site content screen: text edits and staged image uploads
use super::{run_cancellable, ListController, ScreenKind};
use crate::{
    api::{ContentApi, CreateApi, RemoveApi},
    error::{AdminError, AdminResult},
    models::{content::is_image_key, ContentEntry, ContentUpdate, FileUpload, NewContent},
    notify::Notifier,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

const IMAGE_UPDATED: &str = "Image mise à jour avec succès";
const IMAGE_UPDATE_FAILED: &str = "Erreur lors de l'envoi de l'image";

/// Content entries plus locally held files waiting to be uploaded
pub struct ContentController<A: ContentApi> {
    list: ListController<A>,
    pending: BTreeMap<String, FileUpload>,
}

impl<A: ContentApi> ContentController<A> {
    pub fn new(api: A, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: ListController::new(api, ScreenKind::Content, notifier),
            pending: BTreeMap::new(),
        }
    }

    pub fn list(&self) -> &ListController<A> {
        &self.list
    }

    pub fn entries(&self) -> &[ContentEntry] {
        self.list.records()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    /// Resync, keeping staged files whose key still exists
    pub async fn load(&mut self) -> bool {
        if !self.list.load().await {
            return false;
        }
        let list = &self.list;
        self.pending.retain(|key, _| {
            let keep = list.get(key).is_some();
            if !keep {
                debug!("Dropping staged upload for vanished key {}", key);
            }
            keep
        });
        true
    }

    /// Hold a file for an image key until `commit_upload`
    pub fn stage_upload(&mut self, key: &str, upload: FileUpload) -> AdminResult<()> {
        if !is_image_key(key) {
            return Err(AdminError::Validation(format!(
                "{} n'accepte pas d'image",
                key
            )));
        }
        debug!("Staged {} for {}", upload.file_name, key);
        self.pending.insert(key.to_string(), upload);
        Ok(())
    }

    pub fn pending(&self, key: &str) -> Option<&FileUpload> {
        self.pending.get(key)
    }

    pub fn pending_keys(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    pub fn discard_upload(&mut self, key: &str) -> Option<FileUpload> {
        self.pending.remove(key)
    }

    /// Upload the staged file for `key`, then resync
    ///
    /// The file stays staged when the upload fails.
    pub async fn commit_upload(&mut self, key: &str) -> bool {
        let Some(upload) = self.pending.get(key).cloned() else {
            self.list.fail(
                IMAGE_UPDATE_FAILED,
                &AdminError::Validation(format!("aucun fichier en attente pour {}", key)),
            );
            return false;
        };

        let update = ContentUpdate::File(upload);
        if !self.apply(key, &update, IMAGE_UPDATED, IMAGE_UPDATE_FAILED).await {
            return false;
        }
        self.pending.remove(key);
        self.load().await;
        true
    }

    /// Replace a text value, then resync
    pub async fn update_text(&mut self, key: &str, value: impl Into<String>) -> bool {
        let messages = ScreenKind::Content.messages();
        let update = ContentUpdate::Text(value.into());
        if !self.apply(key, &update, messages.updated, messages.update_failed).await {
            return false;
        }
        self.load().await;
        true
    }

    async fn apply(&self, key: &str, update: &ContentUpdate, success: &str, failure: &str) -> bool {
        if let Err(e) = update.check_key(key) {
            self.list.fail(failure, &e);
            return false;
        }

        let call = self.list.api().update_content(key, update);
        match run_cancellable(self.list.cancel_token(), call).await {
            Ok(()) => {
                info!(key, "Content updated");
                self.list.succeed(success);
                true
            }
            Err(e) => {
                self.list.fail(failure, &e);
                false
            }
        }
    }
}

impl<A> ContentController<A>
where
    A: ContentApi + CreateApi<Draft = NewContent>,
{
    pub async fn create(&mut self, draft: NewContent) -> bool {
        self.list.create(draft).await
    }
}

impl<A> ContentController<A>
where
    A: ContentApi + RemoveApi,
{
    pub async fn delete(&mut self, key: &String) -> bool {
        let removed = self.list.delete(key).await;
        if removed {
            self.pending.remove(key);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use crate::models::content::fixtures::PNG_BYTES;
    use crate::notify::RecordingNotifier;

    fn png(name: &str) -> FileUpload {
        FileUpload::from_bytes(name, PNG_BYTES.to_vec()).unwrap()
    }

    async fn controller() -> (
        MemoryBackend,
        ContentController<crate::api::memory::MemoryContent>,
        Arc<RecordingNotifier>,
    ) {
        let backend = MemoryBackend::new();
        backend.seed_content("hero_title", "Des fleurs pour chaque instant").await;
        backend.seed_content("hero_image", "/uploads/old.png").await;
        let notifier = Arc::new(RecordingNotifier::new());
        let mut controller = ContentController::new(backend.content(), notifier.clone());
        controller.load().await;
        (backend, controller, notifier)
    }

    #[tokio::test]
    async fn test_update_text_resyncs() {
        let (_backend, mut controller, _notifier) = controller().await;
        assert!(controller.update_text("hero_title", "Bouquets de saison").await);
        assert_eq!(controller.list().get(&"hero_title".to_string()).unwrap().value, "Bouquets de saison");
    }

    #[tokio::test]
    async fn test_stage_and_commit_upload() {
        let (_backend, mut controller, _notifier) = controller().await;
        controller.stage_upload("hero_image", png("roses.png")).unwrap();
        assert!(controller.pending("hero_image").is_some());

        assert!(controller.commit_upload("hero_image").await);
        assert!(controller.pending("hero_image").is_none());
        let entry = controller.list().get(&"hero_image".to_string()).unwrap();
        assert!(entry.value.ends_with("-roses.png"));
    }

    #[tokio::test]
    async fn test_staging_requires_image_key() {
        let (_backend, mut controller, _notifier) = controller().await;
        assert!(controller.stage_upload("hero_title", png("roses.png")).is_err());
        assert_eq!(controller.pending_keys().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_stays_staged() {
        let (backend, mut controller, notifier) = controller().await;
        controller.stage_upload("hero_image", png("roses.png")).unwrap();

        backend.set_offline(true).await;
        assert!(!controller.commit_upload("hero_image").await);
        assert!(controller.pending("hero_image").is_some());
        assert_eq!(controller.list().get(&"hero_image".to_string()).unwrap().value, "/uploads/old.png");
        assert!(notifier.errors()[0].message.starts_with(IMAGE_UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_commit_without_staged_file() {
        let (backend, mut controller, notifier) = controller().await;
        let calls = backend.calls().await.len();
        assert!(!controller.commit_upload("hero_image").await);
        assert_eq!(backend.calls().await.len(), calls);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_drops_uploads_for_removed_keys() {
        let (_backend, mut controller, _notifier) = controller().await;
        controller.stage_upload("hero_image", png("roses.png")).unwrap();
        assert!(controller.delete(&"hero_image".to_string()).await);
        assert!(controller.pending("hero_image").is_none());

        controller.stage_upload("logo_url", png("logo.png")).unwrap();
        controller.load().await;
        assert!(controller.pending("logo_url").is_none());
    }

    #[tokio::test]
    async fn test_create_entry() {
        let (_backend, mut controller, _notifier) = controller().await;
        let draft = NewContent {
            key: " footer_text ".to_string(),
            value: "Livraison à Dakar".to_string(),
        };
        assert!(controller.create(draft).await);
        assert!(controller.list().get(&"footer_text".to_string()).is_some());
        assert_eq!(controller.entries().len(), 3);
    }
}
