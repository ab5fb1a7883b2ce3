/// Shop settings form: defaults, server overrides and dirty tracking
use super::{report_failure, run_cancellable};
use crate::{
    api::SettingsApi,
    error::{AdminError, AdminResult},
    models::{settings, Settings},
    notify::{Notice, Notifier},
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use validator::Validate;

const LABEL: &str = "settings";
const LOAD_FAILED: &str = "Erreur lors du chargement des paramètres";
const SAVED: &str = "Paramètres enregistrés avec succès";
const SAVE_FAILED: &str = "Erreur lors de l'enregistrement des paramètres";

/// Keys holding amounts that must be non-negative numbers
const AMOUNT_KEYS: [&str; 3] = [
    settings::DELIVERY_PRICE,
    settings::FREE_SHIPPING_THRESHOLD,
    settings::EXPRESS_DELIVERY_FEE,
];

#[derive(Validate)]
struct EmailField<'a> {
    #[validate(email)]
    value: &'a str,
}

/// Check a value fits its key
pub fn validate_setting(key: &str, value: &str) -> AdminResult<()> {
    if AMOUNT_KEYS.contains(&key) {
        let amount: f64 = value
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| AdminError::Validation(format!("{} doit être un nombre", key)))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(AdminError::Validation(format!("{} doit être positif", key)));
        }
    }

    if key == settings::ADMIN_EMAIL && (EmailField { value }).validate().is_err() {
        return Err(AdminError::Validation(format!("{} n'est pas une adresse valide", value)));
    }

    if key == settings::SITE_NAME && value.trim().is_empty() {
        return Err(AdminError::Validation("le nom du site est obligatoire".to_string()));
    }

    Ok(())
}

pub struct SettingsController<A: SettingsApi> {
    api: A,
    notifier: Arc<dyn Notifier>,
    settings: Settings,
    dirty: BTreeSet<String>,
    loading: bool,
    cancel: CancellationToken,
}

impl<A: SettingsApi> SettingsController<A> {
    /// Start from the shop defaults until `load` brings server values
    pub fn new(api: A, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            settings: Settings::defaults(),
            dirty: BTreeSet::new(),
            loading: false,
            cancel: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_keys(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Defaults overlaid with the server's values; local edits are discarded
    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let result = run_cancellable(&self.cancel, self.api.get_all()).await;
        self.loading = false;

        match result {
            Ok(server) => {
                info!("Loaded {} settings from server", server.len());
                let mut settings = Settings::defaults();
                settings.overlay(server);
                self.settings = settings;
                self.dirty.clear();
                true
            }
            Err(e) => {
                report_failure(self.notifier.as_ref(), LABEL, LOAD_FAILED, &e);
                false
            }
        }
    }

    /// Edit a value locally
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if self.settings.set(key, value) {
            self.dirty.insert(key.to_string());
        }
    }

    /// Send every value to the server
    pub async fn save(&mut self) -> bool {
        for (key, value) in self.settings.iter() {
            if let Err(e) = validate_setting(key, value) {
                report_failure(self.notifier.as_ref(), LABEL, SAVE_FAILED, &e);
                return false;
            }
        }

        let result = run_cancellable(&self.cancel, self.api.update_many(self.settings.as_map())).await;
        match result {
            Ok(()) => {
                info!("Saved {} settings ({} changed)", self.settings.len(), self.dirty.len());
                self.dirty.clear();
                self.notifier.notify(Notice::success(SAVED));
                true
            }
            Err(e) => {
                report_failure(self.notifier.as_ref(), LABEL, SAVE_FAILED, &e);
                false
            }
        }
    }
}
