/// ChezFlora Admin - administration client for the ChezFlora shop backend
///
/// Every dashboard screen (admins, clients, comments, newsletter, site
/// content, settings) keeps a local copy of one remote collection and
/// reconciles it with the server after each confirmed mutation.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;

pub use api::{MemoryBackend, RestClient, UserScope};
pub use auth::Session;
pub use config::ClientConfig;
pub use controller::{ContentController, ListController, ScreenKind, SettingsController};
pub use error::{AdminError, AdminResult};
pub use notify::{Notice, Notifier};
