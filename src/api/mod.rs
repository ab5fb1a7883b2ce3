/// Remote service contract
///
/// Each capability a screen may need is its own trait so a resource only
/// implements what its backend routes actually support. `RestClient` talks
/// to the ChezFlora backend; `MemoryBackend` keeps the same semantics
/// in-process.

pub mod client;
pub mod comments;
pub mod content;
pub mod memory;
pub mod newsletter;
pub mod settings;
pub mod users;

pub use client::RestClient;
pub use memory::MemoryBackend;
pub use users::UserScope;

use crate::error::{AdminError, AdminResult};
use crate::models::{ContentEntry, ContentUpdate, Entity};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// Identifier type of an API's records
pub type IdOf<A> = <<A as ListApi>::Record as Entity>::Id;

/// Fetch the full collection
#[async_trait]
pub trait ListApi: Send + Sync {
    type Record: Entity;

    async fn list_all(&self) -> AdminResult<Vec<Self::Record>>;
}

/// Create a record from caller-supplied fields
///
/// Mutations only report whether the backend accepted them; the response
/// body is not trusted to be a full record, so callers refetch.
#[async_trait]
pub trait CreateApi: ListApi {
    type Draft: Debug + Send + Sync;

    async fn create(&self, draft: &Self::Draft) -> AdminResult<()>;
}

/// Partial update by identifier
#[async_trait]
pub trait UpdateApi: ListApi {
    type Patch: Debug + Send + Sync;

    async fn update(
        &self,
        id: &<Self::Record as Entity>::Id,
        patch: &Self::Patch,
    ) -> AdminResult<()>;
}

/// Delete by identifier
#[async_trait]
pub trait RemoveApi: ListApi {
    async fn remove(&self, id: &<Self::Record as Entity>::Id) -> AdminResult<()>;
}

/// Status transition restricted to a closed set
#[async_trait]
pub trait StatusApi: ListApi {
    type Status: Copy + Eq + Debug + Display + FromStr<Err = AdminError> + Send + Sync + 'static;

    async fn set_status(
        &self,
        id: &<Self::Record as Entity>::Id,
        status: Self::Status,
    ) -> AdminResult<()>;
}

/// Replace a content value or upload a new image
#[async_trait]
pub trait ContentApi: ListApi<Record = ContentEntry> {
    async fn update_content(&self, key: &str, update: &ContentUpdate) -> AdminResult<()>;
}

/// Key/value settings store
#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn get_all(&self) -> AdminResult<BTreeMap<String, String>>;

    async fn update_many(&self, values: &BTreeMap<String, String>) -> AdminResult<()>;
}
