/// Resource records mirrored from the ChezFlora backend
///
/// Every record type the dashboard manages lives here, together with the
/// closed-set status enums and the drafts used to create new records.

pub mod comment;
pub mod content;
pub mod newsletter;
pub mod settings;
pub mod user;

pub use comment::Comment;
pub use content::{ContentEntry, ContentUpdate, FileUpload, NewContent};
pub use newsletter::{Subscriber, SubscriptionStatus};
pub use settings::Settings;
pub use user::{NewUser, Role, User, UserStatus, UserUpdate};

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A record with an identity that stays stable across reloads
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}

/// A record carrying a status tag from a closed set
pub trait HasStatus<S> {
    fn status(&self) -> S;
    fn set_status(&mut self, status: S);
}
