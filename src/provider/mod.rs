//! Capability traits for the Auto Scaling management API.
//!
//! The core only ever talks to these traits. The real AWS SDK client lives
//! in [`aws`]; an in-memory fake in [`memory`] backs the tests and lets the
//! HTTP surface be exercised without credentials.

mod aws;
mod memory;

use async_trait::async_trait;
pub use aws::{AutoScalingProvider, AutoScalingProviderConfig};
use chrono::{DateTime, Utc};
pub use memory::InMemoryProvider;

/// One raw group description as returned by the listing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescription {
    /// Full Auto Scaling group name.
    pub name: String,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

impl GroupDescription {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
        }
    }
}

/// One page of the group listing.
///
/// `next_token` is `Some` while more pages remain; callers must keep fetching
/// until it comes back `None`.
#[derive(Debug, Clone, Default)]
pub struct GroupPage {
    pub groups: Vec<GroupDescription>,
    pub next_token: Option<String>,
}

/// Errors surfaced by the management API.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to list auto scaling groups: {0}")]
    List(String),
    #[error("failed to delete auto scaling group '{name}': {message}")]
    Delete { name: String, message: String },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Paginated, read-only listing of Auto Scaling groups.
#[async_trait]
pub trait GroupLister: Send + Sync {
    /// Fetch one page, passing the token from the previous page (`None` for
    /// the first). Errors propagate to the caller unmodified; there is no
    /// retry at this layer.
    async fn list_page(&self, next_token: Option<String>) -> ProviderResult<GroupPage>;
}

/// Force-delete of a single Auto Scaling group by name.
///
/// Force-delete semantics: deletion is requested even if instances are still
/// attached. The API's own behavior beyond that is not reimplemented here.
#[async_trait]
pub trait GroupTerminator: Send + Sync {
    async fn force_delete(&self, name: &str) -> ProviderResult<()>;
}
