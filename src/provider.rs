//! Transport abstraction over the cloud provider API.
//!
//! The manager treats the provider as a black-box RPC client offering three
//! request/response verbs per resource kind: describe by tag filter, create,
//! and delete. Retries, pagination, and backoff are the provider's problem
//! (or the operator's), never the manager's.

use std::future::Future;
use std::pin::Pin;

use crate::resource::{ResourceDescriptor, ResourceKind};

/// Tag key holding a resource's logical name.
pub const TAG_NAME: &str = "Name";

/// Tag key linking a child resource back to its parent's provider identifier.
pub const TAG_SOURCE: &str = "Source";

/// Tag-equality filter used by describe queries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagFilter {
    /// Tag key to match on.
    pub key: &'static str,
    /// Exact value the tag must carry.
    pub value: String,
}

impl TagFilter {
    /// Filter on the `Name` tag.
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            key: TAG_NAME,
            value: value.into(),
        }
    }

    /// Filter on the `Source` tag.
    #[must_use]
    pub fn source(value: impl Into<String>) -> Self {
        Self {
            key: TAG_SOURCE,
            value: value.into(),
        }
    }
}

/// Input for a single mutating create call.
///
/// The provider tags the new resource with `Name = name` and
/// `Source = parent_id` so later lookups and parent-scoped queries work.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateSpec {
    /// Logical name for the new resource.
    pub name: String,
    /// Provider identifier of the parent the resource is derived from.
    pub parent_id: String,
    /// Optional description recorded on the provider side.
    pub description: Option<String>,
}

/// Provisional response from a create call.
///
/// Creation responses are not guaranteed to carry fully-settled state; the
/// identifier here may lag behind what a subsequent describe returns. Callers
/// needing authoritative state must re-query by name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateReceipt {
    /// Identifier reported by the create response, when present.
    pub id: Option<String>,
}

/// Future returned by provider operations.
pub type ProviderFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Minimal request/response interface implemented by cloud providers.
///
/// Implementations are constructed once and passed by reference; they hold no
/// per-operation state.
pub trait Provider {
    /// Provider specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists resources of `kind` whose tags match `filter`.
    fn describe<'a>(
        &'a self,
        kind: ResourceKind,
        filter: &'a TagFilter,
    ) -> ProviderFuture<'a, Vec<ResourceDescriptor>, Self::Error>;

    /// Issues the single mutating create call for `kind`.
    fn create<'a>(
        &'a self,
        kind: ResourceKind,
        spec: &'a CreateSpec,
    ) -> ProviderFuture<'a, CreateReceipt, Self::Error>;

    /// Issues the single mutating delete call for `kind`.
    ///
    /// Deletion takes the provider identifier, never the logical name; names
    /// are lookup tags only.
    fn delete<'a>(
        &'a self,
        kind: ResourceKind,
        id: &'a str,
    ) -> ProviderFuture<'a, (), Self::Error>;
}
