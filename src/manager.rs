//! Guarded lifecycle manager generic over resource kind.
//!
//! One manager implements the uniform verbs for every managed kind: find a
//! resource by its `Name` tag, guard-create it under a parent, guard-delete
//! it, and run parent-scoped bulk queries over the `Source` tag. All guard
//! checks are local and synchronous relative to the calling operation; there
//! are no retries and no silent recovery.

use thiserror::Error;

use crate::provider::{CreateSpec, Provider, TagFilter};
use crate::resource::{ResourceDescriptor, ResourceKind, ResourceRef};

/// Errors raised by lifecycle operations, uniform across resource kinds.
///
/// Provider-transport errors are caught at the call site and re-wrapped here;
/// raw transport error types never reach callers.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LifecycleError {
    /// Raised when the target of an operation does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of the missing resource.
        kind: ResourceKind,
        /// Logical name that was looked up.
        name: String,
    },
    /// Raised when a create target already exists.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Kind of the conflicting resource.
        kind: ResourceKind,
        /// Logical name that is already taken.
        name: String,
    },
    /// Raised when the referenced parent resource is absent.
    #[error("parent {kind} '{name}' not found")]
    ParentNotFound {
        /// Kind of the missing parent.
        kind: ResourceKind,
        /// Logical name of the missing parent.
        name: String,
    },
    /// Raised when the provider rejects or fails the mutating create call.
    #[error("failed to create {kind} '{name}': {message}")]
    CreationFailed {
        /// Kind being created.
        kind: ResourceKind,
        /// Logical name of the resource that was not created.
        name: String,
        /// Message reported by the provider transport.
        message: String,
    },
    /// Raised when the provider rejects or fails the mutating delete call.
    #[error("failed to delete {kind} '{name}': {message}")]
    DeletionFailed {
        /// Kind being deleted.
        kind: ResourceKind,
        /// Logical name of the resource that was not deleted.
        name: String,
        /// Message reported by the provider transport.
        message: String,
    },
    /// Raised when a bulk threshold is not a non-negative integer.
    #[error("invalid threshold {value}: must be a non-negative integer")]
    InvalidThreshold {
        /// The rejected threshold value.
        value: i64,
    },
    /// Raised when a describe query fails in transport.
    #[error("{kind} query failed: {message}")]
    Query {
        /// Kind that was being queried.
        kind: ResourceKind,
        /// Message reported by the provider transport.
        message: String,
    },
}

/// Lifecycle manager for one managed resource kind.
///
/// The provider is injected once at construction and shared by reference;
/// the manager itself holds no other state, so every operation is
/// independent and stateless.
#[derive(Clone, Debug)]
pub struct LifecycleManager<P> {
    provider: P,
    kind: ResourceKind,
    parent_kind: ResourceKind,
}

impl<P: Provider> LifecycleManager<P> {
    /// Manages disk snapshots scoped to volumes.
    #[must_use]
    pub const fn snapshots(provider: P) -> Self {
        Self {
            provider,
            kind: ResourceKind::Snapshot,
            parent_kind: ResourceKind::Volume,
        }
    }

    /// Manages machine images scoped to instances.
    #[must_use]
    pub const fn images(provider: P) -> Self {
        Self {
            provider,
            kind: ResourceKind::Image,
            parent_kind: ResourceKind::Instance,
        }
    }

    /// Manages lifecycle policies scoped to instances.
    #[must_use]
    pub const fn policies(provider: P) -> Self {
        Self {
            provider,
            kind: ResourceKind::LifecyclePolicy,
            parent_kind: ResourceKind::Instance,
        }
    }

    /// Kind managed by this instance.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Kind of the parent that children are scoped to.
    #[must_use]
    pub const fn parent_kind(&self) -> ResourceKind {
        self.parent_kind
    }

    /// Finds the resource carrying `name` as its `Name` tag.
    ///
    /// When several live resources share one name the first match wins; the
    /// contract leaves that ordering undefined.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Query`] when the describe call fails in
    /// transport.
    pub async fn find(&self, name: &str) -> Result<Option<ResourceDescriptor>, LifecycleError> {
        let filter = TagFilter::name(name);
        let matches = self
            .provider
            .describe(self.kind, &filter)
            .await
            .map_err(|err| LifecycleError::Query {
                kind: self.kind,
                message: err.to_string(),
            })?;
        Ok(matches.into_iter().next())
    }

    /// Reports whether a resource named `name` exists.
    ///
    /// Defined as `find(name).is_some()`; no separate existence API is used,
    /// which doubles query cost but keeps a single source of truth.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Query`] when the describe call fails in
    /// transport.
    pub async fn exists(&self, name: &str) -> Result<bool, LifecycleError> {
        Ok(self.find(name).await?.is_some())
    }

    /// Creates a resource named `name` under the parent named `parent_name`.
    ///
    /// The new resource is tagged `Name = name` and `Source = <parent id>`.
    /// The create response is treated as provisional: the manager re-queries
    /// by name for the authoritative identifier and only falls back to the
    /// response identifier while the resource is not yet queryable.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyExists`] when `name` is taken,
    /// [`LifecycleError::ParentNotFound`] when the parent is absent,
    /// [`LifecycleError::CreationFailed`] when the mutating call fails, and
    /// [`LifecycleError::Query`] when a lookup fails in transport.
    pub async fn create(
        &self,
        parent_name: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<ResourceRef, LifecycleError> {
        if self.exists(name).await? {
            tracing::error!(kind = %self.kind, name, "create refused: name already taken");
            return Err(LifecycleError::AlreadyExists {
                kind: self.kind,
                name: name.to_owned(),
            });
        }

        let parent_id = self.resolve_parent_id(parent_name).await?;
        let spec = CreateSpec {
            name: name.to_owned(),
            parent_id: parent_id.clone(),
            description: description.map(str::to_owned),
        };
        let receipt = self
            .provider
            .create(self.kind, &spec)
            .await
            .map_err(|err| LifecycleError::CreationFailed {
                kind: self.kind,
                name: name.to_owned(),
                message: err.to_string(),
            })?;

        // Read-after-write gap: re-find by name for the authoritative id.
        let settled = self.find(name).await?;
        let created = settled
            .map(|descriptor| descriptor.to_ref(name))
            .or_else(|| {
                receipt.id.map(|id| ResourceRef {
                    kind: self.kind,
                    id,
                    name: name.to_owned(),
                })
            })
            .ok_or_else(|| LifecycleError::CreationFailed {
                kind: self.kind,
                name: name.to_owned(),
                message: String::from(
                    "create response carried no identifier and the resource is not yet queryable",
                ),
            })?;

        tracing::info!(
            kind = %self.kind,
            name,
            id = %created.id,
            parent = %parent_id,
            "created resource"
        );
        Ok(created)
    }

    /// Deletes the resource named `name` and returns its resolved handle.
    ///
    /// The delete call uses the provider identifier resolved by a find, never
    /// the name itself. No post-condition check is issued; callers wanting a
    /// confirmed-deleted guarantee must call [`Self::exists`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when `name` does not resolve,
    /// [`LifecycleError::DeletionFailed`] when the mutating call fails, and
    /// [`LifecycleError::Query`] when the lookup fails in transport.
    pub async fn delete(&self, name: &str) -> Result<ResourceRef, LifecycleError> {
        let descriptor = self.find(name).await?.ok_or_else(|| {
            tracing::error!(kind = %self.kind, name, "delete refused: target not found");
            LifecycleError::NotFound {
                kind: self.kind,
                name: name.to_owned(),
            }
        })?;

        self.provider
            .delete(self.kind, &descriptor.id)
            .await
            .map_err(|err| LifecycleError::DeletionFailed {
                kind: self.kind,
                name: name.to_owned(),
                message: err.to_string(),
            })?;

        tracing::info!(kind = %self.kind, name, id = %descriptor.id, "deleted resource");
        Ok(descriptor.to_ref(name))
    }

    /// Lists all children of the parent named `parent_name`.
    ///
    /// Resolves the parent to its provider identifier, then filters children
    /// on the `Source` tag carrying that identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ParentNotFound`] when the parent is absent
    /// and [`LifecycleError::Query`] when a describe call fails in transport.
    pub async fn find_all_by_parent(
        &self,
        parent_name: &str,
    ) -> Result<Vec<ResourceDescriptor>, LifecycleError> {
        let parent_id = self.resolve_parent_id(parent_name).await?;
        let filter = TagFilter::source(parent_id);
        self.provider
            .describe(self.kind, &filter)
            .await
            .map_err(|err| LifecycleError::Query {
                kind: self.kind,
                message: err.to_string(),
            })
    }

    /// Deletes every child of the parent named `parent_name`, one at a time.
    ///
    /// Children are deleted sequentially by their `Name` tag. A failure on
    /// the Nth child aborts the remaining deletes; there is no partial-
    /// failure aggregation. A parent with zero children yields an empty
    /// sequence without issuing any delete call.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by [`Self::find_all_by_parent`] or
    /// [`Self::delete`]; a child with no `Name` tag fails with
    /// [`LifecycleError::DeletionFailed`].
    pub async fn delete_all_by_parent(
        &self,
        parent_name: &str,
    ) -> Result<Vec<ResourceRef>, LifecycleError> {
        let children = self.find_all_by_parent(parent_name).await?;
        let mut deleted = Vec::with_capacity(children.len());
        for child in children {
            let child_name = child.name.clone().ok_or_else(|| {
                LifecycleError::DeletionFailed {
                    kind: self.kind,
                    name: child.id.clone(),
                    message: String::from("resource carries no Name tag to delete by"),
                }
            })?;
            deleted.push(self.delete(&child_name).await?);
        }
        Ok(deleted)
    }

    /// Reports whether the parent named `parent_name` has at least
    /// `threshold` children.
    ///
    /// A threshold of zero is satisfied by any child count, including zero.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidThreshold`] for negative thresholds,
    /// plus any error raised by [`Self::find_all_by_parent`].
    pub async fn has_more_than_by_parent(
        &self,
        parent_name: &str,
        threshold: i64,
    ) -> Result<bool, LifecycleError> {
        if threshold < 0 {
            return Err(LifecycleError::InvalidThreshold { value: threshold });
        }
        let children = self.find_all_by_parent(parent_name).await?;
        Ok(i64::try_from(children.len()).map_or(true, |count| count >= threshold))
    }

    /// Resolves the parent's provider identifier via a find on its `Name`
    /// tag.
    async fn resolve_parent_id(&self, parent_name: &str) -> Result<String, LifecycleError> {
        let filter = TagFilter::name(parent_name);
        let matches = self
            .provider
            .describe(self.parent_kind, &filter)
            .await
            .map_err(|err| LifecycleError::Query {
                kind: self.parent_kind,
                message: err.to_string(),
            })?;
        matches
            .into_iter()
            .next()
            .map(|parent| parent.id)
            .ok_or_else(|| {
                tracing::error!(
                    kind = %self.parent_kind,
                    name = parent_name,
                    "parent lookup failed"
                );
                LifecycleError::ParentNotFound {
                    kind: self.parent_kind,
                    name: parent_name.to_owned(),
                }
            })
    }
}

#[cfg(test)]
mod tests;
