//! Guarded lifecycle management for cloud backup resources.
//!
//! The crate collapses the find/exists/create/delete pattern around disk
//! snapshots, machine images, and lifecycle policies into one generic
//! [`LifecycleManager`] driven through an injected [`Provider`] transport.
//! Resources are looked up by their `Name` tag and scoped to parents via a
//! `Source` tag; the provider stays the single source of truth. An AWS
//! implementation backed by EC2 and Data Lifecycle Manager lives in [`aws`];
//! tests inject the in-memory double from [`test_support`].

pub mod aws;
pub mod config;
pub mod manager;
pub mod provider;
pub mod resource;
pub mod test_support;

pub use aws::{AwsProvider, AwsProviderError};
pub use config::{ConfigError, SnapkeepConfig};
pub use manager::{LifecycleError, LifecycleManager};
pub use provider::{
    CreateReceipt, CreateSpec, Provider, ProviderFuture, TAG_NAME, TAG_SOURCE, TagFilter,
};
pub use resource::{ResourceDescriptor, ResourceKind, ResourceRef, ResourceTag};
