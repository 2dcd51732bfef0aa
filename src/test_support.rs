//! Test support utilities shared across unit and integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::provider::{
    CreateReceipt, CreateSpec, Provider, ProviderFuture, TAG_NAME, TAG_SOURCE, TagFilter,
};
use crate::resource::{ResourceDescriptor, ResourceKind, ResourceTag};

/// Error returned by the fake provider, standing in for a transport failure.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct FakeProviderError {
    /// Scripted failure message.
    pub message: String,
}

/// Records a single call made through [`FakeProvider`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderCall {
    /// Verb that was invoked (`describe`, `create`, or `delete`).
    pub verb: &'static str,
    /// Resource kind the call targeted.
    pub kind: ResourceKind,
    /// Filter, name, or identifier the call carried.
    pub argument: String,
}

#[derive(Clone, Debug)]
struct FakeResource {
    kind: ResourceKind,
    id: String,
    name: Option<String>,
    source_id: Option<String>,
    state: String,
    description: Option<String>,
    hidden: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    resources: Vec<FakeResource>,
    next_id: u64,
    hide_created: bool,
    omit_receipt_ids: bool,
    fail_describe: VecDeque<String>,
    fail_create: VecDeque<String>,
    fail_delete: VecDeque<String>,
    fail_delete_by_id: HashMap<String, String>,
    calls: Vec<ProviderCall>,
}

/// In-memory provider double with seedable resources and scripted failures.
///
/// Used to drive deterministic lifecycle outcomes without network calls.
/// Cloning shares the underlying store, so a test can keep a handle for
/// assertions after moving a clone into a manager.
#[derive(Clone, Debug, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    /// Creates an empty provider with no seeded resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a root resource (a parent such as a volume or instance).
    pub fn seed(&self, kind: ResourceKind, id: &str, name: &str) {
        self.lock().resources.push(FakeResource {
            kind,
            id: id.to_owned(),
            name: Some(name.to_owned()),
            source_id: None,
            state: String::from("available"),
            description: None,
            hidden: false,
        });
    }

    /// Seeds a child resource scoped to `source_id`.
    pub fn seed_child(&self, kind: ResourceKind, id: &str, name: &str, source_id: &str) {
        self.lock().resources.push(FakeResource {
            kind,
            id: id.to_owned(),
            name: Some(name.to_owned()),
            source_id: Some(source_id.to_owned()),
            state: String::from("available"),
            description: None,
            hidden: false,
        });
    }

    /// Seeds a child resource that carries no `Name` tag.
    pub fn seed_nameless_child(&self, kind: ResourceKind, id: &str, source_id: &str) {
        self.lock().resources.push(FakeResource {
            kind,
            id: id.to_owned(),
            name: None,
            source_id: Some(source_id.to_owned()),
            state: String::from("available"),
            description: None,
            hidden: false,
        });
    }

    /// Scripts the next describe call to fail with `message`.
    pub fn fail_next_describe(&self, message: &str) {
        self.lock().fail_describe.push_back(message.to_owned());
    }

    /// Scripts the next create call to fail with `message`.
    pub fn fail_next_create(&self, message: &str) {
        self.lock().fail_create.push_back(message.to_owned());
    }

    /// Scripts the next delete call to fail with `message`.
    pub fn fail_next_delete(&self, message: &str) {
        self.lock().fail_delete.push_back(message.to_owned());
    }

    /// Scripts deletion of the resource with identifier `id` to fail with
    /// `message`, leaving deletes of other resources untouched.
    pub fn fail_delete_of(&self, id: &str, message: &str) {
        self.lock()
            .fail_delete_by_id
            .insert(id.to_owned(), message.to_owned());
    }

    /// Makes subsequently created resources invisible to describe calls,
    /// simulating the provider's read-after-write gap.
    pub fn hide_created(&self) {
        self.lock().hide_created = true;
    }

    /// Makes create receipts carry no identifier.
    pub fn omit_receipt_ids(&self) {
        self.lock().omit_receipt_ids = true;
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// Reports whether a resource of `kind` named `name` is stored,
    /// including resources hidden from describe.
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.lock()
            .resources
            .iter()
            .any(|resource| resource.kind == kind && resource.name.as_deref() == Some(name))
    }

    /// Number of stored resources of `kind`, including hidden ones.
    #[must_use]
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.lock()
            .resources
            .iter()
            .filter(|resource| resource.kind == kind)
            .count()
    }

    const fn id_prefix(kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::Snapshot => "snap",
            ResourceKind::Image => "ami",
            ResourceKind::LifecyclePolicy => "policy",
            ResourceKind::Instance => "i",
            ResourceKind::Volume => "vol",
        }
    }

    fn descriptor(resource: &FakeResource) -> ResourceDescriptor {
        let mut tags = Vec::new();
        if let Some(name) = &resource.name {
            tags.push(ResourceTag {
                key: TAG_NAME.to_owned(),
                value: name.clone(),
            });
        }
        if let Some(source_id) = &resource.source_id {
            tags.push(ResourceTag {
                key: TAG_SOURCE.to_owned(),
                value: source_id.clone(),
            });
        }
        ResourceDescriptor {
            kind: resource.kind,
            id: resource.id.clone(),
            name: resource.name.clone(),
            state: Some(resource.state.clone()),
            source_id: resource.source_id.clone(),
            size_gib: None,
            description: resource.description.clone(),
            tags,
        }
    }

    fn matches(resource: &FakeResource, kind: ResourceKind, filter: &TagFilter) -> bool {
        if resource.kind != kind || resource.hidden {
            return false;
        }
        match filter.key {
            TAG_NAME => resource.name.as_deref() == Some(filter.value.as_str()),
            TAG_SOURCE => resource.source_id.as_deref() == Some(filter.value.as_str()),
            _ => false,
        }
    }
}

impl Provider for FakeProvider {
    type Error = FakeProviderError;

    fn describe<'a>(
        &'a self,
        kind: ResourceKind,
        filter: &'a TagFilter,
    ) -> ProviderFuture<'a, Vec<ResourceDescriptor>, Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(ProviderCall {
                verb: "describe",
                kind,
                argument: format!("tag:{}={}", filter.key, filter.value),
            });
            if let Some(message) = state.fail_describe.pop_front() {
                return Err(FakeProviderError { message });
            }
            Ok(state
                .resources
                .iter()
                .filter(|resource| Self::matches(resource, kind, filter))
                .map(Self::descriptor)
                .collect())
        })
    }

    fn create<'a>(
        &'a self,
        kind: ResourceKind,
        spec: &'a CreateSpec,
    ) -> ProviderFuture<'a, CreateReceipt, Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(ProviderCall {
                verb: "create",
                kind,
                argument: spec.name.clone(),
            });
            if let Some(message) = state.fail_create.pop_front() {
                return Err(FakeProviderError { message });
            }
            state.next_id += 1;
            let id = format!("{}-{:04}", Self::id_prefix(kind), state.next_id);
            let hidden = state.hide_created;
            state.resources.push(FakeResource {
                kind,
                id: id.clone(),
                name: Some(spec.name.clone()),
                source_id: Some(spec.parent_id.clone()),
                state: String::from("pending"),
                description: spec.description.clone(),
                hidden,
            });
            let receipt_id = if state.omit_receipt_ids { None } else { Some(id) };
            Ok(CreateReceipt { id: receipt_id })
        })
    }

    fn delete<'a>(
        &'a self,
        kind: ResourceKind,
        id: &'a str,
    ) -> ProviderFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.calls.push(ProviderCall {
                verb: "delete",
                kind,
                argument: id.to_owned(),
            });
            if let Some(message) = state.fail_delete_by_id.remove(id) {
                return Err(FakeProviderError { message });
            }
            if let Some(message) = state.fail_delete.pop_front() {
                return Err(FakeProviderError { message });
            }
            let before = state.resources.len();
            state
                .resources
                .retain(|resource| !(resource.kind == kind && resource.id == id));
            if state.resources.len() == before {
                return Err(FakeProviderError {
                    message: format!("no such {kind}: {id}"),
                });
            }
            Ok(())
        })
    }
}
