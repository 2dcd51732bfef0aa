//! Core data model for managed cloud resources.
//!
//! Every resource the crate touches is identified two ways: a provider-assigned
//! identifier (only valid in mutating API calls) and a logical name carried as
//! a tag (only valid in lookups). The provider remains the single source of
//! truth; nothing in this module caches identifiers across operations.

use std::fmt;

use serde::Serialize;

/// Kinds of cloud resources the lifecycle manager knows about.
///
/// `Snapshot`, `Image`, and `LifecyclePolicy` are managed kinds; `Volume` and
/// `Instance` appear only as parents that children are scoped to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// A point-in-time copy of a disk volume.
    Snapshot,
    /// A machine image registered from a compute instance.
    Image,
    /// A snapshot/image rotation policy scoped to an instance.
    LifecyclePolicy,
    /// A compute instance; parent of images and lifecycle policies.
    Instance,
    /// A disk volume; parent of snapshots.
    Volume,
}

impl ResourceKind {
    /// Returns the lowercase wire name used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Image => "image",
            Self::LifecyclePolicy => "lifecycle-policy",
            Self::Instance => "instance",
            Self::Volume => "volume",
        }
    }

    /// Returns the parent kind that children of this kind are scoped to.
    ///
    /// `Volume` and `Instance` are roots and have no parent.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Snapshot => Some(Self::Volume),
            Self::Image | Self::LifecyclePolicy => Some(Self::Instance),
            Self::Instance | Self::Volume => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-level key/value label.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResourceTag {
    /// Tag key, for example `Name` or `Source`.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// Handle to a live resource: authoritative identifier plus logical name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResourceRef {
    /// Kind of the referenced resource.
    pub kind: ResourceKind,
    /// Provider-assigned identifier, valid in mutating API calls.
    pub id: String,
    /// Logical name carried as the resource's `Name` tag.
    pub name: String,
}

/// Result of a find operation, passing provider-native fields through opaquely.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    /// Kind of the described resource.
    pub kind: ResourceKind,
    /// Provider-assigned identifier.
    pub id: String,
    /// Logical name from the `Name` tag, when the resource carries one.
    pub name: Option<String>,
    /// Provider-reported state (for example `pending` or `completed`).
    pub state: Option<String>,
    /// Identifier of the parent resource, from the `Source` tag or a native
    /// field such as the snapshot's volume id.
    pub source_id: Option<String>,
    /// Size in gibibytes for sized resources.
    pub size_gib: Option<i32>,
    /// Free-form description recorded on the provider side.
    pub description: Option<String>,
    /// All tags carried by the resource.
    pub tags: Vec<ResourceTag>,
}

impl ResourceDescriptor {
    /// Looks up a tag value by key.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    /// Builds a [`ResourceRef`] from this descriptor, using `fallback_name`
    /// when the resource carries no `Name` tag.
    #[must_use]
    pub fn to_ref(&self, fallback_name: &str) -> ResourceRef {
        ResourceRef {
            kind: self.kind,
            id: self.id.clone(),
            name: self
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_mapping_matches_tagging_convention() {
        assert_eq!(ResourceKind::Snapshot.parent(), Some(ResourceKind::Volume));
        assert_eq!(ResourceKind::Image.parent(), Some(ResourceKind::Instance));
        assert_eq!(
            ResourceKind::LifecyclePolicy.parent(),
            Some(ResourceKind::Instance)
        );
        assert_eq!(ResourceKind::Volume.parent(), None);
        assert_eq!(ResourceKind::Instance.parent(), None);
    }

    #[test]
    fn descriptor_tag_lookup_returns_first_match() {
        let descriptor = ResourceDescriptor {
            kind: ResourceKind::Snapshot,
            id: String::from("snap-1"),
            name: Some(String::from("nightly")),
            state: None,
            source_id: None,
            size_gib: None,
            description: None,
            tags: vec![
                ResourceTag {
                    key: String::from("Name"),
                    value: String::from("nightly"),
                },
                ResourceTag {
                    key: String::from("Source"),
                    value: String::from("vol-1"),
                },
            ],
        };

        assert_eq!(descriptor.tag("Source"), Some("vol-1"));
        assert_eq!(descriptor.tag("missing"), None);
    }
}
