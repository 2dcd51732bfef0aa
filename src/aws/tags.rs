//! Tag plumbing shared by the EC2-backed calls.

use aws_sdk_ec2::types::{Filter, ResourceType, Tag, TagSpecification};

use crate::provider::{TAG_NAME, TAG_SOURCE, TagFilter};
use crate::resource::ResourceTag;

/// Builds the EC2 filter matching `tag:<key> = value`.
pub(super) fn tag_filter(filter: &TagFilter) -> Filter {
    Filter::builder()
        .name(format!("tag:{}", filter.key))
        .values(filter.value.clone())
        .build()
}

/// Tags a new child resource with its logical name and parent identifier.
pub(super) fn child_tag_specification(
    resource_type: ResourceType,
    name: &str,
    source_id: &str,
) -> TagSpecification {
    TagSpecification::builder()
        .resource_type(resource_type)
        .tags(Tag::builder().key(TAG_NAME).value(name).build())
        .tags(Tag::builder().key(TAG_SOURCE).value(source_id).build())
        .build()
}

/// Returns the value of `key` among EC2 tags, when present.
pub(super) fn tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key() == Some(key))
        .and_then(|tag| tag.value())
}

/// Converts EC2 tags into the provider-neutral representation.
pub(super) fn convert_tags(tags: &[Tag]) -> Vec<ResourceTag> {
    tags.iter()
        .filter_map(|tag| match (tag.key(), tag.value()) {
            (Some(key), Some(value)) => Some(ResourceTag {
                key: key.to_owned(),
                value: value.to_owned(),
            }),
            _ => None,
        })
        .collect()
}
