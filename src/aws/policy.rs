//! Lifecycle policy calls against the Data Lifecycle Manager API.

use std::collections::HashMap;

use aws_sdk_dlm::types::{
    CreateRule, IntervalUnitValues, LifecyclePolicySummary, PolicyDetails, PolicyTypeValues,
    ResourceTypeValues, RetainRule, Schedule, SettablePolicyStateValues, Tag,
};

use super::{AwsProvider, AwsProviderError};
use crate::provider::{CreateReceipt, CreateSpec, TAG_NAME, TAG_SOURCE, TagFilter};
use crate::resource::{ResourceDescriptor, ResourceKind, ResourceTag};

/// How often the policy's schedule runs.
const SCHEDULE_INTERVAL_HOURS: i32 = 24;

/// How many snapshots the schedule retains per target.
const SCHEDULE_RETAIN_COUNT: i32 = 7;

impl AwsProvider {
    pub(super) async fn describe_policies(
        &self,
        filter: &TagFilter,
    ) -> Result<Vec<ResourceDescriptor>, AwsProviderError> {
        // DLM offers no tag-filtered describe over arbitrary tags, so the
        // summaries are filtered client-side.
        let response = self
            .dlm
            .get_lifecycle_policies()
            .send()
            .await
            .map_err(|err| AwsProviderError::api("GetLifecyclePolicies", &err))?;
        Ok(response
            .policies()
            .iter()
            .filter(|summary| summary_matches(summary, filter))
            .map(policy_descriptor)
            .collect())
    }

    pub(super) async fn create_policy(
        &self,
        spec: &CreateSpec,
    ) -> Result<CreateReceipt, AwsProviderError> {
        let role = self
            .dlm_role_arn
            .as_deref()
            .ok_or(AwsProviderError::MissingPolicyRole)?;
        let target_tag = Tag::builder()
            .key(TAG_SOURCE)
            .value(&spec.parent_id)
            .build()
            .map_err(|err| AwsProviderError::invalid("CreateLifecyclePolicy", &err))?;
        let schedule = Schedule::builder()
            .name("snapkeep-rotation")
            .copy_tags(true)
            .create_rule(
                CreateRule::builder()
                    .interval(SCHEDULE_INTERVAL_HOURS)
                    .interval_unit(IntervalUnitValues::Hours)
                    .build(),
            )
            .retain_rule(RetainRule::builder().count(SCHEDULE_RETAIN_COUNT).build())
            .build();
        let details = PolicyDetails::builder()
            .policy_type(PolicyTypeValues::EbsSnapshotManagement)
            .resource_types(ResourceTypeValues::Instance)
            .target_tags(target_tag)
            .schedules(schedule)
            .build();

        let description = spec
            .description
            .clone()
            .unwrap_or_else(|| format!("rotation policy for {}", spec.parent_id));
        let response = self
            .dlm
            .create_lifecycle_policy()
            .execution_role_arn(role)
            .description(description)
            .state(SettablePolicyStateValues::Enabled)
            .policy_details(details)
            .tags(TAG_NAME, &spec.name)
            .tags(TAG_SOURCE, &spec.parent_id)
            .send()
            .await
            .map_err(|err| AwsProviderError::api("CreateLifecyclePolicy", &err))?;
        Ok(CreateReceipt {
            id: response.policy_id().map(str::to_owned),
        })
    }

    pub(super) async fn delete_policy(&self, id: &str) -> Result<(), AwsProviderError> {
        self.dlm
            .delete_lifecycle_policy()
            .policy_id(id)
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DeleteLifecyclePolicy", &err))?;
        Ok(())
    }
}

pub(super) fn summary_matches(summary: &LifecyclePolicySummary, filter: &TagFilter) -> bool {
    summary.tags().is_some_and(|tags| {
        tags.get(filter.key).map(String::as_str) == Some(filter.value.as_str())
    })
}

pub(super) fn policy_descriptor(summary: &LifecyclePolicySummary) -> ResourceDescriptor {
    let tags = summary.tags().map(convert_policy_tags).unwrap_or_default();
    ResourceDescriptor {
        kind: ResourceKind::LifecyclePolicy,
        id: summary.policy_id().unwrap_or_default().to_owned(),
        name: summary
            .tags()
            .and_then(|tags_map| tags_map.get(TAG_NAME))
            .cloned(),
        state: summary.state().map(|state| state.as_str().to_owned()),
        source_id: summary
            .tags()
            .and_then(|tags_map| tags_map.get(TAG_SOURCE))
            .cloned(),
        size_gib: None,
        description: summary.description().map(str::to_owned),
        tags,
    }
}

fn convert_policy_tags(tags: &HashMap<String, String>) -> Vec<ResourceTag> {
    let mut converted: Vec<ResourceTag> = tags
        .iter()
        .map(|(key, value)| ResourceTag {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    // HashMap iteration order is arbitrary; keep descriptor output stable.
    converted.sort_by(|lhs, rhs| lhs.key.cmp(&rhs.key));
    converted
}
