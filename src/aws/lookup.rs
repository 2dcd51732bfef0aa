//! Parent lookups: instances and volumes are found, never mutated.

use aws_sdk_ec2::types::{Instance, Volume};

use super::{AwsProvider, AwsProviderError, tags};
use crate::provider::{TAG_NAME, TagFilter};
use crate::resource::{ResourceDescriptor, ResourceKind};

impl AwsProvider {
    pub(super) async fn describe_instances(
        &self,
        filter: &TagFilter,
    ) -> Result<Vec<ResourceDescriptor>, AwsProviderError> {
        let response = self
            .ec2
            .describe_instances()
            .filters(tags::tag_filter(filter))
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DescribeInstances", &err))?;
        // Instances arrive grouped into reservations; flatten them.
        let mut found = Vec::new();
        for reservation in response.reservations() {
            for instance in reservation.instances() {
                found.push(instance_descriptor(instance));
            }
        }
        Ok(found)
    }

    pub(super) async fn describe_volumes(
        &self,
        filter: &TagFilter,
    ) -> Result<Vec<ResourceDescriptor>, AwsProviderError> {
        let response = self
            .ec2
            .describe_volumes()
            .filters(tags::tag_filter(filter))
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DescribeVolumes", &err))?;
        Ok(response.volumes().iter().map(volume_descriptor).collect())
    }
}

pub(super) fn instance_descriptor(instance: &Instance) -> ResourceDescriptor {
    ResourceDescriptor {
        kind: ResourceKind::Instance,
        id: instance.instance_id().unwrap_or_default().to_owned(),
        name: tags::tag_value(instance.tags(), TAG_NAME).map(str::to_owned),
        state: instance
            .state()
            .and_then(|state| state.name())
            .map(|name| name.as_str().to_owned()),
        source_id: None,
        size_gib: None,
        description: None,
        tags: tags::convert_tags(instance.tags()),
    }
}

pub(super) fn volume_descriptor(volume: &Volume) -> ResourceDescriptor {
    ResourceDescriptor {
        kind: ResourceKind::Volume,
        id: volume.volume_id().unwrap_or_default().to_owned(),
        name: tags::tag_value(volume.tags(), TAG_NAME).map(str::to_owned),
        state: volume.state().map(|state| state.as_str().to_owned()),
        source_id: None,
        size_gib: volume.size(),
        description: None,
        tags: tags::convert_tags(volume.tags()),
    }
}
