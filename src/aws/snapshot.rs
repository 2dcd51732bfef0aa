//! Snapshot calls against the EC2 API.

use aws_sdk_ec2::types::{ResourceType, Snapshot};

use super::{AwsProvider, AwsProviderError, tags};
use crate::provider::{CreateReceipt, CreateSpec, TAG_NAME, TAG_SOURCE, TagFilter};
use crate::resource::{ResourceDescriptor, ResourceKind};

impl AwsProvider {
    pub(super) async fn describe_snapshots(
        &self,
        filter: &TagFilter,
    ) -> Result<Vec<ResourceDescriptor>, AwsProviderError> {
        let response = self
            .ec2
            .describe_snapshots()
            .filters(tags::tag_filter(filter))
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DescribeSnapshots", &err))?;
        Ok(response
            .snapshots()
            .iter()
            .map(snapshot_descriptor)
            .collect())
    }

    pub(super) async fn create_snapshot(
        &self,
        spec: &CreateSpec,
    ) -> Result<CreateReceipt, AwsProviderError> {
        let response = self
            .ec2
            .create_snapshot()
            .volume_id(&spec.parent_id)
            .set_description(spec.description.clone())
            .tag_specifications(tags::child_tag_specification(
                ResourceType::Snapshot,
                &spec.name,
                &spec.parent_id,
            ))
            .send()
            .await
            .map_err(|err| AwsProviderError::api("CreateSnapshot", &err))?;
        Ok(CreateReceipt {
            id: response.snapshot_id().map(str::to_owned),
        })
    }

    pub(super) async fn delete_snapshot(&self, id: &str) -> Result<(), AwsProviderError> {
        self.ec2
            .delete_snapshot()
            .snapshot_id(id)
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DeleteSnapshot", &err))?;
        Ok(())
    }
}

pub(super) fn snapshot_descriptor(snapshot: &Snapshot) -> ResourceDescriptor {
    ResourceDescriptor {
        kind: ResourceKind::Snapshot,
        id: snapshot.snapshot_id().unwrap_or_default().to_owned(),
        name: tags::tag_value(snapshot.tags(), TAG_NAME).map(str::to_owned),
        state: snapshot.state().map(|state| state.as_str().to_owned()),
        source_id: tags::tag_value(snapshot.tags(), TAG_SOURCE)
            .or_else(|| snapshot.volume_id())
            .map(str::to_owned),
        size_gib: snapshot.volume_size(),
        description: snapshot.description().map(str::to_owned),
        tags: tags::convert_tags(snapshot.tags()),
    }
}
