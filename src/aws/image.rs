//! Machine image calls against the EC2 API.

use aws_sdk_ec2::types::{Image, ResourceType};

use super::{AwsProvider, AwsProviderError, tags};
use crate::provider::{CreateReceipt, CreateSpec, TAG_NAME, TAG_SOURCE, TagFilter};
use crate::resource::{ResourceDescriptor, ResourceKind};

impl AwsProvider {
    pub(super) async fn describe_images(
        &self,
        filter: &TagFilter,
    ) -> Result<Vec<ResourceDescriptor>, AwsProviderError> {
        let response = self
            .ec2
            .describe_images()
            .filters(tags::tag_filter(filter))
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DescribeImages", &err))?;
        Ok(response.images().iter().map(image_descriptor).collect())
    }

    pub(super) async fn create_image(
        &self,
        spec: &CreateSpec,
    ) -> Result<CreateReceipt, AwsProviderError> {
        let response = self
            .ec2
            .create_image()
            .instance_id(&spec.parent_id)
            .name(&spec.name)
            .set_description(spec.description.clone())
            .tag_specifications(tags::child_tag_specification(
                ResourceType::Image,
                &spec.name,
                &spec.parent_id,
            ))
            .send()
            .await
            .map_err(|err| AwsProviderError::api("CreateImage", &err))?;
        Ok(CreateReceipt {
            id: response.image_id().map(str::to_owned),
        })
    }

    pub(super) async fn deregister_image(&self, id: &str) -> Result<(), AwsProviderError> {
        self.ec2
            .deregister_image()
            .image_id(id)
            .send()
            .await
            .map_err(|err| AwsProviderError::api("DeregisterImage", &err))?;
        Ok(())
    }
}

pub(super) fn image_descriptor(image: &Image) -> ResourceDescriptor {
    ResourceDescriptor {
        kind: ResourceKind::Image,
        id: image.image_id().unwrap_or_default().to_owned(),
        // Images also carry a provider-native name field; the Name tag wins
        // because it is the lookup key the manager writes.
        name: tags::tag_value(image.tags(), TAG_NAME)
            .or_else(|| image.name())
            .map(str::to_owned),
        state: image.state().map(|state| state.as_str().to_owned()),
        source_id: tags::tag_value(image.tags(), TAG_SOURCE).map(str::to_owned),
        size_gib: None,
        description: image.description().map(str::to_owned),
        tags: tags::convert_tags(image.tags()),
    }
}
