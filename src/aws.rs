//! AWS-backed provider implementation (EC2 and Data Lifecycle Manager).
//!
//! One [`AwsProvider`] serves every resource kind: snapshots, images,
//! instances, and volumes go through the EC2 client; lifecycle policies go
//! through the DLM client. The provider issues plain request/response calls
//! and leaves retries, pagination, and backoff to the SDK's defaults.

mod error;
mod image;
mod lookup;
mod policy;
mod snapshot;
mod tags;

use aws_config::{BehaviorVersion, Region};

use crate::config::SnapkeepConfig;
use crate::provider::{CreateReceipt, CreateSpec, Provider, ProviderFuture, TagFilter};
use crate::resource::{ResourceDescriptor, ResourceKind};

pub use error::AwsProviderError;

/// Provider backed by the AWS SDK, holding one EC2 and one DLM client.
///
/// Construct once via [`AwsProvider::connect`] and pass by reference; the
/// underlying SDK clients are cheap to clone and share.
#[derive(Clone, Debug)]
pub struct AwsProvider {
    ec2: aws_sdk_ec2::Client,
    dlm: aws_sdk_dlm::Client,
    dlm_role_arn: Option<String>,
}

impl AwsProvider {
    /// Builds SDK clients from the ambient AWS configuration chain, honouring
    /// the configured region override.
    ///
    /// # Errors
    ///
    /// Returns [`AwsProviderError::Config`] when the provided configuration
    /// fails validation.
    pub async fn connect(config: &SnapkeepConfig) -> Result<Self, AwsProviderError> {
        config.validate()?;
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;
        Ok(Self {
            ec2: aws_sdk_ec2::Client::new(&shared),
            dlm: aws_sdk_dlm::Client::new(&shared),
            dlm_role_arn: config.dlm_role_arn.clone(),
        })
    }
}

impl Provider for AwsProvider {
    type Error = AwsProviderError;

    fn describe<'a>(
        &'a self,
        kind: ResourceKind,
        filter: &'a TagFilter,
    ) -> ProviderFuture<'a, Vec<ResourceDescriptor>, Self::Error> {
        Box::pin(async move {
            match kind {
                ResourceKind::Snapshot => self.describe_snapshots(filter).await,
                ResourceKind::Image => self.describe_images(filter).await,
                ResourceKind::LifecyclePolicy => self.describe_policies(filter).await,
                ResourceKind::Instance => self.describe_instances(filter).await,
                ResourceKind::Volume => self.describe_volumes(filter).await,
            }
        })
    }

    fn create<'a>(
        &'a self,
        kind: ResourceKind,
        spec: &'a CreateSpec,
    ) -> ProviderFuture<'a, CreateReceipt, Self::Error> {
        Box::pin(async move {
            match kind {
                ResourceKind::Snapshot => self.create_snapshot(spec).await,
                ResourceKind::Image => self.create_image(spec).await,
                ResourceKind::LifecyclePolicy => self.create_policy(spec).await,
                ResourceKind::Instance | ResourceKind::Volume => {
                    Err(AwsProviderError::Unsupported {
                        kind,
                        verb: "create",
                    })
                }
            }
        })
    }

    fn delete<'a>(
        &'a self,
        kind: ResourceKind,
        id: &'a str,
    ) -> ProviderFuture<'a, (), Self::Error> {
        Box::pin(async move {
            match kind {
                ResourceKind::Snapshot => self.delete_snapshot(id).await,
                ResourceKind::Image => self.deregister_image(id).await,
                ResourceKind::LifecyclePolicy => self.delete_policy(id).await,
                ResourceKind::Instance | ResourceKind::Volume => {
                    Err(AwsProviderError::Unsupported {
                        kind,
                        verb: "delete",
                    })
                }
            }
        })
    }
}
