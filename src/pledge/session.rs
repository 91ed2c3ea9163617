// Loads organization metadata once and wires the workflow to the
// organization's deposit token. Submission is only possible through a
// session, so the metadata query always precedes the first attempt.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::driver::PledgeTransactionDriver;
use super::errors::{MetadataError, SessionError};
use super::traits::{
    ApplicationKind, ApplicationRecordWriter, OrganizationMetadata, OrganizationMetadataSource,
    TokenBindingFactory,
};
use super::types::Address;
use super::workflow::{PledgeSubmissionWorkflow, WorkflowSettings};

pub struct PledgeSession {
    metadata: OrganizationMetadata,
    workflow: PledgeSubmissionWorkflow,
}

impl PledgeSession {
    pub async fn open(
        organization: Address,
        applicant: Address,
        metadata_source: &dyn OrganizationMetadataSource,
        bindings: &dyn TokenBindingFactory,
        writer: Arc<dyn ApplicationRecordWriter>,
        settings: WorkflowSettings,
    ) -> Result<Self, SessionError> {
        let metadata = metadata_source.query(&organization).await?;
        info!(
            organization = %organization,
            deposit_token = %metadata.deposit_token_address,
            kind = ?metadata.application_kind,
            "Organization metadata loaded"
        );

        let token = bindings.token_contract(&metadata.deposit_token_address);
        let driver = PledgeTransactionDriver::new(token);
        let workflow = PledgeSubmissionWorkflow::new(organization, applicant, driver, writer, settings);

        Ok(Self { metadata, workflow })
    }

    pub fn metadata(&self) -> &OrganizationMetadata {
        &self.metadata
    }

    /// Which wizard steps the presentation layer should render
    pub fn application_kind(&self) -> ApplicationKind {
        self.metadata.application_kind
    }

    pub fn workflow(&self) -> &PledgeSubmissionWorkflow {
        &self.workflow
    }

    pub fn into_workflow(self) -> PledgeSubmissionWorkflow {
        self.workflow
    }
}

/// Metadata known up front (e.g. supplied on the command line)
#[derive(Debug, Clone)]
pub struct FixedMetadataSource {
    organization: Address,
    metadata: OrganizationMetadata,
}

impl FixedMetadataSource {
    pub fn new(organization: Address, metadata: OrganizationMetadata) -> Self {
        Self {
            organization,
            metadata,
        }
    }
}

#[async_trait]
impl OrganizationMetadataSource for FixedMetadataSource {
    async fn query(&self, organization: &Address) -> Result<OrganizationMetadata, MetadataError> {
        if organization != &self.organization {
            return Err(MetadataError::NotFound(organization.clone()));
        }
        Ok(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pledge::mocks::{
        address, RecordingWriter, ScriptedTokenContract, StaticTokenBindings,
    };
    use crate::pledge::traits::MockOrganizationMetadataSource;
    use crate::pledge::types::PledgeForm;

    fn euma_metadata() -> OrganizationMetadata {
        OrganizationMetadata {
            deposit_token_address: address(0x7),
            application_kind: ApplicationKind::Euma,
        }
    }

    #[tokio::test]
    async fn test_session_binds_deposit_token() {
        let token = Arc::new(ScriptedTokenContract::confirming("0xabc"));
        let bindings = StaticTokenBindings::new(token.clone());
        let source = FixedMetadataSource::new(address(0x2), euma_metadata());

        let session = PledgeSession::open(
            address(0x2),
            address(0x1),
            &source,
            &bindings,
            Arc::new(RecordingWriter::new()),
            WorkflowSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(session.application_kind(), ApplicationKind::Euma);
        assert_eq!(bindings.requested_tokens(), vec![address(0x7)]);

        let outcome = session
            .workflow()
            .run(&PledgeForm::new("1", "1"))
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(token.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_metadata_is_queried_once() {
        let mut source = MockOrganizationMetadataSource::new();
        source
            .expect_query()
            .times(1)
            .returning(|_| Ok(euma_metadata()));
        let bindings = StaticTokenBindings::new(Arc::new(ScriptedTokenContract::confirming("0x1")));

        let session = PledgeSession::open(
            address(0x2),
            address(0x1),
            &source,
            &bindings,
            Arc::new(RecordingWriter::new()),
            WorkflowSettings::default(),
        )
        .await
        .unwrap();

        session.workflow().run(&PledgeForm::new("1", "1")).await.unwrap();
        session.workflow().run(&PledgeForm::new("2", "1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_organization_blocks_submission() {
        let source = FixedMetadataSource::new(address(0x2), euma_metadata());
        let bindings = StaticTokenBindings::new(Arc::new(ScriptedTokenContract::confirming("0x1")));

        let result = PledgeSession::open(
            address(0x3),
            address(0x1),
            &source,
            &bindings,
            Arc::new(RecordingWriter::new()),
            WorkflowSettings::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(SessionError::Metadata(MetadataError::NotFound(_)))
        ));
        assert!(bindings.requested_tokens().is_empty());
    }
}
