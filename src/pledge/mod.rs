// Pledge Submission Module
//
// Sequences the token approval, mirrors the application to the backend and
// turns every failure into a user-facing category. All collaborators are
// injected so the flow can be exercised without a chain or a backend.

pub mod types;
pub mod errors;
pub mod traits;
pub mod classifier;
pub mod driver;
pub mod state_machine;
pub mod workflow;
pub mod session;

#[cfg(test)]
pub mod mocks;


pub use classifier::{classify, validation_message};
pub use driver::{PledgeTransactionDriver, TransactionHandle};
pub use errors::{BackendError, ChainError, MetadataError, SessionError, ValidationError, WorkflowError};
pub use session::{FixedMetadataSource, PledgeSession};
pub use state_machine::{SubmissionEvent, SubmissionMachine};
pub use traits::{
    ApplicationKind, ApplicationRecordWriter, OrganizationMetadata, OrganizationMetadataSource,
    StateObserver, TokenBindingFactory, TokenContract,
};
pub use types::{
    Address, ApplicationRecord, ApplicationStatus, ErrorCategory, PledgeForm, PledgeRequest,
    SubmissionOutcome, TokenAmount, TransactionEvent, TransactionReceipt, TxHash, WorkflowState,
};
pub use workflow::{PledgeSubmissionWorkflow, WorkflowSettings};
