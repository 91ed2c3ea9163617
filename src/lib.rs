// dao-pledge - pledge submission workflow for on-chain organizations
// This exposes the core components for testing and integration

pub mod pledge;
pub mod chain;
pub mod http;
pub mod telemetry;
pub mod observability;
pub mod config;

// Re-export key types for easy access
pub use pledge::{
    classify, Address, ApplicationRecord, ApplicationRecordWriter, ChainError, ErrorCategory,
    PledgeForm, PledgeSession, PledgeSubmissionWorkflow, PledgeTransactionDriver, StateObserver,
    SubmissionOutcome, TokenContract, TxHash, WorkflowSettings, WorkflowState,
};
pub use chain::{JsonRpcBindings, JsonRpcTokenContract};
pub use http::BackendClient;
pub use telemetry::{init_telemetry, shutdown_telemetry, generate_correlation_id, create_submission_span};
pub use observability::{PledgeMetrics, pledge_metrics};
pub use crate::config::{PledgeConfig, config, init_config};
