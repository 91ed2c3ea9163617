// Pledge submission workflow - one attempt at a time per form instance

use statig::prelude::*;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn, Instrument};

use super::classifier::{classify, validation_message};
use super::driver::PledgeTransactionDriver;
use super::errors::WorkflowError;
use super::state_machine::{SubmissionEvent, SubmissionMachine};
use super::traits::{ApplicationRecordWriter, StateObserver};
use super::types::{
    Address, ApplicationRecord, ErrorCategory, PledgeForm, PledgeRequest, SubmissionOutcome,
    TransactionEvent, TxHash, WorkflowState,
};
use crate::observability::pledge_metrics;
use crate::telemetry::{create_submission_span, generate_correlation_id};

/// Settings the workflow needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub token_decimals: u32,
    pub redirect_base: String,
    pub success_message: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            token_decimals: 18,
            redirect_base: "/dao/v1".to_string(),
            success_message: "pledge".to_string(),
        }
    }
}

pub struct PledgeSubmissionWorkflow {
    organization: Address,
    applicant: Address,
    driver: PledgeTransactionDriver,
    writer: Arc<dyn ApplicationRecordWriter>,
    settings: WorkflowSettings,
    machine: Mutex<StateMachine<SubmissionMachine>>,
    observers: Vec<Arc<dyn StateObserver>>,
    state_tx: watch::Sender<WorkflowState>,
}

impl PledgeSubmissionWorkflow {
    pub fn new(
        organization: Address,
        applicant: Address,
        driver: PledgeTransactionDriver,
        writer: Arc<dyn ApplicationRecordWriter>,
        settings: WorkflowSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::default());
        Self {
            organization,
            applicant,
            driver,
            writer,
            settings,
            machine: Mutex::new(SubmissionMachine::new().state_machine()),
            observers: Vec::new(),
            state_tx,
        }
    }

    /// Register a callback invoked on every state change
    pub fn with_observer(mut self, observer: Arc<dyn StateObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Subscribe to the latest WorkflowState
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    pub fn organization(&self) -> &Address {
        &self.organization
    }

    /// Where the presentation layer navigates after a confirmed pledge
    pub fn redirect_target(&self) -> String {
        format!(
            "{}/{}?successMessage={}",
            self.settings.redirect_base.trim_end_matches('/'),
            self.organization,
            self.settings.success_message
        )
    }

    /// Run one submission attempt to its terminal outcome.
    ///
    /// Chain and backend failures are folded into the returned outcome; the
    /// only error is a second call while an attempt is still in flight.
    pub async fn run(&self, form: &PledgeForm) -> Result<SubmissionOutcome, WorkflowError> {
        let mut machine = self.machine.try_lock().map_err(|_| {
            pledge_metrics().record_rejected_run();
            warn!(organization = %self.organization, "Rejected pledge submission while another is in flight");
            WorkflowError::AttemptInFlight
        })?;

        let correlation_id = generate_correlation_id();
        let span = create_submission_span(&self.organization, &self.applicant, &correlation_id);

        let outcome = self
            .run_attempt(&mut machine, form)
            .instrument(span)
            .await;
        Ok(outcome)
    }

    async fn run_attempt(
        &self,
        machine: &mut StateMachine<SubmissionMachine>,
        form: &PledgeForm,
    ) -> SubmissionOutcome {
        pledge_metrics().record_attempt();
        self.apply(machine, SubmissionEvent::Start);

        let request = match PledgeRequest::from_form(
            form,
            &self.applicant,
            &self.organization,
            self.settings.token_decimals,
        ) {
            Ok(request) => request,
            Err(error) => {
                warn!(error = %error, "Pledge form rejected before submission");
                let message = validation_message(&error);
                return self.finish_failure(machine, ErrorCategory::ValidationFailure, message, None);
            }
        };

        info!(
            pledge = %request.pledge_amount(),
            shares = request.share_count(),
            "Submitting pledge"
        );

        let record = ApplicationRecord::new(&request);
        let mut handle = self.driver.submit(request);
        let mut hash = None;

        while let Some(event) = handle.next_event().await {
            match event {
                TransactionEvent::HashAvailable(tx_hash) => {
                    hash = Some(tx_hash.clone());
                    self.apply(machine, SubmissionEvent::HashAvailable { hash: tx_hash });
                    self.persist_in_background(record.clone());
                }
                TransactionEvent::Confirmed(receipt) => {
                    info!(
                        tx_hash = %receipt.transaction_hash,
                        block = ?receipt.block_number,
                        "Pledge approval confirmed"
                    );
                    self.apply(machine, SubmissionEvent::Confirmed);
                    pledge_metrics().record_success();
                    return SubmissionOutcome::Success {
                        redirect_target: self.redirect_target(),
                    };
                }
                TransactionEvent::Failed(error) => {
                    let category = classify(&error);
                    warn!(
                        error = %error,
                        code = ?error.code,
                        category = %category,
                        tx_hash = ?hash,
                        "Pledge transaction failed"
                    );
                    let message = category.message(hash.as_ref());
                    return self.finish_failure(machine, category, message, hash);
                }
            }
        }

        // The driver always ends with Confirmed or Failed
        warn!("Transaction driver finished without a terminal event");
        let category = ErrorCategory::Unknown;
        let message = category.message(hash.as_ref());
        self.finish_failure(machine, category, message, hash)
    }

    fn finish_failure(
        &self,
        machine: &mut StateMachine<SubmissionMachine>,
        category: ErrorCategory,
        message: String,
        hash: Option<TxHash>,
    ) -> SubmissionOutcome {
        self.apply(
            machine,
            SubmissionEvent::Failed {
                message: message.clone(),
            },
        );
        pledge_metrics().record_failure(category);
        SubmissionOutcome::Failure {
            category,
            message,
            hash,
        }
    }

    /// Best-effort mirror of the application; never awaited by the attempt
    fn persist_in_background(&self, record: ApplicationRecord) {
        let writer = Arc::clone(&self.writer);
        tokio::spawn(
            async move {
                match writer.persist(&record).await {
                    Ok(()) => info!("Application recorded, approving tokens now"),
                    Err(error) => {
                        pledge_metrics().record_persistence_failure();
                        warn!(error = %error, "Failed to record application");
                    }
                }
            }
            .in_current_span(),
        );
    }

    fn apply(&self, machine: &mut StateMachine<SubmissionMachine>, event: SubmissionEvent) {
        machine.handle(&event);
        let state = machine.inner().workflow_state().clone();
        for observer in &self.observers {
            observer.state_changed(&state);
        }
        self.state_tx.send_replace(state);
    }
}
