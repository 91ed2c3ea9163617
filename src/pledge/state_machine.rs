use serde::{Deserialize, Serialize};
use statig::prelude::*;

use super::types::{TxHash, WorkflowState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionEvent {
    Start,
    HashAvailable { hash: TxHash },
    Confirmed,
    Failed { message: String },
}

/// Owns the externally observed WorkflowState; the only writer of it.
#[derive(Default)]
pub struct SubmissionMachine {
    observed: WorkflowState,
    attempts: u32,
}

impl SubmissionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_attempt(&mut self) {
        self.attempts += 1;
        self.observed = WorkflowState {
            loading: true,
            error_message: None,
            hash: None,
        };
        tracing::debug!(attempt = self.attempts, "Submission attempt started");
    }

    /// A Start while an attempt is still open means the previous attempt was
    /// dropped before reaching a terminal event.
    fn restart_abandoned(&mut self) -> Outcome<State> {
        tracing::warn!(
            attempt = self.attempts,
            tx_hash = ?self.observed.hash,
            "Previous submission attempt was abandoned"
        );
        self.begin_attempt();
        Transition(State::submitting())
    }

    fn fail(&mut self, message: &str) {
        self.observed.loading = false;
        self.observed.error_message = Some(message.to_string());
    }
}

#[state_machine(initial = "State::idle()")]
impl SubmissionMachine {
    #[state]
    fn idle(&mut self, event: &SubmissionEvent) -> Outcome<State> {
        match event {
            SubmissionEvent::Start => {
                self.begin_attempt();
                Transition(State::submitting())
            }
            _ => Handled,
        }
    }

    /// Waiting for the wallet to sign and broadcast
    #[state]
    fn submitting(&mut self, event: &SubmissionEvent) -> Outcome<State> {
        match event {
            SubmissionEvent::Start => self.restart_abandoned(),
            SubmissionEvent::HashAvailable { hash } => {
                self.observed.hash = Some(hash.clone());
                tracing::info!(tx_hash = %hash, "Waiting for approval to be mined");
                Transition(State::awaiting_confirmation())
            }
            SubmissionEvent::Failed { message } => {
                self.fail(message);
                Transition(State::failed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn awaiting_confirmation(&mut self, event: &SubmissionEvent) -> Outcome<State> {
        match event {
            SubmissionEvent::Start => self.restart_abandoned(),
            SubmissionEvent::Confirmed => {
                self.observed.loading = false;
                Transition(State::confirmed())
            }
            SubmissionEvent::Failed { message } => {
                self.fail(message);
                Transition(State::failed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn confirmed(&mut self, event: &SubmissionEvent) -> Outcome<State> {
        match event {
            SubmissionEvent::Start => {
                self.begin_attempt();
                Transition(State::submitting())
            }
            _ => Handled,
        }
    }

    #[state]
    fn failed(&mut self, event: &SubmissionEvent) -> Outcome<State> {
        match event {
            SubmissionEvent::Start => {
                self.begin_attempt();
                Transition(State::submitting())
            }
            _ => Handled,
        }
    }
}

impl SubmissionMachine {
    pub fn workflow_state(&self) -> &WorkflowState {
        &self.observed
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_loading(&self) -> bool {
        self.observed.loading
    }
}
