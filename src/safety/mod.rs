//! Safety screening of the draft prompt.
//!
//! Every draft edit bumps a sequence number. Only the check started for the
//! newest sequence number may change the published verdict; anything that
//! finishes later for an older draft is dropped, whatever order the
//! responses arrive in.

use crate::error::ServiceError;
use crate::gateway::types::{PromptRequest, SafetyVerdict};
use crate::gateway::{self, Endpoint, Gateway};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SafetyStatus {
    Idle,
    Checking,
    Safe,
    Unsafe,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetySnapshot {
    pub sequence: u64,
    pub draft: String,
    pub status: SafetyStatus,
    pub issues: Vec<String>,
    pub recovery_suggestions: Vec<String>,
    pub error: Option<String>,
}

impl SafetySnapshot {
    fn with_status(sequence: u64, draft: String, status: SafetyStatus) -> Self {
        Self {
            sequence,
            draft,
            status,
            issues: Vec::new(),
            recovery_suggestions: Vec::new(),
            error: None,
        }
    }
}

pub type ListObserver = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Optional listeners supplied by the embedding view. Each is invoked at
/// most once per accepted verdict, after the verdict is published.
#[derive(Clone, Default)]
pub struct SafetyObservers {
    pub on_issue: Option<ListObserver>,
    pub on_suggestion: Option<ListObserver>,
}

struct MonitorState {
    sequence: u64,
    pending: Option<JoinHandle<()>>,
}

pub struct SafetyMonitor {
    gateway: Arc<dyn Gateway>,
    debounce: Duration,
    observers: SafetyObservers,
    state: Mutex<MonitorState>,
    snapshot: watch::Sender<SafetySnapshot>,
}

impl SafetyMonitor {
    pub fn new(gateway: Arc<dyn Gateway>, debounce: Duration) -> Arc<Self> {
        Self::with_observers(gateway, debounce, SafetyObservers::default())
    }

    pub fn with_observers(
        gateway: Arc<dyn Gateway>,
        debounce: Duration,
        observers: SafetyObservers,
    ) -> Arc<Self> {
        let (snapshot, _) = watch::channel(SafetySnapshot::with_status(
            0,
            String::new(),
            SafetyStatus::Idle,
        ));
        Arc::new(Self {
            gateway,
            debounce,
            observers,
            state: Mutex::new(MonitorState {
                sequence: 0,
                pending: None,
            }),
            snapshot,
        })
    }

    /// Record a new draft and schedule its screening. Must be called from
    /// within a Tokio runtime. Returns the sequence number assigned to it.
    pub fn on_draft_changed(self: &Arc<Self>, draft: impl Into<String>) -> u64 {
        let draft = draft.into();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.sequence += 1;
        let sequence = state.sequence;
        if let Some(previous) = state.pending.take() {
            previous.abort();
        }

        if draft.trim().is_empty() {
            self.snapshot
                .send_replace(SafetySnapshot::with_status(sequence, draft, SafetyStatus::Idle));
            return sequence;
        }

        self.snapshot.send_replace(SafetySnapshot::with_status(
            sequence,
            draft.clone(),
            SafetyStatus::Checking,
        ));
        let monitor = Arc::clone(self);
        state.pending = Some(tokio::spawn(async move {
            monitor.run_check(sequence, draft).await;
        }));
        sequence
    }

    pub fn snapshot(&self) -> SafetySnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SafetySnapshot> {
        self.snapshot.subscribe()
    }

    /// Wait until the newest draft has left `Checking`.
    pub async fn settled(&self) -> SafetySnapshot {
        let mut rx = self.snapshot.subscribe();
        let settled = rx
            .wait_for(|snapshot| snapshot.status != SafetyStatus::Checking)
            .await
            .map(|snapshot| snapshot.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    /// Cancel pending work and mark anything in flight as stale.
    pub fn teardown(&self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.sequence += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        let current = self.snapshot.borrow().clone();
        if current.status == SafetyStatus::Checking {
            self.snapshot.send_replace(SafetySnapshot::with_status(
                state.sequence,
                current.draft,
                SafetyStatus::Idle,
            ));
        }
    }

    async fn run_check(&self, sequence: u64, draft: String) {
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        let outcome = gateway::send::<_, SafetyVerdict>(
            self.gateway.as_ref(),
            Endpoint::SafetyCheck,
            &PromptRequest {
                prompt: draft.clone(),
            },
        )
        .await;
        self.settle(sequence, draft, outcome);
    }

    fn settle(&self, sequence: u64, draft: String, outcome: Result<SafetyVerdict, ServiceError>) {
        let (accepted, suggestions) = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if state.sequence != sequence {
                tracing::debug!(sequence, current = state.sequence, "safety.stale");
                return;
            }
            state.pending = None;

            let (snapshot, suggestions) = match outcome {
                // Suggestions may accompany a safe verdict. They reach the
                // observer but are not displayed.
                Ok(verdict) if verdict.is_safe => (
                    SafetySnapshot::with_status(sequence, draft, SafetyStatus::Safe),
                    verdict.recovery_suggestions,
                ),
                Ok(verdict) => {
                    let suggestions = verdict.recovery_suggestions.clone();
                    let snapshot = SafetySnapshot {
                        sequence,
                        draft,
                        status: SafetyStatus::Unsafe,
                        issues: verdict.issues,
                        recovery_suggestions: verdict.recovery_suggestions,
                        error: None,
                    };
                    (snapshot, suggestions)
                }
                Err(err) => {
                    tracing::warn!(sequence, error = %err, "safety.check_failed");
                    let mut snapshot =
                        SafetySnapshot::with_status(sequence, draft, SafetyStatus::Error);
                    snapshot.error = Some(err.to_string());
                    (snapshot, Vec::new())
                }
            };
            self.snapshot.send_replace(snapshot.clone());
            (snapshot, suggestions)
        };

        if accepted.status == SafetyStatus::Unsafe {
            tracing::info!(sequence, issues = accepted.issues.len(), "safety.unsafe");
            if let Some(observer) = &self.observers.on_issue {
                observer(&accepted.issues);
            }
        }
        if !suggestions.is_empty() {
            if let Some(observer) = &self.observers.on_suggestion {
                observer(&suggestions);
            }
        }
    }
}
