//! Generation workflow: validate → safety gate → generate → commit →
//! history refresh.
//!
//! One controller owns at most one in-flight submission. A newer call
//! supersedes the older one: the older call's token is cancelled and its
//! epoch goes stale, so it can never commit. The committed result is an
//! `Arc` replaced in a single step.

pub mod export;

pub use export::{artifact_name, write_artifact};

use crate::error::{GenerationError, ServiceError};
use crate::gateway::types::{GenerationRequest, GenerationResponse, PromptRequest, SafetyVerdict};
use crate::gateway::{self, Endpoint, Gateway};
use crate::history::HistorySynchronizer;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub request_id: String,
    pub image_data: Vec<u8>,
    pub enriched_prompt: String,
}

struct WorkflowState {
    epoch: u64,
    in_flight: Option<CancellationToken>,
    current: Option<Arc<GenerationResult>>,
}

pub struct GenerationController {
    gateway: Arc<dyn Gateway>,
    history: Option<Arc<HistorySynchronizer>>,
    safety_gate: bool,
    state: Mutex<WorkflowState>,
}

impl GenerationController {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            history: None,
            safety_gate: true,
            state: Mutex::new(WorkflowState {
                epoch: 0,
                in_flight: None,
                current: None,
            }),
        }
    }

    /// Refresh `history` after every committed result.
    #[must_use]
    pub fn with_history(mut self, history: Arc<HistorySynchronizer>) -> Self {
        self.history = Some(history);
        self
    }

    /// Screen each prompt with the safety check before generating.
    #[must_use]
    pub fn with_safety_gate(mut self, enabled: bool) -> Self {
        self.safety_gate = enabled;
        self
    }

    pub fn current(&self) -> Option<Arc<GenerationResult>> {
        self.lock().current.clone()
    }

    pub fn in_flight(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Cancel any in-flight submission. Its result, if it still arrives, is
    /// dropped.
    pub fn teardown(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        if let Some(token) = state.in_flight.take() {
            token.cancel();
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        options: BTreeMap<String, String>,
    ) -> Result<Arc<GenerationResult>, GenerationError> {
        let request = validate(prompt, options)?;
        let workflow_id = format!("gen_{}", Uuid::new_v4().simple());
        let (epoch, token) = self.begin();
        let _slot = InFlightSlot {
            state: &self.state,
            epoch,
        };
        tracing::info!(%workflow_id, epoch, options = request.options.len(), "generation.submit");

        let outcome = tokio::select! {
            () = token.cancelled() => {
                tracing::info!(%workflow_id, epoch, "generation.superseded");
                return Err(GenerationError::Superseded);
            }
            outcome = self.run(&request) => outcome,
        };

        let result = {
            let mut state = self.lock();
            if state.epoch != epoch {
                tracing::info!(%workflow_id, epoch, current = state.epoch, "generation.superseded");
                return Err(GenerationError::Superseded);
            }
            let result = match outcome {
                Ok(result) => Arc::new(result),
                Err(err) => {
                    tracing::warn!(%workflow_id, epoch, error = %err, "generation.failed");
                    return Err(err);
                }
            };
            state.current = Some(Arc::clone(&result));
            result
        };
        tracing::info!(
            %workflow_id,
            request_id = %result.request_id,
            bytes = result.image_data.len(),
            "generation.commit"
        );

        self.refresh_history(&result.request_id);
        Ok(result)
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut state = self.lock();
        state.epoch += 1;
        let token = CancellationToken::new();
        if let Some(previous) = state.in_flight.replace(token.clone()) {
            previous.cancel();
        }
        (state.epoch, token)
    }

    async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        if self.safety_gate {
            let verdict = gateway::send::<_, SafetyVerdict>(
                self.gateway.as_ref(),
                Endpoint::SafetyCheck,
                &PromptRequest {
                    prompt: request.prompt.clone(),
                },
            )
            .await
            .map_err(GenerationError::service)?;
            if !verdict.is_safe {
                return Err(GenerationError::Unsafe {
                    issues: verdict.issues,
                    suggestions: verdict.recovery_suggestions,
                });
            }
        }

        let response: GenerationResponse =
            gateway::send(self.gateway.as_ref(), Endpoint::Generate, request)
                .await
                .map_err(GenerationError::service)?;

        let image_data = STANDARD
            .decode(response.image_data.trim())
            .map_err(|e| GenerationError::service(ServiceError::Parse(format!("image_data: {e}"))))?;

        Ok(GenerationResult {
            request_id: response.request_id,
            image_data,
            enriched_prompt: response.enriched_prompt,
        })
    }

    fn refresh_history(&self, request_id: &str) {
        let Some(history) = &self.history else {
            return;
        };
        let history = Arc::clone(history);
        let request_id = request_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = history.refresh().await {
                tracing::warn!(%request_id, error = %err, "generation.history_refresh_failed");
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WorkflowState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Clears the in-flight slot when a submission ends, including when its
/// future is dropped before completing. A newer epoch owns the slot.
struct InFlightSlot<'a> {
    state: &'a Mutex<WorkflowState>,
    epoch: u64,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.epoch == self.epoch {
            state.in_flight = None;
        }
    }
}

fn validate(
    prompt: &str,
    options: BTreeMap<String, String>,
) -> Result<GenerationRequest, GenerationError> {
    if prompt.trim().is_empty() {
        return Err(GenerationError::InvalidInput("prompt must not be empty".into()));
    }
    if let Some((key, _)) = options
        .iter()
        .find(|(key, value)| key.trim().is_empty() || value.trim().is_empty())
    {
        return Err(GenerationError::InvalidInput(format!(
            "option '{key}' must have a non-empty name and value"
        )));
    }
    Ok(GenerationRequest {
        prompt: prompt.to_string(),
        options,
    })
}
