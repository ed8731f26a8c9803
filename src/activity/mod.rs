//! Timer-driven pseudo-agent progress log.
//!
//! Stage offsets are measured from the start of the run, not chained from
//! the previous stage. The log is purely presentational: nothing in the
//! generation path waits on it.

use crate::config::{ActivityConfig, StageConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptor {
    pub agent_id: String,
    pub display_name: String,
    pub role_description: String,
    pub offset: Duration,
}

impl From<&StageConfig> for StageDescriptor {
    fn from(stage: &StageConfig) -> Self {
        Self {
            agent_id: stage.id.clone(),
            display_name: stage.name.clone(),
            role_description: stage.role.clone(),
            offset: Duration::from_millis(stage.offset_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentActivityRecord {
    pub agent_id: String,
    pub display_name: String,
    pub role_description: String,
    pub status: ActivityStatus,
    pub timestamp: DateTime<Utc>,
}

impl AgentActivityRecord {
    fn for_stage(stage: &StageDescriptor, status: ActivityStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            agent_id: stage.agent_id.clone(),
            display_name: stage.display_name.clone(),
            role_description: stage.role_description.clone(),
            status,
            timestamp,
        }
    }
}

struct SimulatorState {
    run: u64,
    started_at: Option<DateTime<Utc>>,
    pending: Option<AbortHandle>,
}

pub struct ActivitySimulator {
    stages: Vec<StageDescriptor>,
    state: Mutex<SimulatorState>,
    log: watch::Sender<Vec<AgentActivityRecord>>,
}

/// Handle to one simulator run.
pub struct ActivityRun {
    pub run: u64,
    handle: JoinHandle<Vec<AgentActivityRecord>>,
}

impl ActivityRun {
    /// Wait for every stage of this run. `None` when the run was cancelled
    /// by a restart or teardown.
    pub async fn wait(self) -> Option<Vec<AgentActivityRecord>> {
        self.handle.await.ok()
    }
}

impl ActivitySimulator {
    /// Offsets that go backwards are raised to the previous stage's offset,
    /// so records always come out in configured order.
    pub fn new(stages: Vec<StageDescriptor>) -> Arc<Self> {
        let mut floor = Duration::ZERO;
        let stages = stages
            .into_iter()
            .map(|mut stage| {
                floor = floor.max(stage.offset);
                stage.offset = floor;
                stage
            })
            .collect();
        let (log, _) = watch::channel(Vec::new());
        Arc::new(Self {
            stages,
            state: Mutex::new(SimulatorState {
                run: 0,
                started_at: None,
                pending: None,
            }),
            log,
        })
    }

    pub fn from_config(config: &ActivityConfig) -> Arc<Self> {
        Self::new(config.stages.iter().map(StageDescriptor::from).collect())
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    /// Reset the log and start a new run, cancelling any run in progress.
    pub fn start(self: &Arc<Self>) -> ActivityRun {
        let mut state = self.lock();
        state.run += 1;
        let run = state.run;
        if let Some(previous) = state.pending.take() {
            previous.abort();
        }
        state.started_at = Some(Utc::now());
        self.log.send_replace(Vec::new());
        tracing::debug!(run, stages = self.stages.len(), "activity.start");

        let simulator = Arc::clone(self);
        let handle = tokio::spawn(async move { simulator.drive(run).await });
        state.pending = Some(handle.abort_handle());
        ActivityRun { run, handle }
    }

    pub fn snapshot(&self) -> Vec<AgentActivityRecord> {
        self.log.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<AgentActivityRecord>> {
        self.log.subscribe()
    }

    /// `(completed, total)` for the current run.
    pub fn progress(&self) -> (usize, usize) {
        (self.log.borrow().len(), self.stages.len())
    }

    /// One row per configured stage: the completed record where one exists,
    /// a pending placeholder otherwise.
    pub fn board(&self) -> Vec<AgentActivityRecord> {
        let started_at = self.lock().started_at.unwrap_or_else(Utc::now);
        let log = self.log.borrow();
        self.stages
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                log.get(index).cloned().unwrap_or_else(|| {
                    AgentActivityRecord::for_stage(stage, ActivityStatus::Pending, started_at)
                })
            })
            .collect()
    }

    /// Cancel pending stage timers. The log keeps what was already emitted.
    pub fn teardown(&self) {
        let mut state = self.lock();
        state.run += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
    }

    async fn drive(&self, run: u64) -> Vec<AgentActivityRecord> {
        let started = Instant::now();
        let mut emitted = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            tokio::time::sleep_until(started + stage.offset).await;
            let record = AgentActivityRecord::for_stage(stage, ActivityStatus::Completed, Utc::now());
            if !self.append(run, record.clone()) {
                break;
            }
            emitted.push(record);
        }
        emitted
    }

    fn append(&self, run: u64, record: AgentActivityRecord) -> bool {
        let mut state = self.lock();
        if state.run != run {
            return false;
        }
        tracing::debug!(run, agent = %record.agent_id, "activity.stage");
        self.log.send_modify(|log| log.push(record));
        if self.log.borrow().len() == self.stages.len() {
            state.pending = None;
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimulatorState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
