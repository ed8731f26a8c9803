//! Periodic AI status polling.

use crate::error::{DemoError, ServiceError};
use crate::gateway::types::{AgentDetails, SystemStatus};
use crate::gateway::{self, Endpoint, Gateway};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HealthBand {
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn classify(score: f64) -> Self {
        if score >= 0.8 {
            Self::Good
        } else if score >= 0.6 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Low,
}

impl PerformanceBand {
    pub fn classify(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else {
            Self::Low
        }
    }
}

/// What the dashboard currently shows: the last good status plus the most
/// recent poll error, if the latest poll failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub status: Option<SystemStatus>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub polls: u64,
}

impl DashboardView {
    pub fn health(&self) -> Option<HealthBand> {
        self.status
            .as_ref()
            .map(|status| HealthBand::classify(status.overall_health))
    }
}

pub struct StatusDashboard {
    gateway: Arc<dyn Gateway>,
    interval: Duration,
    view: watch::Sender<DashboardView>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusDashboard {
    pub fn new(gateway: Arc<dyn Gateway>, interval: Duration) -> Arc<Self> {
        let (view, _) = watch::channel(DashboardView::default());
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            gateway,
            interval,
            view,
            shutdown,
            task: Mutex::new(None),
        })
    }

    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.subscribe()
    }

    /// Poll once and fold the outcome into the view.
    pub async fn fetch_once(&self) -> Result<SystemStatus, ServiceError> {
        let outcome = gateway::fetch::<SystemStatus>(self.gateway.as_ref(), Endpoint::AiStatus).await;
        self.view.send_modify(|view| {
            view.polls += 1;
            match &outcome {
                Ok(status) => {
                    view.status = Some(status.clone());
                    view.fetched_at = Some(Utc::now());
                    view.last_error = None;
                }
                Err(err) => view.last_error = Some(err.to_string()),
            }
        });
        match &outcome {
            Ok(status) => tracing::debug!(
                health = status.overall_health,
                agents = status.agents.len(),
                "dashboard.poll"
            ),
            Err(err) => tracing::warn!(error = %err, "dashboard.poll_failed"),
        }
        outcome
    }

    /// Poll now and then every interval until [`teardown`](Self::teardown).
    /// Calling it while already polling does nothing.
    pub fn start(self: &Arc<Self>) {
        let mut task = self
            .task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        self.shutdown.send_replace(false);
        let dashboard = Arc::clone(self);
        let shutdown = self.shutdown.subscribe();
        *task = Some(tokio::spawn(async move {
            dashboard.poll_loop(shutdown).await;
        }));
    }

    pub fn teardown(&self) {
        self.shutdown.send_replace(true);
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    pub async fn agent_details(&self, agent_id: &str) -> Result<AgentDetails, DemoError> {
        let agent_id = agent_id.trim();
        if agent_id.is_empty() {
            return Err(DemoError::EmptyAgentId);
        }
        Ok(gateway::fetch(
            self.gateway.as_ref(),
            Endpoint::AgentDetails(agent_id.to_string()),
        )
        .await?)
    }

    async fn poll_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let _ = self.fetch_once().await;
        loop {
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {
                    let _ = self.fetch_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() { break; }
                }
            }
        }
        tracing::debug!("dashboard.stopped");
    }
}
