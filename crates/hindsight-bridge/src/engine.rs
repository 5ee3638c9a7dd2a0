//! Completion inference and dedup.
//!
//! Hosts never announce that a session ended. A session counts as complete
//! once a different session is created after it; that transition is the only
//! thing that triggers analysis. The final session of a process is therefore
//! never analyzed unless the host calls [`Reflector::flush`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use hindsight_core::{HostEvent, SessionEvent};

use crate::config::ReflectConfig;
use crate::dispatch::{dispatch, DispatchOutcome};
use crate::eligibility::{evaluate, SkipReason, Verdict};
use crate::host::Host;

/// Last-known session slot plus the set of ids already decided upon.
///
/// The dedup set only grows for the lifetime of the process.
#[derive(Debug, Default, Clone)]
pub struct CompletionTracker {
    last_known: Option<String>,
    analyzed: HashSet<String>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_known(&self) -> Option<&str> {
        self.last_known.as_deref()
    }

    pub fn is_analyzed(&self, session_id: &str) -> bool {
        self.analyzed.contains(session_id)
    }

    pub fn analyzed_count(&self) -> usize {
        self.analyzed.len()
    }

    /// Update the last-known slot and return the session this event completes.
    ///
    /// Only `Created` completes anything: the previous id, when it differs from
    /// the new one and has not been decided yet. `Idle` just moves the slot.
    pub fn observe(&mut self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::Created(id) => {
                let previous = self.last_known.replace(id.clone())?;
                if previous != *id && !self.is_analyzed(&previous) {
                    Some(previous)
                } else {
                    None
                }
            }
            SessionEvent::Idle(id) => {
                self.last_known = Some(id.clone());
                None
            }
            SessionEvent::Ignored => None,
        }
    }

    /// Record `session_id` as decided. Returns `false` if it already was.
    pub fn claim(&mut self, session_id: &str) -> bool {
        self.analyzed.insert(session_id.to_string())
    }
}

/// What happened to one analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The id was already in the dedup set; nothing ran.
    Duplicate,
    Skipped(SkipReason),
    Dispatched { reflection_id: String },
    /// Reflection session creation yielded no id.
    NoReflectionSession,
    /// Some collaborator failed; the error was logged.
    Failed(String),
}

/// Event-driven reflection engine for one project.
pub struct Reflector {
    host: Host,
    config: ReflectConfig,
    project_dir: PathBuf,
    tracker: CompletionTracker,
}

impl Reflector {
    pub fn new(host: Host, config: ReflectConfig, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            config,
            project_dir: project_dir.into(),
            tracker: CompletionTracker::new(),
        }
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn config(&self) -> &ReflectConfig {
        &self.config
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Entry point for raw host events. Unrecognized events are dropped silently.
    pub async fn handle_event(&mut self, event: &HostEvent) -> Option<AnalysisOutcome> {
        self.handle(SessionEvent::from_host(event)).await
    }

    /// Returns the outcome when the event completed a session.
    pub async fn handle(&mut self, event: SessionEvent) -> Option<AnalysisOutcome> {
        let completed = self.tracker.observe(&event)?;
        Some(self.analyze_session(&completed).await)
    }

    /// Analyze the last-known session now, for hosts that can signal shutdown.
    pub async fn flush(&mut self) -> Option<AnalysisOutcome> {
        let last = self.tracker.last_known()?.to_string();
        Some(self.analyze_session(&last).await)
    }

    /// Wait for notifications spawned by earlier dispatches.
    pub async fn wait_for_notifications(&self) {
        self.host.wait_for_notifications().await;
    }

    /// Claim the id, then run eligibility and dispatch. Never fails: errors
    /// are logged at error level and reported as `Failed`.
    pub async fn analyze_session(&mut self, session_id: &str) -> AnalysisOutcome {
        // Claim before the first await so a duplicate trigger cannot slip in.
        if !self.tracker.claim(session_id) {
            return AnalysisOutcome::Duplicate;
        }
        match self.run(session_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("{e:#}");
                self.host.error(format!("Analysis failed: {message}")).await;
                AnalysisOutcome::Failed(message)
            }
        }
    }

    async fn run(&self, session_id: &str) -> Result<AnalysisOutcome> {
        let eligible = match evaluate(&self.host, &self.config, &self.project_dir, session_id)
            .await?
        {
            Verdict::Eligible(e) => e,
            Verdict::Skip(reason) => return Ok(AnalysisOutcome::Skipped(reason)),
        };

        self.host
            .info(format!("Analyzing: {}", eligible.session.label()))
            .await;

        let outcome = match dispatch(&self.host, &self.config, &self.project_dir, &eligible).await? {
            DispatchOutcome::Dispatched { reflection_id } => {
                AnalysisOutcome::Dispatched { reflection_id }
            }
            DispatchOutcome::NoSessionId => AnalysisOutcome::NoReflectionSession,
        };
        Ok(outcome)
    }
}
