use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use mapsweep_core::{
    CategoryData, CategoryEntry, Counts, DeletionRun, Engine, EventBus, Phase, ResetPolicy,
    StatusText, WorkflowController,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionOptions {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub reset_policy: ResetPolicy,
    #[serde(default = "default_event_log_limit")]
    pub event_log_limit: usize,
}

fn default_event_log_limit() -> usize {
    10_000
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            session_id: None,
            reset_policy: ResetPolicy::default(),
            event_log_limit: default_event_log_limit(),
        }
    }
}

pub fn load_options(path: impl AsRef<Path>) -> Result<SessionOptions> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read session options {}", path.display()))?;
    let options: SessionOptions = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(options)
}

/// Entry of the session log, appended after every operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEvent {
    pub seq: u64,
    pub session_id: String,
    pub action: String,
    pub phase: Phase,
    pub status: StatusText,
    pub error: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: Phase,
    pub counts: Counts,
    pub status: StatusText,
    pub categories: Vec<CategoryEntry>,
    pub selected_size: u64,
    pub deletion: Option<DeletionRun>,
    pub total_events: u64,
}

/// One workflow session: a controller bound to an engine plus a pollable event log.
pub struct Session<E: Engine> {
    id: String,
    options: SessionOptions,
    controller: WorkflowController<E>,
    log: VecDeque<SessionEvent>,
    next_seq: u64,
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E, bus: &EventBus, options: SessionOptions) -> Self {
        let id = options
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let controller =
            WorkflowController::new(engine, bus).with_reset_policy(options.reset_policy);
        info!(session = %id, "session opened");
        Self {
            id,
            options,
            controller,
            log: VecDeque::new(),
            next_seq: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn controller(&self) -> &WorkflowController<E> {
        &self.controller
    }

    pub fn start_scan(&mut self, path: impl AsRef<Path>) -> Result<Phase> {
        let path = path.as_ref();
        let result = self.controller.start_scan(path);
        self.record("start_scan", result.as_ref().err());
        result.with_context(|| format!("failed to scan {}", path.display()))
    }

    pub fn complete_scan(&mut self) -> Result<()> {
        let result = self.controller.complete_scan();
        self.record("complete_scan", result.as_ref().err());
        result.context("failed to load category summary")
    }

    pub fn pump(&mut self) -> usize {
        let applied = self.controller.pump();
        if applied > 0 {
            self.record("pump", None::<&String>);
        }
        applied
    }

    pub fn cancel(&mut self) -> Phase {
        let phase = self.controller.cancel();
        self.record("cancel", None::<&String>);
        phase
    }

    pub fn toggle_selection(&mut self, category: &str) -> Result<bool> {
        let result = self.controller.toggle_selection(category);
        self.record("toggle_selection", result.as_ref().err());
        result.with_context(|| format!("failed to toggle {category}"))
    }

    pub fn delete_selected(&mut self) -> Result<DeletionRun> {
        let result = self.controller.start_deletion();
        self.record("delete_selected", result.as_ref().err());
        result.context("failed to delete selected categories")
    }

    pub fn category_files(&mut self, category: &str) -> Result<CategoryData> {
        self.controller
            .category_files(category)
            .with_context(|| format!("failed to list files for {category}"))
    }

    pub fn reset(&mut self, policy: ResetPolicy) {
        self.controller.reset(policy);
        self.record("reset", None::<&String>);
    }

    /// Log entries with a sequence number greater than `from_seq`.
    pub fn events_since(&self, from_seq: u64) -> Vec<SessionEvent> {
        self.log
            .iter()
            .filter(|event| event.seq > from_seq)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.controller.state();
        SessionSnapshot {
            session_id: self.id.clone(),
            phase: state.phase(),
            counts: *state.counts(),
            status: state.status().clone(),
            categories: self.controller.categories().entries().cloned().collect(),
            selected_size: self.controller.categories().total_selected_size(),
            deletion: self.controller.deletion().cloned(),
            total_events: self.next_seq - 1,
        }
    }

    /// Ends the session and hands the engine back.
    pub fn close(self) -> E {
        info!(session = %self.id, "session closed");
        self.controller.shutdown()
    }

    fn record(&mut self, action: &str, error: Option<&impl ToString>) {
        let state = self.controller.state();
        let event = SessionEvent {
            seq: self.next_seq,
            session_id: self.id.clone(),
            action: action.to_string(),
            phase: state.phase(),
            status: state.status().clone(),
            error: error.map(ToString::to_string),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.next_seq += 1;
        self.log.push_back(event);
        while self.log.len() > self.options.event_log_limit {
            self.log.pop_front();
        }
    }
}
