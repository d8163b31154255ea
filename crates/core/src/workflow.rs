use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::category::{parse_deletable, CategoryId};
use crate::counters::{CounterAggregator, Counts, StatusText};
use crate::engine::{Engine, EngineEvent, StatusEvent};
use crate::error::WorkflowError;
use crate::events::{EventBus, Subscription};
use crate::model::{CategoryData, CategorySummary, Phase};
use crate::summary::CategorySummaryStore;

/// What happens to the category store when a run is restarted or reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Zero the metrics but keep the user's selection.
    #[default]
    KeepSelection,
    /// Restore every category to its initial, unselected state.
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    phase: Phase,
    counters: CounterAggregator,
    summary: Option<CategorySummary>,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn counts(&self) -> &Counts {
        self.counters.counts()
    }

    pub fn status(&self) -> &StatusText {
        self.counters.status()
    }

    pub fn summary(&self) -> Option<&CategorySummary> {
        self.summary.as_ref()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStatus {
    Running,
    Finished,
    Cancelled,
    Failed,
}

/// Progress of one deletion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionRun {
    pub requested: Vec<CategoryId>,
    pub started: Vec<CategoryId>,
    pub completed: Vec<CategoryId>,
    pub status: DeletionStatus,
}

impl DeletionRun {
    fn new(requested: Vec<CategoryId>) -> Self {
        Self {
            requested,
            started: Vec::new(),
            completed: Vec::new(),
            status: DeletionStatus::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == DeletionStatus::Running
    }

    pub fn pending(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.requested
            .iter()
            .copied()
            .filter(|id| !self.completed.contains(id))
    }
}

/// Drives one workflow session: issues engine requests, applies engine events and owns the
/// workflow state and category store. Calls are expected to be made sequentially.
pub struct WorkflowController<E> {
    engine: E,
    bus: EventBus,
    subscription: Option<Subscription>,
    reset_policy: ResetPolicy,
    state: WorkflowState,
    categories: CategorySummaryStore,
    deletion: Option<DeletionRun>,
}

impl<E: Engine> WorkflowController<E> {
    pub fn new(engine: E, bus: &EventBus) -> Self {
        Self {
            engine,
            bus: bus.clone(),
            subscription: Some(bus.subscribe()),
            reset_policy: ResetPolicy::default(),
            state: WorkflowState::default(),
            categories: CategorySummaryStore::new(),
            deletion: None,
        }
    }

    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn categories(&self) -> &CategorySummaryStore {
        &self.categories
    }

    pub fn deletion(&self) -> Option<&DeletionRun> {
        self.deletion.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn deletion_in_flight(&self) -> bool {
        self.deletion.as_ref().is_some_and(DeletionRun::is_running)
    }

    /// Starts a new scan at `path`. Counters are reset and the category store follows the
    /// configured [`ResetPolicy`]. If the engine rejects the request the previous state is
    /// restored untouched.
    ///
    /// Engines that run the whole analysis inside `scan_directory` are completed right away:
    /// queued events are applied and, once filtering was reached, the terminal summary is
    /// requested. Otherwise the caller drives [`pump`](Self::pump) and
    /// [`complete_scan`](Self::complete_scan).
    pub fn start_scan(&mut self, path: &Path) -> Result<Phase, WorkflowError> {
        if !self.state.phase.accepts_start() || self.deletion_in_flight() {
            return Err(WorkflowError::InvalidTransition {
                action: "start a scan",
                phase: self.state.phase,
            });
        }

        self.discard_pending();
        let previous_state = self.state.clone();
        let previous_categories = self.categories.clone();
        let previous_deletion = self.deletion.take();

        self.state = WorkflowState::default();
        self.apply_reset_policy(self.reset_policy);
        self.set_phase(Phase::Scanning);
        info!(path = %path.display(), "scan requested");

        if let Err(err) = self.engine.scan_directory(path) {
            let discarded = self.discard_pending();
            warn!(%err, discarded, "scan request failed; restoring previous state");
            self.state = previous_state;
            self.categories = previous_categories;
            self.deletion = previous_deletion;
            return Err(err.into());
        }

        self.pump();
        if self.state.phase == Phase::Filtering {
            self.complete_scan()?;
        }
        Ok(self.state.phase)
    }

    /// Requests the terminal summary and moves filtering to complete.
    pub fn complete_scan(&mut self) -> Result<(), WorkflowError> {
        if self.state.phase != Phase::Filtering {
            return Err(WorkflowError::InvalidTransition {
                action: "complete a scan",
                phase: self.state.phase,
            });
        }

        let summary = self
            .engine
            .get_category_summary()?
            .ok_or_else(|| WorkflowError::validation("engine has no category summary"))?;
        self.categories.replace_metrics(&summary)?;
        self.state.summary = Some(summary);
        self.set_phase(Phase::Complete);
        Ok(())
    }

    /// Cancels the active phase or deletion without waiting for the engine. Returns the
    /// resulting phase, which is unchanged when nothing was running.
    pub fn cancel(&mut self) -> Phase {
        let target = if self.deletion_in_flight() {
            Phase::DeletionCancelled
        } else if let Some(target) = self.state.phase.cancelled() {
            target
        } else {
            debug!(phase = %self.state.phase, "nothing to cancel");
            return self.state.phase;
        };

        if let Err(err) = self.engine.cancel_operation() {
            warn!(%err, "cancel request was not delivered");
        }
        self.enter_cancelled(target);
        target
    }

    pub fn toggle_selection(&mut self, category: &str) -> Result<bool, WorkflowError> {
        self.categories.toggle_selection(category)
    }

    /// Deletes every selected category. Only available once a scan completed.
    ///
    /// Categories the engine reports as complete have their size/count cleared. When the
    /// engine fails, categories that did not complete keep their metrics.
    pub fn start_deletion(&mut self) -> Result<DeletionRun, WorkflowError> {
        if self.state.phase != Phase::Complete || self.deletion_in_flight() {
            return Err(WorkflowError::InvalidTransition {
                action: "delete files",
                phase: self.state.phase,
            });
        }

        let selected = self.categories.selected_category_ids();
        if selected.is_empty() {
            return Err(WorkflowError::NothingSelected);
        }

        self.discard_pending();
        info!(categories = ?selected, "deletion requested");
        self.deletion = Some(DeletionRun::new(selected.clone()));
        let result = self.engine.delete_files(&selected);
        self.pump();

        let Some(run) = self.deletion.as_mut() else {
            return Err(WorkflowError::InvalidTransition {
                action: "track deletion",
                phase: self.state.phase,
            });
        };
        if let Err(source) = result {
            if run.is_running() {
                run.status = DeletionStatus::Failed;
            }
            warn!(%source, completed = ?run.completed, "deletion failed");
            return Err(WorkflowError::Deletion {
                completed: run.completed.clone(),
                source,
            });
        }
        Ok(run.clone())
    }

    /// File listing for one deletable category.
    pub fn category_files(&mut self, category: &str) -> Result<CategoryData, WorkflowError> {
        let id = parse_deletable(category)?;
        Ok(self.engine.get_category_data(id)?.unwrap_or_default())
    }

    /// Returns to idle with zero counters and no summary.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.discard_pending();
        self.state = WorkflowState::default();
        self.deletion = None;
        self.apply_reset_policy(policy);
        info!(?policy, "workflow reset");
    }

    /// Applies every queued engine event in arrival order. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let events = match &self.subscription {
            Some(subscription) => subscription.drain(),
            None => return 0,
        };
        events
            .into_iter()
            .filter(|event| self.handle_event(event.clone()))
            .count()
    }

    /// Applies one engine event. Returns `false` when the event does not belong to the current
    /// phase and was discarded.
    pub fn handle_event(&mut self, event: EngineEvent) -> bool {
        let phase = self.state.phase;
        let applied = match &event {
            EngineEvent::Status(StatusEvent::ScanStart) => phase == Phase::Scanning,
            EngineEvent::Status(StatusEvent::ParseStart) => {
                self.advance(Phase::Scanning, Phase::Parsing)
            }
            EngineEvent::Status(StatusEvent::FilterStart) => {
                self.advance(Phase::Parsing, Phase::Filtering)
            }
            EngineEvent::Status(StatusEvent::ScanCancelled) => {
                self.cancelled_by_engine(Phase::ScanCancelled)
            }
            EngineEvent::Status(StatusEvent::ParseCancelled) => {
                self.cancelled_by_engine(Phase::ParseCancelled)
            }
            EngineEvent::Status(StatusEvent::FilterCancelled) => {
                self.cancelled_by_engine(Phase::FilterCancelled)
            }
            EngineEvent::Status(StatusEvent::DeletionCancelled) => {
                if self.deletion_in_flight()
                    || (phase == Phase::Complete && self.deletion.is_some())
                {
                    self.enter_cancelled(Phase::DeletionCancelled);
                    true
                } else {
                    false
                }
            }
            EngineEvent::ScanCount(delta) if phase == Phase::Scanning => {
                self.state.counters.record_scan(*delta);
                true
            }
            EngineEvent::ParseCount(delta) if phase == Phase::Parsing => {
                self.state.counters.record_parse(*delta);
                true
            }
            EngineEvent::FilterCounts(delta) if phase == Phase::Filtering => {
                self.state.counters.record_filter(delta);
                true
            }
            EngineEvent::DeletionCategoryStart(id) => self.deletion_started(*id),
            EngineEvent::DeletionCategoryComplete(id) => self.deletion_completed(*id),
            _ => false,
        };

        if !applied {
            debug!(event = event.name(), phase = %phase, "discarding event");
        }
        applied
    }

    /// Closes the event subscription and hands the engine back.
    pub fn shutdown(mut self) -> E {
        if let Some(subscription) = self.subscription.take() {
            self.bus.unsubscribe(&subscription);
        }
        self.engine
    }

    fn advance(&mut self, from: Phase, to: Phase) -> bool {
        if self.state.phase != from {
            return false;
        }
        self.set_phase(to);
        true
    }

    // A late cancellation overwrites whatever the run reached, completed included.
    fn cancelled_by_engine(&mut self, target: Phase) -> bool {
        if self.state.phase == Phase::Idle || self.deletion_in_flight() {
            return false;
        }
        self.enter_cancelled(target);
        true
    }

    fn enter_cancelled(&mut self, target: Phase) {
        if let Some(run) = self.deletion.as_mut().filter(|run| run.is_running()) {
            run.status = DeletionStatus::Cancelled;
        }
        self.set_phase(target);
    }

    fn deletion_started(&mut self, id: CategoryId) -> bool {
        match self.deletion.as_mut() {
            Some(run) if run.is_running() && run.requested.contains(&id) => {
                if !run.started.contains(&id) {
                    run.started.push(id);
                }
                debug!(category = %id, "deleting category");
                true
            }
            _ => false,
        }
    }

    fn deletion_completed(&mut self, id: CategoryId) -> bool {
        let Some(run) = self
            .deletion
            .as_mut()
            .filter(|run| run.is_running() && run.requested.contains(&id))
        else {
            return false;
        };
        if !run.completed.contains(&id) {
            run.completed.push(id);
        }
        if run.pending().next().is_none() {
            run.status = DeletionStatus::Finished;
            info!(categories = ?run.completed, "deletion finished");
        }
        self.categories.clear_metrics(id);
        true
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            info!(from = %self.state.phase, to = %phase, "phase transition");
        }
        self.state.phase = phase;
        self.state.counters.announce(phase);
    }

    fn apply_reset_policy(&mut self, policy: ResetPolicy) {
        match policy {
            ResetPolicy::KeepSelection => self.categories.reset_metrics(),
            ResetPolicy::Full => self.categories.reset(),
        }
    }

    fn discard_pending(&mut self) -> usize {
        let discarded = self
            .subscription
            .as_ref()
            .map(|subscription| subscription.drain().len())
            .unwrap_or(0);
        if discarded > 0 {
            debug!(discarded, "dropped stale engine events");
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{DeletionStatus, ResetPolicy, WorkflowController, WorkflowState};
    use crate::category::CategoryId;
    use crate::counters::FilterDelta;
    use crate::engine::{Engine, EngineEvent, StatusEvent};
    use crate::error::{EngineError, WorkflowError};
    use crate::events::EventBus;
    use crate::model::{CategoryData, CategoryDetail, CategorySummary, Phase};

    /// Engine that publishes a fixed script and answers from canned responses.
    struct StubEngine {
        bus: EventBus,
        scan_script: Vec<EngineEvent>,
        summary: Option<CategorySummary>,
        fail_scan: bool,
        fail_deletion_after: Option<usize>,
        cancels: usize,
    }

    impl StubEngine {
        fn new(bus: &EventBus) -> Self {
            Self {
                bus: bus.clone(),
                scan_script: full_scan_script(),
                summary: Some(summary(1_000)),
                fail_scan: false,
                fail_deletion_after: None,
                cancels: 0,
            }
        }
    }

    impl Engine for StubEngine {
        fn cancel_operation(&mut self) -> Result<(), EngineError> {
            self.cancels += 1;
            Ok(())
        }

        fn scan_directory(&mut self, _path: &Path) -> Result<(), EngineError> {
            for event in &self.scan_script {
                self.bus.publish(event.clone());
            }
            if self.fail_scan {
                return Err(EngineError::Unreachable("worker crashed".to_string()));
            }
            Ok(())
        }

        fn get_category_summary(&mut self) -> Result<Option<CategorySummary>, EngineError> {
            Ok(self.summary.clone())
        }

        fn get_category_data(
            &mut self,
            _category: CategoryId,
        ) -> Result<Option<CategoryData>, EngineError> {
            Ok(None)
        }

        fn delete_files(&mut self, categories: &[CategoryId]) -> Result<(), EngineError> {
            for (index, id) in categories.iter().enumerate() {
                if self.fail_deletion_after == Some(index) {
                    return Err(EngineError::Rejected {
                        request: "delete_files".to_string(),
                        reason: "permission denied".to_string(),
                    });
                }
                self.bus.publish(EngineEvent::DeletionCategoryStart(*id));
                self.bus.publish(EngineEvent::DeletionCategoryComplete(*id));
            }
            Ok(())
        }
    }

    fn full_scan_script() -> Vec<EngineEvent> {
        vec![
            EngineEvent::Status(StatusEvent::ScanStart),
            EngineEvent::ScanCount(10),
            EngineEvent::ScanCount(5),
            EngineEvent::Status(StatusEvent::ParseStart),
            EngineEvent::ParseCount(4),
            EngineEvent::Status(StatusEvent::FilterStart),
            EngineEvent::FilterCounts(
                FilterDelta::default()
                    .with(CategoryId::Hitsound, 6)
                    .with(CategoryId::Other, 9),
            ),
        ]
    }

    fn summary(size: u64) -> CategorySummary {
        CategoryId::DELETABLE
            .into_iter()
            .map(|id| {
                (
                    id.as_str().to_string(),
                    CategoryDetail {
                        total_size: size,
                        total_count: 2,
                    },
                )
            })
            .collect()
    }

    fn controller() -> (EventBus, WorkflowController<StubEngine>) {
        let bus = EventBus::new();
        let engine = StubEngine::new(&bus);
        let controller = WorkflowController::new(engine, &bus);
        (bus, controller)
    }

    #[test]
    fn full_run_reaches_complete() {
        let (_bus, mut controller) = controller();
        let phase = controller.start_scan(Path::new("songs")).expect("scan runs");

        assert_eq!(phase, Phase::Complete);
        let counts = controller.state().counts();
        assert_eq!(counts.scanned, 15);
        assert_eq!(counts.parsed, 4);
        assert_eq!(counts.filtered.hitsound, 6);
        assert_eq!(counts.filtered.other, 9);
        assert!(controller.state().summary().is_some());
        assert_eq!(
            controller
                .categories()
                .get(CategoryId::Storyboard)
                .expect("entry")
                .size,
            1_000
        );
        assert_eq!(controller.state().status().title, "Analysis complete");
    }

    #[test]
    fn failed_scan_restores_previous_state() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("first scan");
        controller.toggle_selection("hitsound").expect("toggle");
        let state = controller.state().clone();
        let categories = controller.categories().clone();

        controller.engine.fail_scan = true;
        let err = controller
            .start_scan(Path::new("songs"))
            .expect_err("scan fails");
        assert!(matches!(err, WorkflowError::Transport(EngineError::Unreachable(_))));
        assert_eq!(controller.state(), &state);
        assert_eq!(controller.categories(), &categories);
        assert_eq!(controller.pump(), 0);
    }

    #[test]
    fn events_after_cancel_are_ignored() {
        let (bus, mut controller) = controller();
        controller.engine.scan_script = vec![
            EngineEvent::Status(StatusEvent::ScanStart),
            EngineEvent::ScanCount(3),
        ];
        assert_eq!(
            controller.start_scan(Path::new("songs")).expect("scan"),
            Phase::Scanning
        );

        assert_eq!(controller.cancel(), Phase::ScanCancelled);
        assert_eq!(controller.engine().cancels, 1);

        bus.publish(EngineEvent::ScanCount(50));
        bus.publish(EngineEvent::Status(StatusEvent::ParseStart));
        assert_eq!(controller.pump(), 0);
        assert_eq!(controller.state().counts().scanned, 3);
        assert_eq!(controller.phase(), Phase::ScanCancelled);
    }

    #[test]
    fn cancel_when_idle_is_a_no_op() {
        let (_bus, mut controller) = controller();
        assert_eq!(controller.cancel(), Phase::Idle);
        assert_eq!(controller.engine().cancels, 0);
    }

    #[test]
    fn late_cancellation_event_overwrites_complete() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        assert!(controller.handle_event(EngineEvent::Status(StatusEvent::FilterCancelled)));
        assert_eq!(controller.phase(), Phase::FilterCancelled);
    }

    #[test]
    fn deletion_cancelled_without_a_deletion_is_ignored() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        assert!(!controller.handle_event(EngineEvent::Status(StatusEvent::DeletionCancelled)));
        assert_eq!(controller.phase(), Phase::Complete);

        controller.toggle_selection("hitsound").expect("toggle");
        let run = controller.start_deletion().expect("deletion still allowed");
        assert_eq!(run.status, DeletionStatus::Finished);
    }

    #[test]
    fn late_deletion_cancelled_overwrites_finished_deletion() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        controller.toggle_selection("hitsound").expect("toggle");
        controller.start_deletion().expect("deletion");

        assert!(controller.handle_event(EngineEvent::Status(StatusEvent::DeletionCancelled)));
        assert_eq!(controller.phase(), Phase::DeletionCancelled);
        assert_eq!(
            controller.deletion().expect("run").status,
            DeletionStatus::Finished
        );
    }

    #[test]
    fn cannot_start_twice() {
        let (_bus, mut controller) = controller();
        controller.engine.scan_script = vec![EngineEvent::Status(StatusEvent::ScanStart)];
        controller.start_scan(Path::new("songs")).expect("scan");
        assert!(matches!(
            controller.start_scan(Path::new("songs")),
            Err(WorkflowError::InvalidTransition {
                phase: Phase::Scanning,
                ..
            })
        ));
    }

    #[test]
    fn missing_summary_keeps_filtering() {
        let (_bus, mut controller) = controller();
        controller.engine.summary = None;
        assert!(matches!(
            controller.start_scan(Path::new("songs")),
            Err(WorkflowError::Validation { .. })
        ));
        assert_eq!(controller.phase(), Phase::Filtering);

        controller.engine.summary = Some(summary(5));
        controller.complete_scan().expect("retry succeeds");
        assert_eq!(controller.phase(), Phase::Complete);
    }

    #[test]
    fn deletion_clears_only_selected_categories() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        controller.toggle_selection("storyboard").expect("toggle");
        controller.toggle_selection("hitsound").expect("toggle");

        let run = controller.start_deletion().expect("deletion succeeds");
        assert_eq!(run.status, DeletionStatus::Finished);
        assert_eq!(
            run.completed,
            vec![CategoryId::Storyboard, CategoryId::Hitsound]
        );

        let categories = controller.categories();
        let storyboard = categories.get(CategoryId::Storyboard).expect("entry");
        assert_eq!((storyboard.size, storyboard.count), (0, 0));
        assert!(storyboard.selected);
        let video = categories.get(CategoryId::BackgroundVideo).expect("entry");
        assert_eq!((video.size, video.count), (1_000, 2));
    }

    #[test]
    fn failed_deletion_keeps_unfinished_categories() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        controller.toggle_selection("background_image").expect("toggle");
        controller.toggle_selection("skin_element").expect("toggle");
        controller.engine.fail_deletion_after = Some(1);

        let err = controller.start_deletion().expect_err("deletion fails");
        match err {
            WorkflowError::Deletion { completed, .. } => {
                assert_eq!(completed, vec![CategoryId::BackgroundImage]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let categories = controller.categories();
        assert_eq!(
            categories.get(CategoryId::BackgroundImage).expect("entry").size,
            0
        );
        assert_eq!(
            categories.get(CategoryId::SkinElement).expect("entry").size,
            1_000
        );
    }

    #[test]
    fn deletion_requires_selection_and_complete_run() {
        let (_bus, mut controller) = controller();
        assert!(matches!(
            controller.start_deletion(),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        controller.start_scan(Path::new("songs")).expect("scan");
        assert!(matches!(
            controller.start_deletion(),
            Err(WorkflowError::NothingSelected)
        ));
    }

    #[test]
    fn restart_keeps_selection_by_default() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        controller.toggle_selection("hitsound").expect("toggle");
        controller.start_scan(Path::new("songs")).expect("rescan");

        assert_eq!(
            controller.categories().selected_category_ids(),
            vec![CategoryId::Hitsound]
        );
        assert_eq!(controller.state().counts().scanned, 15);
    }

    #[test]
    fn full_reset_policy_clears_selection_on_restart() {
        let bus = EventBus::new();
        let mut controller = WorkflowController::new(StubEngine::new(&bus), &bus)
            .with_reset_policy(ResetPolicy::Full);
        controller.start_scan(Path::new("songs")).expect("scan");
        controller.toggle_selection("hitsound").expect("toggle");
        controller.start_scan(Path::new("songs")).expect("rescan");
        assert!(controller.categories().selected_category_ids().is_empty());
    }

    #[test]
    fn reset_returns_initial_state() {
        let (_bus, mut controller) = controller();
        controller.start_scan(Path::new("songs")).expect("scan");
        controller.reset(ResetPolicy::Full);

        assert_eq!(controller.state(), &WorkflowState::default());
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.state().summary().is_none());
        assert!(controller.categories().entries().all(|entry| entry.size == 0));
    }

    #[test]
    fn shutdown_unsubscribes() {
        let (bus, controller) = controller();
        assert_eq!(bus.subscriber_count(), 1);
        let _engine = controller.shutdown();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn category_files_rejects_other() {
        let (_bus, mut controller) = controller();
        assert!(matches!(
            controller.category_files("other"),
            Err(WorkflowError::NotFound { .. })
        ));
        assert!(controller
            .category_files("hitsound")
            .expect("listing")
            .files
            .is_empty());
    }
}
