pub mod category;
pub mod counters;
pub mod engine;
pub mod error;
pub mod events;
pub mod humanize;
pub mod model;
pub mod summary;
pub mod workflow;

pub use category::{parse_deletable, registry, CategoryId, CategoryInfo};
pub use counters::{
    format_count, CounterAggregator, Counts, FilterCounts, FilterDelta, StatusText, INITIAL_TITLE,
};
pub use engine::{names as event_names, Engine, EngineEvent, StatusEvent, WireEvent};
pub use error::{EngineError, WorkflowError};
pub use events::{EventBus, Subscription};
pub use humanize::{humanize, humanize_bytes};
pub use model::{CategoryData, CategoryDetail, CategorySummary, FileInfo, Phase};
pub use summary::{CategoryEntry, CategorySummaryStore};
pub use workflow::{DeletionRun, DeletionStatus, ResetPolicy, WorkflowController, WorkflowState};
