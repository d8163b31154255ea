//! Contract between the workflow and the external analysis/deletion engine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::CategoryId;
use crate::counters::FilterDelta;
use crate::error::{EngineError, WorkflowError};
use crate::model::{CategoryData, CategorySummary};

pub mod names {
    pub const STATUS: &str = "scanner_status";

    pub const SCAN_COUNTS: &str = "scanner_scan_counts";
    pub const PARSE_COUNTS: &str = "scanner_parse_counts";
    pub const FILTER_COUNTS: &str = "scanner_filter_counts";

    pub const DELETION_CATEGORY_START: &str = "deletion_category_start";
    pub const DELETION_CATEGORY_COMPLETE: &str = "deletion_category_complete";
}

/// Request/response calls the engine serves. Implementations publish progress to an
/// [`EventBus`](crate::events::EventBus) while a request is running.
pub trait Engine {
    /// Cancels whichever phase or deletion is currently active.
    fn cancel_operation(&mut self) -> Result<(), EngineError>;

    /// Runs scan, parse and filter over `path`.
    fn scan_directory(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Terminal summary of the last completed run, if any.
    fn get_category_summary(&mut self) -> Result<Option<CategorySummary>, EngineError>;

    fn get_category_data(
        &mut self,
        category: CategoryId,
    ) -> Result<Option<CategoryData>, EngineError>;

    fn delete_files(&mut self, categories: &[CategoryId]) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    ScanStart,
    ParseStart,
    FilterStart,
    ScanCancelled,
    ParseCancelled,
    FilterCancelled,
    DeletionCancelled,
}

/// Push event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Status(StatusEvent),
    ScanCount(u64),
    ParseCount(u64),
    FilterCounts(FilterDelta),
    DeletionCategoryStart(CategoryId),
    DeletionCategoryComplete(CategoryId),
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Status(_) => names::STATUS,
            EngineEvent::ScanCount(_) => names::SCAN_COUNTS,
            EngineEvent::ParseCount(_) => names::PARSE_COUNTS,
            EngineEvent::FilterCounts(_) => names::FILTER_COUNTS,
            EngineEvent::DeletionCategoryStart(_) => names::DELETION_CATEGORY_START,
            EngineEvent::DeletionCategoryComplete(_) => names::DELETION_CATEGORY_COMPLETE,
        }
    }

    /// Decodes a `(name, payload)` pair as delivered by the transport.
    pub fn from_wire(name: &str, payload: &Value) -> Result<Self, WorkflowError> {
        let malformed = |reason: String| WorkflowError::MalformedEvent {
            event: name.to_string(),
            reason,
        };
        let event = match name {
            names::STATUS => EngineEvent::Status(
                StatusEvent::deserialize(payload).map_err(|err| malformed(err.to_string()))?,
            ),
            names::SCAN_COUNTS => EngineEvent::ScanCount(count(payload).map_err(malformed)?),
            names::PARSE_COUNTS => EngineEvent::ParseCount(count(payload).map_err(malformed)?),
            names::FILTER_COUNTS => EngineEvent::FilterCounts(
                FilterDelta::deserialize(payload).map_err(|err| malformed(err.to_string()))?,
            ),
            names::DELETION_CATEGORY_START => {
                EngineEvent::DeletionCategoryStart(category(payload).map_err(malformed)?)
            }
            names::DELETION_CATEGORY_COMPLETE => {
                EngineEvent::DeletionCategoryComplete(category(payload).map_err(malformed)?)
            }
            _ => return Err(malformed("unknown event".to_string())),
        };
        Ok(event)
    }

    pub fn payload(&self) -> Value {
        match self {
            EngineEvent::Status(status) => serde_json::to_value(status).unwrap_or(Value::Null),
            EngineEvent::ScanCount(delta) | EngineEvent::ParseCount(delta) => Value::from(*delta),
            EngineEvent::FilterCounts(delta) => serde_json::to_value(delta).unwrap_or(Value::Null),
            EngineEvent::DeletionCategoryStart(id) | EngineEvent::DeletionCategoryComplete(id) => {
                Value::from(id.as_str())
            }
        }
    }
}

fn count(payload: &Value) -> Result<u64, String> {
    payload
        .as_u64()
        .ok_or_else(|| format!("expected a non-negative integer, got {payload}"))
}

fn category(payload: &Value) -> Result<CategoryId, String> {
    let raw = payload
        .as_str()
        .ok_or_else(|| format!("expected a category id, got {payload}"))?;
    raw.parse::<CategoryId>().map_err(|err| err.to_string())
}

/// Wire representation of an event, as recorded in transcripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireEvent {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl WireEvent {
    pub fn decode(&self) -> Result<EngineEvent, WorkflowError> {
        EngineEvent::from_wire(&self.event, &self.payload)
    }
}

impl From<&EngineEvent> for WireEvent {
    fn from(event: &EngineEvent) -> Self {
        Self {
            event: event.name().to_string(),
            payload: event.payload(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{names, EngineEvent, StatusEvent, WireEvent};
    use crate::category::CategoryId;
    use crate::counters::FilterDelta;
    use crate::error::WorkflowError;

    #[test]
    fn decodes_status_and_counts() {
        assert_eq!(
            EngineEvent::from_wire(names::STATUS, &json!("parse_start")).expect("status"),
            EngineEvent::Status(StatusEvent::ParseStart)
        );
        assert_eq!(
            EngineEvent::from_wire(names::SCAN_COUNTS, &json!(250)).expect("count"),
            EngineEvent::ScanCount(250)
        );
        assert_eq!(
            EngineEvent::from_wire(names::FILTER_COUNTS, &json!({"storyboard": 3}))
                .expect("filter"),
            EngineEvent::FilterCounts(FilterDelta::default().with(CategoryId::Storyboard, 3))
        );
        assert_eq!(
            EngineEvent::from_wire(names::DELETION_CATEGORY_COMPLETE, &json!("hitsound"))
                .expect("deletion"),
            EngineEvent::DeletionCategoryComplete(CategoryId::Hitsound)
        );
    }

    #[test]
    fn rejects_negative_counts_and_unknown_names() {
        assert!(matches!(
            EngineEvent::from_wire(names::PARSE_COUNTS, &json!(-1)),
            Err(WorkflowError::MalformedEvent { .. })
        ));
        assert!(matches!(
            EngineEvent::from_wire(names::STATUS, &json!("warming_up")),
            Err(WorkflowError::MalformedEvent { .. })
        ));
        assert!(matches!(
            EngineEvent::from_wire("scanner_progress", &json!(1)),
            Err(WorkflowError::MalformedEvent { event, .. }) if event == "scanner_progress"
        ));
    }

    #[test]
    fn wire_event_carries_name_and_payload() {
        let wire = WireEvent::from(&EngineEvent::Status(StatusEvent::DeletionCancelled));
        assert_eq!(wire.event, names::STATUS);
        assert_eq!(wire.payload, json!("deletion_cancelled"));
        assert_eq!(
            wire.decode().expect("decodes"),
            EngineEvent::Status(StatusEvent::DeletionCancelled)
        );
    }
}
