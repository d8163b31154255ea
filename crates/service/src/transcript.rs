use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mapsweep_core::{
    CategoryData, CategoryId, CategorySummary, Engine, EngineError, EngineEvent, EventBus,
    FileInfo, WireEvent,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Recorded engine session: the events a scan emitted plus the responses the engine served.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    #[serde(default)]
    pub scan_events: Vec<WireEvent>,
    #[serde(default)]
    pub summary: Option<CategorySummary>,
    #[serde(default)]
    pub category_data: BTreeMap<String, Vec<FileInfo>>,
    /// Categories whose deletion the engine rejected.
    #[serde(default)]
    pub failing_categories: Vec<CategoryId>,
}

impl Transcript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse transcript {}", path.display()))
    }
}

/// Engine that replays a [`Transcript`] onto an event bus.
#[derive(Debug)]
pub struct TranscriptEngine {
    transcript: Transcript,
    bus: EventBus,
    scanned: bool,
    deleted: BTreeSet<CategoryId>,
    cancel_requests: usize,
}

impl TranscriptEngine {
    pub fn new(transcript: Transcript, bus: &EventBus) -> Self {
        Self {
            transcript,
            bus: bus.clone(),
            scanned: false,
            deleted: BTreeSet::new(),
            cancel_requests: 0,
        }
    }

    pub fn from_path(path: impl AsRef<Path>, bus: &EventBus) -> Result<Self> {
        Ok(Self::new(Transcript::load(path)?, bus))
    }

    pub fn cancel_requests(&self) -> usize {
        self.cancel_requests
    }

    pub fn deleted(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.deleted.iter().copied()
    }

    fn decode_scan_events(&self) -> Result<Vec<EngineEvent>, EngineError> {
        self.transcript
            .scan_events
            .iter()
            .map(|wire| {
                wire.decode().map_err(|err| EngineError::Malformed {
                    request: "scan_directory".to_string(),
                    reason: err.to_string(),
                })
            })
            .collect()
    }
}

impl Engine for TranscriptEngine {
    fn cancel_operation(&mut self) -> Result<(), EngineError> {
        self.cancel_requests += 1;
        debug!(requests = self.cancel_requests, "cancel requested");
        Ok(())
    }

    fn scan_directory(&mut self, path: &Path) -> Result<(), EngineError> {
        let events = self.decode_scan_events()?;
        debug!(path = %path.display(), events = events.len(), "replaying scan");
        self.scanned = false;
        self.deleted.clear();
        for event in events {
            self.bus.publish(event);
        }
        self.scanned = true;
        Ok(())
    }

    fn get_category_summary(&mut self) -> Result<Option<CategorySummary>, EngineError> {
        if !self.scanned {
            return Ok(None);
        }
        Ok(self.transcript.summary.clone())
    }

    fn get_category_data(
        &mut self,
        category: CategoryId,
    ) -> Result<Option<CategoryData>, EngineError> {
        if !self.scanned {
            return Ok(None);
        }
        if self.deleted.contains(&category) {
            return Ok(Some(CategoryData::default()));
        }
        let files = self
            .transcript
            .category_data
            .get(category.as_str())
            .cloned()
            .unwrap_or_default();
        Ok(Some(CategoryData { files }))
    }

    fn delete_files(&mut self, categories: &[CategoryId]) -> Result<(), EngineError> {
        if !self.scanned {
            return Err(EngineError::Rejected {
                request: "delete_files".to_string(),
                reason: "no completed scan".to_string(),
            });
        }

        for id in categories {
            self.bus.publish(EngineEvent::DeletionCategoryStart(*id));
            if self.transcript.failing_categories.contains(id) {
                return Err(EngineError::Rejected {
                    request: "delete_files".to_string(),
                    reason: format!("failed to delete {id}"),
                });
            }
            self.deleted.insert(*id);
            self.bus.publish(EngineEvent::DeletionCategoryComplete(*id));
        }
        Ok(())
    }
}
