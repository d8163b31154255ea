use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Workflow phase. The forward path is idle, scanning, parsing, filtering, complete; every active
/// phase (and deletion) has its own cancellation terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Scanning,
    Parsing,
    Filtering,
    Complete,
    ScanCancelled,
    ParseCancelled,
    FilterCancelled,
    DeletionCancelled,
}

impl Phase {
    /// Scanning, parsing or filtering.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Scanning | Phase::Parsing | Phase::Filtering)
    }

    pub fn is_cancelled(self) -> bool {
        matches!(
            self,
            Phase::ScanCancelled
                | Phase::ParseCancelled
                | Phase::FilterCancelled
                | Phase::DeletionCancelled
        )
    }

    /// Phases from which a new run may be started.
    pub fn accepts_start(self) -> bool {
        matches!(self, Phase::Idle | Phase::Complete) || self.is_cancelled()
    }

    /// Terminal state reached when this active phase is cancelled.
    pub fn cancelled(self) -> Option<Phase> {
        match self {
            Phase::Scanning => Some(Phase::ScanCancelled),
            Phase::Parsing => Some(Phase::ParseCancelled),
            Phase::Filtering => Some(Phase::FilterCancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning",
            Phase::Parsing => "parsing",
            Phase::Filtering => "filtering",
            Phase::Complete => "complete",
            Phase::ScanCancelled => "scan_cancelled",
            Phase::ParseCancelled => "parse_cancelled",
            Phase::FilterCancelled => "filter_cancelled",
            Phase::DeletionCancelled => "deletion_cancelled",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDetail {
    pub total_size: u64,
    pub total_count: u64,
}

/// Terminal summary as returned by the engine. Keys are raw category ids so that the
/// summary store can validate the payload instead of the deserializer.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategorySummary(pub BTreeMap<String, CategoryDetail>);

impl CategorySummary {
    pub fn get(&self, id: &str) -> Option<&CategoryDetail> {
        self.0.get(id)
    }
}

impl FromIterator<(String, CategoryDetail)> for CategorySummary {
    fn from_iter<I: IntoIterator<Item = (String, CategoryDetail)>>(iter: I) -> Self {
        CategorySummary(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryData {
    pub files: Vec<FileInfo>,
}
