use serde::{Deserialize, Serialize};

use crate::category::CategoryId;
use crate::model::Phase;

pub const INITIAL_TITLE: &str = "Initializing...";

/// Running totals for the six filter outcomes, `other` included.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterCounts {
    pub background_video: u64,
    pub background_image: u64,
    pub storyboard: u64,
    pub hitsound: u64,
    pub skin_element: u64,
    pub other: u64,
}

impl FilterCounts {
    pub fn get(&self, id: CategoryId) -> u64 {
        match id {
            CategoryId::BackgroundVideo => self.background_video,
            CategoryId::BackgroundImage => self.background_image,
            CategoryId::Storyboard => self.storyboard,
            CategoryId::Hitsound => self.hitsound,
            CategoryId::SkinElement => self.skin_element,
            CategoryId::Other => self.other,
        }
    }

    fn slot(&mut self, id: CategoryId) -> &mut u64 {
        match id {
            CategoryId::BackgroundVideo => &mut self.background_video,
            CategoryId::BackgroundImage => &mut self.background_image,
            CategoryId::Storyboard => &mut self.storyboard,
            CategoryId::Hitsound => &mut self.hitsound,
            CategoryId::SkinElement => &mut self.skin_element,
            CategoryId::Other => &mut self.other,
        }
    }

    pub fn total(&self) -> u64 {
        CategoryId::ALL
            .into_iter()
            .fold(0_u64, |sum, id| sum.saturating_add(self.get(id)))
    }
}

/// Partial filter update as streamed by the engine. Keys missing from the payload count as zero
/// and unknown keys are ignored.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FilterDelta(pub FilterCounts);

impl FilterDelta {
    pub fn with(mut self, id: CategoryId, delta: u64) -> Self {
        *self.0.slot(id) = delta;
        self
    }

    pub fn get(&self, id: CategoryId) -> u64 {
        self.0.get(id)
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counts {
    pub scanned: u64,
    pub parsed: u64,
    pub filtered: FilterCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusText {
    pub title: String,
    pub subtitle: String,
}

impl Default for StatusText {
    fn default() -> Self {
        Self {
            title: INITIAL_TITLE.to_string(),
            subtitle: String::new(),
        }
    }
}

impl StatusText {
    /// Status shown for `phase` given the current totals.
    pub fn for_phase(phase: Phase, counts: &Counts) -> Self {
        let (title, subtitle) = match phase {
            Phase::Idle => return Self::default(),
            Phase::Scanning => ("Scanning files", found(counts.scanned)),
            Phase::Parsing => ("Parsing beatmaps", parsed(counts.parsed)),
            Phase::Filtering => ("Filtering files", classified(counts.filtered.total())),
            Phase::Complete => ("Analysis complete", classified(counts.filtered.total())),
            Phase::ScanCancelled => ("Scan cancelled", found(counts.scanned)),
            Phase::ParseCancelled => ("Parsing cancelled", parsed(counts.parsed)),
            Phase::FilterCancelled => (
                "Filtering cancelled",
                classified(counts.filtered.total()),
            ),
            Phase::DeletionCancelled => ("Deletion cancelled", String::new()),
        };
        Self {
            title: title.to_string(),
            subtitle,
        }
    }
}

fn found(count: u64) -> String {
    format!("Found {} files", format_count(count))
}

fn parsed(count: u64) -> String {
    format!("Parsed {} files", format_count(count))
}

fn classified(count: u64) -> String {
    format!("Classified {} files", format_count(count))
}

/// Groups digits in threes with commas (en-US).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Accumulates scan/parse/filter deltas into running totals. Phase bookkeeping lives in the
/// workflow controller; the aggregator only owns counters and the status text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CounterAggregator {
    counts: Counts,
    status: StatusText,
}

impl CounterAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    pub fn status(&self) -> &StatusText {
        &self.status
    }

    pub fn record_scan(&mut self, delta: u64) {
        self.counts.scanned = self.counts.scanned.saturating_add(delta);
        self.status.subtitle = found(self.counts.scanned);
    }

    pub fn record_parse(&mut self, delta: u64) {
        self.counts.parsed = self.counts.parsed.saturating_add(delta);
        self.status.subtitle = parsed(self.counts.parsed);
    }

    /// Applies every category of `delta` in one step.
    pub fn record_filter(&mut self, delta: &FilterDelta) {
        for id in CategoryId::ALL {
            let slot = self.counts.filtered.slot(id);
            *slot = slot.saturating_add(delta.get(id));
        }
        self.status.subtitle = classified(self.counts.filtered.total());
    }

    /// Replaces the status text with the one derived for `phase`.
    pub fn announce(&mut self, phase: Phase) {
        self.status = StatusText::for_phase(phase, &self.counts);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
