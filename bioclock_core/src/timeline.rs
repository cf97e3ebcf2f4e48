//! Active/history view over the dose log at a given instant.

use crate::config::TimelineCfg;
use crate::dose::DoseEvent;
use crate::phase::{PhaseResult, compute_phase};
use crate::store::sort_newest_first;
use crate::substance::SubstanceLookup;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub dose: DoseEvent,
    pub phase: PhaseResult,
}

impl TimelineEntry {
    pub fn is_active(&self) -> bool {
        self.phase.stage.is_active()
    }
}

/// Every dose paired with its phase at `now`, newest dose first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub now: DateTime<Utc>,
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn build<L: SubstanceLookup + ?Sized>(
        doses: &[DoseEvent],
        lookup: &L,
        now: DateTime<Utc>,
        cfg: &TimelineCfg,
    ) -> Self {
        let mut sorted = doses.to_vec();
        sort_newest_first(&mut sorted);
        let entries = sorted
            .into_iter()
            .map(|dose| {
                let phase = compute_phase(&dose, lookup, now, &cfg.resolver, &cfg.phase);
                TimelineEntry { dose, phase }
            })
            .collect();
        Self { now, entries }
    }

    /// All entries (the history tab).
    pub fn history(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Entries not yet in the afterglow.
    pub fn active(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(|e| e.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn into_active(self) -> Vec<TimelineEntry> {
        self.entries.into_iter().filter(|e| e.is_active()).collect()
    }
}
