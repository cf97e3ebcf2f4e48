//! Volatile dose log.
//!
//! Ids start at 1 and are never reused, even after delete or clear. Once
//! `u64::MAX` has been handed out, creates fail. Nothing survives a restart.

use crate::dose::{DoseEvent, NewDose};
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// List/create/delete over dose records.
pub trait DoseRepository {
    /// All records, newest dose time first.
    fn list(&self) -> Result<Vec<DoseEvent>, StoreError>;
    /// Validate and store; no partial record on failure.
    fn create(&self, dose: NewDose) -> Result<DoseEvent, StoreError>;
    /// Idempotent. Returns whether a record was removed.
    fn delete(&self, id: u64) -> Result<bool, StoreError>;
    /// Remove everything; returns how many records were removed.
    fn clear(&self) -> Result<usize, StoreError>;
}

/// Newest first; equal times keep the later id first.
pub fn sort_newest_first(doses: &mut [DoseEvent]) {
    doses.sort_by(|a, b| b.dose_time.cmp(&a.dose_time).then(b.id.cmp(&a.id)));
}

#[derive(Debug)]
struct Inner {
    doses: BTreeMap<u64, DoseEvent>,
    /// `None` once every id has been used.
    next_id: Option<u64>,
}

#[derive(Debug)]
pub struct MemDoseStore {
    inner: Mutex<Inner>,
}

impl Default for MemDoseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemDoseStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                doses: BTreeMap::new(),
                next_id: Some(1),
            }),
        }
    }

    /// Seed from existing records, keeping their ids; numbering continues after the largest.
    /// A later record with a duplicate id replaces the earlier one.
    pub fn from_events(events: impl IntoIterator<Item = DoseEvent>) -> Self {
        let doses: BTreeMap<u64, DoseEvent> = events.into_iter().map(|e| (e.id, e)).collect();
        let next_id = doses.keys().next_back().map_or(Some(1), |max| max.checked_add(1));
        Self {
            inner: Mutex::new(Inner { doses, next_id }),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.doses.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl DoseRepository for MemDoseStore {
    fn list(&self) -> Result<Vec<DoseEvent>, StoreError> {
        let mut all: Vec<DoseEvent> = self.lock()?.doses.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    fn create(&self, dose: NewDose) -> Result<DoseEvent, StoreError> {
        let valid = dose.validate()?;
        let mut inner = self.lock()?;
        let id = inner.next_id.ok_or(StoreError::IdsExhausted)?;
        inner.next_id = id.checked_add(1);
        let event = valid.into_event(id);
        inner.doses.insert(id, event.clone());
        tracing::info!(id, substance = %event.substance, route = %event.route, "dose logged");
        Ok(event)
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let removed = self.lock()?.doses.remove(&id).is_some();
        tracing::info!(id, removed, "dose delete");
        Ok(removed)
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let n = inner.doses.len();
        inner.doses.clear();
        tracing::info!(cleared = n, "dose log cleared");
        Ok(n)
    }
}

/// Read a JSON array of dose records (the export format of the log).
pub fn load_events_json(text: &str) -> Result<Vec<DoseEvent>, serde_json::Error> {
    serde_json::from_str(text)
}
