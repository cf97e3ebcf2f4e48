//! Assembled engine: catalog, dose log and tuned configs in one place.
//!
//! The CLI and the HTTP server both go through this type so they share one
//! view of defaults and the same dose log semantics.

use crate::config::{TimelineCfg, ToleranceCfg};
use crate::dose::{DoseEvent, NewDose};
use crate::error::{BioclockError, Result, ToleranceError};
use crate::resolver::ResolvedTimes;
use crate::store::{DoseRepository, MemDoseStore};
use crate::substance::{Catalog, SubstanceLookup, SubstanceProfile};
use crate::timeline::Timeline;
use crate::tolerance::{ToleranceEstimate, ToleranceInput, estimate};
use chrono::{DateTime, Utc};
use eyre::WrapErr;

#[derive(Debug)]
pub struct Dashboard {
    pub catalog: Catalog,
    pub store: MemDoseStore,
    pub timeline: TimelineCfg,
    pub tolerance: ToleranceCfg,
}

impl Dashboard {
    pub fn new(catalog: Catalog, timeline: TimelineCfg, tolerance: ToleranceCfg) -> Self {
        Self {
            catalog,
            store: MemDoseStore::new(),
            timeline,
            tolerance,
        }
    }

    /// Build from a validated file config, loading the catalog when one is configured.
    /// Without a catalog every substance resolves to the defaults.
    pub fn from_config(cfg: &bioclock_config::Config) -> Result<Self> {
        let catalog = match cfg.catalog.path.as_deref() {
            Some(path) => Catalog::load(path)
                .map_err(BioclockError::from)
                .wrap_err_with(|| format!("load substance catalog {}", path.display()))?,
            None => {
                tracing::warn!("no catalog configured; all substances use default timings");
                Catalog::default()
            }
        };
        Ok(Self::new(catalog, cfg.into(), (&cfg.tolerance).into()))
    }

    pub fn with_store(mut self, store: MemDoseStore) -> Self {
        self.store = store;
        self
    }

    /// Profile for a display name or key, or a typed not-found error.
    pub fn profile(&self, substance: &str) -> std::result::Result<&SubstanceProfile, BioclockError> {
        self.catalog
            .find(substance)
            .ok_or_else(|| BioclockError::UnknownSubstance(substance.to_string()))
    }

    /// Onset/duration for a substance and route; unknown substances get defaults.
    pub fn resolve(&self, substance: &str, route: &str) -> ResolvedTimes {
        ResolvedTimes::resolve(self.catalog.find(substance), route, &self.timeline.resolver)
    }

    pub fn log_dose(&self, dose: NewDose) -> std::result::Result<DoseEvent, BioclockError> {
        Ok(self.store.create(dose)?)
    }

    pub fn timeline_at(&self, now: DateTime<Utc>) -> std::result::Result<Timeline, BioclockError> {
        let doses = self.store.list()?;
        Ok(Timeline::build(&doses, &self.catalog, now, &self.timeline))
    }

    pub fn tolerance(
        &self,
        input: ToleranceInput,
    ) -> std::result::Result<ToleranceEstimate, ToleranceError> {
        estimate(input, &self.tolerance)
    }
}
