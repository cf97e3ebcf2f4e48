#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Dose timeline and tolerance engine.
//!
//! Pure computations over a static substance catalog and a volatile dose log.
//!
//! ## Architecture
//!
//! - **Substances**: catalog model and lookup by display name or key (`substance`)
//! - **Routes**: route classes and hard override tables (`route`)
//! - **Resolver**: onset/duration text to minutes (`resolver`)
//! - **Phase**: Come Up / Peak / Comedown / Afterglow classification (`phase`)
//! - **Tolerance**: power-law equivalent dose (`tolerance`)
//! - **Dose log**: in-memory create/list/delete (`store`)
//! - **Timeline**: active and history views per tick (`timeline`, `ticker`)
//!
//! All times are minutes as `f64`; timestamps are `chrono::DateTime<Utc>`.

pub mod config;
pub mod conversions;
pub mod dashboard;
pub mod dose;
pub mod error;
pub mod mocks;
pub mod phase;
pub mod resolver;
pub mod route;
pub mod store;
pub mod substance;
pub mod ticker;
pub mod timeline;
pub mod tolerance;
pub mod util;

pub use config::{PhaseCfg, ResolverCfg, TickerCfg, TimelineCfg, ToleranceCfg};
pub use dashboard::Dashboard;
pub use dose::{DoseEvent, NewDose};
pub use error::{BioclockError, CatalogError, StoreError, ToleranceError};
pub use phase::{PhaseResult, Stage, compute_phase};
pub use resolver::{ResolvedTimes, TimeField, resolve};
pub use route::RouteClass;
pub use store::{DoseRepository, MemDoseStore};
pub use substance::{Catalog, SubstanceLookup, SubstanceProfile};
pub use timeline::{Timeline, TimelineEntry};
pub use tolerance::{ToleranceEstimate, ToleranceInput, estimate_equivalent_dose};
