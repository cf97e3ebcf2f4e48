//! Test and helper lookups for bioclock_core

use crate::substance::{SubstanceLookup, SubstanceProfile};

/// A lookup that knows no substances; every dose resolves to the defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyLookup;

impl SubstanceLookup for EmptyLookup {
    fn find(&self, _substance: &str) -> Option<&SubstanceProfile> {
        None
    }
}

/// A lookup holding exactly one profile, matched by name or display name.
#[derive(Debug, Clone)]
pub struct SingleLookup(pub SubstanceProfile);

impl SubstanceLookup for SingleLookup {
    fn find(&self, substance: &str) -> Option<&SubstanceProfile> {
        let p = &self.0;
        (p.name.eq_ignore_ascii_case(substance) || p.display_name().eq_ignore_ascii_case(substance))
            .then_some(p)
    }
}
