//! Administration route classes and the hard override tables.
//!
//! Overrides are ordered `(token, minutes)` tables; the first token contained
//! in the lowercased substance name wins. Keeping them as data makes the
//! priority order auditable in one place.

/// Route tokens that mark a smoked-like route.
pub const SMOKED_TOKENS: [&str; 4] = ["smoke", "vape", "vapor", "inhale"];
/// Route tokens that mark an insufflated route.
pub const SNORTED_TOKENS: [&str; 2] = ["snort", "insuff"];

/// Duration overrides (minutes) for smoked-like routes.
pub const SMOKED_DURATION_OVERRIDES: [(&str, f64); 9] = [
    ("dmt", 20.0),
    ("dimethyltryptamine", 20.0),
    ("salvia", 15.0),
    ("5-meo", 20.0),
    ("crack", 45.0),
    ("cocaine", 45.0),
    ("cannabis", 180.0),
    ("thc", 180.0),
    ("weed", 180.0),
];

/// Duration overrides (minutes) for insufflated routes.
pub const SNORTED_DURATION_OVERRIDES: [(&str, f64); 2] = [("cocaine", 60.0), ("ketamine", 75.0)];

/// Onset for smoked-like routes regardless of substance (minutes).
pub const SMOKED_ONSET_MIN: f64 = 2.0;
/// Onset for insufflated routes regardless of substance (minutes).
pub const SNORTED_ONSET_MIN: f64 = 10.0;

/// Names whose bare duration numbers are already minutes.
pub const SHORT_ACTING_NAMES: [&str; 6] = ["salvia", "dmt", "nitrous", "k", "ketamine", "cocaine"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Smoked,
    Snorted,
    Other,
}

impl RouteClass {
    /// Case-insensitive substring classification. Smoked-like wins when a
    /// route somehow matches both.
    pub fn classify(route: &str) -> Self {
        let r = route.to_lowercase();
        if SMOKED_TOKENS.iter().any(|t| r.contains(t)) {
            RouteClass::Smoked
        } else if SNORTED_TOKENS.iter().any(|t| r.contains(t)) {
            RouteClass::Snorted
        } else {
            RouteClass::Other
        }
    }

    /// Fixed onset for this class, if any.
    pub fn onset_override(self) -> Option<f64> {
        match self {
            RouteClass::Smoked => Some(SMOKED_ONSET_MIN),
            RouteClass::Snorted => Some(SNORTED_ONSET_MIN),
            RouteClass::Other => None,
        }
    }

    /// Fixed duration for `name` under this class, if the name is in the table.
    pub fn duration_override(self, name: &str) -> Option<f64> {
        let table: &[(&str, f64)] = match self {
            RouteClass::Smoked => &SMOKED_DURATION_OVERRIDES,
            RouteClass::Snorted => &SNORTED_DURATION_OVERRIDES,
            RouteClass::Other => return None,
        };
        first_match(table, &name.to_lowercase())
    }
}

fn first_match(table: &[(&str, f64)], lowered_name: &str) -> Option<f64> {
    table
        .iter()
        .find(|(token, _)| lowered_name.contains(token))
        .map(|&(_, minutes)| minutes)
}

/// Whether a bare duration number for `name` should be read as minutes.
pub fn is_short_acting(name: &str) -> bool {
    let n = name.to_lowercase();
    SHORT_ACTING_NAMES.iter().any(|s| n.contains(s))
}
