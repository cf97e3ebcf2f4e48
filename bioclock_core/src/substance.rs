//! Substance reference data: profiles, the catalog, and lookup.
//!
//! The dataset is a JSON object mapping a stable substance key to its profile.
//! It is loaded once and never mutated.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Routes offered for every substance, after the dataset's own dose-table routes.
pub const STANDARD_ROUTES: [&str; 9] = [
    "Oral",
    "Smoked",
    "Vaporized",
    "Insufflated",
    "Sublingual",
    "Buccal",
    "Rectal",
    "IV",
    "IM",
];

/// Route used when a substance carries no dose table.
pub const FALLBACK_ROUTE: &str = "Oral";

/// Structured time field, e.g. `{"value": "4-6", "_unit": "hours"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedField {
    pub value: String,
    #[serde(rename = "_unit", alias = "unit", default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub onset: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(rename = "after-effects", default)]
    pub after_effects: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub experiences: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstanceProfile {
    pub name: String,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub formatted_onset: Option<FormattedField>,
    #[serde(default)]
    pub formatted_duration: Option<FormattedField>,
    /// Route -> opaque dose table, in dataset order.
    #[serde(default)]
    pub formatted_dose: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl SubstanceProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// `pretty_name` when present and non-empty, else `name`.
    pub fn display_name(&self) -> &str {
        match self.pretty_name.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => &self.name,
        }
    }

    /// Routes from the dose table (dataset order) followed by the standard
    /// routes, without duplicates.
    pub fn available_routes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let table = self
            .formatted_dose
            .iter()
            .flat_map(|m| m.keys().map(String::as_str));
        for r in table.chain(STANDARD_ROUTES) {
            if !out.iter().any(|o| o == r) {
                out.push(r.to_string());
            }
        }
        out
    }

    /// First dose-table route, else `Oral`.
    pub fn default_route(&self) -> &str {
        self.formatted_dose
            .as_ref()
            .and_then(|m| m.keys().next())
            .map_or(FALLBACK_ROUTE, String::as_str)
    }

    pub fn info(&self) -> SubstanceInfo {
        let pick = |formatted: Option<&FormattedField>, free: Option<&String>| {
            formatted
                .map(|f| f.value.as_str())
                .filter(|v| !v.is_empty())
                .or_else(|| free.map(String::as_str).filter(|v| !v.is_empty()))
                .unwrap_or("Unknown")
                .to_string()
        };
        let props = self.properties.as_ref();
        let experiences_link = self
            .links
            .as_ref()
            .and_then(|l| l.experiences.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| format!("https://erowid.org/search.php?q={}", self.name));
        SubstanceInfo {
            name: self.display_name().to_string(),
            onset: pick(
                self.formatted_onset.as_ref(),
                props.and_then(|p| p.onset.as_ref()),
            ),
            duration: pick(
                self.formatted_duration.as_ref(),
                props.and_then(|p| p.duration.as_ref()),
            ),
            summary: props.and_then(|p| p.summary.clone()),
            experiences_link,
        }
    }
}

/// Human-facing summary of a profile's timing text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstanceInfo {
    pub name: String,
    pub onset: String,
    pub duration: String,
    pub summary: Option<String>,
    pub experiences_link: String,
}

/// Read-only access to substance profiles by display name or key.
pub trait SubstanceLookup {
    fn find(&self, substance: &str) -> Option<&SubstanceProfile>;
}

/// Immutable key -> profile map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, SubstanceProfile>,
}

impl Catalog {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, SubstanceProfile)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), substances = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SubstanceProfile> {
        self.entries.get(key)
    }

    /// `(key, display name)` pairs ordered by display name, for pickers.
    pub fn sorted_entries(&self) -> Vec<(&str, &str)> {
        let mut v: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(k, p)| (k.as_str(), p.display_name()))
            .collect();
        v.sort_by(|a, b| {
            a.1.to_lowercase()
                .cmp(&b.1.to_lowercase())
                .then_with(|| a.0.cmp(b.0))
        });
        v
    }
}

impl SubstanceLookup for Catalog {
    /// Exact display name, then exact key, then either case-insensitively.
    fn find(&self, substance: &str) -> Option<&SubstanceProfile> {
        let wanted = substance.trim();
        if wanted.is_empty() {
            return None;
        }
        if let Some(p) = self.entries.values().find(|p| p.display_name() == wanted) {
            return Some(p);
        }
        if let Some(p) = self.entries.get(wanted) {
            return Some(p);
        }
        self.entries
            .iter()
            .find(|(k, p)| {
                p.display_name().eq_ignore_ascii_case(wanted) || k.eq_ignore_ascii_case(wanted)
            })
            .map(|(_, p)| p)
    }
}

impl<L: SubstanceLookup + ?Sized> SubstanceLookup for &L {
    fn find(&self, substance: &str) -> Option<&SubstanceProfile> {
        (**self).find(substance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"{
        "lsd": {
            "name": "lsd",
            "pretty_name": "LSD",
            "formatted_onset": {"value": "30-60", "_unit": "minutes"},
            "formatted_duration": {"value": "8-12", "_unit": "hours"},
            "formatted_dose": {"Sublingual": {}, "Oral": {}},
            "links": {"experiences": "https://example.org/lsd"}
        },
        "dmt": {
            "name": "dmt",
            "pretty_name": "DMT",
            "properties": {"onset": "1-2 minutes", "duration": "5-15 minutes"}
        },
        "mystery": {"name": "mystery"}
    }"#;

    fn catalog() -> Catalog {
        Catalog::from_json_str(DATA).unwrap()
    }

    #[test]
    fn find_by_display_name_key_and_case() {
        let c = catalog();
        assert_eq!(c.find("LSD").map(|p| p.name.as_str()), Some("lsd"));
        assert_eq!(c.find("dmt").map(|p| p.name.as_str()), Some("dmt"));
        assert_eq!(c.find("Mystery").map(|p| p.name.as_str()), Some("mystery"));
        assert!(c.find("unobtainium").is_none());
        assert!(c.find("   ").is_none());
    }

    #[test]
    fn routes_keep_dataset_order_then_standard() {
        let c = catalog();
        let lsd = c.get("lsd").unwrap();
        let routes = lsd.available_routes();
        assert_eq!(&routes[..3], &["Sublingual", "Oral", "Smoked"]);
        assert_eq!(routes.len(), STANDARD_ROUTES.len() + 1);
        assert_eq!(lsd.default_route(), "Sublingual");

        let dmt = c.get("dmt").unwrap();
        assert_eq!(dmt.available_routes(), STANDARD_ROUTES.to_vec());
        assert_eq!(dmt.default_route(), "Oral");
    }

    #[test]
    fn info_falls_back_through_fields() {
        let c = catalog();
        let lsd = c.get("lsd").unwrap().info();
        assert_eq!(lsd.onset, "30-60");
        assert_eq!(lsd.duration, "8-12");
        assert_eq!(lsd.experiences_link, "https://example.org/lsd");

        let dmt = c.get("dmt").unwrap().info();
        assert_eq!(dmt.onset, "1-2 minutes");
        assert!(dmt.experiences_link.ends_with("q=dmt"));

        let m = c.get("mystery").unwrap().info();
        assert_eq!(m.onset, "Unknown");
        assert_eq!(m.duration, "Unknown");
    }

    #[test]
    fn sorted_entries_order_by_display_name() {
        let c = catalog();
        let names: Vec<&str> = c.sorted_entries().iter().map(|e| e.1).collect();
        assert_eq!(names, vec!["DMT", "LSD", "mystery"]);
    }
}
