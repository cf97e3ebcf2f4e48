//! Human-readable error descriptions and structured JSON error formatting.

use bioclock_core::error::{BioclockError, CatalogError, StoreError, ToleranceError};

/// Exit code for bad input (same code clap uses for usage errors).
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Exit code when a substance is not in the catalog.
pub const EXIT_UNKNOWN_SUBSTANCE: i32 = 3;

fn tolerance_text(te: &ToleranceError) -> String {
    let ToleranceError::InvalidInput(msg) = te;
    format!(
        "What happened: Tolerance input was rejected ({msg}).\nLikely causes: --days was zero or negative, or --desired was negative.\nHow to fix: Pass --days greater than 0 (e.g. `bioclock tolerance --desired 100 --days 3`)."
    )
}

fn store_text(se: &StoreError) -> String {
    match se {
        StoreError::MissingField(field) => format!(
            "What happened: A dose record is missing the required field {field}.\nLikely causes: The dose log entry was written without it.\nHow to fix: Every dose needs substance and doseTime; fix the record and rerun."
        ),
        StoreError::InvalidTime(msg) => format!(
            "What happened: Could not parse a dose time ({msg}).\nLikely causes: The timestamp is not RFC 3339.\nHow to fix: Use a value like 2024-05-01T20:00:00Z."
        ),
        StoreError::Poisoned => "What happened: The dose log became unusable after an internal panic.\nLikely causes: A bug in a previous operation.\nHow to fix: Restart the process and report the logs.".to_string(),
        StoreError::IdsExhausted => "What happened: No dose id is left to assign.\nLikely causes: The dose log holds a record with the largest possible id.\nHow to fix: Renumber or remove that record and rerun.".to_string(),
    }
}

fn catalog_text(ce: &CatalogError) -> String {
    match ce {
        CatalogError::Io { path, .. } => format!(
            "What happened: Could not read the substance catalog at {path}.\nLikely causes: Wrong catalog.path in the config or a missing file.\nHow to fix: Point --catalog or catalog.path at the dataset JSON."
        ),
        CatalogError::Parse(e) => format!(
            "What happened: The substance catalog is not valid JSON ({e}).\nLikely causes: A truncated download or a file in another format.\nHow to fix: Re-download the dataset; it must be a JSON object of key -> profile."
        ),
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BioclockError>() {
        return match be {
            BioclockError::Tolerance(te) => tolerance_text(te),
            BioclockError::Store(se) => store_text(se),
            BioclockError::Catalog(ce) => catalog_text(ce),
            BioclockError::UnknownSubstance(name) => format!(
                "What happened: {name:?} is not in the substance catalog.\nLikely causes: A typo, or the catalog was not loaded.\nHow to fix: Check the spelling or pass --catalog with the dataset JSON."
            ),
            BioclockError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }
    if let Some(te) = err.downcast_ref::<ToleranceError>() {
        return tolerance_text(te);
    }
    if let Some(se) = err.downcast_ref::<StoreError>() {
        return store_text(se);
    }
    if let Some(ce) = err.downcast_ref::<CatalogError>() {
        return catalog_text(ce);
    }

    // String-based heuristics for errors coming from file handling
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("dose log") {
        return format!(
            "What happened: The dose log file could not be used ({msg}).\nLikely causes: Wrong path, or the file is not a JSON array of doses.\nHow to fix: Pass --doses with a file exported from the dashboard."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for rejected input, 3 for unknown substances, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(be) = err.downcast_ref::<BioclockError>() {
        return match be {
            BioclockError::Tolerance(_) | BioclockError::Config(_) => EXIT_INVALID_INPUT,
            BioclockError::Store(StoreError::MissingField(_) | StoreError::InvalidTime(_)) => {
                EXIT_INVALID_INPUT
            }
            BioclockError::UnknownSubstance(_) => EXIT_UNKNOWN_SUBSTANCE,
            _ => 1,
        };
    }
    if err.downcast_ref::<ToleranceError>().is_some() {
        return EXIT_INVALID_INPUT;
    }
    if let Some(StoreError::MissingField(_) | StoreError::InvalidTime(_)) =
        err.downcast_ref::<StoreError>()
    {
        return EXIT_INVALID_INPUT;
    }
    1
}

/// Short machine-readable reason for --json output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BioclockError>() {
        return match be {
            BioclockError::Tolerance(_) => "InvalidInput",
            BioclockError::Store(_) => "DoseLog",
            BioclockError::Catalog(_) => "Catalog",
            BioclockError::UnknownSubstance(_) => "UnknownSubstance",
            BioclockError::Config(_) => "Config",
        };
    }
    if err.downcast_ref::<ToleranceError>().is_some() {
        return "InvalidInput";
    }
    if err.downcast_ref::<StoreError>().is_some() {
        return "DoseLog";
    }
    if err.downcast_ref::<CatalogError>().is_some() {
        return "Catalog";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
