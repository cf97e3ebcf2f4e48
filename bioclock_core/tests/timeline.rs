use bioclock_core::{Catalog, DoseRepository, MemDoseStore, NewDose, Stage, Timeline, TimelineCfg};
use chrono::{Duration, TimeZone, Utc};

const DATA: &str = r#"{
    "cocaine": {"name": "cocaine", "pretty_name": "Cocaine",
                "properties": {"onset": "5-10 minutes", "duration": "1-2"}},
    "psilocybin": {"name": "psilocybin", "pretty_name": "Psilocybin Mushrooms",
                   "formatted_onset": {"value": "20-40", "_unit": "minutes"},
                   "formatted_duration": {"value": "4-6", "_unit": "hours"}}
}"#;

#[test]
fn active_excludes_afterglow_and_history_keeps_everything() {
    let catalog = Catalog::from_json_str(DATA).unwrap();
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    let store = MemDoseStore::new();
    store
        .create(NewDose::new("Cocaine", t0).route("Insufflated"))
        .unwrap();
    store
        .create(NewDose::new("Psilocybin Mushrooms", t0 + Duration::minutes(10)))
        .unwrap();
    store
        .create(NewDose::new("Something Else", t0 + Duration::minutes(20)))
        .unwrap();

    let now = t0 + Duration::minutes(120);
    let tl = Timeline::build(&store.list().unwrap(), &catalog, now, &TimelineCfg::default());

    assert_eq!(tl.history().len(), 3);
    // newest first
    assert_eq!(tl.history()[0].dose.substance, "Something Else");

    // insufflated cocaine: 60 min duration, 72 min window -> afterglow at 120
    let coke = tl
        .history()
        .iter()
        .find(|e| e.dose.substance == "Cocaine")
        .unwrap();
    assert_eq!(coke.phase.duration_minutes, 60.0);
    assert_eq!(coke.phase.onset_minutes, 10.0);
    assert_eq!(coke.phase.stage, Stage::Afterglow);

    // psilocybin: 30 min onset, 300 min duration, 110 min in -> peak
    let shrooms = tl
        .active()
        .find(|e| e.dose.substance == "Psilocybin Mushrooms")
        .unwrap();
    assert_eq!(shrooms.phase.stage, Stage::Peak);

    assert_eq!(tl.active_count(), 2);
    assert!(tl.clone().into_active().iter().all(|e| e.is_active()));
}

#[test]
fn entries_serialize_with_flattened_dose() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    let dose = NewDose::new("X", t0).validate().unwrap().into_event(1);
    let tl = Timeline::build(
        &[dose],
        &Catalog::default(),
        t0 + Duration::minutes(10),
        &TimelineCfg::default(),
    );
    let v = serde_json::to_value(tl.history()).unwrap();
    assert_eq!(v[0]["substance"], "X");
    assert_eq!(v[0]["phase"]["stage"], "Come Up");
}
