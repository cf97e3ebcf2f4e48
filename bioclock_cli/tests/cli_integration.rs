use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{TempDir, tempdir};

const CATALOG: &str = r#"{
  "dmt": {
    "name": "dmt",
    "pretty_name": "DMT",
    "formatted_onset": {"value": "2-5", "_unit": "minutes"},
    "formatted_duration": {"value": "1-2", "_unit": "hours"},
    "formatted_dose": {"Smoked": {}, "Oral": {}},
    "links": {"experiences": "https://erowid.org/experiences/subs/exp_DMT.shtml"}
  },
  "lsd": {
    "name": "lsd",
    "pretty_name": "LSD",
    "formatted_onset": {"value": "30-60", "_unit": "minutes"},
    "formatted_duration": {"value": "8-12", "_unit": "hours"},
    "properties": {"summary": "Classic psychedelic."}
  }
}"#;

const DOSES: &str = r#"[
  {"id": 1, "substance": "LSD", "route": "Oral", "quantity": "100", "unit": "ug",
   "doseTime": "2024-05-01T20:00:00Z"},
  {"id": 2, "substance": "DMT", "route": "Smoked", "quantity": "30", "unit": "mg",
   "doseTime": "2024-05-01T21:00:00Z"}
]"#;

// Config pointing at a catalog next to it (relative path)
fn write_fixture(dir: &TempDir) -> PathBuf {
    fs::write(dir.path().join("drugs.json"), CATALOG).unwrap();
    fs::write(dir.path().join("doses.json"), DOSES).unwrap();
    let toml = r#"
[catalog]
path = "drugs.json"

[ticker]
interval_ms = 100
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn bioclock(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("bioclock").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["resolve", "--substance", "DMT", "--route", "Smoked"], 0, "onset 2 min, duration 20 min", "stdout")]
#[case(&["resolve", "--substance", "LSD"], 0, "LSD via Oral: onset 45 min, duration 600 min", "stdout")]
#[case(&["resolve", "--substance", "Unlisted"], 0, "onset 30 min, duration 240 min", "stdout")]
#[case(&["tolerance", "--desired", "100", "--days", "14"], 0, "You need to take 100 to feel the same effects as 100", "stdout")]
#[case(&["tolerance", "--desired", "100", "--days", "1"], 0, "You need to take 280", "stdout")]
#[case(&["tolerance", "--desired", "100", "--days", "0"], 2, "--days greater than 0", "stderr")]
#[case(&["tolerance", "--desired", "100"], 2, "required", "stderr")]
#[case(&["routes", "--substance", "DMT"], 0, "Smoked (default)", "stdout")]
#[case(&["routes", "--substance", "unobtainium"], 3, "not in the substance catalog", "stderr")]
#[case(&["info", "--substance", "lsd"], 0, "Duration: 8-12", "stdout")]
#[case(&["phase", "--substance", "LSD", "--dose-time", "2024-05-01T20:00:00Z", "--now", "2024-05-01T21:00:00Z"], 0, "Peak / Plateau", "stdout")]
#[case(&["phase", "--substance", "LSD", "--dose-time", "yesterday"], 2, "RFC 3339", "stderr")]
#[case(&["self-check"], 0, "catalog: 2 substances", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_fixture(&dir);

    let mut cmd = bioclock(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        _ => {
            assert.stderr(predicate::str::contains(needle));
        }
    }
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_fixture(&dir);
    let out = bioclock(&cfg)
        .args(["--json", "tolerance", "--desired", "100", "--days=-3"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .expect("json error line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "InvalidInput");
}

#[test]
fn json_resolve_is_machine_readable() {
    let dir = tempdir().unwrap();
    let cfg = write_fixture(&dir);
    let out = bioclock(&cfg)
        .args(["--json", "resolve", "--substance", "DMT", "--route", "Smoked"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["onset_minutes"], 2.0);
    assert_eq!(v["duration_minutes"], 20.0);
}

#[test]
fn timeline_all_lists_history() {
    let dir = tempdir().unwrap();
    let cfg = write_fixture(&dir);
    let doses = dir.path().join("doses.json");
    bioclock(&cfg)
        .args(["timeline", "--all", "--doses"])
        .arg(&doses)
        .assert()
        .success()
        // history rows carry the full calendar date
        .stdout(predicate::str::is_match(r"(?m)^#2  DMT  Smoked  30mg  \w+ \d{1,2}, 2024 \d{1,2}:\d{2} [AP]M$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^#1  LSD  Oral  100ug  \w+ \d{1,2}, 2024 \d{1,2}:\d{2} [AP]M$").unwrap())
        .stdout(predicate::str::contains("Afterglow / Sober").not());

    bioclock(&cfg)
        .args(["timeline", "--doses"])
        .arg(&doses)
        .assert()
        .success()
        .stdout(predicate::str::contains("No active doses"));
}

#[test]
fn export_writes_csv_newest_first() {
    let dir = tempdir().unwrap();
    let cfg = write_fixture(&dir);
    let out_path = dir.path().join("history.csv");
    bioclock(&cfg)
        .args(["export", "--doses"])
        .arg(dir.path().join("doses.json"))
        .arg("--out")
        .arg(&out_path)
        .assert()
        .success();

    let csv = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,substance,route,quantity,unit,doseTime");
    assert!(lines[1].starts_with("2,DMT,Smoked,30,mg,"));
    assert!(lines[2].starts_with("1,LSD,Oral,100,ug,"));
}

#[test]
fn broken_dose_log_is_explained() {
    let dir = tempdir().unwrap();
    let cfg = write_fixture(&dir);
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{not json").unwrap();
    bioclock(&cfg)
        .args(["timeline", "--doses"])
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dose log"));
}

#[test]
fn invalid_config_exits_two() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[phase]\nafterglow_factor = 0.5\n").unwrap();
    bioclock(&cfg)
        .args(["self-check"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("phase.afterglow_factor"));
}

#[test]
fn missing_config_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("absent.toml");
    bioclock(&cfg)
        .args(["resolve", "--substance", "LSD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("onset 30 min, duration 240 min"));
}
