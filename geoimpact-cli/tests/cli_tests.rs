use assert_cmd::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const FIXTURE: &str = r#"{
  "regions": [
    {"id": "R", "name": "Test region", "cells": ["85280a73fffffff"]},
    {"id": "empty", "cells": []}
  ],
  "datasets": [
    {"id": "cotton-prod", "subject": {"material": "cotton"}, "kind": "production",
     "physicalTable": "grid", "valueColumn": "cotton_prod", "resolution": 6},
    {"id": "cotton-harv", "subject": {"material": "cotton"}, "kind": "harvest",
     "physicalTable": "grid", "valueColumn": "cotton_harv", "resolution": 6},
    {"id": "all-crops", "subject": {"layer": "allCropsHarvestedArea"}, "kind": "auxiliary",
     "physicalTable": "grid", "valueColumn": "all_crops", "resolution": 6},
    {"id": "defor", "subject": {"indicator": "DF_LUC_T"}, "kind": "indicatorValue",
     "physicalTable": "grid", "valueColumn": "defor", "resolution": 6, "year": 2020}
  ],
  "grids": [
    {"table": "grid", "column": "cotton_prod", "values": {"86280a707ffffff": 10, "86280a70fffffff": 5}},
    {"table": "grid", "column": "cotton_harv", "values": {"86280a707ffffff": 4, "86280a70fffffff": 2}},
    {"table": "grid", "column": "all_crops", "values": {"86280a707ffffff": 2, "86280a70fffffff": 2}},
    {"table": "grid", "column": "defor", "values": {"86280a707ffffff": 1, "86280a70fffffff": 0}}
  ],
  "coefficients": [
    {"indicator": "WU", "material": "cotton", "value": 0.5}
  ]
}"#;

/// A `geoimpact` command isolated in `work_dir`, with HOME pointed there so
/// `~/.geoimpact/` never leaks between tests.
fn geoimpact_cmd(work_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("geoimpact");
    cmd.current_dir(work_dir.path());
    cmd.env("HOME", work_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("GEOIMPACT_FIXTURE");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn with_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("fixture.json"), FIXTURE).unwrap();
    tmp
}

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

#[test]
fn help_lists_subcommands() {
    cargo_bin_cmd!("geoimpact")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("expand"))
        .stdout(predicate::str::contains("compute"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn verbose_quiet_conflict() {
    cargo_bin_cmd!("geoimpact")
        .args(["--verbose", "--quiet", "indicators"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn indicators_lists_every_code() {
    let tmp = TempDir::new().unwrap();
    geoimpact_cmd(&tmp)
        .arg("indicators")
        .assert()
        .success()
        .stdout(predicate::str::contains("DF_LUC_T"))
        .stdout(predicate::str::contains("UWU_T"))
        .stdout(predicate::str::contains("rawWater"));
}

#[test]
fn expand_counts_children() {
    let tmp = with_fixture();
    geoimpact_cmd(&tmp)
        .args(["--fixture", "fixture.json", "expand", "R", "--resolution", "6", "--count"])
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn expand_rejects_bad_resolution() {
    let tmp = with_fixture();
    geoimpact_cmd(&tmp)
        .args(["--fixture", "fixture.json", "expand", "R", "-r", "16"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid resolution 16"));
}

#[test]
fn compute_reports_values_as_json() {
    let tmp = with_fixture();
    let out = geoimpact_cmd(&tmp)
        .args([
            "--fixture", "fixture.json", "compute", "--region", "R", "--material", "cotton",
            "-i", "LF", "-i", "DF_LUC_T", "-i", "WU", "--tonnage", "3", "--format", "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let close = |key: &str, expected: f64| {
        let v = json["values"][key].as_f64().unwrap();
        assert!((v - expected).abs() < 1e-9, "{key}: {v}");
    };
    close("LF", 3.0 * 6.0 / 15.0);
    close("DF_LUC_T", 3.0 * 10.0 / 30.0);
    close("WU", 1.5);
    assert_eq!(json["failures"].as_array().unwrap().len(), 0);
    assert_eq!(json["emptyRegion"], false);
}

#[test]
fn compute_partial_failure_still_succeeds() {
    let tmp = with_fixture();
    geoimpact_cmd(&tmp)
        .args([
            "--fixture", "fixture.json", "compute", "--region", "R", "--material", "cotton",
            "-i", "LF", "-i", "GHG_LUC_T",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("LF"))
        .stderr(predicate::str::contains("GHG_LUC_T"));
}

#[test]
fn compute_fails_when_every_indicator_fails() {
    let tmp = with_fixture();
    geoimpact_cmd(&tmp)
        .args([
            "--fixture", "fixture.json", "compute", "--region", "R", "--material", "cocoa", "-i", "LF",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no indicator could be computed"))
        .stderr(predicate::str::contains("cocoa"));
}

#[test]
fn unknown_indicator_is_a_usage_error() {
    let tmp = with_fixture();
    geoimpact_cmd(&tmp)
        .args([
            "--fixture", "fixture.json", "compute", "--region", "R", "--material", "cotton", "-i", "XYZ",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_fixture_explains_how_to_set_one() {
    let tmp = TempDir::new().unwrap();
    geoimpact_cmd(&tmp)
        .args(["expand", "R", "-r", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no fixture workspace given"));
}

#[test]
fn fixture_from_config_file_and_env() {
    let tmp = with_fixture();
    std::fs::create_dir(tmp.path().join(".geoimpact")).unwrap();
    write(&tmp.path().join(".geoimpact"), "config.toml", "fixture = \"fixture.json\"\n");
    let nested = tmp.path().join("sub");
    std::fs::create_dir(&nested).unwrap();

    geoimpact_cmd(&tmp)
        .current_dir(&nested)
        .args(["expand", "R", "-r", "7", "--count"])
        .assert()
        .success()
        .stdout("49\n");

    geoimpact_cmd(&tmp)
        .env("GEOIMPACT_FIXTURE", tmp.path().join("missing.json"))
        .args(["expand", "R", "-r", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn compare_renders_supplier_table() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "baseline.json",
        r#"[{"indicator": "DF_LUC_T", "year": 2020, "value": 2000, "supplier": "Oils"}]"#,
    );
    write(
        tmp.path(),
        "intervention.json",
        r#"[{"indicator": "DF_LUC_T", "year": 2020, "value": 1500, "supplier": "Oils"},
            {"indicator": "DF_LUC_T", "year": 2020, "value": 600, "supplier": "Textile"}]"#,
    );

    geoimpact_cmd(&tmp)
        .args([
            "compare", "--baseline", "baseline.json", "--intervention", "intervention.json",
            "--group-by", "supplier",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("-500 (1500 / 2000)"))
        .stdout(predicate::str::contains("Total"));

    let out = geoimpact_cmd(&tmp)
        .args([
            "compare", "--baseline", "baseline.json", "--intervention", "intervention.json",
            "--group-by", "supplier", "--start-year", "2020", "--end-year", "2021", "--format", "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let year_sum = &json["indicators"][0]["yearSum"];
    assert_eq!(year_sum[0]["impactResult"], 100.0);
    assert_eq!(year_sum[1]["isProjected"], true);
}
