//! Runs the validate handler against packs built in temp dirs.

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use spack_cli::validate::{run_validate, ValidateArgs};
use spack_core::{Check, Severity};
use spack_pack::ValidatorConfig;

fn pack_with(manifest: &Value) -> (TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let pack = tmp.path().join("root").join("packs").join("roads");
    fs::create_dir_all(pack.join("layers")).unwrap();
    fs::write(pack.join("layers").join("roads.parquet"), b"data").unwrap();
    fs::write(
        pack.join("spatialpack.json"),
        serde_json::to_string_pretty(manifest).unwrap(),
    )
    .unwrap();
    (tmp, pack)
}

fn manifest() -> Value {
    json!({
        "pack_id": "acme:us:roads:v1",
        "version": "1.0.0",
        "created_at": "2024-01-15T10:00:00Z",
        "geography": "us",
        "theme": "roads",
        "bbox": [0, 0, 10, 10],
        "crs": "EPSG:4326",
        "layers": [{"id": "roads", "type": "vector", "title": "Roads", "parquet": "./layers/roads.parquet"}],
        "integrity": {"asset_hashes": {"roads": "sha256-PLACEHOLDER"}}
    })
}

fn args(pack: PathBuf) -> ValidateArgs {
    ValidateArgs {
        pack,
        strict: false,
        output: None,
        quiet: true,
        severity: Vec::new(),
    }
}

/// Config whose install dir holds no schemas, so the built-in fallback applies.
fn config(tmp: &TempDir) -> ValidatorConfig {
    ValidatorConfig {
        install_dir: Some(tmp.path().join("install")),
        ..ValidatorConfig::default()
    }
}

fn read_report(path: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn warnings_exit_zero_unless_strict() {
    let (tmp, pack) = pack_with(&manifest());
    assert_eq!(run_validate(&args(pack.clone()), &config(&tmp)).unwrap(), 0);

    let strict = ValidateArgs {
        strict: true,
        ..args(pack)
    };
    assert_eq!(run_validate(&strict, &config(&tmp)).unwrap(), 1);
}

#[test]
fn strict_from_config_applies() {
    let (tmp, pack) = pack_with(&manifest());
    let strict_config = ValidatorConfig {
        strict: true,
        ..config(&tmp)
    };
    assert_eq!(run_validate(&args(pack), &strict_config).unwrap(), 1);
}

#[test]
fn report_file_has_documented_shape() {
    let (tmp, pack) = pack_with(&manifest());
    let output = tmp.path().join("report.json");
    let run = ValidateArgs {
        output: Some(output.clone()),
        ..args(pack.clone())
    };
    assert_eq!(run_validate(&run, &config(&tmp)).unwrap(), 0);

    let report = read_report(&output);
    assert_eq!(report["status"], "warn");
    assert_eq!(report["run_id"].as_str().unwrap().len(), 8);
    assert!(report["validator"].as_str().unwrap().starts_with("spatialpack-cli@"));
    assert_eq!(report["pack_path"], pack.display().to_string());
    assert_eq!(report["summary"]["errors"], 0);
    assert_eq!(report["summary"]["warnings"], 1);
    assert_eq!(report["summary"]["layers_validated"], 1);
    assert_eq!(report["warnings"][0]["rule"], "INTEGRITY-001");
    assert_eq!(report["warnings"][0]["path"], "integrity.asset_hashes.roads");
}

#[test]
fn severity_flag_escalates_to_failure() {
    let (tmp, pack) = pack_with(&manifest());
    let output = tmp.path().join("report.json");
    let run = ValidateArgs {
        output: Some(output.clone()),
        severity: vec![(Check::PlaceholderHash, Severity::Error)],
        ..args(pack)
    };
    assert_eq!(run_validate(&run, &config(&tmp)).unwrap(), 1);
    let report = read_report(&output);
    assert_eq!(report["status"], "fail");
    assert_eq!(report["errors"][0]["rule"], "INTEGRITY-001");
}

#[test]
fn missing_manifest_fails_with_exit_one() {
    let tmp = tempfile::tempdir().unwrap();
    let pack = tmp.path().join("empty");
    fs::create_dir_all(&pack).unwrap();
    assert_eq!(run_validate(&args(pack), &config(&tmp)).unwrap(), 1);
}

#[test]
fn nonexistent_pack_is_operational_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = run_validate(&args(tmp.path().join("nope")), &config(&tmp)).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}
