//! Scenario: `kf` drives an order through its lifecycle on disk
//!
//! # Invariants under test
//!
//! 1. State survives between invocations: each command resumes the latest
//!    order from the data directory.
//! 2. Guard violations exit non-zero with the violation on stderr and leave
//!    the stored order unchanged.
//! 3. The audit journal written along the way verifies.
//! 4. Reset refuses without `--yes`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn kf(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kf").unwrap();
    cmd.env("RUST_LOG", "warn")
        .env_remove("KF_VENDOR_ESTIMATOR_URL")
        .env_remove("KF_PRICING_URL")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

#[test]
fn lifecycle_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();

    kf(d).arg("new")
        .assert()
        .success()
        .stdout(predicate::str::contains("status=INTAKE"));

    kf(d).arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("quotable=false"))
        .stdout(predicate::str::contains("Client name is required"));

    kf(d).args(["quote"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GenerateQuote requires a client name"));

    kf(d).args(["edit-client", "--name", "Harbor Transit"])
        .assert()
        .success();
    kf(d).args(["set-spec", "brightness=900", "extended.enclosure.ipRating=IP65"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warnings=0"));

    kf(d).args(["approve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "CEOApprove requires status CLIENT_ACCEPTED (current: INTAKE)",
        ));

    kf(d).arg("quote")
        .assert()
        .success()
        .stdout(predicate::str::contains("status=QUOTE_SENT"))
        .stdout(predicate::str::contains("estimator=local"));
    kf(d).arg("accept").assert().success();
    kf(d).args(["approve", "--comment", "ok"]).assert().success();
    kf(d).args(["vendor", "--vendor", "Shenzhen Display Co", "--po", "PO-1001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status=VENDOR_ORDERED"));
    kf(d).args(["fulfill", "--carrier", "UPS", "--tracking", "1Z999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status=FULFILLMENT"));
    kf(d).args(["fulfill", "--delivered"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status=CLOSED"));

    kf(d).arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: CLOSED"))
        .stdout(predicate::str::contains("No warnings"));

    kf(d).arg("audit-verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit_valid=true"))
        .stdout(predicate::str::contains("lines=7"));

    kf(d).arg("clients")
        .assert()
        .success()
        .stdout(predicate::str::contains("Harbor Transit"));
}

#[test]
fn export_import_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    let export = d.join("order.json");

    kf(d).arg("new").assert().success();
    kf(d).args(["edit-client", "--name", "Acme"]).assert().success();
    kf(d).arg("export")
        .arg("--out")
        .arg(&export)
        .assert()
        .success();

    kf(d).arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("status=INTAKE"));

    let bad = d.join("bad.json");
    std::fs::write(&bad, r#"{"status":"INTAKE"}"#).unwrap();
    kf(d).arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("orderId is missing"));

    kf(d).arg("reset")
        .assert()
        .failure()
        .stderr(predicate::str::contains("REFUSING RESET"));
    kf(d).args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("audit_entries=1"));
}

#[test]
fn catalog_hash_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let out1 = kf(dir.path()).arg("catalog-hash").output().unwrap();
    let out2 = kf(dir.path()).arg("catalog-hash").output().unwrap();
    assert!(out1.status.success());
    let first = String::from_utf8_lossy(&out1.stdout);
    assert!(first.starts_with("catalog_hash="));
    assert_eq!(out1.stdout, out2.stdout);
}
