use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keystore-mac"));
    cmd.env_remove("KEYSTORE_MAC_ALGORITHM")
        .env_remove("KEYSTORE_MAC_ITERATION_COUNT")
        .env_remove("RUST_LOG");
    cmd
}

fn compute(payload: &Path, out: &Path, algorithm: &str) {
    bin()
        .env("KEYSTORE_MAC_PASSWORD", "changeit")
        .arg("compute")
        .arg("--payload")
        .arg(payload)
        .arg("--out")
        .arg(out)
        .arg("--algorithm")
        .arg(algorithm)
        .arg("--iterations")
        .arg("1000")
        .assert()
        .success()
        .stdout(predicate::str::contains("MAC written to"));
}

#[test]
fn compute_writes_mac_file() {
    let dir = tempdir().unwrap();
    let payload = dir.path().join("payload.bin");
    let mac = dir.path().join("payload.mac");
    fs::write(&payload, [0xABu8; 100]).unwrap();

    compute(&payload, &mac, "PBEWithHmacSHA256AndHmacSHA256");

    assert!(mac.exists());
    assert!(!fs::read(&mac).unwrap().is_empty());
}

#[test]
fn compute_and_verify_roundtrip() {
    let dir = tempdir().unwrap();
    let payload = dir.path().join("payload.bin");
    let mac = dir.path().join("payload.mac");
    fs::write(&payload, b"keystore content").unwrap();

    compute(&payload, &mac, "HmacPBESHA256");

    bin()
        .env("KEYSTORE_MAC_PASSWORD", "changeit")
        .arg("verify")
        .arg("--payload")
        .arg(&payload)
        .arg("--mac")
        .arg(&mac)
        .assert()
        .success()
        .stdout(predicate::str::contains("MAC verified (HmacPBESHA256)"));
}

#[test]
fn wrong_password_fails() {
    let dir = tempdir().unwrap();
    let payload = dir.path().join("payload.bin");
    let mac = dir.path().join("payload.mac");
    fs::write(&payload, b"keystore content").unwrap();

    compute(&payload, &mac, "PBEWithHmacSHA512AndHmacSHA512");

    bin()
        .env("KEYSTORE_MAC_PASSWORD", "wrong_pw")
        .arg("verify")
        .arg("--payload")
        .arg(&payload)
        .arg("--mac")
        .arg(&mac)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed integrity checking"));
}

#[test]
fn tampered_payload_fails() {
    let dir = tempdir().unwrap();
    let payload = dir.path().join("payload.bin");
    let mac = dir.path().join("payload.mac");
    fs::write(&payload, [0xABu8; 100]).unwrap();

    compute(&payload, &mac, "PBEWithHmacSHA256AndHmacSHA256");

    let mut data = vec![0xABu8; 100];
    data[99] = 0xAC;
    fs::write(&payload, data).unwrap();

    bin()
        .env("KEYSTORE_MAC_PASSWORD", "changeit")
        .arg("verify")
        .arg("--payload")
        .arg(&payload)
        .arg("--mac")
        .arg(&mac)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed integrity checking"));
}

#[test]
fn inspect_prints_json() {
    let dir = tempdir().unwrap();
    let payload = dir.path().join("payload.bin");
    let mac = dir.path().join("payload.mac");
    fs::write(&payload, b"abc").unwrap();

    compute(&payload, &mac, "PBEWithHmacSHA256AndHmacSHA512");

    let output = bin()
        .arg("inspect")
        .arg("--mac")
        .arg(&mac)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["scheme"], "pbmac1");
    assert_eq!(json["mac_algorithm"], "PBEWithHmacSHA256AndHmacSHA512");
    assert_eq!(json["kdf_hmac"], "HmacSHA256");
    assert_eq!(json["verify_hmac"], "HmacSHA512");
    assert_eq!(json["key_length_bits"], 512);
    assert_eq!(json["iterations"], 1000);
}

#[test]
fn inspect_rejects_garbage() {
    let dir = tempdir().unwrap();
    let mac = dir.path().join("garbage.mac");
    fs::write(&mac, b"not der at all").unwrap();

    bin()
        .arg("inspect")
        .arg("--mac")
        .arg(&mac)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid MAC data"));
}

#[test]
fn unknown_algorithm_fails() {
    let dir = tempdir().unwrap();
    let payload = dir.path().join("payload.bin");
    fs::write(&payload, b"abc").unwrap();

    bin()
        .env("KEYSTORE_MAC_PASSWORD", "changeit")
        .arg("compute")
        .arg("--payload")
        .arg(&payload)
        .arg("--out")
        .arg(dir.path().join("out.mac"))
        .arg("--algorithm")
        .arg("HmacMD5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported algorithm"));
}

#[test]
fn missing_payload_fails() {
    let dir = tempdir().unwrap();

    bin()
        .env("KEYSTORE_MAC_PASSWORD", "changeit")
        .arg("compute")
        .arg("--payload")
        .arg(dir.path().join("missing.bin"))
        .arg("--out")
        .arg(dir.path().join("out.mac"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read payload"));
}
