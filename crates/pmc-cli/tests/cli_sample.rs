use std::path::PathBuf;
use std::process::{Command, Output};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pmc"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

#[test]
fn sample_gamma_reports_exact_values() {
    let out = run(&[
        "sample", "--family", "gamma", "--params", "68,45", "--draws", "20000", "--seed", "3",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

    assert_eq!(v["family"], "gamma");
    assert_eq!(v["param_names"], serde_json::json!(["shape", "rate"]));
    let exact = v["exact"]["mean"].as_f64().unwrap();
    assert!((exact - 68.0 / 45.0).abs() < 1e-12);
    let est = v["summary"]["mean"]["estimate"].as_f64().unwrap();
    assert!((est - exact).abs() < 0.01, "{est} vs {exact}");

    let lo = v["exact"]["equal_tailed"][0].as_f64().unwrap();
    let hi = v["exact"]["equal_tailed"][1].as_f64().unwrap();
    let mc_lo = v["summary"]["equal_tailed"][0].as_f64().unwrap();
    let mc_hi = v["summary"]["equal_tailed"][1].as_f64().unwrap();
    assert!((lo - mc_lo).abs() < 0.02 && (hi - mc_hi).abs() < 0.02);
}

#[test]
fn sample_accepts_negative_params() {
    let out = run(&[
        "sample", "--family", "normal", "--params", "-2,0.5", "--draws", "1000", "--seed", "1",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["params"], serde_json::json!([-2.0, 0.5]));
}

#[test]
fn sample_rejects_bad_family_and_params() {
    let out = run(&["sample", "--family", "cauchy", "--params", "0,1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown distribution family"));

    let out = run(&["sample", "--family", "gamma", "--params", "1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("expects 2 parameter(s)"));
}

#[test]
fn version_prints_crate_version() {
    let out = run(&["version"]);
    assert!(out.status.success());
    let s = String::from_utf8_lossy(&out.stdout);
    assert!(s.starts_with("pmc "), "{s}");
}
