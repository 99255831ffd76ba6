//! Binary-level contract tests: exit codes, report shape, output modes.

use std::io::Write;
use std::process::Command;

const TWO_STATE_LOOP: &str = r#"
const int capacity = 2;

module loop
  s : [0..1] init 0;

  [step] s=0 -> 1:(s'=1);
  [step] s=1 -> 1:(s'=0);
endmodule

rewards "cost"
  [step] s=0 : 1;
  [step] s=1 : 1;
endrewards

label "reload" = s=0;
label "target" = s=1;
"#;

fn model_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".prism")
        .tempfile()
        .expect("create temp model");
    file.write_all(contents.as_bytes()).expect("write model");
    file
}

fn petrel() -> Command {
    Command::new(env!("CARGO_BIN_EXE_petrel"))
}

#[test]
fn valid_model_exits_zero_with_full_report() {
    let model = model_file(TWO_STATE_LOOP);
    let output = petrel().arg(model.path()).output().expect("run petrel");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    for needle in [
        "capacity = 2",
        "MinInitCons",
        "1 2",
        "Safe",
        "SafePR",
        "counterSelector =",
        "Counter selector satisfies requirements:",
        "true",
    ] {
        assert!(stdout.contains(needle), "missing `{needle}` in:\n{stdout}");
    }
}

#[test]
fn unsupported_model_exits_one() {
    let broken = TWO_STATE_LOOP.replace("label \"target\" = s=1;\n", "");
    let model = model_file(&broken);
    let output = petrel().arg(model.path()).output().expect("run petrel");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("target"), "stderr: {stderr}");
}

#[test]
fn syntax_error_exits_one() {
    let model = model_file("module broken\n");
    let output = petrel().arg(model.path()).output().expect("run petrel");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_file_exits_one() {
    let output = petrel()
        .arg("no-such-model.prism")
        .output()
        .expect("run petrel");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-model.prism"), "stderr: {stderr}");
}

#[test]
fn missing_capacity_is_fixed_by_the_flag() {
    let without = TWO_STATE_LOOP.replace("const int capacity = 2;\n", "");
    let model = model_file(&without);

    let bare = petrel().arg(model.path()).output().expect("run petrel");
    assert_eq!(bare.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&bare.stderr).contains("capacity"));

    let with_flag = petrel()
        .arg(model.path())
        .args(["--capacity", "2"])
        .output()
        .expect("run petrel");
    assert!(with_flag.status.success());
    assert!(String::from_utf8_lossy(&with_flag.stdout).contains("capacity = 2"));
}

#[test]
fn capacity_override_changes_the_verdicts() {
    let model = model_file(TWO_STATE_LOOP);
    let output = petrel()
        .arg(model.path())
        .args(["--capacity", "0"])
        .output()
        .expect("run petrel");
    // Still exit 0: the selector is vacuously valid when nothing is safe.
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("capacity = 0"));
    assert!(stdout.contains("infinity infinity"));
}

#[test]
fn json_format_emits_machine_readable_report() {
    let model = model_file(TWO_STATE_LOOP);
    let output = petrel()
        .arg(model.path())
        .args(["--format", "json"])
        .output()
        .expect("run petrel");
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(report["capacity"], 2);
    assert_eq!(report["min_init_cons"], serde_json::json!([1, 2]));
    assert_eq!(report["selector_valid"], true);
}

#[test]
fn unknown_format_is_rejected() {
    let model = model_file(TWO_STATE_LOOP);
    let output = petrel()
        .arg(model.path())
        .args(["--format", "xml"])
        .output()
        .expect("run petrel");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn output_flag_writes_the_report_to_a_file() {
    let model = model_file(TWO_STATE_LOOP);
    let dir = tempfile::tempdir().expect("tempdir");
    let out_path = dir.path().join("report.txt");
    let output = petrel()
        .arg(model.path())
        .arg("--output")
        .arg(&out_path)
        .output()
        .expect("run petrel");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let report = std::fs::read_to_string(&out_path).expect("report file");
    assert!(report.contains("Counter selector satisfies requirements:"));
}
