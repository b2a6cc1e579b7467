use assert_cmd::prelude::*;
use rstest::rstest;
use std::process::Command;

fn json_lines(args: &[&str]) -> (Option<i32>, Vec<serde_json::Value>) {
    let out = Command::cargo_bin("probe")
        .unwrap()
        .args(["--json", "--log-level", "error"])
        .args(args)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l:?}: {e}")))
        .collect();
    (out.status.code(), lines)
}

/// Every simulated tick is one JSON object, followed by a summary.
#[rstest]
fn simulate_tick_schema() {
    let (code, lines) = json_lines(&["simulate", "--ticks", "10", "--havoc", "5..7"]);
    assert_eq!(code, Some(0));
    assert_eq!(lines.len(), 11);

    for (i, v) in lines[..10].iter().enumerate() {
        assert_eq!(v["tick"].as_u64(), Some(i as u64));
        for key in ["havoc", "cmd_ok", "fresh", "last_read_success", "temp_ever_valid"] {
            assert!(v[key].is_boolean(), "{key} should be bool in {v}");
        }
        for key in ["real_temp", "temp"] {
            assert!(v[key].is_i64(), "{key} should be an integer in {v}");
        }
        assert!(v["command"].is_string());
        assert!(v["phase"].is_string());
        // Null until the first successful read.
        assert!(v["last_good_temp"].is_null() || v["last_good_temp"].is_i64());
    }

    assert_eq!(lines[0]["command"], "reset");
    assert_eq!(lines[1]["command"], "set_int_enable");
    assert_eq!(lines[2]["phase"], "polling");
    assert!(lines[0]["last_good_temp"].is_null());
    assert_eq!(lines[3]["last_good_temp"], 20);
    assert_eq!(lines[5]["havoc"], true);

    let summary = &lines[10];
    assert_eq!(summary["summary"], true);
    assert_eq!(summary["ticks"], 10);
    assert_eq!(summary["first_valid_tick"], 3);
    assert_eq!(summary["recoveries"], 1);
}

#[rstest]
fn negative_temperature_override_is_reported() {
    let (code, lines) = json_lines(&["simulate", "--ticks", "8", "--temp", "-5"]);
    assert_eq!(code, Some(0));
    assert_eq!(lines[7]["last_good_temp"], -5);
}

#[rstest]
fn self_check_reports_each_scenario() {
    let (code, lines) = json_lines(&["self-check"]);
    assert_eq!(code, Some(0));
    assert!(!lines.is_empty());
    for v in &lines {
        assert!(v["scenario"].is_string());
        assert_eq!(v["ok"], true, "scenario failed: {v}");
        assert_eq!(v["problems"].as_array().map(Vec::len), Some(0));
    }
}
