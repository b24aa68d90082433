#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;

fn critpath() -> Command {
    let mut cmd = Command::cargo_bin("critpath").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// critpath solve
// ---------------------------------------------------------------------------

#[test]
fn solve_best_case_reports_critical_path_time() {
    critpath()
        .arg("solve")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: OPTIMAL"))
        .stdout(predicate::str::contains("A_DescribeProduct starts at time 0\n"))
        .stdout(predicate::str::contains("B_Marketing starts at time 0\n"))
        .stdout(predicate::str::contains("H_Proposal ends at 310 days in duration\n"))
        .stdout(predicate::str::contains("start_D4_Coding = 18\n"))
        .stdout(predicate::str::contains("end_H_Proposal = 310\n"));
}

#[test]
fn solve_other_scenarios() {
    critpath()
        .args(["solve", "--scenario", "expected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("H_Proposal ends at 620 days in duration"));

    critpath()
        .args(["solve", "-s", "worst"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(worst case)"))
        .stdout(predicate::str::contains("H_Proposal ends at 970 days in duration"));
}

#[test]
fn solve_rejects_unknown_scenario() {
    critpath()
        .args(["solve", "--scenario", "likely"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown scenario"));
}

#[test]
fn solve_with_analysis_lists_chain() {
    critpath()
        .args(["solve", "--analysis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Critical path (310 days):"))
        .stdout(predicate::str::contains("D4_Coding"))
        .stdout(predicate::str::contains("G_Implementation starts when D8_Package ends"));
}

#[test]
fn solve_json_output() {
    let output = critpath()
        .args(["solve", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "OPTIMAL");
    assert_eq!(value["scenario"], "best");
    assert_eq!(value["schedule"]["makespan"], 310.0);
    assert_eq!(value["schedule"]["activities"].as_array().unwrap().len(), 15);
    assert_eq!(value["schedule"]["variables"].as_array().unwrap().len(), 30);
    assert_eq!(value["critical_path"].as_array().unwrap().len(), 10);
}

#[test]
fn solve_extra_precedence_shifts_schedule() {
    // Pricing must now wait for implementation: 270 + 10, then the proposal 280 + 40
    critpath()
        .args(["solve", "--precedence", "F_Pricing:G_Implementation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("H_Proposal ends at 320 days in duration"));
}

#[test]
fn solve_cycle_fails_validation() {
    critpath()
        .args(["solve", "-p", "A_DescribeProduct:H_Proposal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Precedence cycle detected"));
}

#[test]
fn solve_cycle_without_validation_is_infeasible() {
    critpath()
        .args(["solve", "-p", "A_DescribeProduct:H_Proposal", "--skip-validation"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Status: INFEASIBLE"))
        .stdout(predicate::str::contains("Precedence cycle: A_DescribeProduct -> H_Proposal -> "))
        .stdout(predicate::str::contains("A_DescribeProduct_predecessor_H_Proposal"))
        .stdout(predicate::str::contains("B_Marketing").not())
        .stdout(predicate::str::contains("starts at time 0").not())
        .stdout(predicate::str::contains("Solution variable values").not());
}

#[test]
fn solve_cycle_json_has_no_schedule() {
    let output = critpath()
        .args(["solve", "-p", "A_DescribeProduct:H_Proposal", "--skip-validation", "-f", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "INFEASIBLE");
    assert!(value.get("schedule").is_none());
    assert_eq!(value["cycle"][0], "A_DescribeProduct");
    let violations = value["violations"].as_array().unwrap();
    assert_eq!(violations.len(), value["cycle"].as_array().unwrap().len() - 1);
}

#[test]
fn solve_two_activity_cycle_lists_only_its_links() {
    critpath()
        .args(["solve", "-p", "D7_SystemTesting:D8_Package", "--skip-validation"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Precedence cycle: D7_SystemTesting -> D8_Package -> D7_SystemTesting",
        ))
        .stdout(predicate::str::contains("D8_Package_predecessor_D7_SystemTesting"))
        .stdout(predicate::str::contains("D5_Documentation_predecessor_D4_Coding").not());
}

#[test]
fn solve_unknown_activity_in_precedence() {
    critpath()
        .args(["solve", "-p", "Z_Launch:H_Proposal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown activity: Z_Launch"));
}

#[test]
fn solve_malformed_precedence_is_a_usage_error() {
    critpath()
        .args(["solve", "-p", "F_Pricing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ACTIVITY:PREDECESSOR"));
}

#[test]
fn solve_iteration_limit_reports_error_status() {
    critpath()
        .args(["solve", "--max-iterations", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Status: ERROR"))
        .stdout(predicate::str::contains("ends at").not());
}

// ---------------------------------------------------------------------------
// critpath check / table
// ---------------------------------------------------------------------------

#[test]
fn check_builtin_table() {
    critpath()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("15 activities"))
        .stdout(predicate::str::contains("19 precedence links"));
}

#[test]
fn check_reports_unknown_predecessor() {
    critpath()
        .args(["check", "-p", "H_Proposal:Z_Launch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown predecessor Z_Launch"));
}

#[test]
fn table_text_and_json() {
    critpath()
        .args(["table", "--scenario", "worst"])
        .assert()
        .success()
        .stdout(predicate::str::contains("D4_Coding"))
        .stdout(predicate::str::contains("480 days"));

    let output = critpath().args(["table", "-f", "json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "Software product launch");
    assert_eq!(value["activities"].as_array().unwrap().len(), 15);
}
