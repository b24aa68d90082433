use std::io::{self, Write};

use critpath_model::{ProjectTable, Scenario, Schedule, ScheduleOutcome};
use critpath_solver::{ConstraintViolation, SolutionStatus};
use serde::Serialize;

#[derive(Serialize)]
struct SolveReport<'a> {
    project: &'a str,
    scenario: Scenario,
    status: SolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<&'a Schedule>,
    critical_path: Vec<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    cycle: &'a [String],
    violations: &'a [ConstraintViolation],
}

pub fn outcome_json(
    table: &ProjectTable,
    scenario: Scenario,
    outcome: &ScheduleOutcome,
) -> Result<String, serde_json::Error> {
    let schedule = outcome.schedule();
    let (violations, cycle): (&[ConstraintViolation], &[String]) = match outcome {
        ScheduleOutcome::Infeasible { violations, cycle } => (violations, cycle),
        _ => (&[], &[]),
    };

    let report = SolveReport {
        project: &table.name,
        scenario,
        status: outcome.status(),
        schedule,
        critical_path: schedule
            .map(|s| s.critical_path().into_iter().map(|a| a.name.as_str()).collect())
            .unwrap_or_default(),
        cycle,
        violations,
    };
    serde_json::to_string_pretty(&report)
}

pub fn write_outcome(
    out: &mut impl Write,
    table: &ProjectTable,
    scenario: Scenario,
    outcome: &ScheduleOutcome,
    analysis: bool,
) -> io::Result<()> {
    writeln!(out, "Project: {} ({} case)", table.name, scenario)?;
    writeln!(out, "Status: {}", outcome.status())?;

    match outcome {
        ScheduleOutcome::Optimal(schedule) => {
            writeln!(out)?;
            writeln!(out, "Critical Path time:")?;
            for activity in schedule.starting_at_zero() {
                writeln!(out, "{} starts at time 0", activity.name)?;
            }
            for activity in schedule.finishing_last() {
                writeln!(out, "{} ends at {} days in duration", activity.name, activity.end)?;
            }

            writeln!(out)?;
            writeln!(out, "Solution variable values:")?;
            for variable in &schedule.variables {
                writeln!(out, "{} = {}", variable.name, variable.value)?;
            }

            if analysis {
                write_analysis(out, schedule)?;
            }
        }
        ScheduleOutcome::Infeasible { violations, cycle } => {
            writeln!(out, "No schedule satisfies every constraint.")?;
            if !cycle.is_empty() {
                writeln!(out, "Precedence cycle: {}", cycle.join(" -> "))?;
            }
            if !violations.is_empty() {
                writeln!(out)?;
                writeln!(out, "Violated constraints (precedence rows relaxed):")?;
                for v in violations {
                    writeln!(out, "  - {}", v.description)?;
                }
            }
        }
        ScheduleOutcome::Unbounded => {
            writeln!(out, "The problem has no finite optimal solution.")?;
        }
        ScheduleOutcome::Error => {
            writeln!(out, "Solver stopped before reaching an optimum.")?;
        }
    }

    Ok(())
}

fn write_analysis(out: &mut impl Write, schedule: &Schedule) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Critical path ({} days):", schedule.makespan)?;
    for activity in schedule.critical_path() {
        writeln!(out, "  {:20} {:>8} -> {}", activity.name, activity.start, activity.end)?;
    }

    writeln!(out)?;
    writeln!(out, "Binding precedence links:")?;
    for link in schedule.tight_links() {
        writeln!(out, "  {} starts when {} ends", link.activity, link.predecessor)?;
    }
    Ok(())
}

pub fn write_table(out: &mut impl Write, table: &ProjectTable, scenario: Scenario) -> io::Result<()> {
    writeln!(out, "Project: {} ({} case)", table.name, scenario)?;
    for activity in table.activities() {
        let after = if activity.predecessors.is_empty() {
            "-".to_string()
        } else {
            activity.predecessors.join(", ")
        };
        writeln!(out, "  {:20} {:>6} days  after {}", activity.name, activity.duration, after)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use critpath_model::{solve_table, Activity};
    use critpath_solver::Solver;

    fn render(table: &ProjectTable, outcome: &ScheduleOutcome, analysis: bool) -> String {
        let mut buf = Vec::new();
        write_outcome(&mut buf, table, Scenario::Best, outcome, analysis).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn two_step() -> ProjectTable {
        ProjectTable::from_tables("two step", &[("X", 2.0), ("Y", 3.0)], &[("Y", &["X"])]).unwrap()
    }

    #[test]
    fn test_render_optimal() {
        let table = two_step();
        let outcome = solve_table(&table, &Solver::new()).unwrap();
        let text = render(&table, &outcome, false);

        assert!(text.contains("Status: OPTIMAL"));
        assert!(text.contains("X starts at time 0\n"));
        assert!(!text.contains("Y starts at time 0"));
        assert!(text.contains("Y ends at 5 days in duration\n"));
        assert!(text.ends_with("end_X = 2\nend_Y = 5\nstart_X = 0\nstart_Y = 2\n"));
        assert!(!text.contains("Critical path ("));
    }

    #[test]
    fn test_render_analysis() {
        let table = two_step();
        let outcome = solve_table(&table, &Solver::new()).unwrap();
        let text = render(&table, &outcome, true);

        assert!(text.contains("Critical path (5 days):"));
        assert!(text.contains("Y starts when X ends"));
    }

    #[test]
    fn test_render_infeasible_has_no_times() {
        let table = ProjectTable::from_activities(
            "cycle",
            vec![
                Activity::new("A", 1.0).with_predecessor("B"),
                Activity::new("B", 1.0).with_predecessor("A"),
            ],
        );
        let outcome = solve_table(&table, &Solver::new()).unwrap();
        let text = render(&table, &outcome, true);

        assert!(text.contains("Status: INFEASIBLE"));
        assert!(text.contains("Precedence cycle: A -> B -> A\n"));
        assert!(text.contains("A_predecessor_B"));
        assert!(!text.contains("starts at time"));
        assert!(!text.contains(" = "));
    }

    #[test]
    fn test_outcome_json() {
        let table = two_step();
        let outcome = solve_table(&table, &Solver::new()).unwrap();
        let json = outcome_json(&table, Scenario::Expected, &outcome).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "OPTIMAL");
        assert!(value.get("cycle").is_none());
        assert_eq!(value["scenario"], "expected");
        assert_eq!(value["schedule"]["makespan"], 5.0);
        assert_eq!(value["critical_path"], serde_json::json!(["X", "Y"]));
    }

    #[test]
    fn test_render_table() {
        let mut buf = Vec::new();
        write_table(&mut buf, &two_step(), Scenario::Best).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Project: two step (best case)\n"));
        assert!(text.contains("after X"));
        assert!(text.contains("after -"));
    }
}
