use std::collections::{HashMap, HashSet};

use critpath_solver::{ConstraintViolation, SolutionStatus};

use crate::builder::{end_variable, start_variable};

/// Times closer than this are considered equal
pub const TIME_TOLERANCE: f64 = 1e-6;

/// Outcome of solving a critical path model. Only `Optimal` carries times.
#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    Optimal(Schedule),
    /// No schedule satisfies every constraint. When a precedence cycle is the
    /// cause, `cycle` holds its path and `violations` only the links along it.
    Infeasible {
        violations: Vec<ConstraintViolation>,
        cycle: Vec<String>,
    },
    Unbounded,
    Error,
}

impl ScheduleOutcome {
    pub fn status(&self) -> SolutionStatus {
        match self {
            ScheduleOutcome::Optimal(_) => SolutionStatus::Optimal,
            ScheduleOutcome::Infeasible { .. } => SolutionStatus::Infeasible,
            ScheduleOutcome::Unbounded => SolutionStatus::Unbounded,
            ScheduleOutcome::Error => SolutionStatus::Error,
        }
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            ScheduleOutcome::Optimal(schedule) => Some(schedule),
            _ => None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityTimes {
    pub name: String,
    pub duration: f64,
    pub start: f64,
    pub end: f64,
}

/// How long `activity` waits after `predecessor` ends; zero when the link is tight
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PrecedenceLink {
    pub activity: String,
    pub predecessor: String,
    pub gap: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub name: String,
    pub value: f64,
}

/// Earliest start and end times for every activity
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// In table order
    pub activities: Vec<ActivityTimes>,
    pub links: Vec<PrecedenceLink>,
    /// Every decision variable, sorted by name
    pub variables: Vec<VariableValue>,
    /// Latest end time over all activities
    pub makespan: f64,
    /// Objective value: sum of all end times
    pub total_end_time: f64,
}

/// Round away simplex noise around whole numbers
pub(crate) fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < TIME_TOLERANCE {
        if rounded == 0.0 { 0.0 } else { rounded }
    } else {
        value
    }
}

fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIME_TOLERANCE
}

impl Schedule {
    /// Times are taken as given; `end` must already equal `start + duration`.
    /// The variable listing is derived from the times so it agrees with them.
    pub fn new(activities: Vec<ActivityTimes>, links: Vec<PrecedenceLink>) -> Self {
        let mut variables: Vec<VariableValue> = activities
            .iter()
            .flat_map(|a| {
                [
                    VariableValue {
                        name: start_variable(&a.name),
                        value: a.start,
                    },
                    VariableValue {
                        name: end_variable(&a.name),
                        value: a.end,
                    },
                ]
            })
            .collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));

        let makespan = activities.iter().map(|a| a.end).fold(0.0, f64::max);
        let total_end_time = activities.iter().map(|a| a.end).sum();

        Self {
            activities,
            links,
            variables,
            makespan,
            total_end_time,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ActivityTimes> {
        self.activities.iter().find(|a| a.name == name)
    }

    pub fn starting_at_zero(&self) -> impl Iterator<Item = &ActivityTimes> {
        self.activities.iter().filter(|a| same_time(a.start, 0.0))
    }

    /// Every activity that ends at the makespan, ties included
    pub fn finishing_last(&self) -> impl Iterator<Item = &ActivityTimes> {
        self.activities.iter().filter(|a| same_time(a.end, self.makespan))
    }

    pub fn tight_links(&self) -> impl Iterator<Item = &PrecedenceLink> {
        self.links.iter().filter(|l| same_time(l.gap, 0.0))
    }

    /// Activities on a critical path: walk back from each activity that
    /// finishes last through predecessors it starts immediately after.
    /// Returned in table order.
    pub fn critical_path(&self) -> Vec<&ActivityTimes> {
        let mut tight: HashMap<&str, Vec<&str>> = HashMap::new();
        for link in self.tight_links() {
            tight
                .entry(link.activity.as_str())
                .or_default()
                .push(link.predecessor.as_str());
        }

        let mut critical: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = self.finishing_last().map(|a| a.name.as_str()).collect();
        while let Some(name) = pending.pop() {
            if !critical.insert(name) {
                continue;
            }
            if let Some(predecessors) = tight.get(name) {
                pending.extend(predecessors.iter().copied());
            }
        }

        self.activities
            .iter()
            .filter(|a| critical.contains(a.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::solve_table;
    use crate::scenario::Scenario;
    use crate::table::ProjectTable;
    use critpath_solver::Solver;

    fn times(name: &str, start: f64, duration: f64) -> ActivityTimes {
        ActivityTimes {
            name: name.to_string(),
            duration,
            start,
            end: start + duration,
        }
    }

    fn names<'a>(activities: impl IntoIterator<Item = &'a ActivityTimes>) -> Vec<&'a str> {
        activities.into_iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_snap_removes_round_off() {
        assert_eq!(snap(2.0000000000000004), 2.0);
        assert_eq!(snap(-1e-12), 0.0);
        assert!(snap(-1e-12).is_sign_positive());
        assert_eq!(snap(2.5), 2.5);
    }

    #[test]
    fn test_makespan_computed_once_from_end_times() {
        let schedule = Schedule::new(vec![times("A", 0.0, 4.0), times("B", 0.0, 9.0)], Vec::new());
        assert_eq!(schedule.makespan, 9.0);
        assert_eq!(schedule.total_end_time, 13.0);
        assert_eq!(names(schedule.finishing_last()), vec!["B"]);
    }

    #[test]
    fn test_variables_follow_times_sorted_by_name() {
        let schedule = Schedule::new(vec![times("B", 1.5, 0.25), times("A", 0.0, 1.5)], Vec::new());
        let listed: Vec<(&str, f64)> = schedule
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.value))
            .collect();
        assert_eq!(
            listed,
            vec![("end_A", 1.5), ("end_B", 1.75), ("start_A", 0.0), ("start_B", 1.5)]
        );
    }

    #[test]
    fn test_ties_at_makespan_all_reported() {
        let table = ProjectTable::from_tables(
            "ties",
            &[("Kickoff", 1.0), ("Left", 3.0), ("Right", 3.0), ("Short", 1.0)],
            &[("Left", &["Kickoff"]), ("Right", &["Kickoff"]), ("Short", &["Kickoff"])],
        )
        .unwrap();
        let outcome = solve_table(&table, &Solver::new()).unwrap();
        let schedule = outcome.schedule().unwrap();

        assert_eq!(schedule.makespan, 4.0);
        assert_eq!(names(schedule.finishing_last()), vec!["Left", "Right"]);
        assert_eq!(names(schedule.starting_at_zero()), vec!["Kickoff"]);
        assert_eq!(names(schedule.critical_path()), vec!["Kickoff", "Left", "Right"]);
    }

    #[test]
    fn test_best_case_critical_path() {
        let outcome = solve_table(&Scenario::Best.table(), &Solver::new()).unwrap();
        let schedule = outcome.schedule().unwrap();

        assert_eq!(names(schedule.starting_at_zero()), vec!["A_DescribeProduct", "B_Marketing"]);
        assert_eq!(names(schedule.finishing_last()), vec!["H_Proposal"]);
        assert_eq!(
            names(schedule.critical_path()),
            vec![
                "A_DescribeProduct",
                "D1_Requirements",
                "D2_SoftwareDesign",
                "D3_SystemDesign",
                "D4_Coding",
                "D6_UnitTesting",
                "D7_SystemTesting",
                "D8_Package",
                "G_Implementation",
                "H_Proposal",
            ]
        );

        let f_pricing = schedule.get("F_Pricing").unwrap();
        assert_eq!((f_pricing.start, f_pricing.end), (230.0, 240.0));
        let gap = schedule
            .links
            .iter()
            .find(|l| l.activity == "H_Proposal" && l.predecessor == "F_Pricing")
            .map(|l| l.gap);
        assert_eq!(gap, Some(30.0));
        assert_eq!(schedule.variables.len(), 30);
    }
}
