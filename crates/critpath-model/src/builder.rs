use std::collections::{HashMap, HashSet};

use critpath_solver::{ConstraintOp, LpProblem, Solution, SolutionStatus, Solver};
use tracing::debug;

use crate::graph;
use crate::schedule::{snap, ActivityTimes, PrecedenceLink, Schedule, ScheduleOutcome, TIME_TOLERANCE};
use crate::table::{ModelError, ProjectTable};

/// A precedence constraint and the activities it relates
#[derive(Debug, Clone)]
struct LinkRow {
    activity: usize,
    predecessor: usize,
    row: usize,
}

/// The critical path LP for one project table
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    problem: LpProblem,
    names: Vec<String>,
    durations: Vec<f64>,
    links: Vec<LinkRow>,
}

pub fn start_variable(activity: &str) -> String {
    format!("start_{}", activity)
}

pub fn end_variable(activity: &str) -> String {
    format!("end_{}", activity)
}

/// Build the LP: minimize the sum of end times subject to
/// `end = start + duration` per activity and `start >= end(predecessor)` per link.
///
/// Cycles are not rejected here; they make the LP infeasible.
pub fn build_model(table: &ProjectTable) -> Result<ScheduleModel, ModelError> {
    let n = table.len();
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, activity) in table.activities().iter().enumerate() {
        if index.insert(activity.name.as_str(), i).is_some() {
            return Err(ModelError::DuplicateActivity(activity.name.clone()));
        }
    }

    // start_* for every activity, then end_* for every activity
    let variables: Vec<String> = table
        .activities()
        .iter()
        .map(|a| start_variable(&a.name))
        .chain(table.activities().iter().map(|a| end_variable(&a.name)))
        .collect();
    let start = |i: usize| i;
    let end = |i: usize| n + i;

    let mut problem = LpProblem::new(variables);
    let mut links = Vec::new();

    for (i, activity) in table.activities().iter().enumerate() {
        let mut coefficients = vec![0.0; 2 * n];
        coefficients[end(i)] = 1.0;
        coefficients[start(i)] = -1.0;
        problem.add_constraint(
            format!("{}_duration", activity.name),
            coefficients,
            ConstraintOp::Eq,
            activity.duration,
        );

        for predecessor in &activity.predecessors {
            let p = *index
                .get(predecessor.as_str())
                .ok_or_else(|| ModelError::UnknownPredecessor {
                    activity: activity.name.clone(),
                    predecessor: predecessor.clone(),
                })?;

            let mut coefficients = vec![0.0; 2 * n];
            coefficients[start(i)] += 1.0;
            coefficients[end(p)] -= 1.0;
            links.push(LinkRow {
                activity: i,
                predecessor: p,
                row: problem.num_constraints(),
            });
            problem.add_constraint(
                format!("{}_predecessor_{}", activity.name, predecessor),
                coefficients,
                ConstraintOp::Ge,
                0.0,
            );
        }
    }

    let objective = (0..2 * n).map(|j| if j >= n { 1.0 } else { 0.0 }).collect();
    problem.set_objective(objective, true);

    debug!(
        table = %table.name,
        variables = problem.num_variables(),
        constraints = problem.num_constraints(),
        "built critical path model"
    );

    Ok(ScheduleModel {
        problem,
        names: table.activities().iter().map(|a| a.name.clone()).collect(),
        durations: table.activities().iter().map(|a| a.duration).collect(),
        links,
    })
}

/// Build and solve in one step
pub fn solve_table(table: &ProjectTable, solver: &Solver) -> Result<ScheduleOutcome, ModelError> {
    Ok(build_model(table)?.solve(solver))
}

impl ScheduleModel {
    pub fn problem(&self) -> &LpProblem {
        &self.problem
    }

    pub fn num_activities(&self) -> usize {
        self.names.len()
    }

    pub fn solve(&self, solver: &Solver) -> ScheduleOutcome {
        let solution = solver.solve(&self.problem);
        debug!(status = %solution.status, "critical path model solved");

        match solution.status {
            SolutionStatus::Optimal => ScheduleOutcome::Optimal(self.schedule_from(&solution)),
            SolutionStatus::Infeasible => self.infeasible(solution),
            SolutionStatus::Unbounded => ScheduleOutcome::Unbounded,
            SolutionStatus::Error => ScheduleOutcome::Error,
        }
    }

    /// Activity indices each activity waits on
    fn waits_on(&self) -> Vec<Vec<usize>> {
        let mut waits_on = vec![Vec::new(); self.num_activities()];
        for link in &self.links {
            waits_on[link.activity].push(link.predecessor);
        }
        waits_on
    }

    /// Narrow the solver's violations down to the links of a precedence cycle, if there is one.
    fn infeasible(&self, solution: Solution) -> ScheduleOutcome {
        let Some(cycle) = graph::find_cycle(&self.waits_on()) else {
            return ScheduleOutcome::Infeasible {
                violations: solution.violations,
                cycle: Vec::new(),
            };
        };

        let cycle_rows: HashSet<&str> = cycle
            .windows(2)
            .filter_map(|pair| {
                self.links
                    .iter()
                    .find(|l| l.activity == pair[0] && l.predecessor == pair[1])
            })
            .map(|l| self.problem.constraints[l.row].name.as_str())
            .collect();

        let violations = solution
            .violations
            .into_iter()
            .filter(|v| cycle_rows.contains(v.constraint.as_str()))
            .collect();
        let cycle = cycle.into_iter().map(|i| self.names[i].clone()).collect();
        debug!(?cycle, "precedence cycle makes the model infeasible");

        ScheduleOutcome::Infeasible { violations, cycle }
    }

    /// Earliest times from the LP values. A start that sits on a predecessor's
    /// end takes that end exactly, and every end is `start + duration`.
    fn schedule_from(&self, solution: &Solution) -> Schedule {
        let n = self.num_activities();
        let raw_start = |i: usize| solution.values[i];
        let raw_end = |i: usize| solution.values[n + i];
        let waits_on = self.waits_on();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            raw_start(a)
                .total_cmp(&raw_start(b))
                .then(raw_end(a).total_cmp(&raw_end(b)))
        });

        let mut starts = vec![0.0; n];
        let mut ends = vec![0.0; n];
        let mut placed = vec![false; n];
        for i in order {
            let mut pinned: Option<f64> = None;
            for &p in &waits_on[i] {
                let end_p = if placed[p] { ends[p] } else { snap(raw_end(p)) };
                if (raw_start(i) - end_p).abs() <= TIME_TOLERANCE {
                    pinned = Some(pinned.map_or(end_p, |s: f64| s.max(end_p)));
                }
            }
            let start = pinned.unwrap_or_else(|| snap(raw_start(i)));
            starts[i] = start;
            ends[i] = start + self.durations[i];
            placed[i] = true;
        }

        let activities = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| ActivityTimes {
                name: name.clone(),
                duration: self.durations[i],
                start: starts[i],
                end: ends[i],
            })
            .collect();

        let links = self
            .links
            .iter()
            .map(|link| PrecedenceLink {
                activity: self.names[link.activity].clone(),
                predecessor: self.names[link.predecessor].clone(),
                gap: snap(starts[link.activity] - ends[link.predecessor]),
            })
            .collect();

        Schedule::new(activities, links)
    }
}
