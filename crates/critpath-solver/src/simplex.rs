use tracing::{debug, trace};

use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Analysis, ConstraintSlack, ConstraintViolation, Solution, SolutionStatus};

/// Simplex solver for linear programming problems
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        debug!(
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            minimize = problem.objective.minimize,
            "solving LP"
        );

        match self.run(problem) {
            Outcome::Optimal(tableau) => {
                let values = tableau.variable_values(problem.num_variables());
                self.optimal_solution(problem, values)
            }
            Outcome::Unbounded => {
                debug!("objective is unbounded");
                Solution::unbounded()
            }
            Outcome::Infeasible => self.diagnose_infeasibility(problem),
            Outcome::IterationLimit => {
                debug!(max_iterations = self.max_iterations, "iteration limit reached");
                Solution::error()
            }
        }
    }

    fn run(&self, problem: &LpProblem) -> Outcome {
        let mut tableau = Tableau::new(problem);

        // Phase 1: find an initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau) {
                Phase::Optimal => {}
                Phase::Unbounded | Phase::Infeasible => return Outcome::Infeasible,
                Phase::IterationLimit => return Outcome::IterationLimit,
            }
        }

        // Phase 2: optimize, never letting an artificial column re-enter
        let eligible = tableau.art_start();
        match self.iterate(&mut tableau, eligible) {
            Phase::Optimal => Outcome::Optimal(tableau),
            Phase::Unbounded => Outcome::Unbounded,
            Phase::Infeasible => Outcome::Infeasible,
            Phase::IterationLimit => Outcome::IterationLimit,
        }
    }

    /// When the problem is infeasible, solve it again without its `>=` rows and
    /// report which of the original constraints that relaxed optimum breaks.
    fn diagnose_infeasibility(&self, problem: &LpProblem) -> Solution {
        let mut relaxed = LpProblem::new(problem.variables.clone());
        relaxed.set_objective(
            problem.objective.coefficients.clone(),
            problem.objective.minimize,
        );
        relaxed.constraints = problem
            .constraints
            .iter()
            .filter(|c| c.op != ConstraintOp::Ge)
            .cloned()
            .collect();

        let values = match self.run(&relaxed) {
            Outcome::Optimal(tableau) => tableau.variable_values(relaxed.num_variables()),
            _ => {
                debug!("relaxed problem has no optimum either");
                return Solution::infeasible();
            }
        };

        let violations = self.find_violations(problem, &values);
        if violations.is_empty() {
            // The relaxation's optimum satisfies every row, so it is optimal for the original too
            return self.optimal_solution(problem, values);
        }

        debug!(violations = violations.len(), "problem is infeasible");
        let objective_value = objective_at(problem, &values);
        Solution::infeasible_with_relaxed(values, objective_value, violations)
    }

    /// Find which constraints are violated by a given solution, worst first
    fn find_violations(&self, problem: &LpProblem, values: &[f64]) -> Vec<ConstraintViolation> {
        let mut violations: Vec<ConstraintViolation> = problem
            .constraints
            .iter()
            .filter_map(|c| {
                let lhs = c.lhs(values);
                let slack = c.slack(values);
                if slack >= -self.scaled_tolerance(lhs, c.rhs) {
                    return None;
                }
                let amount = -slack;
                let description = match c.op {
                    ConstraintOp::Le => format!("{} exceeds its upper bound {} by {}", c.name, c.rhs, amount),
                    ConstraintOp::Ge => format!("{} falls short of its lower bound {} by {}", c.name, c.rhs, amount),
                    ConstraintOp::Eq => format!("{} should equal {} but is {}", c.name, c.rhs, lhs),
                };
                Some(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount: amount,
                    description,
                })
            })
            .collect();

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        violations
    }

    fn phase1(&self, tableau: &mut Tableau) -> Phase {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.art_start();

        let original = tableau.data[obj_row].clone();

        // Maximize -sum(artificials), priced out against the artificial basis
        tableau.data[obj_row].fill(0.0);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        let result = self.iterate(tableau, n_cols - 1);
        if result != Phase::Optimal {
            return result;
        }

        let rhs_col = n_cols - 1;
        let residual: f64 = (0..obj_row)
            .filter(|&i| tableau.basic_vars[i] >= art_start)
            .map(|i| tableau.data[i][rhs_col])
            .sum();
        if residual > self.tolerance {
            debug!(residual, "phase 1 left artificial variables positive");
            return Phase::Infeasible;
        }

        // Artificials still basic sit at zero; swap them out where the row allows it.
        // A row with no usable column is redundant and stays inert during phase 2.
        for i in 0..obj_row {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            if let Some(j) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                trace!(row = i, col = j, "driving artificial out of basis");
                tableau.pivot(i, j);
            }
        }

        // Restore original objective and price out the basic columns
        tableau.data[obj_row] = original;
        for i in 0..obj_row {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        Phase::Optimal
    }

    /// Pivot until no column below `eligible` can improve the objective.
    fn iterate(&self, tableau: &mut Tableau, eligible: usize) -> Phase {
        let mut iterations = 0;
        loop {
            let Some(col) = self.entering_column(tableau, eligible) else {
                trace!(iterations, "simplex phase converged");
                return Phase::Optimal;
            };
            if iterations == self.max_iterations {
                return Phase::IterationLimit;
            }
            let Some(row) = self.leaving_row(tableau, col) else {
                return Phase::Unbounded;
            };
            tableau.pivot(row, col);
            iterations += 1;
        }
    }

    /// Bland's rule: the lowest-index column with a positive reduced cost.
    fn entering_column(&self, tableau: &Tableau, eligible: usize) -> Option<usize> {
        let obj_row = tableau.obj_row();
        (0..eligible).find(|&j| tableau.data[obj_row][j] > self.tolerance)
    }

    /// Minimum ratio test; ties go to the row whose basic variable has the lowest index.
    fn leaving_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.n_cols() - 1;

        let mut best: Option<(usize, f64)> = None;
        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            best = match best {
                None => Some((i, ratio)),
                Some((row, min_ratio)) => {
                    if ratio < min_ratio - self.tolerance
                        || (ratio <= min_ratio + self.tolerance
                            && tableau.basic_vars[i] < tableau.basic_vars[row])
                    {
                        Some((i, ratio))
                    } else {
                        Some((row, min_ratio))
                    }
                }
            };
        }

        best.map(|(row, _)| row)
    }

    fn optimal_solution(&self, problem: &LpProblem, values: Vec<f64>) -> Solution {
        let objective_value = objective_at(problem, &values);
        let analysis = self.analyze(problem, &values);
        debug!(objective_value, binding = analysis.binding_constraints.len(), "optimal solution found");

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            analysis,
            violations: Vec::new(),
        }
    }

    fn analyze(&self, problem: &LpProblem, values: &[f64]) -> Analysis {
        let constraint_slacks: Vec<ConstraintSlack> = problem
            .constraints
            .iter()
            .map(|c| {
                let lhs = c.lhs(values);
                let slack = c.slack(values);
                ConstraintSlack {
                    constraint: c.name.clone(),
                    lhs,
                    rhs: c.rhs,
                    slack: if slack.abs() <= self.scaled_tolerance(lhs, c.rhs) { 0.0 } else { slack },
                }
            })
            .collect();

        let binding_constraints = constraint_slacks
            .iter()
            .filter(|s| s.slack == 0.0)
            .map(|s| s.constraint.clone())
            .collect();

        Analysis {
            binding_constraints,
            constraint_slacks,
        }
    }

    fn scaled_tolerance(&self, lhs: f64, rhs: f64) -> f64 {
        self.tolerance * (1.0 + lhs.abs().max(rhs.abs()))
    }
}

fn objective_at(problem: &LpProblem, values: &[f64]) -> f64 {
    problem
        .objective
        .coefficients
        .iter()
        .zip(values)
        .map(|(coef, value)| coef * value)
        .sum()
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn new(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        let mut n_slack = 0;
        let mut n_artificial = 0;
        for c in &problem.constraints {
            match c.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_constraints + 1],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, c) in problem.constraints.iter().enumerate() {
            // Keep the RHS non-negative so the starting basis is feasible
            let flip = c.rhs < 0.0;
            let sign = if flip { -1.0 } else { 1.0 };
            for (j, &coef) in c.coefficients.iter().take(n_vars).enumerate() {
                tableau.data[i][j] = sign * coef;
            }
            tableau.data[i][total_cols - 1] = sign * c.rhs;

            // A flipped `<=` becomes a `>=` and vice versa
            let op = match (c.op, flip) {
                (ConstraintOp::Le, true) => ConstraintOp::Ge,
                (ConstraintOp::Ge, true) => ConstraintOp::Le,
                (op, _) => op,
            };
            match op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row holds reduced costs of a maximization: -c when minimizing
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().take(n_vars).enumerate() {
            tableau.data[obj_row][j] = if problem.objective.minimize { -coef } else { coef };
        }

        tableau
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn art_start(&self) -> usize {
        self.n_vars + self.n_slack
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_cols = self.n_cols();
        self.basic_vars[row] = col;

        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        let pivot_row = self.data[row].clone();
        for (i, r) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = r[col];
            if factor != 0.0 {
                for (cell, p) in r.iter_mut().zip(&pivot_row) {
                    *cell -= factor * p;
                }
            }
        }
    }

    fn variable_values(&self, n_vars: usize) -> Vec<f64> {
        let rhs_col = self.n_cols() - 1;
        let mut values = vec![0.0; n_vars];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < n_vars {
                values[basic] = self.data[i][rhs_col].max(0.0);
            }
        }
        values
    }
}

enum Outcome {
    Optimal(Tableau),
    Unbounded,
    Infeasible,
    IterationLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Optimal,
    Unbounded,
    Infeasible,
    IterationLimit,
}
