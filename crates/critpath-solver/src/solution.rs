use crate::problem::LpProblem;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable (the relaxed values when infeasible)
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Constraint analysis at the optimum
    pub analysis: Analysis,
    /// Constraint violations (populated when infeasible)
    pub violations: Vec<ConstraintViolation>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// Solver gave up, e.g. the iteration limit was reached
    Error,
}

/// Which constraints hold with equality at the optimum, and by how much the others are slack
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Names of constraints that are tight at the optimum
    pub binding_constraints: Vec<String>,
    /// Slack of every constraint, in problem order
    pub constraint_slacks: Vec<ConstraintSlack>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ConstraintSlack {
    /// Constraint name
    pub constraint: String,
    /// Left-hand side at the optimum
    pub lhs: f64,
    /// Right-hand side of the constraint
    pub rhs: f64,
    /// Distance from the bound; zero for binding constraints
    pub slack: f64,
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            analysis: Analysis::default(),
            violations: Vec::new(),
        }
    }

    pub fn infeasible_with_relaxed(
        values: Vec<f64>,
        objective_value: f64,
        violations: Vec<ConstraintViolation>,
    ) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values,
            objective_value,
            analysis: Analysis::default(),
            violations,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            analysis: Analysis::default(),
            violations: Vec::new(),
        }
    }

    pub fn error() -> Self {
        Self {
            status: SolutionStatus::Error,
            values: Vec::new(),
            objective_value: f64::NAN,
            analysis: Analysis::default(),
            violations: Vec::new(),
        }
    }

    /// Value of the named variable, if the solution carries values
    pub fn value_of(&self, problem: &LpProblem, name: &str) -> Option<f64> {
        problem
            .variable_index(name)
            .and_then(|i| self.values.get(i).copied())
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SolutionStatus::Optimal => "OPTIMAL",
            SolutionStatus::Infeasible => "INFEASIBLE",
            SolutionStatus::Unbounded => "UNBOUNDED",
            SolutionStatus::Error => "ERROR",
        };
        f.write_str(label)
    }
}
