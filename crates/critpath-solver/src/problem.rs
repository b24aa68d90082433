/// Represents a linear programming problem
///
/// Every variable is implicitly bounded below by zero.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Constraint {
    /// Left-hand side evaluated at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Signed distance from violation: non-negative when satisfied, zero when tight.
    pub fn slack(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs(values);
        match self.op {
            ConstraintOp::Le => self.rhs - lhs,
            ConstraintOp::Ge => lhs - self.rhs,
            ConstraintOp::Eq => -(lhs - self.rhs).abs(),
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_slack_signs() {
        let le = Constraint {
            name: "le".to_string(),
            coefficients: vec![1.0, 1.0],
            op: ConstraintOp::Le,
            rhs: 4.0,
        };
        assert_eq!(le.lhs(&[1.0, 2.0]), 3.0);
        assert_eq!(le.slack(&[1.0, 2.0]), 1.0);
        assert_eq!(le.slack(&[3.0, 2.0]), -1.0);

        let ge = Constraint { op: ConstraintOp::Ge, ..le.clone() };
        assert_eq!(ge.slack(&[1.0, 2.0]), -1.0);
        assert_eq!(ge.slack(&[2.0, 2.0]), 0.0);

        let eq = Constraint { op: ConstraintOp::Eq, ..le };
        assert_eq!(eq.slack(&[1.0, 3.0]), 0.0);
        assert_eq!(eq.slack(&[5.0, 1.0]), -2.0);
    }

    #[test]
    fn test_variable_index() {
        let problem = LpProblem::new(vec!["start_x".to_string(), "end_x".to_string()]);
        assert_eq!(problem.variable_index("end_x"), Some(1));
        assert_eq!(problem.variable_index("end_y"), None);
        assert_eq!(problem.objective.coefficients, vec![0.0, 0.0]);
    }
}
