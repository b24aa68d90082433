mod problem;
mod simplex;
mod solution;

pub use problem::{Constraint, ConstraintOp, LpProblem, Objective};
pub use simplex::Solver;
pub use solution::{Analysis, ConstraintSlack, ConstraintViolation, Solution, SolutionStatus};
