pub mod builder;
mod graph;
pub mod scenario;
pub mod schedule;
pub mod table;

pub use builder::{build_model, end_variable, solve_table, start_variable, ScheduleModel};
pub use scenario::Scenario;
pub use schedule::{ActivityTimes, PrecedenceLink, Schedule, ScheduleOutcome, VariableValue, TIME_TOLERANCE};
pub use table::{Activity, ModelError, ProjectTable};
