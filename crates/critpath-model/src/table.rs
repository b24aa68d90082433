use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use crate::graph;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate activity: {0}")]
    DuplicateActivity(String),
    #[error("Unknown activity: {0}")]
    UnknownActivity(String),
    #[error("Activity {activity} references unknown predecessor {predecessor}")]
    UnknownPredecessor { activity: String, predecessor: String },
    #[error("Activity {activity} has invalid duration {duration}; durations must be positive")]
    InvalidDuration { activity: String, duration: f64 },
    #[error("Precedence cycle detected: {}", .0.join(" -> "))]
    CyclicPrecedence(Vec<String>),
    #[error("Unknown scenario: {0} (expected best, expected or worst)")]
    UnknownScenario(String),
}

/// A single unit of work with a fixed duration
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub name: String,
    pub duration: f64,
    /// Activities that must end before this one starts
    pub predecessors: Vec<String>,
}

impl Activity {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            predecessors: Vec::new(),
        }
    }

    pub fn with_predecessor(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessors.push(predecessor.into());
        self
    }

    pub fn with_predecessors<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessors.extend(predecessors.into_iter().map(Into::into));
        self
    }
}

/// The activity-duration and precedence tables of one project, in reporting order
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectTable {
    pub name: String,
    activities: Vec<Activity>,
}

impl ProjectTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activities: Vec::new(),
        }
    }

    /// Takes activities as given; call [`ProjectTable::validate`] before trusting them.
    pub fn from_activities(name: impl Into<String>, activities: Vec<Activity>) -> Self {
        Self {
            name: name.into(),
            activities,
        }
    }

    /// Build from a duration table and a precedence table.
    ///
    /// Activity order follows `durations`. Predecessor names are not resolved here.
    pub fn from_tables(
        name: impl Into<String>,
        durations: &[(&str, f64)],
        precedences: &[(&str, &[&str])],
    ) -> Result<Self, ModelError> {
        let mut table = Self::new(name);
        for &(activity, duration) in durations {
            table.add_activity(Activity::new(activity, duration))?;
        }
        for &(activity, predecessors) in precedences {
            for &predecessor in predecessors {
                table.add_predecessor(activity, predecessor)?;
            }
        }
        Ok(table)
    }

    pub fn add_activity(&mut self, activity: Activity) -> Result<(), ModelError> {
        if self.get(&activity.name).is_some() {
            return Err(ModelError::DuplicateActivity(activity.name));
        }
        self.activities.push(activity);
        Ok(())
    }

    /// Require `predecessor` to end before `activity` starts. Adding an existing pair is a no-op.
    pub fn add_predecessor(&mut self, activity: &str, predecessor: &str) -> Result<(), ModelError> {
        let entry = self
            .activities
            .iter_mut()
            .find(|a| a.name == activity)
            .ok_or_else(|| ModelError::UnknownActivity(activity.to_string()))?;
        if !entry.predecessors.iter().any(|p| p == predecessor) {
            entry.predecessors.push(predecessor.to_string());
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.name == name)
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Number of (activity, predecessor) pairs
    pub fn num_precedences(&self) -> usize {
        self.activities.iter().map(|a| a.predecessors.len()).sum()
    }

    /// Check the table can be scheduled: unique names, positive durations,
    /// known predecessors and an acyclic precedence graph.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for activity in &self.activities {
            if !seen.insert(activity.name.as_str()) {
                return Err(ModelError::DuplicateActivity(activity.name.clone()));
            }
            if !activity.duration.is_finite() || activity.duration <= 0.0 {
                return Err(ModelError::InvalidDuration {
                    activity: activity.name.clone(),
                    duration: activity.duration,
                });
            }
        }

        for activity in &self.activities {
            for predecessor in &activity.predecessors {
                if !seen.contains(predecessor.as_str()) {
                    return Err(ModelError::UnknownPredecessor {
                        activity: activity.name.clone(),
                        predecessor: predecessor.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(ModelError::CyclicPrecedence(cycle));
        }

        debug!(
            table = %self.name,
            activities = self.len(),
            precedences = self.num_precedences(),
            "table validated"
        );
        Ok(())
    }

    /// The first precedence cycle found, starting and ending with the same activity.
    /// Unknown predecessors are ignored.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let index: HashMap<&str, usize> = self
            .activities
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.as_str(), i))
            .collect();
        let predecessors: Vec<Vec<usize>> = self
            .activities
            .iter()
            .map(|a| {
                a.predecessors
                    .iter()
                    .filter_map(|p| index.get(p.as_str()).copied())
                    .collect()
            })
            .collect();

        graph::find_cycle(&predecessors).map(|cycle| {
            cycle
                .into_iter()
                .map(|i| self.activities[i].name.clone())
                .collect()
        })
    }
}
