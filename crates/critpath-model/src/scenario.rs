//! Built-in project: the software product launch from Williams (2013),
//! *Model Building in Mathematical Programming*, pp. 94-98.

use std::fmt;
use std::str::FromStr;

use crate::table::{Activity, ModelError, ProjectTable};

/// Which column of duration estimates to use
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    #[default]
    Best,
    Expected,
    Worst,
}

/// name, [best, expected, worst] duration in days, predecessors
const ACTIVITIES: &[(&str, [f64; 3], &[&str])] = &[
    ("A_DescribeProduct", [2.0, 4.0, 6.0], &[]),
    ("B_Marketing", [4.0, 8.0, 12.0], &[]),
    ("C_Brochure", [8.0, 16.0, 24.0], &["A_DescribeProduct"]),
    ("D1_Requirements", [8.0, 16.0, 24.0], &["A_DescribeProduct"]),
    ("D2_SoftwareDesign", [8.0, 16.0, 24.0], &["D1_Requirements"]),
    ("D3_SystemDesign", [8.0, 16.0, 24.0], &["D1_Requirements"]),
    ("D4_Coding", [160.0, 320.0, 480.0], &["D2_SoftwareDesign", "D3_SystemDesign"]),
    ("D5_Documentation", [16.0, 32.0, 48.0], &["D4_Coding"]),
    ("D6_UnitTesting", [20.0, 40.0, 60.0], &["D4_Coding"]),
    ("D7_SystemTesting", [20.0, 40.0, 60.0], &["D6_UnitTesting"]),
    ("D8_Package", [12.0, 24.0, 36.0], &["D5_Documentation", "D7_SystemTesting"]),
    ("E_Survey", [20.0, 40.0, 60.0], &["B_Marketing", "C_Brochure"]),
    ("F_Pricing", [10.0, 20.0, 30.0], &["D8_Package", "E_Survey"]),
    ("G_Implementation", [40.0, 80.0, 120.0], &["A_DescribeProduct", "D8_Package"]),
    ("H_Proposal", [40.0, 80.0, 160.0], &["F_Pricing", "G_Implementation"]),
];

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Best, Scenario::Expected, Scenario::Worst];

    fn column(self) -> usize {
        match self {
            Scenario::Best => 0,
            Scenario::Expected => 1,
            Scenario::Worst => 2,
        }
    }

    /// The launch project with this scenario's durations
    pub fn table(self) -> ProjectTable {
        let activities = ACTIVITIES
            .iter()
            .map(|(name, durations, predecessors)| {
                Activity::new(*name, durations[self.column()]).with_predecessors(predecessors.iter().copied())
            })
            .collect();
        ProjectTable::from_activities("Software product launch", activities)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Scenario::Best => "best",
            Scenario::Expected => "expected",
            Scenario::Worst => "worst",
        };
        f.write_str(label)
    }
}

impl FromStr for Scenario {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(Scenario::Best),
            "expected" => Ok(Scenario::Expected),
            "worst" => Ok(Scenario::Worst),
            _ => Err(ModelError::UnknownScenario(s.to_string())),
        }
    }
}
