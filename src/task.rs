//! Task classes and measurement scopes.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// Class of an arriving task. Class1 has priority over Class2 under the threshold controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskClass {
    Class1,
    Class2,
}

impl TaskClass {
    pub const ALL: [TaskClass; 2] = [TaskClass::Class1, TaskClass::Class2];

    pub fn index(self) -> usize {
        match self {
            TaskClass::Class1 => 0,
            TaskClass::Class2 => 1,
        }
    }
}

impl Display for TaskClass {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            TaskClass::Class1 => write!(f, "class_1"),
            TaskClass::Class2 => write!(f, "class_2"),
        }
    }
}

/// Part of the two-tier system a measurement refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    System,
    Cloudlet,
    Cloud,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::System, Scope::Cloudlet, Scope::Cloud];
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Scope::System => write!(f, "system"),
            Scope::Cloudlet => write!(f, "cloudlet"),
            Scope::Cloud => write!(f, "cloud"),
        }
    }
}

/// Class dimension of the metrics table: a single task class or both of them together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricClass {
    Class1,
    Class2,
    Global,
}

impl MetricClass {
    pub const ALL: [MetricClass; 3] = [MetricClass::Class1, MetricClass::Class2, MetricClass::Global];

    /// Task classes aggregated under this metric class.
    pub fn classes(self) -> &'static [TaskClass] {
        match self {
            MetricClass::Class1 => &[TaskClass::Class1],
            MetricClass::Class2 => &[TaskClass::Class2],
            MetricClass::Global => &TaskClass::ALL,
        }
    }
}

impl From<TaskClass> for MetricClass {
    fn from(class: TaskClass) -> Self {
        match class {
            TaskClass::Class1 => MetricClass::Class1,
            TaskClass::Class2 => MetricClass::Class2,
        }
    }
}

impl Display for MetricClass {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            MetricClass::Class1 => write!(f, "class_1"),
            MetricClass::Class2 => write!(f, "class_2"),
            MetricClass::Global => write!(f, "global"),
        }
    }
}
