use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical name of one managed chart on the dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChartSlot {
    #[serde(rename = "fillChart")]
    Fill,
    #[serde(rename = "timeChart")]
    Time,
    #[serde(rename = "derivChart")]
    Derivative,
}

impl ChartSlot {
    pub const ALL: [Self; 3] = [Self::Fill, Self::Time, Self::Derivative];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fillChart",
            Self::Time => "timeChart",
            Self::Derivative => "derivChart",
        }
    }
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
