use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Per-key result of a bulk action over a table selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    /// `(key, error message)`; the row was rolled back.
    pub failed: Vec<(String, String)>,
    /// Selected rows the action does not apply to.
    pub skipped: Vec<String>,
}

impl BulkOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
