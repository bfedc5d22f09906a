use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::data::Section;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SetupStep {
    Welcome,
    Database,
    Admin,
    Site,
    Installing,
    Complete,
}

impl SetupStep {
    pub const ALL: [Self; 6] = [
        Self::Welcome,
        Self::Database,
        Self::Admin,
        Self::Site,
        Self::Installing,
        Self::Complete,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).map(|idx| Self::ALL[idx])
    }

    /// The section of the draft this step collects, if any.
    pub fn section(self) -> Option<Section> {
        match self {
            Self::Database => Some(Section::Database),
            Self::Admin => Some(Section::Admin),
            Self::Site => Some(Section::Site),
            Self::Welcome | Self::Installing | Self::Complete => None,
        }
    }

    /// Steps where the operator can still edit and move around.
    pub fn accepts_input(self) -> bool {
        !matches!(self, Self::Installing | Self::Complete)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Database => "Database Connection",
            Self::Admin => "Administrator Account",
            Self::Site => "Site Details",
            Self::Installing => "Installing",
            Self::Complete => "Complete",
        }
    }
}
