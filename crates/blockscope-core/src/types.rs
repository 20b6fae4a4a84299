//! Shared presentation-facing types

use serde::Serialize;

/// What a list consumer should show for its current contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListDisplayState {
    /// No scan has been delivered yet
    #[default]
    Loading,
    /// A scan was delivered and nothing survived it
    Empty,
    /// At least one record is listed
    Populated,
}

impl ListDisplayState {
    pub fn for_len(len: usize) -> Self {
        if len == 0 {
            Self::Empty
        } else {
            Self::Populated
        }
    }

    /// True for the "no data" state (as opposed to "not loaded yet").
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
