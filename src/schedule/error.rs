use std::fmt;

use super::types::{DaySet, ItemId, Scope};

/// Proposed days already claimed by other active, day-scheduled items in the scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConflict {
    pub scope: Scope,
    pub days: DaySet,
    pub claimed_by: Vec<ItemId>,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.days.iter().map(|d| d.label()).collect();
        write!(
            f,
            "{} already assigned to another active item in {}",
            labels.join(", "),
            self.scope
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule conflict: {0}")]
    Conflict(ScheduleConflict),
    #[error("'everyday' cannot be combined with day scheduling in {scope}")]
    EverydayInDaySchedule { scope: Scope },
    #[error("{scope} does not rotate by day")]
    RotationUnsupported { scope: Scope },
}

impl ScheduleError {
    /// Contested days, empty unless this is a conflict
    pub fn conflicting_days(&self) -> DaySet {
        match self {
            ScheduleError::Conflict(conflict) => conflict.days.clone(),
            _ => DaySet::new(),
        }
    }
}

/// Non-blocking findings surfaced to the administrator on save
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    /// Day-scheduled with no days, so the item will never display
    EmptyDaySet { id: ItemId },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::EmptyDaySet { id } => {
                write!(f, "item {id} is day-scheduled with no days and will never display")
            }
        }
    }
}
