use super::error::{ScheduleConflict, ScheduleError, ScheduleWarning};
use super::types::{DayTag, DaySet, ItemId, Scope, ScheduledItem};

/// Outcome of a successful day assignment check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub days: DaySet,
    pub warnings: Vec<ScheduleWarning>,
}

/// Checks a proposed day assignment against the other items of the same scope.
///
/// Only active, day-scheduled items other than `candidate_id` claim days, so an
/// item may always be re-submitted with (a subset or superset of) its own days.
/// Pure: persisting the result is the caller's job.
pub fn validate_assignment<'a, D, I>(
    scope: Scope,
    candidate_id: &ItemId,
    proposed_days: D,
    existing_items: I,
) -> Result<Validated, ScheduleError>
where
    D: IntoIterator<Item = DayTag>,
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    let days: DaySet = proposed_days.into_iter().collect();

    if days.contains(&DayTag::Everyday) {
        return Err(ScheduleError::EverydayInDaySchedule { scope });
    }

    let mut contested = DaySet::new();
    let mut claimed_by: Vec<ItemId> = Vec::new();
    for item in existing_items {
        if item.id == *candidate_id || !item.is_active || !item.is_day_scheduled {
            continue;
        }
        let overlap: Vec<DayTag> = item.assigned_days.intersection(&days).copied().collect();
        if overlap.is_empty() {
            continue;
        }
        contested.extend(overlap);
        if !claimed_by.contains(&item.id) {
            claimed_by.push(item.id.clone());
        }
    }

    if !contested.is_empty() {
        claimed_by.sort();
        return Err(ScheduleError::Conflict(ScheduleConflict {
            scope,
            days: contested,
            claimed_by,
        }));
    }

    let mut warnings = Vec::new();
    if days.is_empty() {
        warnings.push(ScheduleWarning::EmptyDaySet {
            id: candidate_id.clone(),
        });
    }

    Ok(Validated { days, warnings })
}
