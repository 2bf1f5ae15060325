use std::collections::BTreeMap;

use chrono::Weekday;

use super::types::{DayTag, ScheduledItem};

/// Returns the items eligible on `evaluation_day`.
///
/// Active day-scheduled items whose days include the evaluation day come first,
/// followed by active always-eligible items in carousel order. Both groups are
/// sorted by `(display_order, id)` so the caller's ordering never leaks through.
pub fn resolve_active<'a, I>(evaluation_day: Weekday, items: I) -> Vec<&'a ScheduledItem>
where
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    let day = DayTag::from(evaluation_day);

    let (mut day_scheduled, mut always_on): (Vec<&ScheduledItem>, Vec<&ScheduledItem>) = items
        .into_iter()
        .filter(|item| item.is_active)
        .partition(|item| item.is_day_scheduled);

    day_scheduled.retain(|item| item.assigned_days.contains(&day));

    let carousel_order =
        |a: &&ScheduledItem, b: &&ScheduledItem| (a.display_order, &a.id).cmp(&(b.display_order, &b.id));
    day_scheduled.sort_by(carousel_order);
    always_on.sort_by(carousel_order);

    day_scheduled.extend(always_on);
    day_scheduled
}

/// Eligible items for every weekday, Monday first
pub fn week_rotation<'a, I>(items: I) -> BTreeMap<DayTag, Vec<&'a ScheduledItem>>
where
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    let items: Vec<&ScheduledItem> = items.into_iter().collect();
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .map(|day| (DayTag::from(day), resolve_active(day, items.iter().copied())))
    .collect()
}
