pub mod banner;
pub mod promotion;

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::schedule::types::UnknownScope;
use crate::schedule::{DayTag, DaySet, ItemId, ScheduledItem, Scope};

pub use banner::{BannerDraft, BannerImage, BannerView};
pub use promotion::{Promotion, PromotionDraft, PromotionView};

/// A stored row that competes for weekday slots within a scope
pub trait Schedulable:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Admin payload used to create or replace a row
    type Draft: DeserializeOwned + Send + 'static;
    /// Read-side shape returned to clients
    type View: Serialize;

    /// Backing table in the managed database
    const TABLE: &'static str;
    /// Column holding the scope key
    const SCOPE_COLUMN: &'static str;
    /// Name used in log lines and error messages
    const KIND: &'static str;

    fn id(&self) -> &ItemId;
    fn scope(&self) -> Scope;
    fn scheduled(&self) -> ScheduledItem;

    fn set_schedule(&mut self, days: DaySet, is_day_scheduled: bool);
    fn set_active(&mut self, active: bool);
    fn set_display_order(&mut self, order: i32);
    fn touch(&mut self, at: DateTime<Utc>);

    /// Extra availability gate applied before day resolution (date windows)
    fn available_at(&self, _at: DateTime<Utc>) -> bool {
        true
    }

    /// Scope a draft will land in, known before the row exists
    fn draft_scope(draft: &Self::Draft) -> Scope;

    fn from_draft(id: ItemId, draft: Self::Draft, now: DateTime<Utc>, next_order: i32) -> Self;
    fn apply_draft(&mut self, draft: Self::Draft, now: DateTime<Utc>);

    fn view(&self, eligible: bool) -> Self::View;
    /// Short name for reports
    fn label(&self) -> String;

    /// Scope that rows with a NULL scope column are read into, if any
    fn null_scope() -> Option<Scope> {
        None
    }

    /// Accepts either the bare column value or the full `kind:value` scope key
    fn parse_scope(raw: &str) -> Result<Scope, UnknownScope>;
    fn all_scopes() -> Vec<Scope>;
}

/// Day scheduling implied by a day list when a draft leaves the flag out
pub fn implied_day_scheduling(days: &DaySet) -> bool {
    !days.is_empty() && !days.contains(&DayTag::Everyday)
}

/// Treats an explicit JSON `null` like a missing column
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Next carousel position after the rows already in a scope
pub fn next_display_order<'a, I>(items: I) -> i32
where
    I: IntoIterator<Item = &'a ScheduledItem>,
{
    items
        .into_iter()
        .map(|item| item.display_order)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
}
