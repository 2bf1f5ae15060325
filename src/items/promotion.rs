use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{implied_day_scheduling, null_as_default, Schedulable};
use crate::schedule::types::UnknownScope;
use crate::schedule::{format_schedule, DaySet, ItemId, ScheduledItem, Scope, UsageType};

/// Row of the `promotions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub promotion_type: Option<String>,
    #[serde(default)]
    pub bonus_percent: Option<f64>,
    #[serde(default)]
    pub min_deposit_amount: Option<f64>,
    #[serde(default)]
    pub max_deposit_amount: Option<f64>,
    #[serde(default)]
    pub wagering_requirement: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_type: UsageType,
    #[serde(default = "default_daily_limit")]
    pub daily_usage_limit: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule_days: DaySet,
    /// Stored rows often leave this out; see [`Promotion::day_scheduled`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_day_scheduled: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_daily_limit() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

impl Promotion {
    /// Explicit flag when the row carries one, otherwise implied by the day list
    pub fn day_scheduled(&self) -> bool {
        self.is_day_scheduled
            .unwrap_or_else(|| implied_day_scheduling(&self.schedule_days))
    }

    /// Whether `at` falls inside the promotion's date range (open ends allowed)
    pub fn in_window(&self, at: DateTime<Utc>) -> bool {
        self.start_at.map_or(true, |start| start <= at) && self.end_at.map_or(true, |end| at <= end)
    }
}

/// Create/replace payload from the promotions admin screen
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub promotion_type: Option<String>,
    #[serde(default)]
    pub bonus_percent: Option<f64>,
    #[serde(default)]
    pub min_deposit_amount: Option<f64>,
    #[serde(default)]
    pub max_deposit_amount: Option<f64>,
    #[serde(default)]
    pub wagering_requirement: Option<f64>,
    #[serde(default)]
    pub usage_type: UsageType,
    #[serde(default)]
    pub daily_usage_limit: Option<i32>,
    #[serde(default)]
    pub schedule_days: DaySet,
    #[serde(default)]
    pub is_day_scheduled: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionView {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub promotion_type: Option<String>,
    pub bonus_percent: Option<f64>,
    pub min_deposit_amount: Option<f64>,
    pub max_deposit_amount: Option<f64>,
    pub wagering_requirement: Option<f64>,
    pub usage_type: UsageType,
    pub daily_usage_limit: i32,
    pub schedule_days: DaySet,
    pub is_day_scheduled: bool,
    pub schedule_label: String,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_eligible: bool,
}

impl Schedulable for Promotion {
    type Draft = PromotionDraft;
    type View = PromotionView;

    const TABLE: &'static str = "promotions";
    const SCOPE_COLUMN: &'static str = "usage_type";
    const KIND: &'static str = "promotion";

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn scope(&self) -> Scope {
        Scope::Promotion(self.usage_type)
    }

    fn scheduled(&self) -> ScheduledItem {
        ScheduledItem {
            id: self.id.clone(),
            assigned_days: self.schedule_days.clone(),
            is_day_scheduled: self.day_scheduled(),
            is_active: self.is_active,
            display_order: self.display_order,
        }
    }

    fn set_schedule(&mut self, days: DaySet, is_day_scheduled: bool) {
        self.schedule_days = days;
        self.is_day_scheduled = Some(is_day_scheduled);
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn set_display_order(&mut self, order: i32) {
        self.display_order = order;
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn available_at(&self, at: DateTime<Utc>) -> bool {
        self.in_window(at)
    }

    fn draft_scope(draft: &PromotionDraft) -> Scope {
        Scope::Promotion(draft.usage_type)
    }

    fn from_draft(id: ItemId, draft: PromotionDraft, now: DateTime<Utc>, next_order: i32) -> Self {
        let mut promotion = Promotion {
            id,
            name: String::new(),
            description: None,
            promotion_type: None,
            bonus_percent: None,
            min_deposit_amount: None,
            max_deposit_amount: None,
            wagering_requirement: None,
            usage_type: draft.usage_type,
            daily_usage_limit: default_daily_limit(),
            schedule_days: DaySet::new(),
            is_day_scheduled: None,
            display_order: next_order,
            start_at: None,
            end_at: None,
            is_active: draft.is_active,
            created_at: now,
            updated_at: None,
        };
        promotion.apply_draft(draft, now);
        promotion
    }

    fn apply_draft(&mut self, draft: PromotionDraft, now: DateTime<Utc>) {
        self.is_day_scheduled = Some(
            draft
                .is_day_scheduled
                .unwrap_or_else(|| implied_day_scheduling(&draft.schedule_days)),
        );
        self.name = draft.name;
        self.description = draft.description;
        self.promotion_type = draft.promotion_type;
        self.bonus_percent = draft.bonus_percent;
        self.min_deposit_amount = draft.min_deposit_amount;
        self.max_deposit_amount = draft.max_deposit_amount;
        self.wagering_requirement = draft.wagering_requirement;
        self.usage_type = draft.usage_type;
        self.daily_usage_limit = draft.daily_usage_limit.unwrap_or(self.daily_usage_limit);
        self.schedule_days = draft.schedule_days;
        if let Some(order) = draft.display_order {
            self.display_order = order;
        }
        self.start_at = draft.start_at;
        self.end_at = draft.end_at;
        self.is_active = draft.is_active;
        self.updated_at = Some(now);
    }

    fn view(&self, eligible: bool) -> PromotionView {
        PromotionView {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            promotion_type: self.promotion_type.clone(),
            bonus_percent: self.bonus_percent,
            min_deposit_amount: self.min_deposit_amount,
            max_deposit_amount: self.max_deposit_amount,
            wagering_requirement: self.wagering_requirement,
            usage_type: self.usage_type,
            daily_usage_limit: self.daily_usage_limit,
            schedule_days: self.schedule_days.clone(),
            is_day_scheduled: self.day_scheduled(),
            schedule_label: format_schedule(&self.schedule_days, self.day_scheduled()),
            start_at: self.start_at,
            end_at: self.end_at,
            is_active: self.is_active,
            is_eligible: eligible,
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn parse_scope(raw: &str) -> Result<Scope, UnknownScope> {
        match raw.parse::<Scope>() {
            Ok(scope @ Scope::Promotion(_)) => Ok(scope),
            Ok(_) => Err(UnknownScope(raw.to_string())),
            Err(_) => raw.parse::<UsageType>().map(Scope::Promotion),
        }
    }

    fn null_scope() -> Option<Scope> {
        Some(Scope::Promotion(UsageType::default()))
    }

    fn all_scopes() -> Vec<Scope> {
        UsageType::ALL.into_iter().map(Scope::Promotion).collect()
    }
}
