use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{implied_day_scheduling, null_as_default, Schedulable};
use crate::schedule::types::UnknownScope;
use crate::schedule::{BannerPlacement, DaySet, ItemId, ScheduledItem, Scope};

/// Row of the `banner_images` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerImage {
    pub id: ItemId,
    pub banner_id: BannerPlacement,
    pub image_url: String,
    #[serde(default)]
    pub mobile_image_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule_days: DaySet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_day_scheduled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BannerImage {
    /// Image shown for the placement; mobile slots prefer the mobile asset
    pub fn display_url(&self) -> &str {
        if self.banner_id.is_mobile() {
            self.mobile_image_url.as_deref().unwrap_or(&self.image_url)
        } else {
            &self.image_url
        }
    }
}

/// Create/replace payload from the banner admin screen
#[derive(Debug, Clone, Deserialize)]
pub struct BannerDraft {
    pub banner_id: BannerPlacement,
    pub image_url: String,
    #[serde(default)]
    pub mobile_image_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub schedule_days: DaySet,
    #[serde(default)]
    pub is_day_scheduled: Option<bool>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerView {
    pub id: ItemId,
    pub image_url: String,
    pub filename: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub schedule_days: DaySet,
    pub is_day_scheduled: bool,
    pub created_at: DateTime<Utc>,
    pub is_eligible: bool,
}

impl Schedulable for BannerImage {
    type Draft = BannerDraft;
    type View = BannerView;

    const TABLE: &'static str = "banner_images";
    const SCOPE_COLUMN: &'static str = "banner_id";
    const KIND: &'static str = "banner image";

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn scope(&self) -> Scope {
        Scope::Banner(self.banner_id)
    }

    fn scheduled(&self) -> ScheduledItem {
        ScheduledItem {
            id: self.id.clone(),
            assigned_days: self.schedule_days.clone(),
            is_day_scheduled: self.is_day_scheduled,
            is_active: self.is_active,
            display_order: self.display_order,
        }
    }

    fn set_schedule(&mut self, days: DaySet, is_day_scheduled: bool) {
        self.schedule_days = days;
        self.is_day_scheduled = is_day_scheduled;
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

    fn draft_scope(draft: &BannerDraft) -> Scope {
        Scope::Banner(draft.banner_id)
    }

    fn from_draft(id: ItemId, draft: BannerDraft, now: DateTime<Utc>, next_order: i32) -> Self {
        let is_day_scheduled = draft
            .is_day_scheduled
            .unwrap_or_else(|| implied_day_scheduling(&draft.schedule_days));
        BannerImage {
            id,
            banner_id: draft.banner_id,
            image_url: draft.image_url,
            mobile_image_url: draft.mobile_image_url,
            filename: draft.filename,
            display_order: draft.display_order.unwrap_or(next_order),
            is_active: draft.is_active,
            schedule_days: draft.schedule_days,
            is_day_scheduled,
            created_at: now,
            updated_at: Some(now),
        }
    }

    fn apply_draft(&mut self, draft: BannerDraft, now: DateTime<Utc>) {
        self.is_day_scheduled = draft
            .is_day_scheduled
            .unwrap_or_else(|| implied_day_scheduling(&draft.schedule_days));
        self.banner_id = draft.banner_id;
        self.image_url = draft.image_url;
        self.mobile_image_url = draft.mobile_image_url;
        self.filename = draft.filename;
        if let Some(order) = draft.display_order {
            self.display_order = order;
        }
        self.is_active = draft.is_active;
        self.schedule_days = draft.schedule_days;
        self.updated_at = Some(now);
    }

    fn view(&self, eligible: bool) -> BannerView {
        BannerView {
            id: self.id.clone(),
            image_url: self.display_url().to_string(),
            filename: self.filename.clone(),
            display_order: self.display_order,
            is_active: self.is_active,
            schedule_days: self.schedule_days.clone(),
            is_day_scheduled: self.is_day_scheduled,
            created_at: self.created_at,
            is_eligible: eligible,
        }
    }

    fn label(&self) -> String {
        self.filename.clone().unwrap_or_else(|| self.image_url.clone())
    }

    fn parse_scope(raw: &str) -> Result<Scope, UnknownScope> {
        match raw.parse::<Scope>() {
            Ok(scope @ Scope::Banner(_)) => Ok(scope),
            Ok(_) => Err(UnknownScope(raw.to_string())),
            Err(_) => raw.parse::<BannerPlacement>().map(Scope::Banner),
        }
    }

    fn all_scopes() -> Vec<Scope> {
        BannerPlacement::ALL.into_iter().map(Scope::Banner).collect()
    }
}
