use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A weekday tag as stored in the `schedule_days` column, plus the `everyday` sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayTag {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    Everyday,
}

impl DayTag {
    #[cfg(test)]
    pub const WEEK: [DayTag; 7] = [
        DayTag::Monday,
        DayTag::Tuesday,
        DayTag::Wednesday,
        DayTag::Thursday,
        DayTag::Friday,
        DayTag::Saturday,
        DayTag::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayTag::Monday => "monday",
            DayTag::Tuesday => "tuesday",
            DayTag::Wednesday => "wednesday",
            DayTag::Thursday => "thursday",
            DayTag::Friday => "friday",
            DayTag::Saturday => "saturday",
            DayTag::Sunday => "sunday",
            DayTag::Everyday => "everyday",
        }
    }

    /// Capitalized name for administrator-facing text
    pub fn label(&self) -> &'static str {
        match self {
            DayTag::Monday => "Monday",
            DayTag::Tuesday => "Tuesday",
            DayTag::Wednesday => "Wednesday",
            DayTag::Thursday => "Thursday",
            DayTag::Friday => "Friday",
            DayTag::Saturday => "Saturday",
            DayTag::Sunday => "Sunday",
            DayTag::Everyday => "Every day",
        }
    }
}

impl From<chrono::Weekday> for DayTag {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => DayTag::Monday,
            chrono::Weekday::Tue => DayTag::Tuesday,
            chrono::Weekday::Wed => DayTag::Wednesday,
            chrono::Weekday::Thu => DayTag::Thursday,
            chrono::Weekday::Fri => DayTag::Friday,
            chrono::Weekday::Sat => DayTag::Saturday,
            chrono::Weekday::Sun => DayTag::Sunday,
        }
    }
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day tag '{0}'")]
pub struct UnknownDayTag(pub String);

impl FromStr for DayTag {
    type Err = UnknownDayTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Ok(DayTag::Monday),
            "tuesday" => Ok(DayTag::Tuesday),
            "wednesday" => Ok(DayTag::Wednesday),
            "thursday" => Ok(DayTag::Thursday),
            "friday" => Ok(DayTag::Friday),
            "saturday" => Ok(DayTag::Saturday),
            "sunday" => Ok(DayTag::Sunday),
            "everyday" | "every day" => Ok(DayTag::Everyday),
            other => Err(UnknownDayTag(other.to_string())),
        }
    }
}

/// De-duplicated day tags, iterated Monday first and `everyday` last
pub type DaySet = BTreeSet<DayTag>;

/// Opaque identifier of a schedulable row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

/// The scheduling projection of a banner image or promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub id: ItemId,
    pub assigned_days: DaySet,
    pub is_day_scheduled: bool,
    pub is_active: bool,
    pub display_order: i32,
}

/// Banner slot on the player-facing site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BannerPlacement {
    #[serde(rename = "main-web")]
    MainWeb,
    #[serde(rename = "main-mobile")]
    MainMobile,
    #[serde(rename = "promotion-web")]
    PromotionWeb,
    #[serde(rename = "promotion-mobile")]
    PromotionMobile,
}

impl BannerPlacement {
    pub const ALL: [BannerPlacement; 4] = [
        BannerPlacement::MainWeb,
        BannerPlacement::MainMobile,
        BannerPlacement::PromotionWeb,
        BannerPlacement::PromotionMobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BannerPlacement::MainWeb => "main-web",
            BannerPlacement::MainMobile => "main-mobile",
            BannerPlacement::PromotionWeb => "promotion-web",
            BannerPlacement::PromotionMobile => "promotion-mobile",
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, BannerPlacement::MainMobile | BannerPlacement::PromotionMobile)
    }

    /// Only promotional placements rotate one image per weekday
    pub fn rotates_by_day(&self) -> bool {
        matches!(self, BannerPlacement::PromotionWeb | BannerPlacement::PromotionMobile)
    }
}

impl FromStr for BannerPlacement {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BannerPlacement::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| UnknownScope(s.to_string()))
    }
}

/// Promotion pool; at most one day-scheduled promotion per weekday within a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    #[default]
    OnceOff,
    Recurring,
}

impl UsageType {
    pub const ALL: [UsageType; 2] = [UsageType::OnceOff, UsageType::Recurring];

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageType::OnceOff => "once_off",
            UsageType::Recurring => "recurring",
        }
    }
}

impl FromStr for UsageType {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "once_off" => Ok(UsageType::OnceOff),
            "recurring" => Ok(UsageType::Recurring),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope '{0}'")]
pub struct UnknownScope(pub String);

/// Grouping key that schedulable items compete within
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Banner(BannerPlacement),
    Promotion(UsageType),
}

impl Scope {
    /// Value stored in the row's scope column (`banner_id` or `usage_type`)
    pub fn column_value(&self) -> &'static str {
        match self {
            Scope::Banner(placement) => placement.as_str(),
            Scope::Promotion(usage) => usage.as_str(),
        }
    }

    pub fn rotates_by_day(&self) -> bool {
        match self {
            Scope::Banner(placement) => placement.rotates_by_day(),
            Scope::Promotion(_) => true,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Banner(placement) => write!(f, "banner:{}", placement.as_str()),
            Scope::Promotion(usage) => write!(f, "promotion:{}", usage.as_str()),
        }
    }
}

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some(("banner", placement)) => placement.parse().map(Scope::Banner),
            Some(("promotion", usage)) => usage.parse().map(Scope::Promotion),
            _ => Err(UnknownScope(s.to_string())),
        }
    }
}
