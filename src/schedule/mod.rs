pub mod types;
pub mod days;
pub mod error;
pub mod validate;
pub mod resolve;

pub use types::{BannerPlacement, DayTag, DaySet, ItemId, ScheduledItem, Scope, UsageType};
pub use days::{format_schedule, join_day_list, parse_day_list, BusinessCalendar};
pub use error::{ScheduleConflict, ScheduleError, ScheduleWarning};
pub use validate::validate_assignment;
pub use resolve::{resolve_active, week_rotation};
