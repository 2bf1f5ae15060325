pub mod memory;
pub mod supabase;

use std::fmt;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::items::Schedulable;
use crate::schedule::{join_day_list, ItemId, Scope};

pub use memory::MemoryRepository;
pub use supabase::{SupabaseConfig, SupabaseRepository};

/// Fingerprint of a scope's scheduling state, used as an ETag for writes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeVersion(String);

impl ScopeVersion {
    /// Hashes the scheduling projection of `rows`; row order does not matter
    pub fn of<R: Schedulable>(rows: &[R]) -> Self {
        let mut items: Vec<_> = rows.iter().map(Schedulable::scheduled).collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hasher = Sha256::new();
        for item in &items {
            hasher.update(item.id.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(join_day_list(&item.assigned_days).as_bytes());
            hasher.update([0u8, item.is_day_scheduled as u8, item.is_active as u8]);
            hasher.update(item.display_order.to_be_bytes());
        }
        let digest = hasher.finalize();
        ScopeVersion(hex::encode(&digest[..16]))
    }

    pub fn parse(raw: &str) -> Self {
        ScopeVersion(raw.trim().trim_matches('"').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rows of one scope as fetched for a single request
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    pub scope: Scope,
    pub rows: Vec<R>,
    pub version: ScopeVersion,
}

impl<R: Schedulable> Snapshot<R> {
    pub fn new(scope: Scope, mut rows: Vec<R>) -> Self {
        rows.sort_by_cached_key(|row| {
            let item = row.scheduled();
            (item.display_order, item.id)
        });
        let version = ScopeVersion::of(&rows);
        Self { scope, rows, version }
    }

    pub fn find(&self, id: &ItemId) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to {table} failed: {source}")]
    Http {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{table} responded with {status}: {body}")]
    Status {
        table: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("stale write to {scope}: expected version {expected}, found {actual}")]
    Stale {
        scope: Scope,
        expected: ScopeVersion,
        actual: ScopeVersion,
    },
    #[error("store misconfigured: {0}")]
    Config(String),
}

/// Persistence boundary for schedulable rows
#[async_trait]
pub trait Repository<R: Schedulable>: Send + Sync {
    async fn fetch_scope(&self, scope: Scope) -> Result<Snapshot<R>, StoreError>;

    async fn fetch_all(&self) -> Result<Vec<R>, StoreError>;

    async fn get(&self, id: &ItemId) -> Result<Option<R>, StoreError>;

    /// Inserts or replaces `row`. With `expected`, the write is rejected when the
    /// row's scope no longer matches that version.
    async fn persist(&self, row: R, expected: Option<&ScopeVersion>) -> Result<R, StoreError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::BannerImage;
    use crate::schedule::{BannerPlacement, DayTag, DaySet};
    use chrono::{TimeZone, Utc};

    pub(crate) fn banner(id: &str, days: &[DayTag], active: bool, order: i32) -> BannerImage {
        BannerImage {
            id: ItemId::from(id),
            banner_id: BannerPlacement::PromotionWeb,
            image_url: format!("https://cdn.example/{id}.png"),
            mobile_image_url: None,
            filename: None,
            display_order: order,
            is_active: active,
            schedule_days: days.iter().copied().collect::<DaySet>(),
            is_day_scheduled: !days.is_empty(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn version_ignores_row_order() {
        let a = banner("a", &[DayTag::Monday], true, 0);
        let b = banner("b", &[DayTag::Tuesday], true, 1);
        assert_eq!(
            ScopeVersion::of(&[a.clone(), b.clone()]),
            ScopeVersion::of(&[b, a])
        );
    }

    #[test]
    fn version_tracks_scheduling_changes() {
        let a = banner("a", &[DayTag::Monday], true, 0);
        let mut moved = a.clone();
        moved.schedule_days = DaySet::from([DayTag::Friday]);
        let mut paused = a.clone();
        paused.is_active = false;

        let base = ScopeVersion::of(&[a.clone()]);
        assert_ne!(base, ScopeVersion::of(&[moved]));
        assert_ne!(base, ScopeVersion::of(&[paused]));
        assert_eq!(base.as_str().len(), 32);
    }

    #[test]
    fn parses_quoted_etags() {
        assert_eq!(ScopeVersion::parse("\"abc\"").as_str(), "abc");
    }

    #[test]
    fn snapshot_sorts_by_carousel_order() {
        let rows = vec![
            banner("z", &[], true, 0),
            banner("b", &[], true, 2),
            banner("a", &[], true, 0),
        ];
        let snapshot = Snapshot::new(Scope::Banner(BannerPlacement::PromotionWeb), rows);
        let ids: Vec<&str> = snapshot.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z", "b"]);
        assert!(snapshot.find(&ItemId::from("b")).is_some());
    }
}
