use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::items::{implied_day_scheduling, next_display_order, Schedulable};
use crate::schedule::{
    resolve_active, validate_assignment, week_rotation, BusinessCalendar, DayTag, DaySet, ItemId,
    ScheduleError, ScheduleWarning, ScheduledItem, Scope,
};
use crate::store::{Repository, ScopeVersion, Snapshot, StoreError};

const LOG_TARGET: &str = "service::rotation";

/// Source of the current instant; swapped for a fixed clock in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: ItemId },
}

/// A persisted row together with the non-blocking findings from its validation
#[derive(Debug, Clone)]
pub struct Saved<R> {
    pub row: R,
    pub warnings: Vec<ScheduleWarning>,
}

/// Every row of a scope with its eligibility at the listing instant
#[derive(Debug, Clone)]
pub struct Listing<R> {
    pub scope: Scope,
    pub version: ScopeVersion,
    pub rows: Vec<(R, bool)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Scheduling view of a row as its scope sees it: placements that do not
/// rotate treat every image as always eligible.
fn projection<R: Schedulable>(row: &R) -> ScheduledItem {
    let mut item = row.scheduled();
    if !row.scope().rotates_by_day() {
        item.is_day_scheduled = false;
    }
    item
}

/// Checks `candidate` against the rest of its scope before it is written
fn admit<R: Schedulable>(
    candidate: &R,
    snapshot: &Snapshot<R>,
) -> Result<Vec<ScheduleWarning>, ScheduleError> {
    let scope = candidate.scope();
    let item = candidate.scheduled();
    if !item.is_day_scheduled {
        return Ok(Vec::new());
    }
    if !scope.rotates_by_day() {
        return Err(ScheduleError::RotationUnsupported { scope });
    }

    // Inactive rows claim nothing, so they only get the shape checks
    let existing: Vec<ScheduledItem> = if item.is_active {
        snapshot.rows.iter().map(projection).collect()
    } else {
        Vec::new()
    };
    let validated = validate_assignment(scope, &item.id, item.assigned_days.iter().copied(), &existing)?;
    Ok(validated.warnings)
}

/// Administrative write path and read-side resolution for one kind of row
pub struct RotationService<R> {
    repo: Arc<dyn Repository<R>>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl<R: Schedulable> RotationService<R> {
    pub fn new(repo: Arc<dyn Repository<R>>, clock: Arc<dyn Clock>, calendar: BusinessCalendar) -> Self {
        Self {
            repo,
            clock,
            calendar,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn snapshot(&self, scope: Scope) -> Result<Snapshot<R>, ServiceError> {
        Ok(self.repo.fetch_scope(scope).await?)
    }

    /// Rows from `rows` eligible at `at`, in display order
    pub fn eligible_in(&self, rows: &[R], at: DateTime<Utc>) -> Vec<R> {
        let day = self.calendar.weekday_at(at);
        let available: Vec<&R> = rows.iter().filter(|row| row.available_at(at)).collect();
        let projected: Vec<ScheduledItem> = available.iter().map(|row| projection(*row)).collect();

        resolve_active(day, &projected)
            .into_iter()
            .filter_map(|item| available.iter().find(|row| *row.id() == item.id))
            .map(|row| (*row).clone())
            .collect()
    }

    pub async fn eligible(&self, scope: Scope, at: DateTime<Utc>) -> Result<Vec<R>, ServiceError> {
        let snapshot = self.repo.fetch_scope(scope).await?;
        Ok(self.eligible_in(&snapshot.rows, at))
    }

    /// Eligible rows for every scope of this kind, from a single fetch
    pub async fn eligible_all(&self, at: DateTime<Utc>) -> Result<BTreeMap<Scope, Vec<R>>, ServiceError> {
        let rows = self.repo.fetch_all().await?;
        Ok(R::all_scopes()
            .into_iter()
            .map(|scope| {
                let in_scope: Vec<R> = rows.iter().filter(|r| r.scope() == scope).cloned().collect();
                (scope, self.eligible_in(&in_scope, at))
            })
            .collect())
    }

    pub async fn listing(&self, scope: Scope) -> Result<Listing<R>, ServiceError> {
        let snapshot = self.repo.fetch_scope(scope).await?;
        let eligible: HashSet<ItemId> = self
            .eligible_in(&snapshot.rows, self.now())
            .into_iter()
            .map(|row| row.id().clone())
            .collect();
        let rows = snapshot
            .rows
            .into_iter()
            .map(|row| {
                let is_eligible = eligible.contains(row.id());
                (row, is_eligible)
            })
            .collect();
        Ok(Listing {
            scope,
            version: snapshot.version,
            rows,
        })
    }

    /// Day-by-day rotation of a scope, ignoring date windows
    pub async fn week(&self, scope: Scope) -> Result<BTreeMap<DayTag, Vec<R>>, ServiceError> {
        let snapshot = self.repo.fetch_scope(scope).await?;
        let projected: Vec<ScheduledItem> = snapshot.rows.iter().map(projection).collect();
        Ok(week_rotation(&projected)
            .into_iter()
            .map(|(day, items)| {
                let rows = items
                    .into_iter()
                    .filter_map(|item| snapshot.find(&item.id).cloned())
                    .collect();
                (day, rows)
            })
            .collect())
    }

    async fn load(&self, id: &ItemId) -> Result<R, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::NotFound {
            kind: R::KIND,
            id: id.clone(),
        })
    }

    /// Validates `row` against a fresh snapshot of its scope and writes it
    async fn commit(&self, mut row: R, if_match: Option<&ScopeVersion>) -> Result<Saved<R>, ServiceError> {
        let scope = row.scope();
        let snapshot = self.repo.fetch_scope(scope).await?;
        if let Some(expected) = if_match {
            if *expected != snapshot.version {
                return Err(StoreError::Stale {
                    scope,
                    expected: expected.clone(),
                    actual: snapshot.version,
                }
                .into());
            }
        }

        let warnings = match admit(&row, &snapshot) {
            Ok(warnings) => warnings,
            Err(err) => {
                info!(
                    target = LOG_TARGET,
                    kind = R::KIND,
                    id = %row.id(),
                    %scope,
                    error = %err,
                    "rejected schedule change"
                );
                return Err(err.into());
            }
        };

        row.touch(self.now());
        let row = self.repo.persist(row, Some(&snapshot.version)).await?;
        for warning in &warnings {
            warn!(target = LOG_TARGET, kind = R::KIND, %scope, %warning, "saved with warning");
        }
        info!(target = LOG_TARGET, kind = R::KIND, id = %row.id(), %scope, "saved");
        Ok(Saved { row, warnings })
    }

    pub async fn create(&self, draft: R::Draft) -> Result<Saved<R>, ServiceError> {
        let snapshot = self.repo.fetch_scope(R::draft_scope(&draft)).await?;
        let existing: Vec<ScheduledItem> = snapshot.rows.iter().map(Schedulable::scheduled).collect();
        let id = ItemId(uuid::Uuid::new_v4().to_string());
        let row = R::from_draft(id, draft, self.now(), next_display_order(&existing));
        self.commit(row, None).await
    }

    /// Writes a fully formed row (e.g. a CSV seed) through the same checks as admin edits
    pub async fn import(&self, row: R) -> Result<Saved<R>, ServiceError> {
        self.commit(row, None).await
    }

    pub async fn update(
        &self,
        id: &ItemId,
        draft: R::Draft,
        if_match: Option<&ScopeVersion>,
    ) -> Result<Saved<R>, ServiceError> {
        let mut row = self.load(id).await?;
        row.apply_draft(draft, self.now());
        self.commit(row, if_match).await
    }

    /// Replaces a row's days; without an explicit flag, weekdays imply day scheduling
    pub async fn set_schedule(
        &self,
        id: &ItemId,
        days: DaySet,
        is_day_scheduled: Option<bool>,
        if_match: Option<&ScopeVersion>,
    ) -> Result<Saved<R>, ServiceError> {
        let mut row = self.load(id).await?;
        let flag = is_day_scheduled.unwrap_or_else(|| implied_day_scheduling(&days));
        row.set_schedule(days, flag);
        self.commit(row, if_match).await
    }

    /// Switching a row on re-checks its days, since inactive rows may hold clashing days
    pub async fn set_active(
        &self,
        id: &ItemId,
        active: bool,
        if_match: Option<&ScopeVersion>,
    ) -> Result<Saved<R>, ServiceError> {
        let mut row = self.load(id).await?;
        row.set_active(active);
        self.commit(row, if_match).await
    }

    /// Moves a row one carousel position and renumbers the scope 0..n
    pub async fn move_item(&self, id: &ItemId, direction: Direction) -> Result<Vec<R>, ServiceError> {
        let row = self.load(id).await?;
        let snapshot = self.repo.fetch_scope(row.scope()).await?;
        let mut rows = snapshot.rows;

        let Some(index) = rows.iter().position(|r| r.id() == id) else {
            return Err(ServiceError::NotFound {
                kind: R::KIND,
                id: id.clone(),
            });
        };
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&t| t < rows.len()),
        };
        if let Some(target) = target {
            rows.swap(index, target);
        }

        let now = self.now();
        let mut expected = snapshot.version;
        for position in 0..rows.len() {
            let order = position as i32;
            if rows[position].scheduled().display_order == order {
                continue;
            }
            rows[position].set_display_order(order);
            rows[position].touch(now);
            rows[position] = self.repo.persist(rows[position].clone(), Some(&expected)).await?;
            // Each write must find the scope exactly as the previous one left it
            expected = ScopeVersion::of(&rows);
        }
        info!(target = LOG_TARGET, kind = R::KIND, %id, ?direction, "moved");
        Ok(rows)
    }

    pub async fn delete(&self, id: &ItemId) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound {
                kind: R::KIND,
                id: id.clone(),
            });
        }
        info!(target = LOG_TARGET, kind = R::KIND, %id, "deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{BannerDraft, BannerImage, Promotion, PromotionDraft};
    use crate::schedule::{BannerPlacement, UsageType};
    use crate::store::MemoryRepository;
    use chrono::TimeZone;

    // Monday 12 October 2026, 10:00 UTC
    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 12, 10, 0, 0).unwrap()
    }

    fn banner_service() -> RotationService<BannerImage> {
        RotationService::new(
            Arc::new(MemoryRepository::<BannerImage>::new()),
            Arc::new(FixedClock(monday())),
            BusinessCalendar::utc(),
        )
    }

    fn banner_draft(placement: BannerPlacement, days: &[DayTag]) -> BannerDraft {
        serde_json::from_value(serde_json::json!({
            "banner_id": placement,
            "image_url": "https://cdn.example/banner.png",
            "schedule_days": days,
        }))
        .unwrap()
    }

    fn promo_draft(name: &str, usage: UsageType, days: &[DayTag]) -> PromotionDraft {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "usage_type": usage,
            "schedule_days": days,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn resolves_the_monday_rotation() {
        let service = banner_service();
        let a = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Monday, DayTag::Wednesday]))
            .await
            .unwrap()
            .row;
        service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Tuesday]))
            .await
            .unwrap();
        let c = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Everyday]))
            .await
            .unwrap()
            .row;
        assert!(!c.is_day_scheduled);

        let scope = Scope::Banner(BannerPlacement::PromotionWeb);
        let today: Vec<ItemId> = service
            .eligible(scope, monday())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(today, vec![a.id.clone(), c.id.clone()]);

        let friday = Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap();
        let friday_rows = service.eligible(scope, friday).await.unwrap();
        assert_eq!(friday_rows.len(), 1);
        assert_eq!(friday_rows[0].id, c.id);
    }

    #[tokio::test]
    async fn conflicting_create_is_blocked_and_not_persisted() {
        let service = banner_service();
        service
            .create(banner_draft(BannerPlacement::PromotionMobile, &[DayTag::Monday]))
            .await
            .unwrap();

        let err = service
            .create(banner_draft(BannerPlacement::PromotionMobile, &[DayTag::Monday, DayTag::Tuesday]))
            .await
            .unwrap_err();
        match err {
            ServiceError::Schedule(err) => {
                assert_eq!(err.conflicting_days(), DaySet::from([DayTag::Monday]))
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        let snapshot = service
            .snapshot(Scope::Banner(BannerPlacement::PromotionMobile))
            .await
            .unwrap();
        assert_eq!(snapshot.rows.len(), 1);
    }

    #[tokio::test]
    async fn same_days_in_another_placement_do_not_clash() {
        let service = banner_service();
        service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Monday]))
            .await
            .unwrap();
        service
            .create(banner_draft(BannerPlacement::PromotionMobile, &[DayTag::Monday]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reassigning_own_days_is_accepted() {
        let service = banner_service();
        let a = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Monday, DayTag::Friday]))
            .await
            .unwrap()
            .row;
        let saved = service
            .set_schedule(&a.id, DaySet::from([DayTag::Friday]), None, None)
            .await
            .unwrap();
        assert_eq!(saved.row.schedule_days, DaySet::from([DayTag::Friday]));
        assert!(saved.warnings.is_empty());
    }

    #[tokio::test]
    async fn activation_rechecks_days() {
        let service = banner_service();
        let a = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Sunday]))
            .await
            .unwrap()
            .row;
        service.set_active(&a.id, false, None).await.unwrap();

        // With A paused, Sunday is free for B
        service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Sunday]))
            .await
            .unwrap();

        let err = service.set_active(&a.id, true, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Schedule(ScheduleError::Conflict(_))));
    }

    #[tokio::test]
    async fn main_placements_reject_day_scheduling() {
        let service = banner_service();
        let err = service
            .create(banner_draft(BannerPlacement::MainWeb, &[DayTag::Monday]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Schedule(ScheduleError::RotationUnsupported { .. })
        ));

        // Without day scheduling the main carousel accepts anything
        service
            .create(banner_draft(BannerPlacement::MainWeb, &[]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_day_schedule_saves_with_warning() {
        let service = banner_service();
        let a = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Monday]))
            .await
            .unwrap()
            .row;
        let saved = service
            .set_schedule(&a.id, DaySet::new(), Some(true), None)
            .await
            .unwrap();
        assert_eq!(
            saved.warnings,
            vec![ScheduleWarning::EmptyDaySet { id: a.id.clone() }]
        );
        assert!(service
            .eligible(Scope::Banner(BannerPlacement::PromotionWeb), monday())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn stale_if_match_is_rejected() {
        let service = banner_service();
        let scope = Scope::Banner(BannerPlacement::PromotionWeb);
        let a = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Monday]))
            .await
            .unwrap()
            .row;
        let seen = service.snapshot(scope).await.unwrap().version;

        service
            .set_schedule(&a.id, DaySet::from([DayTag::Tuesday]), None, Some(&seen))
            .await
            .unwrap();
        let err = service
            .set_schedule(&a.id, DaySet::from([DayTag::Wednesday]), None, Some(&seen))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Stale { .. })));
    }

    #[tokio::test]
    async fn moves_renumber_the_carousel() {
        let service = banner_service();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(
                service
                    .create(banner_draft(BannerPlacement::MainMobile, &[]))
                    .await
                    .unwrap()
                    .row
                    .id,
            );
        }

        let rows = service.move_item(&ids[2], Direction::Up).await.unwrap();
        let order: Vec<&ItemId> = rows.iter().map(|r| &r.id).collect();
        assert_eq!(order, vec![&ids[0], &ids[2], &ids[1]]);

        // Moving the first row up is a no-op
        let rows = service.move_item(&ids[0], Direction::Up).await.unwrap();
        assert_eq!(rows[0].id, ids[0]);
        assert_eq!(rows.iter().map(|r| r.display_order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    /// Memory store that lands one extra write right after the first persist
    struct Interleaved {
        inner: MemoryRepository<BannerImage>,
        pending: parking_lot::Mutex<Option<BannerImage>>,
    }

    #[async_trait::async_trait]
    impl Repository<BannerImage> for Interleaved {
        async fn fetch_scope(&self, scope: Scope) -> Result<Snapshot<BannerImage>, StoreError> {
            self.inner.fetch_scope(scope).await
        }

        async fn fetch_all(&self) -> Result<Vec<BannerImage>, StoreError> {
            self.inner.fetch_all().await
        }

        async fn get(&self, id: &ItemId) -> Result<Option<BannerImage>, StoreError> {
            self.inner.get(id).await
        }

        async fn persist(
            &self,
            row: BannerImage,
            expected: Option<&ScopeVersion>,
        ) -> Result<BannerImage, StoreError> {
            let stored = self.inner.persist(row, expected).await?;
            let pending = self.pending.lock().take();
            if let Some(other) = pending {
                self.inner.persist(other, None).await?;
            }
            Ok(stored)
        }

        async fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn move_does_not_overwrite_a_concurrent_change() {
        let seed = |id: &str, order: i32| {
            BannerImage::from_draft(
                ItemId::from(id),
                banner_draft(BannerPlacement::MainWeb, &[]),
                monday(),
                order,
            )
        };
        let mut paused = seed("x1", 1);
        paused.is_active = false;

        let repo = Arc::new(Interleaved {
            inner: MemoryRepository::with_rows(vec![seed("x0", 0), seed("x1", 1), seed("x2", 2)]),
            pending: parking_lot::Mutex::new(Some(paused)),
        });
        let service: RotationService<BannerImage> =
            RotationService::new(repo.clone(), Arc::new(FixedClock(monday())), BusinessCalendar::utc());

        let err = service.move_item(&ItemId::from("x2"), Direction::Up).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Stale { .. })));

        let x1 = repo.inner.get(&ItemId::from("x1")).await.unwrap().unwrap();
        assert!(!x1.is_active);
    }

    #[tokio::test]
    async fn imported_rows_keep_their_ids_and_are_checked() {
        let service = banner_service();
        let now = monday();
        let mut seed = BannerImage::from_draft(
            ItemId::from("seed-1"),
            banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Thursday]),
            now,
            0,
        );
        service.import(seed.clone()).await.unwrap();

        seed.id = ItemId::from("seed-2");
        let err = service.import(seed).await.unwrap_err();
        assert!(matches!(err, ServiceError::Schedule(ScheduleError::Conflict(_))));

        let snapshot = service
            .snapshot(Scope::Banner(BannerPlacement::PromotionWeb))
            .await
            .unwrap();
        assert!(snapshot.find(&ItemId::from("seed-1")).is_some());
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let service = banner_service();
        let err = service.delete(&ItemId::from("missing")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn promotion_pools_are_independent_and_windowed() {
        let service: RotationService<Promotion> = RotationService::new(
            Arc::new(MemoryRepository::<Promotion>::new()),
            Arc::new(FixedClock(monday())),
            BusinessCalendar::utc(),
        );
        service
            .create(promo_draft("Monday reload", UsageType::Recurring, &[DayTag::Monday]))
            .await
            .unwrap();
        service
            .create(promo_draft("Monday sign-up", UsageType::OnceOff, &[DayTag::Monday]))
            .await
            .unwrap();
        let err = service
            .create(promo_draft("Second reload", UsageType::Recurring, &[DayTag::Monday]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Schedule(ScheduleError::Conflict(_))));

        let mut expired = promo_draft("Old welcome", UsageType::OnceOff, &[DayTag::Everyday]);
        expired.end_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        service.create(expired).await.unwrap();

        let all = service.eligible_all(monday()).await.unwrap();
        let names = |scope: Scope| -> Vec<String> { all[&scope].iter().map(|p| p.name.clone()).collect() };
        assert_eq!(names(Scope::Promotion(UsageType::Recurring)), vec!["Monday reload"]);
        assert_eq!(names(Scope::Promotion(UsageType::OnceOff)), vec!["Monday sign-up"]);
    }

    fn stored_sunday_promotion(id: &str) -> Promotion {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Sunday reload",
            "usage_type": "recurring",
            "schedule_days": ["sunday"],
            "is_active": true,
            "created_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn stored_promotions_without_a_flag_keep_their_days() {
        let service: RotationService<Promotion> = RotationService::new(
            Arc::new(MemoryRepository::with_rows(vec![stored_sunday_promotion("p1")])),
            Arc::new(FixedClock(monday())),
            BusinessCalendar::utc(),
        );
        let scope = Scope::Promotion(UsageType::Recurring);
        assert!(service.eligible(scope, monday()).await.unwrap().is_empty());

        let sunday = Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap();
        assert_eq!(service.eligible(scope, sunday).await.unwrap().len(), 1);

        let err = service.import(stored_sunday_promotion("p2")).await.unwrap_err();
        match err {
            ServiceError::Schedule(err) => {
                assert_eq!(err.conflicting_days(), DaySet::from([DayTag::Sunday]))
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn listing_flags_todays_rows_and_week_covers_each_day() {
        let service = banner_service();
        let scope = Scope::Banner(BannerPlacement::PromotionWeb);
        let a = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Monday]))
            .await
            .unwrap()
            .row;
        let b = service
            .create(banner_draft(BannerPlacement::PromotionWeb, &[DayTag::Saturday]))
            .await
            .unwrap()
            .row;

        let listing = service.listing(scope).await.unwrap();
        let flags: Vec<(ItemId, bool)> =
            listing.rows.iter().map(|(r, e)| (r.id.clone(), *e)).collect();
        assert_eq!(flags, vec![(a.id.clone(), true), (b.id.clone(), false)]);

        let week = service.week(scope).await.unwrap();
        assert_eq!(week[&DayTag::Saturday][0].id, b.id);
        assert!(week[&DayTag::Sunday].is_empty());
    }
}
