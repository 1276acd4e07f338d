//! Integration tests for `SlotRepo` against a real database.

use chrono::{Duration, TimeZone, Utc};
use slotswap_core::overlap::TimeRange;
use slotswap_core::recurrence::{RecurrenceKind, RecurrenceSpec};
use slotswap_core::types::{DbId, Timestamp};
use slotswap_db::models::slot::{NewSlotBatch, Slot, UpdateSlot};
use slotswap_db::models::status::SlotStatus;
use slotswap_db::repositories::SlotRepo;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 11, day, hour, 0, 0).unwrap()
}

fn hour_range(day: u32, hour: u32) -> TimeRange {
    TimeRange::new(at(day, hour), at(day, hour) + Duration::hours(1))
}

async fn insert_one(pool: &PgPool, owner_id: DbId, title: &str, range: TimeRange) -> Slot {
    insert_with_status(pool, owner_id, title, range, SlotStatus::Busy).await
}

async fn insert_with_status(
    pool: &PgPool,
    owner_id: DbId,
    title: &str,
    range: TimeRange,
    status: SlotStatus,
) -> Slot {
    let once = RecurrenceSpec::once();
    let ranges = [range];
    let batch = NewSlotBatch {
        owner_id,
        title,
        status_id: status.id(),
        recurrence: &once,
        recurrence_end_date: None,
        series_id: None,
        ranges: &ranges,
    };
    let mut conn = pool.acquire().await.unwrap();
    let mut rows = SlotRepo::insert_batch(&mut *conn, &batch).await.unwrap();
    assert_eq!(rows.len(), 1);
    rows.remove(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_batch_returns_rows_sorted_with_series(pool: PgPool) {
    let spec = RecurrenceSpec {
        kind: RecurrenceKind::Weekly,
        custom_days: Vec::new(),
        end_date: None,
    };
    let series = Uuid::new_v4();
    let ranges = [hour_range(17, 9), hour_range(3, 9), hour_range(10, 9)];
    let batch = NewSlotBatch {
        owner_id: 1,
        title: "Gym",
        status_id: SlotStatus::Swappable.id(),
        recurrence: &spec,
        recurrence_end_date: Some(at(24, 0).date_naive()),
        series_id: Some(series),
        ranges: &ranges,
    };

    let mut conn = pool.acquire().await.unwrap();
    let rows = SlotRepo::insert_batch(&mut *conn, &batch).await.unwrap();

    let starts: Vec<Timestamp> = rows.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![at(3, 9), at(10, 9), at(17, 9)]);
    for row in &rows {
        assert_eq!(row.owner_id, 1);
        assert_eq!(row.title, "Gym");
        assert_eq!(row.status_id, SlotStatus::Swappable.id());
        assert_eq!(row.recurrence_kind, "weekly");
        assert_eq!(row.recurrence_end_date, Some(at(24, 0).date_naive()));
        assert_eq!(row.series_id, Some(series));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn custom_days_are_stored(pool: PgPool) {
    let spec = RecurrenceSpec {
        kind: RecurrenceKind::Custom,
        custom_days: vec![1, 15],
        end_date: None,
    };
    let ranges = [hour_range(1, 8), hour_range(15, 8)];
    let batch = NewSlotBatch {
        owner_id: 4,
        title: "Rent",
        status_id: SlotStatus::Busy.id(),
        recurrence: &spec,
        recurrence_end_date: Some(at(30, 0).date_naive()),
        series_id: Some(Uuid::new_v4()),
        ranges: &ranges,
    };
    let mut conn = pool.acquire().await.unwrap();
    let rows = SlotRepo::insert_batch(&mut *conn, &batch).await.unwrap();
    assert_eq!(rows[0].recurrence_days, Some(vec![1, 15]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_conflicts_uses_all_three_predicates(pool: PgPool) {
    // Existing: 10:00-12:00 on the 5th.
    let existing = TimeRange::new(at(5, 10), at(5, 12));
    let slot = insert_one(&pool, 1, "Review", existing).await;
    let mut conn = pool.acquire().await.unwrap();

    // Candidate contains the existing start.
    let hits = SlotRepo::find_conflicts(&mut *conn, 1, &[TimeRange::new(at(5, 9), at(5, 11))])
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, slot.id);

    // Candidate contains the existing end.
    let hits = SlotRepo::find_conflicts(&mut *conn, 1, &[TimeRange::new(at(5, 11), at(5, 13))])
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    // Existing fully spans the candidate.
    let inner = TimeRange::new(at(5, 10) + Duration::minutes(30), at(5, 11));
    let hits = SlotRepo::find_conflicts(&mut *conn, 1, &[inner]).await.unwrap();
    assert_eq!(hits.len(), 1);

    // Touching boundaries do not conflict.
    let hits = SlotRepo::find_conflicts(
        &mut *conn,
        1,
        &[TimeRange::new(at(5, 8), at(5, 10)), TimeRange::new(at(5, 12), at(5, 13))],
    )
    .await
    .unwrap();
    assert!(hits.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_conflicts_is_scoped_to_owner(pool: PgPool) {
    insert_one(&pool, 2, "Other user's meeting", hour_range(5, 10)).await;
    let mut conn = pool.acquire().await.unwrap();
    let hits = SlotRepo::find_conflicts(&mut *conn, 1, &[hour_range(5, 10)])
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_by_owner_orders_by_start(pool: PgPool) {
    insert_one(&pool, 1, "Late", hour_range(9, 15)).await;
    insert_one(&pool, 1, "Early", hour_range(2, 8)).await;
    insert_one(&pool, 2, "Not mine", hour_range(1, 8)).await;

    let slots = SlotRepo::list_by_owner(&pool, 1).await.unwrap();
    let titles: Vec<&str> = slots.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Early", "Late"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_swappable_excludes_requester_and_other_statuses(pool: PgPool) {
    insert_with_status(&pool, 1, "Mine", hour_range(3, 9), SlotStatus::Swappable).await;
    insert_with_status(&pool, 2, "Busy", hour_range(3, 10), SlotStatus::Busy).await;
    let open = insert_with_status(&pool, 2, "Open", hour_range(3, 11), SlotStatus::Swappable).await;
    insert_with_status(&pool, 3, "Locked", hour_range(3, 12), SlotStatus::SwapPending).await;

    let slots = SlotRepo::list_swappable(&pool, 1).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, open.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_owned_hides_other_users_slots(pool: PgPool) {
    let slot = insert_one(&pool, 1, "Private", hour_range(4, 9)).await;
    let mut conn = pool.acquire().await.unwrap();

    assert!(SlotRepo::find_owned(&mut *conn, 1, slot.id).await.unwrap().is_some());
    assert!(SlotRepo::find_owned(&mut *conn, 2, slot.id).await.unwrap().is_none());
    assert!(SlotRepo::find_by_id(&mut *conn, slot.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_owned_applies_only_provided_fields(pool: PgPool) {
    let slot = insert_one(&pool, 1, "Draft", hour_range(6, 9)).await;
    let mut conn = pool.acquire().await.unwrap();

    let input = UpdateSlot {
        title: Some("Final".to_string()),
        status_id: Some(SlotStatus::Swappable.id()),
        ..Default::default()
    };
    let updated = SlotRepo::update_owned(&mut *conn, 1, slot.id, &input)
        .await
        .unwrap()
        .expect("slot should be updated");
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.status_id, SlotStatus::Swappable.id());
    assert_eq!(updated.start_time, slot.start_time);
    assert_eq!(updated.end_time, slot.end_time);

    let foreign = SlotRepo::update_owned(&mut *conn, 2, slot.id, &input).await.unwrap();
    assert!(foreign.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_owned_requires_ownership(pool: PgPool) {
    let slot = insert_one(&pool, 1, "Temp", hour_range(7, 9)).await;

    assert!(!SlotRepo::delete_owned(&pool, 2, slot.id).await.unwrap());
    assert!(SlotRepo::delete_owned(&pool, 1, slot.id).await.unwrap());
    assert!(!SlotRepo::delete_owned(&pool, 1, slot.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn transition_status_is_conditional(pool: PgPool) {
    let slot = insert_with_status(&pool, 1, "Swap me", hour_range(8, 9), SlotStatus::Swappable).await;
    let mut conn = pool.acquire().await.unwrap();

    let locked = SlotRepo::transition_status(
        &mut *conn,
        slot.id,
        SlotStatus::Swappable,
        SlotStatus::SwapPending,
    )
    .await
    .unwrap();
    assert_eq!(locked.unwrap().status_id, SlotStatus::SwapPending.id());

    // A second attempt from the stale status matches no row.
    let again = SlotRepo::transition_status(
        &mut *conn,
        slot.id,
        SlotStatus::Swappable,
        SlotStatus::SwapPending,
    )
    .await
    .unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn release_owned_requires_owner_and_pending_status(pool: PgPool) {
    let pending = insert_with_status(&pool, 1, "Held", hour_range(8, 11), SlotStatus::SwapPending).await;
    let busy = insert_with_status(&pool, 1, "Mine again", hour_range(8, 13), SlotStatus::Busy).await;
    let mut conn = pool.acquire().await.unwrap();

    // Someone else cannot release it.
    assert!(SlotRepo::release_owned(&mut *conn, 2, pending.id).await.unwrap().is_none());

    // A slot the owner already took out of SWAP_PENDING is left alone.
    assert!(SlotRepo::release_owned(&mut *conn, 1, busy.id).await.unwrap().is_none());
    let still_busy = SlotRepo::find_by_id(&mut *conn, busy.id).await.unwrap().unwrap();
    assert_eq!(still_busy.status_id, SlotStatus::Busy.id());

    let released = SlotRepo::release_owned(&mut *conn, 1, pending.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(released.status_id, SlotStatus::Swappable.id());

    // Missing rows match nothing.
    assert!(SlotRepo::release_owned(&mut *conn, 1, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn apply_swap_moves_owner_and_end_time(pool: PgPool) {
    let slot = insert_with_status(&pool, 1, "Old", hour_range(9, 9), SlotStatus::SwapPending).await;
    let mut conn = pool.acquire().await.unwrap();
    let new_end = slot.start_time + Duration::minutes(90);

    let swapped = SlotRepo::apply_swap(&mut *conn, slot.id, 2, new_end, None, SlotStatus::Busy)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(swapped.owner_id, 2);
    assert_eq!(swapped.end_time, new_end);
    assert_eq!(swapped.title, "Old");
    assert_eq!(swapped.status_id, SlotStatus::Busy.id());

    let retitled = SlotRepo::apply_swap(
        &mut *conn,
        slot.id,
        2,
        new_end,
        Some("Shared"),
        SlotStatus::Busy,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(retitled.title, "Shared");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_before_start_is_rejected_by_check_constraint(pool: PgPool) {
    let slot = insert_one(&pool, 1, "Guarded", hour_range(10, 9)).await;
    let mut conn = pool.acquire().await.unwrap();
    let input = UpdateSlot {
        end_time: Some(slot.start_time - Duration::hours(1)),
        ..Default::default()
    };
    let err = SlotRepo::update_owned(&mut *conn, 1, slot.id, &input)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("ck_slots_time_range"));
}
