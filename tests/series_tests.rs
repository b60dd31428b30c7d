mod common;
use common::{at, d, open_test_db};

use rmeetings::core::rsvp::RsvpLogic;
use rmeetings::core::series::SeriesLogic;
use rmeetings::db::log::count_operation;
use rmeetings::db::queries::{load_next, load_occurrences};
use rmeetings::errors::AppError;
use rmeetings::models::frequency::Frequency;
use rmeetings::models::response::{CREATED_AT_FORMAT, NewResponse, ResponseScope, ResponseValue};
use rmeetings::models::rule::RecurrenceRule;
use rmeetings::models::series::SeriesInput;
use rmeetings::models::termination::Termination;
use rmeetings::models::weekday_mask::WeekdayMask;

use chrono::{NaiveDate, NaiveDateTime, Weekday};

fn weekly_tuesday(count: u32) -> SeriesInput {
    SeriesInput::new("Standup", at("2024-01-02 10:00"), at("2024-01-02 11:00")).with_rule(
        RecurrenceRule::new(Frequency::Weekly, 1)
            .on_days(WeekdayMask::from_weekdays(&[Weekday::Tue]))
            .ending(Termination::AfterCount(count)),
    )
}

fn dates(pool: &rmeetings::db::pool::DbPool, series_id: i64) -> Vec<NaiveDate> {
    load_occurrences(&pool.conn, series_id)
        .unwrap()
        .into_iter()
        .map(|o| o.date)
        .collect()
}

#[test]
fn weekly_series_materializes_and_index_follows_today() {
    let (mut pool, cfg) = open_test_db("series_weekly_index");

    let (id, diff) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(3), None, d("2024-01-01"), &cfg)
            .unwrap();

    assert_eq!(diff.to_insert.len(), 3);
    assert_eq!(
        dates(&pool, id),
        vec![d("2024-01-02"), d("2024-01-09"), d("2024-01-16")]
    );

    let first = SeriesLogic::display_occurrence(&mut pool, id, d("2024-01-01")).unwrap();
    assert_eq!(first.date, d("2024-01-02"));

    // Today moved past the first meeting: the index is refreshed on read.
    let second = SeriesLogic::display_occurrence(&mut pool, id, d("2024-01-03")).unwrap();
    assert_eq!(second.date, d("2024-01-09"));
    assert_eq!(load_next(&pool.conn, id).unwrap().unwrap().date, d("2024-01-09"));

    // Everything is past: the most recent occurrence is shown.
    let last = SeriesLogic::display_occurrence(&mut pool, id, d("2024-03-01")).unwrap();
    assert_eq!(last.date, d("2024-01-16"));
}

#[test]
fn editing_end_time_keeps_occurrence_ids() {
    let (mut pool, cfg) = open_test_db("series_end_edit");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(3), None, today, &cfg).unwrap();
    let before = load_occurrences(&pool.conn, id).unwrap();

    let mut input = weekly_tuesday(3);
    input.end = at("2024-01-02 12:30");
    let (_, diff) =
        SeriesLogic::create_or_update(&mut pool, Some(id), &input, Some(1), today, &cfg).unwrap();

    assert!(diff.is_empty());
    assert_eq!(load_occurrences(&pool.conn, id).unwrap(), before);

    let series = SeriesLogic::get(&pool, id).unwrap();
    assert_eq!(series.revision, 2);
    assert_eq!(series.duration().num_minutes(), 150);
}

#[test]
fn reconcile_is_idempotent() {
    let (mut pool, cfg) = open_test_db("series_idempotent");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(5), None, today, &cfg).unwrap();

    let again = SeriesLogic::resync(&mut pool, id, today, &cfg).unwrap();
    assert!(again.is_empty());
    assert_eq!(again.unchanged.len(), 5);
    assert_eq!(count_operation(&pool.conn, "reconcile").unwrap(), 1);
}

#[test]
fn interval_change_keeps_shared_dates() {
    let (mut pool, cfg) = open_test_db("series_interval_change");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(4), None, today, &cfg).unwrap();
    let before = load_occurrences(&pool.conn, id).unwrap();

    let mut input = weekly_tuesday(4);
    input.rule.interval = 2;
    let (_, diff) =
        SeriesLogic::create_or_update(&mut pool, Some(id), &input, None, today, &cfg).unwrap();

    assert_eq!(diff.summary(), "+2 -2 =2");

    let after = load_occurrences(&pool.conn, id).unwrap();
    assert_eq!(
        after.iter().map(|o| o.date).collect::<Vec<_>>(),
        vec![d("2024-01-02"), d("2024-01-16"), d("2024-01-30"), d("2024-02-13")]
    );
    // 01-02 and 01-16 survived with their original ids.
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(after[1].id, before[2].id);
}

#[test]
fn removing_an_answered_occurrence_is_refused() {
    let (mut pool, cfg) = open_test_db("series_conflict");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(4), None, today, &cfg).unwrap();
    let before = load_occurrences(&pool.conn, id).unwrap();
    let jan9 = before[1].id;

    RsvpLogic::record(
        &mut pool,
        &NewResponse::new(id, ResponseScope::Occurrence(jan9), "alice", ResponseValue::Declined),
    )
    .unwrap();

    let mut input = weekly_tuesday(4);
    input.rule.interval = 2;
    let err = SeriesLogic::create_or_update(&mut pool, Some(id), &input, None, today, &cfg)
        .unwrap_err();

    match &err {
        AppError::ReconciliationConflict { series_id, dates } => {
            assert_eq!(*series_id, id);
            assert_eq!(dates, &vec!["2024-01-09".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_retryable());

    // Nothing of the refused edit was applied.
    assert_eq!(load_occurrences(&pool.conn, id).unwrap(), before);
    let series = SeriesLogic::get(&pool, id).unwrap();
    assert_eq!(series.revision, 1);
    assert_eq!(series.rule.interval, 1);
}

#[test]
fn series_wide_responses_do_not_block_removal() {
    let (mut pool, cfg) = open_test_db("series_wide_no_block");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(4), None, today, &cfg).unwrap();
    RsvpLogic::record(
        &mut pool,
        &NewResponse::new(id, ResponseScope::Series, "bob", ResponseValue::Accepted),
    )
    .unwrap();

    let (_, diff) =
        SeriesLogic::create_or_update(&mut pool, Some(id), &weekly_tuesday(2), None, today, &cfg)
            .unwrap();
    assert_eq!(diff.to_delete.len(), 2);
}

#[test]
fn stale_revision_is_rejected() {
    let (mut pool, cfg) = open_test_db("series_revision");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(3), None, today, &cfg).unwrap();
    SeriesLogic::create_or_update(&mut pool, Some(id), &weekly_tuesday(4), Some(1), today, &cfg)
        .unwrap();

    let err = SeriesLogic::create_or_update(&mut pool, Some(id), &weekly_tuesday(5), Some(1), today, &cfg)
        .unwrap_err();
    assert!(matches!(err, AppError::ConcurrentModification { series_id, .. } if series_id == id));
    assert_eq!(dates(&pool, id).len(), 4);
}

#[test]
fn writer_holding_the_lock_blocks_a_second_writer() {
    let (mut first, cfg) = open_test_db("series_lock");
    let today = d("2024-01-01");
    let (id, _) =
        SeriesLogic::create_or_update(&mut first, None, &weekly_tuesday(3), None, today, &cfg).unwrap();

    let mut second = rmeetings::db::pool::DbPool::new(&cfg.database).unwrap();

    let tx = first.begin_series_write(id).unwrap();
    let err = SeriesLogic::create_or_update(&mut second, Some(id), &weekly_tuesday(4), None, today, &cfg)
        .unwrap_err();
    assert!(matches!(err, AppError::ConcurrentModification { .. }));
    drop(tx);

    SeriesLogic::create_or_update(&mut second, Some(id), &weekly_tuesday(4), None, today, &cfg)
        .unwrap();
}

#[test]
fn open_ended_series_grows_with_the_horizon() {
    let (mut pool, cfg) = open_test_db("series_extend");

    let input = SeriesInput::new("Daily sync", at("2024-01-01 09:00"), at("2024-01-01 09:15"))
        .with_rule(RecurrenceRule::new(Frequency::Daily, 1));
    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &input, None, d("2024-01-01"), &cfg).unwrap();

    // 60 day window: 2024-01-01 ..= 2024-03-01
    assert_eq!(dates(&pool, id).len(), 61);
    assert_eq!(dates(&pool, id).last(), Some(&d("2024-03-01")));

    let report = SeriesLogic::extend_horizons(&mut pool, d("2024-02-01"), &cfg).unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(report.extended.len(), 1);
    assert_eq!(report.extended[0].1.to_insert.len(), 31);

    assert_eq!(dates(&pool, id).last(), Some(&d("2024-04-01")));
    assert_eq!(count_operation(&pool.conn, "extend").unwrap(), 1);
}

#[test]
fn bounded_series_are_left_alone_by_extension() {
    let (mut pool, cfg) = open_test_db("series_extend_bounded");

    SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(3), None, d("2024-01-01"), &cfg)
        .unwrap();

    let report = SeriesLogic::extend_horizons(&mut pool, d("2024-06-01"), &cfg).unwrap();
    assert!(report.extended.is_empty());
}

#[test]
fn single_meeting_has_one_occurrence() {
    let (mut pool, cfg) = open_test_db("series_single");

    let input = SeriesInput::new("Kickoff", at("2024-05-10 14:00"), at("2024-05-10 15:00"));
    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &input, None, d("2024-01-01"), &cfg).unwrap();

    assert_eq!(dates(&pool, id), vec![d("2024-05-10")]);
    let series = SeriesLogic::get(&pool, id).unwrap();
    assert!(!series.is_repeated());
    assert_eq!(series.rule.to_string(), "");
}

#[test]
fn until_before_start_still_keeps_the_start_date() {
    let (mut pool, cfg) = open_test_db("series_until_before_start");

    let input = SeriesInput::new("Retro", at("2024-05-10 14:00"), at("2024-05-10 15:00")).with_rule(
        RecurrenceRule::new(Frequency::Monthly, 1).ending(Termination::UntilDate(d("2024-05-01"))),
    );
    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &input, None, d("2024-01-01"), &cfg).unwrap();

    assert_eq!(dates(&pool, id), vec![d("2024-05-10")]);
}

#[test]
fn invalid_input_is_rejected_before_any_write() {
    let (mut pool, cfg) = open_test_db("series_invalid");
    let today = d("2024-01-01");

    let mut bad_interval = weekly_tuesday(3);
    bad_interval.rule.interval = 0;
    let err = SeriesLogic::create_or_update(&mut pool, None, &bad_interval, None, today, &cfg)
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRule(_)));

    let backwards = SeriesInput::new("Oops", at("2024-01-02 10:00"), at("2024-01-02 09:00"));
    let err =
        SeriesLogic::create_or_update(&mut pool, None, &backwards, None, today, &cfg).unwrap_err();
    assert!(matches!(err, AppError::InvalidRule(_)));

    assert_eq!(count_operation(&pool.conn, "series_add").unwrap(), 0);
}

#[test]
fn deleting_a_series_removes_everything_it_owns() {
    let (mut pool, cfg) = open_test_db("series_delete");
    let today = d("2024-01-01");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(3), None, today, &cfg).unwrap();
    let occ = load_occurrences(&pool.conn, id).unwrap()[0].id;
    RsvpLogic::record(
        &mut pool,
        &NewResponse::new(id, ResponseScope::Occurrence(occ), "carol", ResponseValue::Tentative),
    )
    .unwrap();

    SeriesLogic::delete(&mut pool, id).unwrap();

    assert!(matches!(SeriesLogic::get(&pool, id), Err(AppError::NotFound(_))));
    assert!(load_occurrences(&pool.conn, id).unwrap().is_empty());
    assert!(load_next(&pool.conn, id).unwrap().is_none());

    let responses: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM responses WHERE series_id = ?1", [id], |r| r.get(0))
        .unwrap();
    assert_eq!(responses, 0);
}

#[test]
fn listings_are_paged_around_today() {
    let (mut pool, cfg) = open_test_db("series_listing");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(6), None, d("2024-01-01"), &cfg)
            .unwrap();

    let today = d("2024-01-20");
    let future = SeriesLogic::list_future(&pool, id, today, 2).unwrap();
    assert_eq!(
        future.iter().map(|o| o.date).collect::<Vec<_>>(),
        vec![d("2024-01-23"), d("2024-01-30")]
    );

    let past = SeriesLogic::list_past(&pool, id, today, 10).unwrap();
    assert_eq!(
        past.iter().map(|o| o.date).collect::<Vec<_>>(),
        vec![d("2024-01-16"), d("2024-01-09"), d("2024-01-02")]
    );
}

#[test]
fn old_never_series_keeps_growing_past_its_first_window() {
    let (mut pool, mut cfg) = open_test_db("series_extend_old");
    cfg.horizon_days = 365;

    let input = SeriesInput::new("Daily sync", at("2024-01-01 09:00"), at("2024-01-01 09:15"))
        .with_rule(RecurrenceRule::new(Frequency::Daily, 1));
    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &input, None, d("2024-01-01"), &cfg).unwrap();
    assert_eq!(dates(&pool, id).last(), Some(&d("2024-12-31")));

    // Two years of history must not eat the cap meant for the new window.
    let report = SeriesLogic::extend_horizons(&mut pool, d("2026-01-01"), &cfg).unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(report.extended.len(), 1);

    assert_eq!(dates(&pool, id).last(), Some(&d("2027-01-01")));
    assert!(!SeriesLogic::list_future(&pool, id, d("2026-01-01"), 5).unwrap().is_empty());
    let shown = SeriesLogic::display_occurrence(&mut pool, id, d("2026-01-01")).unwrap();
    assert_eq!(shown.date, d("2026-01-01"));
}

#[test]
fn until_series_rolls_forward_until_its_end_date() {
    let (mut pool, cfg) = open_test_db("series_extend_until");

    let input = SeriesInput::new("Daily sync", at("2025-01-01 09:00"), at("2025-01-01 09:15"))
        .with_rule(
            RecurrenceRule::new(Frequency::Daily, 1).ending(Termination::UntilDate(d("2026-12-31"))),
        );
    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &input, None, d("2025-01-01"), &cfg).unwrap();
    assert_eq!(dates(&pool, id).last(), Some(&d("2025-03-02")));

    let report = SeriesLogic::extend_horizons(&mut pool, d("2025-12-01"), &cfg).unwrap();
    assert_eq!(report.extended.len(), 1);
    assert!(!SeriesLogic::list_future(&pool, id, d("2025-12-01"), 5).unwrap().is_empty());
    assert_eq!(dates(&pool, id).last(), Some(&d("2026-01-30")));

    // Once the end date is behind us the series is no longer revisited.
    let report = SeriesLogic::extend_horizons(&mut pool, d("2027-01-01"), &cfg).unwrap();
    assert!(report.extended.is_empty());
}

#[test]
fn detail_edit_under_a_narrower_window_keeps_every_occurrence() {
    let (mut pool, mut cfg) = open_test_db("series_narrow_window");

    let input = SeriesInput::new("Review", at("2024-01-02 10:00"), at("2024-01-02 11:00")).with_rule(
        RecurrenceRule::new(Frequency::Weekly, 1).on_days(WeekdayMask::from_weekdays(&[Weekday::Tue])),
    );
    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &input, None, d("2024-01-01"), &cfg).unwrap();
    let before = load_occurrences(&pool.conn, id).unwrap();
    assert_eq!(before.len(), 9);

    cfg.horizon_days = 14;
    let mut edited = input.clone();
    edited.end = at("2024-01-02 11:30");
    let (_, diff) =
        SeriesLogic::create_or_update(&mut pool, Some(id), &edited, Some(1), d("2024-01-01"), &cfg)
            .unwrap();
    assert!(diff.is_empty());
    assert_eq!(load_occurrences(&pool.conn, id).unwrap(), before);

    // An earlier evaluation date trims nothing either.
    edited.name = "Design review".into();
    let (_, diff) =
        SeriesLogic::create_or_update(&mut pool, Some(id), &edited, Some(2), d("2023-12-01"), &cfg)
            .unwrap();
    assert!(diff.is_empty());
    assert_eq!(load_occurrences(&pool.conn, id).unwrap(), before);
}

#[test]
fn series_timestamps_use_the_shared_format() {
    let (mut pool, cfg) = open_test_db("series_timestamps");

    let (id, _) =
        SeriesLogic::create_or_update(&mut pool, None, &weekly_tuesday(2), None, d("2024-01-01"), &cfg)
            .unwrap();
    let series = SeriesLogic::get(&pool, id).unwrap();

    for stamp in [&series.created_at, &series.updated_at] {
        assert!(NaiveDateTime::parse_from_str(stamp, CREATED_AT_FORMAT).is_ok(), "{stamp}");
        assert!(stamp.ends_with('Z'));
    }
}
