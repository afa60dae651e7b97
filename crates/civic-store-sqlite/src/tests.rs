//! Integration tests for `SqliteStore` and the core engine against an
//! in-memory database.

use chrono::{Duration, SubsecRound as _, Utc};
use civic_core::{
  actions::ActionRecorder,
  activity::{ActivityAction, ActivityLogEntry},
  badge,
  leaderboard,
  points::{NewPointEntry, PointSource},
  report::NewReport,
  stats,
  store::{GamificationStore, StoreError as _},
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> User {
  s.add_user(NewUser {
    name:  name.into(),
    email: format!("{}@example.com", name.to_lowercase()),
  })
  .await
  .unwrap()
}

async fn give(s: &SqliteStore, user_id: Uuid, points: i64) {
  s.record_points(NewPointEntry::new(user_id, PointSource::Correction, points))
    .await
    .unwrap();
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  let fetched = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched, alice);
  assert_eq!(s.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_domain_error() {
  let s = store().await;
  user(&s, "Alice").await;

  let err = s
    .add_user(NewUser { name: "Other".into(), email: "alice@example.com".into() })
    .await
    .unwrap_err();
  assert!(matches!(
    err.domain(),
    Some(civic_core::Error::DuplicateEmail(email)) if email == "alice@example.com"
  ));
  assert_eq!(s.count_users().await.unwrap(), 1);
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn total_is_zero_without_entries() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  assert_eq!(s.total_points(alice.user_id).await.unwrap(), 0);
  assert_eq!(s.total_points(Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn submit_then_photo_totals_thirteen() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  s.record_points(NewPointEntry::award(alice.user_id, PointSource::SubmitReport))
    .await
    .unwrap();
  s.record_points(NewPointEntry::award(alice.user_id, PointSource::AddPhoto))
    .await
    .unwrap();

  let total = s.total_points(alice.user_id).await.unwrap();
  assert_eq!(total, 13);
  assert_eq!(civic_core::level::level(total), 1);
}

#[tokio::test]
async fn totals_are_independent_of_write_order() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let bob = user(&s, "Bob").await;

  let writes = [
    (alice.user_id, 10),
    (bob.user_id, 2),
    (alice.user_id, 0),
    (bob.user_id, 5),
    (alice.user_id, 3),
  ];
  let handles: Vec<_> = writes
    .into_iter()
    .map(|(user_id, points)| {
      let s = s.clone();
      tokio::spawn(async move { give(&s, user_id, points).await })
    })
    .collect();
  for h in handles {
    h.await.unwrap();
  }

  assert_eq!(s.total_points(alice.user_id).await.unwrap(), 13);
  assert_eq!(s.total_points(bob.user_id).await.unwrap(), 7);
}

#[tokio::test]
async fn corrections_offset_without_removing_history() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  give(&s, alice.user_id, 10).await;
  give(&s, alice.user_id, -10).await;

  assert_eq!(s.total_points(alice.user_id).await.unwrap(), 0);
  assert_eq!(s.point_entries(alice.user_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn point_entries_roundtrip_meta_newest_first() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let now = Utc::now();

  let old = s
    .record_points(
      NewPointEntry::award(alice.user_id, PointSource::SubmitReport)
        .with_meta("report_id", "r-1")
        .at(now - Duration::days(2)),
    )
    .await
    .unwrap();
  let new = s
    .record_points(NewPointEntry::award(alice.user_id, PointSource::AddComment).at(now))
    .await
    .unwrap();

  let entries = s.point_entries(alice.user_id).await.unwrap();
  assert_eq!(entries, vec![new, old]);
  assert_eq!(entries[1].meta.get("report_id").unwrap(), "r-1");
}

#[tokio::test]
async fn sliding_windows_respect_entry_age() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let now = Utc::now();

  s.record_points(NewPointEntry::new(alice.user_id, PointSource::SubmitReport, 10).at(now))
    .await
    .unwrap();
  s.record_points(
    NewPointEntry::new(alice.user_id, PointSource::SubmitReport, 20)
      .at(now - Duration::days(10)),
  )
  .await
  .unwrap();
  s.record_points(
    NewPointEntry::new(alice.user_id, PointSource::SubmitReport, 40)
      .at(now - Duration::days(40)),
  )
  .await
  .unwrap();

  let st = stats::compute(&s, alice.user_id, now).await.unwrap();
  assert_eq!(st.weekly_points, 10);
  assert_eq!(st.monthly_points, 30);
  assert_eq!(st.points, 70);
}

#[tokio::test]
async fn window_lower_bounds_are_inclusive() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let now = Utc::now().trunc_subsecs(6);

  for (days_ago, points) in [(7, 1), (30, 10)] {
    s.record_points(
      NewPointEntry::new(alice.user_id, PointSource::SubmitReport, points)
        .at(now - Duration::days(days_ago)),
    )
    .await
    .unwrap();
  }
  s.record_points(
    NewPointEntry::new(alice.user_id, PointSource::SubmitReport, 100)
      .at(now - Duration::days(30) - Duration::microseconds(1)),
  )
  .await
  .unwrap();

  let st = stats::compute(&s, alice.user_id, now).await.unwrap();
  assert_eq!(st.weekly_points, 1);
  assert_eq!(st.monthly_points, 11);
  assert_eq!(st.points, 111);
}

// ─── Activity log ────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_day_activity_is_logged_once() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let now = Utc::now();

  let first = s
    .log_activity(ActivityLogEntry::new(alice.user_id, ActivityAction::ReportSubmitted, now))
    .await
    .unwrap();
  let second = s
    .log_activity(ActivityLogEntry::new(alice.user_id, ActivityAction::CommentAdded, now))
    .await
    .unwrap();

  assert!(first);
  assert!(!second);
  assert_eq!(
    s.active_days_since(alice.user_id, now.date_naive()).await.unwrap(),
    1
  );
}

#[tokio::test]
async fn streak_counts_distinct_days_in_window() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let now = Utc::now();

  // Non-consecutive days still count; the 20-day-old one falls outside.
  for days_ago in [0, 2, 5, 20] {
    s.log_activity(ActivityLogEntry::new(
      alice.user_id,
      ActivityAction::ReportConfirmed,
      now - Duration::days(days_ago),
    ))
    .await
    .unwrap();
  }

  let st = stats::compute(&s, alice.user_id, now).await.unwrap();
  assert_eq!(st.streak, 3);
}

#[tokio::test]
async fn streak_window_includes_its_first_day() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let now = Utc::now();

  for days_ago in [7, 8] {
    s.log_activity(ActivityLogEntry::new(
      alice.user_id,
      ActivityAction::CommentAdded,
      now - Duration::days(days_ago),
    ))
    .await
    .unwrap();
  }

  let st = stats::compute(&s, alice.user_id, now).await.unwrap();
  assert_eq!(st.streak, 1);
}

// ─── Badges ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalogue_is_seeded_once() {
  let s = store().await;
  let badges = s.list_badges().await.unwrap();
  assert_eq!(badges.len(), badge::CATALOG.len());
  assert!(badges.iter().any(|b| b.id == "first-report"));
}

#[tokio::test]
async fn awarding_twice_keeps_original_timestamp() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let first_at = Utc::now() - Duration::hours(1);

  assert!(s.award_badge(alice.user_id, "first-report", first_at).await.unwrap());
  assert!(!s.award_badge(alice.user_id, "first-report", Utc::now()).await.unwrap());

  let awards = s.user_badges(alice.user_id).await.unwrap();
  assert_eq!(awards.len(), 1);
  assert_eq!(
    awards[0].earned_at.timestamp_micros(),
    first_at.timestamp_micros()
  );
}

#[tokio::test]
async fn no_activity_earns_no_badges() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  let awarded = badge::evaluate(&s, alice.user_id, Utc::now()).await.unwrap();
  assert!(awarded.is_empty());
  assert!(s.user_badges(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn report_badges_follow_report_count() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let recorder = ActionRecorder::new(&s);

  let first = recorder
    .submit_report(NewReport::new(alice.user_id, "Pothole", "roads"))
    .await
    .unwrap();
  assert_eq!(first.badges_earned, ["first-report"]);

  for i in 2..=19 {
    let out = recorder
      .submit_report(NewReport::new(alice.user_id, &format!("Issue {i}"), "roads"))
      .await
      .unwrap();
    assert!(out.badges_earned.is_empty(), "report {i}");
  }

  let twentieth = recorder
    .submit_report(NewReport::new(alice.user_id, "Issue 20", "roads"))
    .await
    .unwrap();
  assert_eq!(twentieth.badges_earned, ["super-reporter"]);

  let held: Vec<_> = s
    .user_badges(alice.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.badge_id)
    .collect();
  assert_eq!(held.len(), 2);
  assert!(held.contains(&"first-report".to_owned()));
  assert!(held.contains(&"super-reporter".to_owned()));
}

#[tokio::test]
async fn repeated_evaluation_is_idempotent() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  ActionRecorder::new(&s)
    .submit_report(NewReport::new(alice.user_id, "Pothole", "roads"))
    .await
    .unwrap();

  let (a, b) = tokio::join!(
    badge::evaluate(&s, alice.user_id, Utc::now()),
    badge::evaluate(&s, alice.user_id, Utc::now()),
  );
  assert!(a.unwrap().is_empty());
  assert!(b.unwrap().is_empty());
  assert_eq!(s.user_badges(alice.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn badge_statuses_order_by_rarity_then_earned() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  ActionRecorder::new(&s)
    .submit_report(NewReport::new(alice.user_id, "Pothole", "roads"))
    .await
    .unwrap();

  let statuses = badge::statuses(&s, alice.user_id).await.unwrap();
  let ids: Vec<_> = statuses.iter().map(|st| st.badge.id.as_str()).collect();
  assert_eq!(ids, ["super-reporter", "community-helper", "first-report"]);
  assert!(!statuses[0].is_earned());
  assert!(statuses[2].is_earned());

  let progress: Vec<_> = statuses
    .iter()
    .map(|st| st.progress.map(|p| (p.current, p.required)))
    .collect();
  assert_eq!(progress, [Some((1, 20)), Some((0, 10)), None]);
}

// ─── Actions ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_report_with_photo_awards_bonus() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let recorder = ActionRecorder::new(&s);

  let mut input = NewReport::new(alice.user_id, "Broken light", "lighting");
  input.photo_url = Some("/uploads/a/1.jpg".into());
  let out = recorder.submit_report(input).await.unwrap();

  let sources: Vec<_> = out.points.iter().map(|p| p.source).collect();
  assert_eq!(sources, [
    PointSource::SubmitReport,
    PointSource::AddPhoto,
    PointSource::FirstReportBonus,
  ]);
  assert_eq!(s.total_points(alice.user_id).await.unwrap(), 18);

  // Second report: no bonus, no photo.
  recorder
    .submit_report(NewReport::new(alice.user_id, "Graffiti", "vandalism"))
    .await
    .unwrap();
  assert_eq!(s.total_points(alice.user_id).await.unwrap(), 28);
}

#[tokio::test]
async fn concurrent_first_reports_award_one_bonus() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let recorder = ActionRecorder::new(&s);

  let (a, b) = tokio::join!(
    recorder.submit_report(NewReport::new(alice.user_id, "Pothole", "roads")),
    recorder.submit_report(NewReport::new(alice.user_id, "Graffiti", "vandalism")),
  );
  a.unwrap();
  b.unwrap();

  let bonuses = s
    .point_entries(alice.user_id)
    .await
    .unwrap()
    .into_iter()
    .filter(|e| e.source == PointSource::FirstReportBonus)
    .count();
  assert_eq!(bonuses, 1);
  assert_eq!(s.total_points(alice.user_id).await.unwrap(), 25);
}

#[tokio::test]
async fn submit_for_unknown_user_is_rejected() {
  let s = store().await;
  let err = ActionRecorder::new(&s)
    .submit_report(NewReport::new(Uuid::new_v4(), "Pothole", "roads"))
    .await
    .unwrap_err();
  assert!(matches!(err.domain(), Some(civic_core::Error::UserNotFound(_))));
}

#[tokio::test]
async fn confirmation_credits_voter_and_author() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let bob = user(&s, "Bob").await;
  let recorder = ActionRecorder::new(&s);

  let report = recorder
    .submit_report(NewReport::new(alice.user_id, "Pothole", "roads"))
    .await
    .unwrap()
    .report;
  let before = s.total_points(alice.user_id).await.unwrap();

  recorder.confirm_report(report.report_id, bob.user_id).await.unwrap();

  assert_eq!(s.total_points(bob.user_id).await.unwrap(), 2);
  assert_eq!(s.total_points(alice.user_id).await.unwrap(), before + 1);
  assert_eq!(s.activity_counts(bob.user_id).await.unwrap().confirmations_made, 1);
}

#[tokio::test]
async fn confirmation_rules() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let bob = user(&s, "Bob").await;
  let recorder = ActionRecorder::new(&s);

  let report = recorder
    .submit_report(NewReport::new(alice.user_id, "Pothole", "roads"))
    .await
    .unwrap()
    .report;

  let own = recorder
    .confirm_report(report.report_id, alice.user_id)
    .await
    .unwrap_err();
  assert!(matches!(own.domain(), Some(civic_core::Error::SelfConfirmation)));

  recorder.confirm_report(report.report_id, bob.user_id).await.unwrap();
  let twice = recorder
    .confirm_report(report.report_id, bob.user_id)
    .await
    .unwrap_err();
  assert!(matches!(
    twice.domain(),
    Some(civic_core::Error::AlreadyConfirmed { .. })
  ));
  // The rejected retry must not award anything.
  assert_eq!(s.total_points(bob.user_id).await.unwrap(), 2);

  let missing = recorder
    .confirm_report(Uuid::new_v4(), bob.user_id)
    .await
    .unwrap_err();
  assert!(matches!(missing.domain(), Some(civic_core::Error::ReportNotFound(_))));
}

#[tokio::test]
async fn ten_confirmations_earn_community_helper() {
  let s = store().await;
  let helper = user(&s, "Helper").await;
  let recorder = ActionRecorder::new(&s);

  for i in 0..10 {
    let author = user(&s, &format!("Author{i}")).await;
    let report = recorder
      .submit_report(NewReport::new(author.user_id, "Issue", "roads"))
      .await
      .unwrap()
      .report;
    let out = recorder
      .confirm_report(report.report_id, helper.user_id)
      .await
      .unwrap();
    if i == 9 {
      assert_eq!(out.voter_badges_earned, ["community-helper"]);
    } else {
      assert!(out.voter_badges_earned.is_empty());
    }
  }
}

#[tokio::test]
async fn comments_award_one_point() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  let bob = user(&s, "Bob").await;
  let recorder = ActionRecorder::new(&s);

  let report = recorder
    .submit_report(NewReport::new(alice.user_id, "Pothole", "roads"))
    .await
    .unwrap()
    .report;

  let out = recorder
    .add_comment(report.report_id, bob.user_id, "Still there today".into())
    .await
    .unwrap();
  assert_eq!(out.points.points, 1);
  assert_eq!(
    out.points.meta.get("comment_id").unwrap(),
    &out.comment.comment_id.to_string()
  );

  let blank = recorder
    .add_comment(report.report_id, bob.user_id, "   ".into())
    .await
    .unwrap_err();
  assert!(matches!(blank.domain(), Some(civic_core::Error::EmptyComment)));
  assert_eq!(s.total_points(bob.user_id).await.unwrap(), 1);
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_for_user_without_history() {
  let s = store().await;
  let users: Vec<_> = register_users(&s, 5).await;
  for (i, u) in users.iter().take(4).enumerate() {
    give(&s, u.user_id, (i as i64 + 1) * 10).await;
  }

  let st = stats::compute(&s, users[4].user_id, Utc::now()).await.unwrap();
  assert_eq!(st.points, 0);
  assert_eq!(st.level, 1);
  assert_eq!(st.rank, 5);
  assert_eq!(st.total_users, 5);
  assert_eq!(st.badges, 0);
  assert_eq!(st.streak, 0);
  assert_eq!(st.current_level_points, 0);
  assert_eq!(st.next_level_points, 100);
}

#[tokio::test]
async fn stats_rank_and_level() {
  let s = store().await;
  let users = register_users(&s, 3).await;
  give(&s, users[0].user_id, 30).await;
  give(&s, users[1].user_id, 260).await;
  give(&s, users[2].user_id, 10).await;

  let st = stats::compute(&s, users[0].user_id, Utc::now()).await.unwrap();
  assert_eq!(st.rank, 2);
  assert_eq!(st.total_users, 3);

  let st = stats::compute(&s, users[1].user_id, Utc::now()).await.unwrap();
  assert_eq!(st.rank, 1);
  assert_eq!(st.level, 3);
  assert_eq!(st.current_level_points, 250);
  assert_eq!(st.next_level_points, 450);
}

#[tokio::test]
async fn stats_rank_agrees_with_points_during_writes() {
  let s = store().await;
  let users = register_users(&s, 2).await;
  let (climber, rival) = (users[0].user_id, users[1].user_id);
  give(&s, rival, 15).await;

  let writer = {
    let s = s.clone();
    tokio::spawn(async move {
      for _ in 0..30 {
        give(&s, climber, 1).await;
      }
    })
  };

  for _ in 0..30 {
    let st = stats::compute(&s, climber, Utc::now()).await.unwrap();
    let expected = if st.points >= 15 { 1 } else { 2 };
    assert_eq!(st.rank, expected, "points {}", st.points);
    assert_eq!(st.weekly_points, st.points);
    tokio::task::yield_now().await;
  }
  writer.await.unwrap();

  let st = stats::compute(&s, climber, Utc::now()).await.unwrap();
  assert_eq!((st.points, st.rank), (30, 1));
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn leaderboard_top_two_of_three() {
  let s = store().await;
  let users = register_users(&s, 3).await;
  give(&s, users[0].user_id, 20).await;
  give(&s, users[1].user_id, 10).await;
  give(&s, users[2].user_id, 30).await;

  let top = leaderboard::top(&s, 2).await.unwrap();
  assert_eq!(top.len(), 2);
  assert_eq!((top[0].rank, top[0].total_points), (1, 30));
  assert_eq!((top[1].rank, top[1].total_points), (2, 20));
  assert_eq!(top[0].user_id, users[2].user_id);
  assert_eq!(top[0].email, users[2].email);
}

#[tokio::test]
async fn leaderboard_includes_users_without_points() {
  let s = store().await;
  let users = register_users(&s, 2).await;
  give(&s, users[0].user_id, 5).await;

  let top = leaderboard::top(&s, leaderboard::DEFAULT_LIMIT).await.unwrap();
  assert_eq!(top.len(), 2);
  assert_eq!(top[1].user_id, users[1].user_id);
  assert_eq!(top[1].total_points, 0);
  assert_eq!(top[1].rank, 2);
}

async fn register_users(s: &SqliteStore, n: usize) -> Vec<User> {
  let mut out = Vec::with_capacity(n);
  for i in 0..n {
    out.push(user(s, &format!("User{i}")).await);
  }
  out
}
