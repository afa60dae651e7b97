//! SQLite implementation of [`GamificationStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use civic_core::{
  activity::ActivityLogEntry,
  badge::{ActivityCounts, Badge, CATALOG, UserBadgeAward},
  leaderboard::UserTotal,
  points::{NewPointEntry, PointEntry},
  report::{Comment, Confirmation, NewReport, Report, StoredReport},
  stats::{StatsSnapshot, StatsWindows},
  store::GamificationStore,
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawAward, RawBadge, RawPointEntry, RawReport, RawStatsSnapshot, RawUser,
    RawUserPoints, RawUserTotal, encode_date, encode_dt, encode_meta, encode_uuid,
  },
  schema::{SCHEMA, SEED_BADGE},
};

const SUM_POINTS: &str =
  "SELECT COALESCE(SUM(points), 0) FROM points_ledger WHERE user_id = ?1";

const SUM_POINTS_SINCE: &str = "SELECT COALESCE(SUM(points), 0) FROM points_ledger
   WHERE user_id = ?1 AND created_at >= ?2";

const ACTIVE_DAYS_SINCE: &str = "SELECT COUNT(DISTINCT happened_on) FROM activity_log
   WHERE user_id = ?1 AND happened_on >= ?2";

/// Per-user ledger totals; users without entries are absent.
fn ledger_totals(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawUserPoints>> {
  let mut stmt = conn.prepare(
    "SELECT user_id, SUM(points) AS total
     FROM points_ledger
     GROUP BY user_id
     ORDER BY total DESC",
  )?;
  stmt
    .query_map([], |row| {
      Ok(RawUserPoints {
        user_id:      row.get(0)?,
        total_points: row.get(1)?,
      })
    })?
    .collect()
}

/// Server-assigned timestamps are truncated to the stored precision so the
/// values handed back match what a later read decodes.
fn stamp(at: DateTime<Utc>) -> DateTime<Utc> { at.trunc_subsecs(6) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gamification store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and seed
  /// the badge catalogue.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let seeded = self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        let mut seeded = 0;
        for def in CATALOG {
          seeded += conn.execute(
            SEED_BADGE,
            rusqlite::params![
              def.id,
              def.name,
              def.description,
              def.rarity.as_ref(),
              def.icon_name,
              def.color,
            ],
          )?;
        }
        Ok(seeded)
      })
      .await?;
    tracing::debug!(seeded, "schema ready");
    Ok(())
  }

  /// Run a single-value aggregate query for one user.
  async fn user_scalar<T>(
    &self,
    sql: &'static str,
    user_id: Uuid,
    extra: Option<String>,
  ) -> Result<T>
  where
    T: rusqlite::types::FromSql + Send + 'static,
  {
    let id_str = encode_uuid(user_id);
    let value = self
      .conn
      .call(move |conn| {
        let value = match extra {
          Some(extra) => conn
            .query_row(sql, rusqlite::params![id_str, extra], |r| r.get(0))?,
          None => conn.query_row(sql, rusqlite::params![id_str], |r| r.get(0))?,
        };
        Ok(value)
      })
      .await?;
    Ok(value)
  }
}

// ─── GamificationStore impl ──────────────────────────────────────────────────

impl GamificationStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      created_at: stamp(Utc::now()),
    };

    let id_str = encode_uuid(user.user_id);
    let name   = user.name.clone();
    let email  = user.email.clone();
    let at_str = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO users (user_id, name, email, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, email, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(civic_core::Error::DuplicateEmail(user.email).into());
    }
    Ok(user)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, name, email, created_at FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawUser {
                user_id:    row.get(0)?,
                name:       row.get(1)?,
                email:      row.get(2)?,
                created_at: row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn count_users(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn insert_report(&self, input: NewReport) -> Result<StoredReport> {
    let report = Report {
      report_id:   Uuid::new_v4(),
      user_id:     input.user_id,
      title:       input.title,
      description: input.description,
      category:    input.category,
      photo_url:   input.photo_url,
      latitude:    input.latitude,
      longitude:   input.longitude,
      created_at:  stamp(Utc::now()),
    };

    let report_id_str = encode_uuid(report.report_id);
    let user_id_str   = encode_uuid(report.user_id);
    let title         = report.title.clone();
    let description   = report.description.clone();
    let category      = report.category.clone();
    let photo_url     = report.photo_url.clone();
    let (lat, lon)    = (report.latitude, report.longitude);
    let at_str        = encode_dt(report.created_at);

    // Insert and count in one closure: concurrent submissions by the same
    // author must each see a distinct count.
    let author_reports: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO reports (
             report_id, user_id, title, description, category,
             photo_url, latitude, longitude, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            report_id_str,
            user_id_str,
            title,
            description,
            category,
            photo_url,
            lat,
            lon,
            at_str,
          ],
        )?;
        let count = tx.query_row(
          "SELECT COUNT(*) FROM reports WHERE user_id = ?1",
          rusqlite::params![user_id_str],
          |r| r.get(0),
        )?;
        tx.commit()?;
        Ok(count)
      })
      .await?;

    Ok(StoredReport { report, author_reports: author_reports as u64 })
  }

  async fn get_report(&self, report_id: Uuid) -> Result<Option<Report>> {
    let id_str = encode_uuid(report_id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT report_id, user_id, title, description, category,
                    photo_url, latitude, longitude, created_at
             FROM reports WHERE report_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawReport {
                report_id:   row.get(0)?,
                user_id:     row.get(1)?,
                title:       row.get(2)?,
                description: row.get(3)?,
                category:    row.get(4)?,
                photo_url:   row.get(5)?,
                latitude:    row.get(6)?,
                longitude:   row.get(7)?,
                created_at:  row.get(8)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawReport::into_report).transpose()
  }

  async fn insert_confirmation(
    &self,
    report_id: Uuid,
    voter_id:  Uuid,
  ) -> Result<Confirmation> {
    let confirmation = Confirmation {
      report_id,
      voter_id,
      created_at: stamp(Utc::now()),
    };

    let report_id_str = encode_uuid(report_id);
    let voter_id_str  = encode_uuid(voter_id);
    let at_str        = encode_dt(confirmation.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO report_votes (report_id, voter_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![report_id_str, voter_id_str, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(
        civic_core::Error::AlreadyConfirmed { report_id, voter_id }.into(),
      );
    }
    Ok(confirmation)
  }

  async fn insert_comment(
    &self,
    report_id: Uuid,
    user_id:   Uuid,
    content:   String,
  ) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      report_id,
      user_id,
      content,
      created_at: stamp(Utc::now()),
    };

    let comment_id_str = encode_uuid(comment.comment_id);
    let report_id_str  = encode_uuid(report_id);
    let user_id_str    = encode_uuid(user_id);
    let content        = comment.content.clone();
    let at_str         = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, report_id, user_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![comment_id_str, report_id_str, user_id_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn activity_counts(&self, user_id: Uuid) -> Result<ActivityCounts> {
    let id_str = encode_uuid(user_id);

    let (reports, confirmations): (i64, i64) = self
      .conn
      .call(move |conn| {
        let reports: i64 = conn.query_row(
          "SELECT COUNT(*) FROM reports WHERE user_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;
        let confirmations: i64 = conn.query_row(
          "SELECT COUNT(*) FROM report_votes WHERE voter_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;
        Ok((reports, confirmations))
      })
      .await?;

    Ok(ActivityCounts {
      reports_submitted:  reports as u64,
      confirmations_made: confirmations as u64,
    })
  }

  // ── Ledger writes ─────────────────────────────────────────────────────────

  async fn record_points(&self, input: NewPointEntry) -> Result<PointEntry> {
    let entry = PointEntry {
      entry_id:   Uuid::new_v4(),
      user_id:    input.user_id,
      source:     input.source,
      points:     input.points,
      meta:       input.meta,
      created_at: stamp(input.created_at),
    };

    let entry_id_str = encode_uuid(entry.entry_id);
    let user_id_str  = encode_uuid(entry.user_id);
    let source_str   = entry.source.as_ref().to_owned();
    let points       = entry.points;
    let meta_str     = encode_meta(&entry.meta)?;
    let at_str       = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO points_ledger (entry_id, user_id, source, points, meta, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![entry_id_str, user_id_str, source_str, points, meta_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      user_id = %entry.user_id,
      source = %entry.source,
      points = entry.points,
      "points recorded"
    );
    Ok(entry)
  }

  // ── Ledger reads ──────────────────────────────────────────────────────────

  async fn total_points(&self, user_id: Uuid) -> Result<i64> {
    self
      .user_scalar(SUM_POINTS, user_id, None)
      .await
  }

  async fn point_entries(&self, user_id: Uuid) -> Result<Vec<PointEntry>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawPointEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, user_id, source, points, meta, created_at
           FROM points_ledger
           WHERE user_id = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawPointEntry {
              entry_id:   row.get(0)?,
              user_id:    row.get(1)?,
              source:     row.get(2)?,
              points:     row.get(3)?,
              meta:       row.get(4)?,
              created_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPointEntry::into_entry).collect()
  }

  async fn user_totals(&self, limit: usize) -> Result<Vec<UserTotal>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawUserTotal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.user_id, u.name, u.email,
                  COALESCE(SUM(p.points), 0) AS total_points
           FROM users u
           LEFT JOIN points_ledger p ON p.user_id = u.user_id
           GROUP BY u.user_id, u.name, u.email
           ORDER BY total_points DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(RawUserTotal {
              user_id:      row.get(0)?,
              name:         row.get(1)?,
              email:        row.get(2)?,
              total_points: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUserTotal::into_user_total).collect()
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn stats_snapshot(
    &self,
    user_id: Uuid,
    windows: StatsWindows,
  ) -> Result<StatsSnapshot> {
    let id_str     = encode_uuid(user_id);
    let week_str   = encode_dt(windows.week_since);
    let month_str  = encode_dt(windows.month_since);
    let streak_str = encode_date(windows.streak_since);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let scalar = |sql: &str, extra: Option<&str>| -> rusqlite::Result<i64> {
          match extra {
            Some(extra) => {
              tx.query_row(sql, rusqlite::params![id_str, extra], |r| r.get(0))
            }
            None => tx.query_row(sql, rusqlite::params![id_str], |r| r.get(0)),
          }
        };

        let raw = RawStatsSnapshot {
          total_points:   scalar(SUM_POINTS, None)?,
          weekly_points:  scalar(SUM_POINTS_SINCE, Some(week_str.as_str()))?,
          monthly_points: scalar(SUM_POINTS_SINCE, Some(month_str.as_str()))?,
          active_days:    scalar(ACTIVE_DAYS_SINCE, Some(streak_str.as_str()))?,
          badges:         scalar(
            "SELECT COUNT(*) FROM user_badges WHERE user_id = ?1",
            None,
          )?,
          total_users:    tx.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?,
          totals:         ledger_totals(&tx)?,
        };
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_snapshot()
  }

  // ── Activity log ──────────────────────────────────────────────────────────

  async fn log_activity(&self, entry: ActivityLogEntry) -> Result<bool> {
    let user_id_str = encode_uuid(entry.user_id);
    let day_str     = encode_date(entry.happened_on);
    let action_str  = entry.action.as_ref().to_owned();
    let at_str      = encode_dt(entry.created_at);

    // A second action on the same day hits the UNIQUE constraint and is
    // dropped.
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO activity_log (user_id, happened_on, action, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id_str, day_str, action_str, at_str],
        )?)
      })
      .await?;

    Ok(inserted == 1)
  }

  async fn active_days_since(
    &self,
    user_id: Uuid,
    since:   NaiveDate,
  ) -> Result<u32> {
    let days: i64 = self
      .user_scalar(ACTIVE_DAYS_SINCE, user_id, Some(encode_date(since)))
      .await?;
    Ok(days as u32)
  }

  // ── Badges ────────────────────────────────────────────────────────────────

  async fn list_badges(&self) -> Result<Vec<Badge>> {
    let raws: Vec<RawBadge> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, description, rarity, icon_name, color FROM badges",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawBadge {
              id:          row.get(0)?,
              name:        row.get(1)?,
              description: row.get(2)?,
              rarity:      row.get(3)?,
              icon_name:   row.get(4)?,
              color:       row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBadge::into_badge).collect()
  }

  async fn award_badge(
    &self,
    user_id:   Uuid,
    badge_id:  &'static str,
    earned_at: DateTime<Utc>,
  ) -> Result<bool> {
    let user_id_str = encode_uuid(user_id);
    let at_str      = encode_dt(earned_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO user_badges (user_id, badge_id, earned_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_id_str, badge_id, at_str],
        )?)
      })
      .await?;

    Ok(inserted == 1)
  }

  async fn user_badges(&self, user_id: Uuid) -> Result<Vec<UserBadgeAward>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawAward> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, badge_id, earned_at FROM user_badges
           WHERE user_id = ?1
           ORDER BY earned_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAward {
              user_id:   row.get(0)?,
              badge_id:  row.get(1)?,
              earned_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAward::into_award).collect()
  }
}
