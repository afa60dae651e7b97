//! Action recorder: the point-earning sequences behind reports, confirmations
//! and comments.
//!
//! Each sequence is a list of independent steps rather than one transaction.
//! Every step is either additive (a ledger append) or idempotent (activity
//! log, badge evaluation), so a failure partway through leaves earlier steps
//! in place and the same sequence can be retried from the failed step.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error,
  activity::{ActivityAction, ActivityLogEntry},
  badge,
  points::{NewPointEntry, PointEntry, PointSource},
  report::{Comment, Confirmation, NewReport, Report, StoredReport},
  store::GamificationStore,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ReportSubmitted {
  pub report:        Report,
  pub points:        Vec<PointEntry>,
  /// Badges newly earned by the author.
  pub badges_earned: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfirmed {
  pub confirmation:         Confirmation,
  pub points:               Vec<PointEntry>,
  pub voter_badges_earned:  Vec<&'static str>,
  pub author_badges_earned: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentAdded {
  pub comment: Comment,
  pub points:  PointEntry,
}

// ─── Recorder ────────────────────────────────────────────────────────────────

/// Runs action sequences against a [`GamificationStore`].
pub struct ActionRecorder<'s, S> {
  store: &'s S,
}

impl<'s, S> ActionRecorder<'s, S>
where
  S: GamificationStore,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  async fn require_user(&self, user_id: Uuid) -> Result<(), S::Error> {
    match self.store.get_user(user_id).await? {
      Some(_) => Ok(()),
      None => Err(Error::UserNotFound(user_id).into()),
    }
  }

  async fn require_report(&self, report_id: Uuid) -> Result<Report, S::Error> {
    self
      .store
      .get_report(report_id)
      .await?
      .ok_or_else(|| Error::ReportNotFound(report_id).into())
  }

  /// Submit report → award points → first-report bonus → log activity →
  /// evaluate badges.
  pub async fn submit_report(
    &self,
    input: NewReport,
  ) -> Result<ReportSubmitted, S::Error> {
    let now = Utc::now();
    let user_id = input.user_id;
    self.require_user(user_id).await?;

    let has_photo = input.has_photo();
    let StoredReport { report, author_reports } =
      self.store.insert_report(input).await?;
    let report_ref = report.report_id.to_string();
    tracing::debug!(%user_id, report_id = %report.report_id, "report stored");

    let mut points = Vec::with_capacity(3);
    points.push(
      self
        .store
        .record_points(
          NewPointEntry::award(user_id, PointSource::SubmitReport)
            .with_meta("report_id", report_ref.as_str()),
        )
        .await?,
    );

    if has_photo {
      points.push(
        self
          .store
          .record_points(
            NewPointEntry::award(user_id, PointSource::AddPhoto)
              .with_meta("report_id", report_ref.as_str()),
          )
          .await?,
      );
    }

    if author_reports == 1 {
      points.push(
        self
          .store
          .record_points(
            NewPointEntry::award(user_id, PointSource::FirstReportBonus)
              .with_meta("report_id", report_ref.as_str()),
          )
          .await?,
      );
    }

    self
      .store
      .log_activity(ActivityLogEntry::new(
        user_id,
        ActivityAction::ReportSubmitted,
        now,
      ))
      .await?;

    let badges_earned = badge::evaluate(self.store, user_id, now).await?;

    Ok(ReportSubmitted { report, points, badges_earned })
  }

  /// Store vote → award voter → credit author → log voter activity →
  /// evaluate badges for both.
  pub async fn confirm_report(
    &self,
    report_id: Uuid,
    voter_id: Uuid,
  ) -> Result<ReportConfirmed, S::Error> {
    let now = Utc::now();
    let report = self.require_report(report_id).await?;
    self.require_user(voter_id).await?;

    if report.user_id == voter_id {
      tracing::warn!(%report_id, %voter_id, "rejected self-confirmation");
      return Err(Error::SelfConfirmation.into());
    }

    let confirmation = self.store.insert_confirmation(report_id, voter_id).await?;
    let report_ref = report_id.to_string();

    let voter_entry = self
      .store
      .record_points(
        NewPointEntry::award(voter_id, PointSource::ConfirmReport)
          .with_meta("report_id", report_ref.as_str()),
      )
      .await?;
    let author_entry = self
      .store
      .record_points(
        NewPointEntry::award(report.user_id, PointSource::ReportEngaged)
          .with_meta("report_id", report_ref.as_str())
          .with_meta("voter_id", voter_id.to_string()),
      )
      .await?;

    self
      .store
      .log_activity(ActivityLogEntry::new(
        voter_id,
        ActivityAction::ReportConfirmed,
        now,
      ))
      .await?;

    let voter_badges_earned = badge::evaluate(self.store, voter_id, now).await?;
    let author_badges_earned =
      badge::evaluate(self.store, report.user_id, now).await?;

    Ok(ReportConfirmed {
      confirmation,
      points: vec![voter_entry, author_entry],
      voter_badges_earned,
      author_badges_earned,
    })
  }

  /// Store comment → award points → log activity.
  pub async fn add_comment(
    &self,
    report_id: Uuid,
    user_id: Uuid,
    content: String,
  ) -> Result<CommentAdded, S::Error> {
    if content.trim().is_empty() {
      return Err(Error::EmptyComment.into());
    }
    let now = Utc::now();
    self.require_report(report_id).await?;
    self.require_user(user_id).await?;

    let comment = self.store.insert_comment(report_id, user_id, content).await?;

    let points = self
      .store
      .record_points(
        NewPointEntry::award(user_id, PointSource::AddComment)
          .with_meta("report_id", report_id.to_string())
          .with_meta("comment_id", comment.comment_id.to_string()),
      )
      .await?;

    self
      .store
      .log_activity(ActivityLogEntry::new(
        user_id,
        ActivityAction::CommentAdded,
        now,
      ))
      .await?;

    Ok(CommentAdded { comment, points })
  }

  /// Append an offsetting entry. Ledger entries are never edited; this is the
  /// only way to take points back.
  pub async fn record_correction(
    &self,
    user_id: Uuid,
    points: i64,
    reason: Option<String>,
  ) -> Result<PointEntry, S::Error> {
    self.require_user(user_id).await?;

    let mut entry = NewPointEntry::new(user_id, PointSource::Correction, points);
    if let Some(reason) = reason {
      entry = entry.with_meta("reason", reason);
    }
    let entry = self.store.record_points(entry).await?;
    tracing::info!(%user_id, points, "ledger correction recorded");
    Ok(entry)
  }
}
