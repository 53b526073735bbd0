//! Session service: lifecycle, activation switching, date checks, stats.
//!
//! Activation atomicity lives in the repository layer; every path that turns
//! a session active runs its deactivation sweep and write in one transaction.
//! This service adds input validation and the read-side computations.

use campus_db::pg::PgSessionRepository;
use campus_db::{CreateSession, DbError, SessionRepository, SessionRow, UpdateSession};
use campus_types::SessionStatus;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::dates::{days_remaining, elapsed_percent, ranges_overlap};
use crate::error::AcademicError;

/// Input for creating a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SessionStatus,
}

/// Partial session update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SessionStatus>,
}

/// Result of an advisory date-range check.
#[derive(Debug, Clone, Serialize)]
pub struct DateValidation {
    /// True when the range overlaps no other session
    pub valid: bool,
    /// The first overlapping session, if any
    pub conflict: Option<ConflictingSession>,
}

/// Minimal view of a session that conflicts with a proposed range.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictingSession {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<SessionRow> for ConflictingSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

/// Dependent counts and time progress for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub students: i64,
    pub classes: i64,
    pub sections: i64,
    /// Days until end_date, negative once past
    pub days_remaining: i64,
    /// Elapsed share of the range, clamped to [0, 100]
    pub progress_percent: f64,
}

/// Session service generic over its repository.
pub struct SessionService<R: SessionRepository> {
    sessions: Arc<R>,
}

/// Session service wired to the Postgres repository.
pub type SessionServiceImpl = SessionService<PgSessionRepository>;

impl<R: SessionRepository> SessionService<R> {
    /// Create a new session service.
    pub fn new(sessions: Arc<R>) -> Self {
        Self { sessions }
    }

    /// List all sessions, newest first.
    pub async fn list(&self) -> Result<Vec<SessionRow>, AcademicError> {
        Ok(self.sessions.list().await?)
    }

    /// Fetch one session.
    pub async fn get(&self, id: Uuid) -> Result<SessionRow, AcademicError> {
        self.sessions
            .find_by_id(id)
            .await?
            .ok_or(AcademicError::SessionNotFound(id))
    }

    /// The currently active session, if one exists.
    pub async fn active_session(&self) -> Result<Option<SessionRow>, AcademicError> {
        Ok(self.sessions.find_active().await?)
    }

    /// Create a session; creating it active deactivates every other session.
    pub async fn create(&self, new: NewSession) -> Result<SessionRow, AcademicError> {
        let name = validated_name(&new.name)?;
        validate_order(new.start_date, new.end_date)?;

        let row = self
            .sessions
            .create(CreateSession {
                id: Uuid::new_v4(),
                name,
                start_date: new.start_date,
                end_date: new.end_date,
                status: new.status.as_str().to_string(),
            })
            .await?;

        tracing::info!(session_id = %row.id, name = %row.name, status = %row.status, "Created session");
        Ok(row)
    }

    /// Apply a partial update; making a session active sweeps the others.
    ///
    /// Dates are validated against the merged result, so updating only the
    /// start date still catches an inversion against the stored end date.
    pub async fn update(&self, id: Uuid, update: SessionUpdate) -> Result<SessionRow, AcademicError> {
        let existing = self.get(id).await?;

        let start = update.start_date.unwrap_or(existing.start_date);
        let end = update.end_date.unwrap_or(existing.end_date);
        validate_order(start, end)?;

        let name = match &update.name {
            Some(name) => Some(validated_name(name)?),
            None => None,
        };

        let row = self
            .sessions
            .update(
                id,
                UpdateSession {
                    name,
                    start_date: update.start_date,
                    end_date: update.end_date,
                    status: update.status.map(|s| s.as_str().to_string()),
                },
            )
            .await
            .map_err(|err| not_found_as_session(err, id))?;

        tracing::info!(session_id = %row.id, "Updated session");
        Ok(row)
    }

    /// Make `id` the single active session.
    ///
    /// An unknown id reports NotFound and leaves every status untouched.
    pub async fn switch_active(&self, id: Uuid) -> Result<SessionRow, AcademicError> {
        let row = self
            .sessions
            .switch_active(id)
            .await
            .map_err(|err| not_found_as_session(err, id))?;

        tracing::info!(session_id = %row.id, name = %row.name, "Switched active session");
        Ok(row)
    }

    /// Delete a session.
    pub async fn delete(&self, id: Uuid) -> Result<(), AcademicError> {
        self.sessions
            .delete(id)
            .await
            .map_err(|err| not_found_as_session(err, id))?;

        tracing::info!(session_id = %id, "Deleted session");
        Ok(())
    }

    /// Advisory overlap check for a proposed date range.
    ///
    /// Boundary-inclusive against every session except `exclude`. Nothing is
    /// enforced at the storage layer; callers decide what to do with a
    /// conflict.
    pub async fn validate_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<DateValidation, AcademicError> {
        let sessions = self.sessions.list().await?;
        let conflict = sessions
            .into_iter()
            .filter(|s| Some(s.id) != exclude)
            .find(|s| ranges_overlap(start, end, s.start_date, s.end_date));

        Ok(DateValidation {
            valid: conflict.is_none(),
            conflict: conflict.map(ConflictingSession::from),
        })
    }

    /// Dependent counts plus time progress for one session.
    pub async fn stats(&self, id: Uuid) -> Result<SessionStats, AcademicError> {
        let row = self.get(id).await?;
        let deps = self.sessions.dependent_counts(id).await?;
        let today = Utc::now().date_naive();

        Ok(SessionStats {
            session_id: row.id,
            is_active: row.is_active(),
            students: deps.students,
            classes: deps.classes,
            sections: deps.sections,
            days_remaining: days_remaining(row.end_date, today),
            progress_percent: elapsed_percent(row.start_date, row.end_date, today),
            name: row.name,
        })
    }
}

impl<R: SessionRepository> std::fmt::Debug for SessionService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService").finish_non_exhaustive()
    }
}

fn validated_name(name: &str) -> Result<String, AcademicError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AcademicError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validate_order(start: NaiveDate, end: NaiveDate) -> Result<(), AcademicError> {
    // Single-day sessions (start == end) are allowed.
    if start > end {
        return Err(AcademicError::InvalidDateRange { start, end });
    }
    Ok(())
}

fn not_found_as_session(err: DbError, id: Uuid) -> AcademicError {
    match err {
        DbError::NotFound => AcademicError::SessionNotFound(id),
        other => AcademicError::Db(other),
    }
}
