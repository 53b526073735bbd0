//! Mock session repository for testing.
//!
//! Mirrors the transactional semantics of the Postgres implementation: any
//! path that activates a session deactivates the rest first, and an unknown
//! target id leaves every status untouched.

use async_trait::async_trait;
use campus_db::{
    CreateSession, DbError, DbResult, SessionDependents, SessionRepository, SessionRow,
    UpdateSession,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory session repository for testing
#[derive(Default, Clone)]
pub struct MockSessionRepository {
    sessions: Arc<DashMap<Uuid, SessionRow>>,
    dependents: Arc<DashMap<Uuid, SessionDependents>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session row directly
    #[allow(dead_code)]
    pub fn insert_session(&self, session: SessionRow) {
        self.sessions.insert(session.id, session);
    }

    /// Set the dependent counts reported for a session
    #[allow(dead_code)]
    pub fn set_dependents(&self, id: Uuid, students: i64, classes: i64, sections: i64) {
        self.dependents.insert(
            id,
            SessionDependents {
                students,
                classes,
                sections,
            },
        );
    }

    /// Number of sessions currently marked active
    #[allow(dead_code)]
    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|r| r.value().status == "active")
            .count()
    }

    fn deactivate_all_except(&self, keep: Option<Uuid>) {
        for mut row in self.sessions.iter_mut() {
            if Some(row.id) != keep && row.status == "active" {
                row.status = "inactive".to_string();
            }
        }
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>> {
        Ok(self.sessions.get(&id).map(|r| r.value().clone()))
    }

    async fn find_active(&self) -> DbResult<Option<SessionRow>> {
        Ok(self
            .sessions
            .iter()
            .find(|r| r.value().status == "active")
            .map(|r| r.value().clone()))
    }

    async fn list(&self) -> DbResult<Vec<SessionRow>> {
        let mut rows: Vec<SessionRow> = self.sessions.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(rows)
    }

    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        if session.status == "active" {
            self.deactivate_all_except(None);
        }
        let row = SessionRow {
            id: session.id,
            name: session.name,
            start_date: session.start_date,
            end_date: session.end_date,
            status: session.status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.sessions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateSession) -> DbResult<SessionRow> {
        // Unknown id aborts before the sweep, like a rolled-back transaction.
        if !self.sessions.contains_key(&id) {
            return Err(DbError::NotFound);
        }
        if update.status.as_deref() == Some("active") {
            self.deactivate_all_except(Some(id));
        }
        let mut row = self.sessions.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(name) = update.name {
            row.name = name;
        }
        if let Some(start) = update.start_date {
            row.start_date = start;
        }
        if let Some(end) = update.end_date {
            row.end_date = end;
        }
        if let Some(status) = update.status {
            row.status = status;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn switch_active(&self, id: Uuid) -> DbResult<SessionRow> {
        if !self.sessions.contains_key(&id) {
            return Err(DbError::NotFound);
        }
        self.deactivate_all_except(Some(id));
        let mut row = self.sessions.get_mut(&id).ok_or(DbError::NotFound)?;
        row.status = "active".to_string();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }

    async fn dependent_counts(&self, id: Uuid) -> DbResult<SessionDependents> {
        Ok(self
            .dependents
            .get(&id)
            .map(|r| *r.value())
            .unwrap_or(SessionDependents {
                students: 0,
                classes: 0,
                sections: 0,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_session(status: &str, start: NaiveDate, end: NaiveDate) -> CreateSession {
        CreateSession {
            id: Uuid::new_v4(),
            name: "Mock Session".to_string(),
            start_date: start,
            end_date: end,
            status: status.to_string(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_create_active_sweeps_previous() {
        let repo = MockSessionRepository::new();
        let first = repo
            .create(new_session("active", d(2024, 4, 1), d(2025, 3, 31)))
            .await
            .unwrap();
        repo.create(new_session("active", d(2025, 4, 1), d(2026, 3, 31)))
            .await
            .unwrap();

        assert_eq!(repo.active_count(), 1);
        let first_now = repo.find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(first_now.status, "inactive");
    }

    #[tokio::test]
    async fn test_switch_unknown_id_is_untouched() {
        let repo = MockSessionRepository::new();
        repo.create(new_session("active", d(2024, 4, 1), d(2025, 3, 31)))
            .await
            .unwrap();

        let result = repo.switch_active(Uuid::new_v4()).await;
        assert!(matches!(result, Err(DbError::NotFound)));
        assert_eq!(repo.active_count(), 1);
    }
}
