//! PostgreSQL student repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::StudentRow;
use crate::repo::{CreateStudent, StudentFilter, StudentRepository, UpdateStudent};

const STUDENT_COLUMNS: &str = "id, admission_no, first_name, last_name, email, phone, \
     guardian_name, class_id, section_id, session_id, admission_date, active, \
     created_at, updated_at";

/// PostgreSQL student repository
#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    /// Create a new student repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<StudentRow>> {
        let student = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn list(&self, filter: StudentFilter) -> DbResult<Vec<StudentRow>> {
        let students = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            SELECT {STUDENT_COLUMNS} FROM students
            WHERE ($1::uuid IS NULL OR class_id = $1)
              AND ($2::uuid IS NULL OR section_id = $2)
              AND ($3::uuid IS NULL OR session_id = $3)
            ORDER BY admission_date DESC, admission_no
            "#
        ))
        .bind(filter.class_id)
        .bind(filter.section_id)
        .bind(filter.session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn list_by_class_session(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<StudentRow>> {
        let students = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            SELECT {STUDENT_COLUMNS} FROM students
            WHERE class_id = $1 AND session_id = $2 AND active = TRUE
            ORDER BY admission_no
            "#
        ))
        .bind(class_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn create(&self, student: CreateStudent) -> DbResult<StudentRow> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            INSERT INTO students (id, admission_no, first_name, last_name, email, phone,
                                  guardian_name, class_id, section_id, session_id, admission_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(student.id)
        .bind(&student.admission_no)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.email)
        .bind(student.phone)
        .bind(student.guardian_name)
        .bind(student.class_id)
        .bind(student.section_id)
        .bind(student.session_id)
        .bind(student.admission_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateStudent) -> DbResult<StudentRow> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            UPDATE students
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                guardian_name = COALESCE($6, guardian_name),
                class_id = COALESCE($7, class_id),
                section_id = COALESCE($8, section_id),
                active = COALESCE($9, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.guardian_name)
        .bind(update.class_id)
        .bind(update.section_id)
        .bind(update.active)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
