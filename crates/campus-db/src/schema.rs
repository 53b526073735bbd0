//! Idempotent schema bootstrap
//!
//! Applied at service startup. Every statement is `IF NOT EXISTS`, so an
//! already-provisioned database passes through untouched.

use crate::DbPool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS auth_tokens (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    expires_at TIMESTAMPTZ NOT NULL,
    revoked BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE IF NOT EXISTS sessions (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status TEXT NOT NULL DEFAULT 'inactive',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS classes (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    session_id UUID NOT NULL REFERENCES sessions(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (name, session_id)
);

CREATE TABLE IF NOT EXISTS sections (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    class_id UUID NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (name, class_id)
);

CREATE TABLE IF NOT EXISTS students (
    id UUID PRIMARY KEY,
    admission_no TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    guardian_name TEXT,
    class_id UUID NOT NULL REFERENCES classes(id),
    section_id UUID REFERENCES sections(id),
    session_id UUID NOT NULL REFERENCES sessions(id),
    admission_date DATE NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS fee_groups (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    session_id UUID NOT NULL REFERENCES sessions(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (name, session_id)
);

CREATE TABLE IF NOT EXISTS fee_types (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    amount_cents BIGINT NOT NULL,
    fee_group_id UUID NOT NULL REFERENCES fee_groups(id),
    session_id UUID NOT NULL REFERENCES sessions(id),
    frequency TEXT NOT NULL DEFAULT 'one_time',
    due_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (name, fee_group_id, session_id)
);

CREATE TABLE IF NOT EXISTS fee_master (
    id UUID PRIMARY KEY,
    fee_group_id UUID NOT NULL REFERENCES fee_groups(id),
    fee_type_id UUID NOT NULL REFERENCES fee_types(id),
    class_id UUID NOT NULL REFERENCES classes(id),
    session_id UUID NOT NULL REFERENCES sessions(id),
    amount_cents BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (fee_type_id, class_id, session_id)
);

CREATE TABLE IF NOT EXISTS student_fees (
    id UUID PRIMARY KEY,
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    fee_type_id UUID NOT NULL REFERENCES fee_types(id),
    session_id UUID NOT NULL REFERENCES sessions(id),
    amount_due_cents BIGINT NOT NULL,
    amount_paid_cents BIGINT NOT NULL DEFAULT 0,
    due_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (student_id, fee_type_id, session_id)
);

CREATE TABLE IF NOT EXISTS fee_transactions (
    id UUID PRIMARY KEY,
    receipt_no TEXT NOT NULL UNIQUE,
    student_id UUID NOT NULL REFERENCES students(id),
    fee_type_id UUID NOT NULL REFERENCES fee_types(id),
    session_id UUID NOT NULL REFERENCES sessions(id),
    amount_cents BIGINT NOT NULL,
    payment_mode TEXT NOT NULL,
    reference_no TEXT,
    collected_by UUID NOT NULL REFERENCES users(id),
    payment_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions (status);
CREATE INDEX IF NOT EXISTS idx_students_class ON students (class_id, session_id);
CREATE INDEX IF NOT EXISTS idx_student_fees_student ON student_fees (student_id, session_id);
CREATE INDEX IF NOT EXISTS idx_fee_master_class ON fee_master (class_id, session_id);
CREATE INDEX IF NOT EXISTS idx_fee_transactions_date ON fee_transactions (payment_date);
CREATE INDEX IF NOT EXISTS idx_fee_transactions_student ON fee_transactions (student_id);
CREATE INDEX IF NOT EXISTS idx_auth_tokens_user ON auth_tokens (user_id);
"#;

/// Create every table and index the services expect
pub async fn ensure_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::debug!("Database schema ensured");
    Ok(())
}
