//! Campus DB - Database abstractions
//!
//! SQLx-based database layer for campus services.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_db::{create_pool, ensure_schema, Repositories};
//!
//! let pool = create_pool("postgres://localhost/campus").await?;
//! ensure_schema(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! // Use repositories
//! let student = repos.students.find_by_id(student_id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;
pub mod schema;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_limit, DbPool};
pub use repo::*;
pub use schema::ensure_schema;
