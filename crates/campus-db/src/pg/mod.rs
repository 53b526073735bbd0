//! PostgreSQL repository implementations

mod auth_token;
mod class;
mod fee_group;
mod fee_master;
mod fee_transaction;
mod fee_type;
mod section;
mod session;
mod student;
mod student_fee;
mod user;

pub use auth_token::PgAuthTokenRepository;
pub use class::PgClassRepository;
pub use fee_group::PgFeeGroupRepository;
pub use fee_master::PgFeeMasterRepository;
pub use fee_transaction::PgFeeTransactionRepository;
pub use fee_type::PgFeeTypeRepository;
pub use section::PgSectionRepository;
pub use session::PgSessionRepository;
pub use student::PgStudentRepository;
pub use student_fee::PgStudentFeeRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub auth_tokens: PgAuthTokenRepository,
    pub sessions: PgSessionRepository,
    pub classes: PgClassRepository,
    pub sections: PgSectionRepository,
    pub students: PgStudentRepository,
    pub fee_groups: PgFeeGroupRepository,
    pub fee_types: PgFeeTypeRepository,
    pub fee_masters: PgFeeMasterRepository,
    pub student_fees: PgStudentFeeRepository,
    pub fee_transactions: PgFeeTransactionRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            auth_tokens: PgAuthTokenRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            classes: PgClassRepository::new(pool.clone()),
            sections: PgSectionRepository::new(pool.clone()),
            students: PgStudentRepository::new(pool.clone()),
            fee_groups: PgFeeGroupRepository::new(pool.clone()),
            fee_types: PgFeeTypeRepository::new(pool.clone()),
            fee_masters: PgFeeMasterRepository::new(pool.clone()),
            student_fees: PgStudentFeeRepository::new(pool.clone()),
            fee_transactions: PgFeeTransactionRepository::new(pool),
        }
    }
}
