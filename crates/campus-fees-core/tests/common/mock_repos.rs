//! Mock repositories for testing

use async_trait::async_trait;
use campus_db::{
    CollectionTotals, CreateFeeMaster, CreateStudent, CreateStudentFee, DayTotalsRow, DbError,
    DbResult, FeeMasterDetailRow, FeeMasterRepository, FeeMasterRow, FeeTransactionRepository,
    FeeTransactionRow, ModeTotalsRow, PaymentOutcome, RecordPayment, StudentFeeDetailRow,
    StudentFeeFilter, StudentFeeRepository, StudentFeeRow, StudentFilter, StudentRepository,
    StudentRow, UpdateStudent,
};
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory fee template repository for testing
#[derive(Default, Clone)]
pub struct MockFeeMasterRepository {
    masters: Arc<DashMap<Uuid, FeeMasterRow>>,
    // fee_type_id -> (name, due_date), stands in for the fee_types join
    fee_types: Arc<DashMap<Uuid, (String, Option<NaiveDate>)>>,
}

impl MockFeeMasterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fee type the templates can join against
    #[allow(dead_code)]
    pub fn register_fee_type(&self, fee_type_id: Uuid, name: &str, due_date: Option<NaiveDate>) {
        self.fee_types
            .insert(fee_type_id, (name.to_string(), due_date));
    }

    /// Insert a template row directly
    #[allow(dead_code)]
    pub fn insert_template(&self, master: FeeMasterRow) {
        self.masters.insert(master.id, master);
    }

    /// Build a template row for the given class/session
    #[allow(dead_code)]
    pub fn test_template(
        fee_type_id: Uuid,
        class_id: Uuid,
        session_id: Uuid,
        amount_cents: i64,
    ) -> FeeMasterRow {
        FeeMasterRow {
            id: Uuid::new_v4(),
            fee_group_id: Uuid::new_v4(),
            fee_type_id,
            class_id,
            session_id,
            amount_cents,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl FeeMasterRepository for MockFeeMasterRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeMasterRow>> {
        Ok(self.masters.get(&id).map(|r| r.value().clone()))
    }

    async fn list(
        &self,
        session_id: Option<Uuid>,
        class_id: Option<Uuid>,
    ) -> DbResult<Vec<FeeMasterRow>> {
        Ok(self
            .masters
            .iter()
            .filter(|r| session_id.map_or(true, |s| r.session_id == s))
            .filter(|r| class_id.map_or(true, |c| r.class_id == c))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn list_for_class(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<FeeMasterDetailRow>> {
        Ok(self
            .masters
            .iter()
            .filter(|r| r.class_id == class_id && r.session_id == session_id)
            .map(|r| {
                let (fee_type_name, due_date) = self
                    .fee_types
                    .get(&r.fee_type_id)
                    .map(|t| t.value().clone())
                    .unwrap_or(("Unregistered".to_string(), None));
                FeeMasterDetailRow {
                    id: r.id,
                    fee_group_id: r.fee_group_id,
                    fee_type_id: r.fee_type_id,
                    fee_type_name,
                    class_id: r.class_id,
                    session_id: r.session_id,
                    amount_cents: r.amount_cents,
                    due_date,
                }
            })
            .collect())
    }

    async fn create(&self, master: CreateFeeMaster) -> DbResult<FeeMasterRow> {
        let duplicate = self.masters.iter().any(|r| {
            r.fee_type_id == master.fee_type_id
                && r.class_id == master.class_id
                && r.session_id == master.session_id
        });
        if duplicate {
            return Err(DbError::Conflict(
                "fee_master_fee_type_id_class_id_session_id_key".to_string(),
            ));
        }
        let row = FeeMasterRow {
            id: master.id,
            fee_group_id: master.fee_group_id,
            fee_type_id: master.fee_type_id,
            class_id: master.class_id,
            session_id: master.session_id,
            amount_cents: master.amount_cents,
            created_at: Utc::now(),
        };
        self.masters.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_amount(&self, id: Uuid, amount_cents: i64) -> DbResult<FeeMasterRow> {
        let mut row = self.masters.get_mut(&id).ok_or(DbError::NotFound)?;
        row.amount_cents = amount_cents;
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.masters.remove(&id).map(|_| ()).ok_or(DbError::NotFound)
    }
}

/// In-memory student repository for testing
#[derive(Default, Clone)]
pub struct MockStudentRepository {
    students: Arc<DashMap<Uuid, StudentRow>>,
}

impl MockStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a student row directly
    #[allow(dead_code)]
    pub fn insert_student(&self, student: StudentRow) {
        self.students.insert(student.id, student);
    }

    /// Build an active student row in the given class/session
    #[allow(dead_code)]
    pub fn test_student(class_id: Uuid, session_id: Uuid) -> StudentRow {
        let id = Uuid::new_v4();
        StudentRow {
            id,
            admission_no: format!("ADM-{}", &id.simple().to_string()[..8]),
            first_name: "Test".to_string(),
            last_name: "Student".to_string(),
            email: None,
            phone: None,
            guardian_name: None,
            class_id,
            section_id: None,
            session_id,
            admission_date: Utc::now().date_naive(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl StudentRepository for MockStudentRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<StudentRow>> {
        Ok(self.students.get(&id).map(|r| r.value().clone()))
    }

    async fn list(&self, filter: StudentFilter) -> DbResult<Vec<StudentRow>> {
        let mut rows: Vec<StudentRow> = self
            .students
            .iter()
            .filter(|r| filter.class_id.map_or(true, |c| r.class_id == c))
            .filter(|r| filter.section_id.map_or(true, |s| r.section_id == Some(s)))
            .filter(|r| filter.session_id.map_or(true, |s| r.session_id == s))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.admission_date.cmp(&a.admission_date));
        Ok(rows)
    }

    async fn list_by_class_session(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<StudentRow>> {
        Ok(self
            .students
            .iter()
            .filter(|r| r.class_id == class_id && r.session_id == session_id && r.active)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn create(&self, student: CreateStudent) -> DbResult<StudentRow> {
        if self
            .students
            .iter()
            .any(|r| r.admission_no == student.admission_no)
        {
            return Err(DbError::Conflict("students_admission_no_key".to_string()));
        }
        let row = StudentRow {
            id: student.id,
            admission_no: student.admission_no,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            phone: student.phone,
            guardian_name: student.guardian_name,
            class_id: student.class_id,
            section_id: student.section_id,
            session_id: student.session_id,
            admission_date: student.admission_date,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.students.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateStudent) -> DbResult<StudentRow> {
        let mut row = self.students.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(first_name) = update.first_name {
            row.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            row.last_name = last_name;
        }
        if let Some(email) = update.email {
            row.email = Some(email);
        }
        if let Some(phone) = update.phone {
            row.phone = Some(phone);
        }
        if let Some(guardian_name) = update.guardian_name {
            row.guardian_name = Some(guardian_name);
        }
        if let Some(class_id) = update.class_id {
            row.class_id = class_id;
        }
        if let Some(section_id) = update.section_id {
            row.section_id = Some(section_id);
        }
        if let Some(active) = update.active {
            row.active = active;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.students
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

/// In-memory student fee and transaction store for testing.
///
/// One struct implements both repository traits so a single map backs fees
/// and their payments; `record_payment` mutates the fee through a DashMap
/// entry guard, which serializes concurrent payments against the same fee
/// the way the row lock does in Postgres.
#[derive(Default, Clone)]
pub struct MockLedger {
    fees: Arc<DashMap<Uuid, StudentFeeRow>>,
    // (student_id, fee_type_id, session_id) -> fee id
    fee_index: Arc<DashMap<(Uuid, Uuid, Uuid), Uuid>>,
    // fee_type_id -> (type name, group name), stands in for the joins
    fee_names: Arc<DashMap<Uuid, (String, String)>>,
    // student_id -> class_id, backs the class filter
    student_classes: Arc<DashMap<Uuid, Uuid>>,
    transactions: Arc<DashMap<Uuid, FeeTransactionRow>>,
    by_receipt: Arc<DashMap<String, Uuid>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the fee type and group a fee joins against
    #[allow(dead_code)]
    pub fn register_fee_type(&self, fee_type_id: Uuid, type_name: &str, group_name: &str) {
        self.fee_names
            .insert(fee_type_id, (type_name.to_string(), group_name.to_string()));
    }

    /// Record which class a student belongs to
    #[allow(dead_code)]
    pub fn link_student_class(&self, student_id: Uuid, class_id: Uuid) {
        self.student_classes.insert(student_id, class_id);
    }

    /// Insert a fee row directly
    #[allow(dead_code)]
    pub fn insert_fee(&self, fee: StudentFeeRow) {
        self.fee_index
            .insert((fee.student_id, fee.fee_type_id, fee.session_id), fee.id);
        self.fees.insert(fee.id, fee);
    }

    /// Build a fee row with the given amounts
    #[allow(dead_code)]
    pub fn test_fee(
        student_id: Uuid,
        fee_type_id: Uuid,
        session_id: Uuid,
        amount_due_cents: i64,
        amount_paid_cents: i64,
        due_date: Option<NaiveDate>,
    ) -> StudentFeeRow {
        StudentFeeRow {
            id: Uuid::new_v4(),
            student_id,
            fee_type_id,
            session_id,
            amount_due_cents,
            amount_paid_cents,
            due_date,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Current state of one fee row
    #[allow(dead_code)]
    pub fn fee(&self, id: Uuid) -> Option<StudentFeeRow> {
        self.fees.get(&id).map(|r| r.value().clone())
    }

    /// Number of transaction rows recorded
    #[allow(dead_code)]
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    fn detail_row(&self, fee: &StudentFeeRow) -> StudentFeeDetailRow {
        let (fee_type_name, fee_group_name) = self
            .fee_names
            .get(&fee.fee_type_id)
            .map(|n| n.value().clone())
            .unwrap_or(("Unregistered".to_string(), "Unregistered".to_string()));
        StudentFeeDetailRow {
            id: fee.id,
            student_id: fee.student_id,
            fee_type_id: fee.fee_type_id,
            fee_type_name,
            fee_group_name,
            session_id: fee.session_id,
            amount_due_cents: fee.amount_due_cents,
            amount_paid_cents: fee.amount_paid_cents,
            due_date: fee.due_date,
        }
    }

    fn sorted_details(&self, mut rows: Vec<StudentFeeDetailRow>) -> Vec<StudentFeeDetailRow> {
        rows.sort_by(|a, b| {
            (&a.fee_group_name, &a.fee_type_name).cmp(&(&b.fee_group_name, &b.fee_type_name))
        });
        rows
    }
}

#[async_trait]
impl StudentFeeRepository for MockLedger {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<StudentFeeRow>> {
        Ok(self.fees.get(&id).map(|r| r.value().clone()))
    }

    async fn list(&self, filter: StudentFeeFilter) -> DbResult<Vec<StudentFeeDetailRow>> {
        let rows = self
            .fees
            .iter()
            .filter(|r| filter.student_id.map_or(true, |s| r.student_id == s))
            .filter(|r| filter.session_id.map_or(true, |s| r.session_id == s))
            .filter(|r| {
                filter.class_id.map_or(true, |c| {
                    self.student_classes
                        .get(&r.student_id)
                        .map_or(false, |class| *class.value() == c)
                })
            })
            .map(|r| self.detail_row(r.value()))
            .collect();
        Ok(self.sorted_details(rows))
    }

    async fn list_for_student(
        &self,
        student_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<StudentFeeDetailRow>> {
        let rows = self
            .fees
            .iter()
            .filter(|r| r.student_id == student_id && r.session_id == session_id)
            .map(|r| self.detail_row(r.value()))
            .collect();
        Ok(self.sorted_details(rows))
    }

    async fn upsert_assignments(&self, assignments: Vec<CreateStudentFee>) -> DbResult<u64> {
        let mut written = 0;
        for assignment in assignments {
            let key = (
                assignment.student_id,
                assignment.fee_type_id,
                assignment.session_id,
            );
            match self.fee_index.get(&key).map(|id| *id.value()) {
                Some(existing) => {
                    if let Some(mut fee) = self.fees.get_mut(&existing) {
                        fee.amount_due_cents = assignment.amount_due_cents;
                        fee.due_date = assignment.due_date;
                        fee.updated_at = Utc::now();
                        written += 1;
                    }
                }
                None => {
                    self.insert_fee(StudentFeeRow {
                        id: Uuid::new_v4(),
                        student_id: assignment.student_id,
                        fee_type_id: assignment.fee_type_id,
                        session_id: assignment.session_id,
                        amount_due_cents: assignment.amount_due_cents,
                        amount_paid_cents: 0,
                        due_date: assignment.due_date,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    });
                    written += 1;
                }
            }
        }
        Ok(written)
    }
}

#[async_trait]
impl FeeTransactionRepository for MockLedger {
    async fn record_payment(&self, payment: RecordPayment) -> DbResult<PaymentOutcome> {
        // Entry guard stands in for the row lock; the balance re-check and
        // the write happen under it.
        let mut fee = self
            .fees
            .get_mut(&payment.student_fee_id)
            .ok_or(DbError::NotFound)?;

        if fee.amount_paid_cents + payment.amount_cents > fee.amount_due_cents {
            return Ok(PaymentOutcome::InsufficientBalance { fee: fee.clone() });
        }
        if self.by_receipt.contains_key(&payment.receipt_no) {
            return Err(DbError::Conflict(
                "fee_transactions_receipt_no_key".to_string(),
            ));
        }

        fee.amount_paid_cents += payment.amount_cents;
        fee.updated_at = Utc::now();

        let row = FeeTransactionRow {
            id: Uuid::new_v4(),
            receipt_no: payment.receipt_no.clone(),
            student_id: fee.student_id,
            fee_type_id: fee.fee_type_id,
            session_id: fee.session_id,
            amount_cents: payment.amount_cents,
            payment_mode: payment.payment_mode,
            reference_no: payment.reference_no,
            collected_by: payment.collected_by,
            payment_date: Utc::now(),
            created_at: Utc::now(),
        };
        self.by_receipt.insert(payment.receipt_no, row.id);
        self.transactions.insert(row.id, row.clone());

        Ok(PaymentOutcome::Recorded {
            transaction: row,
            fee: fee.clone(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeTransactionRow>> {
        Ok(self.transactions.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_receipt(&self, receipt_no: &str) -> DbResult<Option<FeeTransactionRow>> {
        Ok(self
            .by_receipt
            .get(receipt_no)
            .and_then(|id| self.transactions.get(id.value()).map(|r| r.value().clone())))
    }

    async fn list(&self, limit: i64) -> DbResult<Vec<FeeTransactionRow>> {
        let mut rows: Vec<FeeTransactionRow> = self
            .transactions
            .iter()
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn totals_for_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<CollectionTotals> {
        let mut totals = CollectionTotals {
            total_cents: 0,
            count: 0,
        };
        for row in self.transactions.iter() {
            if row.payment_date >= from && row.payment_date < to {
                totals.total_cents += row.amount_cents;
                totals.count += 1;
            }
        }
        Ok(totals)
    }

    async fn totals_by_mode(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<ModeTotalsRow>> {
        let mut by_mode: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for row in self.transactions.iter() {
            if row.payment_date >= from && row.payment_date < to {
                let entry = by_mode.entry(row.payment_mode.clone()).or_default();
                entry.0 += row.amount_cents;
                entry.1 += 1;
            }
        }
        Ok(by_mode
            .into_iter()
            .map(|(payment_mode, (total_cents, count))| ModeTotalsRow {
                payment_mode,
                total_cents,
                count,
            })
            .collect())
    }

    async fn daily_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DayTotalsRow>> {
        let mut by_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
        for row in self.transactions.iter() {
            if row.payment_date >= from && row.payment_date < to {
                let entry = by_day.entry(row.payment_date.date_naive()).or_default();
                entry.0 += row.amount_cents;
                entry.1 += 1;
            }
        }
        Ok(by_day
            .into_iter()
            .map(|(day, (total_cents, count))| DayTotalsRow {
                day,
                total_cents,
                count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ledger_upsert_preserves_payments() {
        let ledger = MockLedger::new();
        let student_id = Uuid::new_v4();
        let fee_type_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let fee = MockLedger::test_fee(student_id, fee_type_id, session_id, 50_000, 20_000, None);
        let fee_id = fee.id;
        ledger.insert_fee(fee);

        // Re-assignment refreshes the due amount but never the paid amount
        let written = ledger
            .upsert_assignments(vec![CreateStudentFee {
                student_id,
                fee_type_id,
                session_id,
                amount_due_cents: 60_000,
                due_date: None,
            }])
            .await
            .unwrap();
        assert_eq!(written, 1);

        let fee = ledger.fee(fee_id).unwrap();
        assert_eq!(fee.amount_due_cents, 60_000);
        assert_eq!(fee.amount_paid_cents, 20_000);
    }

    #[tokio::test]
    async fn test_mock_ledger_rejects_unknown_fee() {
        let ledger = MockLedger::new();
        let result = ledger
            .record_payment(RecordPayment {
                student_fee_id: Uuid::new_v4(),
                receipt_no: "RCP-X".to_string(),
                amount_cents: 100,
                payment_mode: "cash".to_string(),
                reference_no: None,
                collected_by: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_mock_student_repo_class_session_listing() {
        let repo = MockStudentRepository::new();
        let class_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        repo.insert_student(MockStudentRepository::test_student(class_id, session_id));
        let mut inactive = MockStudentRepository::test_student(class_id, session_id);
        inactive.active = false;
        repo.insert_student(inactive);
        repo.insert_student(MockStudentRepository::test_student(
            Uuid::new_v4(),
            session_id,
        ));

        let listed = repo
            .list_by_class_session(class_id, session_id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
