//! Read access to payroll records.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;

use crate::db::{DataAccess, DbError};
use crate::model::payroll::PayrollRecord;
use crate::utils::db_utils::SqlParam;

const SELECT_PAYROLL: &str = r#"
    SELECT id, employee_id, period_start, period_end,
           base_salary, bonus, deductions, net_salary,
           payment_status, payment_date
    FROM payrolls
"#;

#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Every record, ordered by id.
    async fn list_all(&self) -> Result<Vec<PayrollRecord>, DbError>;

    /// Records whose period overlaps `[start, end]`. The caller guarantees
    /// `start <= end`.
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PayrollRecord>, DbError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<PayrollRecord>, DbError>;
}

#[derive(Clone)]
pub struct MySqlPayrollStore {
    db: DataAccess,
}

impl MySqlPayrollStore {
    pub fn new(db: DataAccess) -> Self {
        Self { db }
    }

    async fn fetch(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<PayrollRecord>, DbError> {
        let rows = self.db.execute_query(sql, params).await?;

        Ok(keep_decoded(rows.iter().map(PayrollRecord::from_row)))
    }
}

/// Drops rows that fail to decode (e.g. an unknown payment status) so one bad
/// row does not fail the whole listing.
fn keep_decoded<E: std::fmt::Display>(
    rows: impl Iterator<Item = Result<PayrollRecord, E>>,
) -> Vec<PayrollRecord> {
    rows.enumerate()
        .filter_map(|(index, row)| match row {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, index, "Skipping undecodable payroll row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PayrollStore for MySqlPayrollStore {
    async fn list_all(&self) -> Result<Vec<PayrollRecord>, DbError> {
        let sql = format!("{SELECT_PAYROLL} ORDER BY id");
        self.fetch(&sql, &[]).await
    }

    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PayrollRecord>, DbError> {
        let sql = format!("{SELECT_PAYROLL} WHERE period_start <= ? AND period_end >= ? ORDER BY id");
        self.fetch(
            &sql,
            &[SqlParam::new("end", end), SqlParam::new("start", start)],
        )
        .await
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<PayrollRecord>, DbError> {
        let sql = format!("{SELECT_PAYROLL} WHERE id = ?");
        let mut records = self.fetch(&sql, &[SqlParam::new("id", id)]).await?;
        Ok(records.pop())
    }
}
