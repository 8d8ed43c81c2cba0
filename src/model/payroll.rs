use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};
use utoipa::ToSchema;

/// Payment state of a payroll. Parsing ignores ASCII case and also accepts the
/// Spanish labels used by older data (`Pagado`, `Pendiente`, `Rechazado`).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, EnumIter, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum PaymentStatus {
    #[strum(serialize = "Paid", serialize = "Pagado")]
    Paid,
    #[strum(serialize = "Pending", serialize = "Pendiente")]
    Pending,
    #[strum(serialize = "Rejected", serialize = "Rechazado")]
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Rejected => "Rejected",
        }
    }

    /// Canonical names, for error messages.
    pub fn allowed() -> String {
        PaymentStatus::iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.trim().parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1001,
        "period_start": "2024-01-01",
        "period_end": "2024-01-15",
        "base_salary": 50000.0,
        "bonus": 5000.0,
        "deductions": 2000.0,
        "net_salary": 53000.0,
        "payment_status": "Paid",
        "payment_date": "2024-01-16"
    })
)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub period_start: NaiveDate,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub period_end: NaiveDate,

    pub base_salary: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub net_salary: f64,

    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,

    #[schema(example = "2024-01-16", value_type = Option<String>, format = "date", nullable = true)]
    pub payment_date: Option<NaiveDate>,
}
