use crate::model::payroll::{PaymentStatus, PayrollRecord};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll API",
        version = "1.0.0",
        description = r#"
## Payroll records (nóminas)

Read-only access to payroll disbursements.

### 🔹 Key Features
- **Listing** newest period first
- **Filtering** by payment status (`Paid`, `Pending`, `Rejected`, case-insensitive) and period range
- **Lookup** of a single payroll by ID
- **Health and diagnostics** for the API and its database

### 📦 Response Format
- JSON responses
- Errors are `{"message": "..."}` with a 4xx/5xx status

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::payroll::list_payrolls,
        crate::api::payroll::list_paid,
        crate::api::payroll::list_pending,
        crate::api::payroll::list_rejected,
        crate::api::payroll::get_payroll,

        crate::api::health::health,

        crate::api::diagnostics::check_connection,
        crate::api::diagnostics::simple_query
    ),
    components(
        schemas(
            PayrollRecord,
            PaymentStatus
        )
    ),
    tags(
        (name = "Payroll", description = "Payroll query APIs"),
        (name = "Health", description = "Liveness probe"),
        (name = "Diagnostics", description = "Database connectivity checks"),
    )
)]
pub struct ApiDoc;
