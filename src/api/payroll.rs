use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::model::payroll::{PaymentStatus, PayrollRecord};
use crate::service::payroll::PayrollStore;

#[derive(Deserialize, IntoParams)]
pub struct PayrollFilter {
    /// Payment status: Paid, Pending or Rejected (case-insensitive)
    pub status: Option<String>,
    /// Start of the period, `YYYY-MM-DD`
    #[param(value_type = Option<String>)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub from: Option<NaiveDate>,
    /// End of the period, `YYYY-MM-DD`
    #[param(value_type = Option<String>)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Start of the period, `YYYY-MM-DD`
    #[param(value_type = Option<String>)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub from: Option<NaiveDate>,
    /// End of the period, `YYYY-MM-DD`
    #[param(value_type = Option<String>)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub to: Option<NaiveDate>,
}

/// `from=` and `to=` with no value mean the bound was not given.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date {raw:?}: {e}"))),
        None => Ok(None),
    }
}

/// Returns the range to query when both ends are given. A single bound is
/// ignored.
fn validate_period(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Option<(NaiveDate, NaiveDate)>, ApiError> {
    match (from, to) {
        (Some(from), Some(to)) if to < from => Err(ApiError::Validation(
            "End date cannot be before start date".to_string(),
        )),
        (Some(from), Some(to)) => Ok(Some((from, to))),
        _ => Ok(None),
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<PaymentStatus>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(|_| {
            ApiError::Validation(format!(
                "Payment status must be one of: {}",
                PaymentStatus::allowed()
            ))
        }),
        None => Ok(None),
    }
}

/// Fetches, filters by status and sorts newest period first. Inputs must
/// already be validated.
async fn filtered_payrolls(
    store: &dyn PayrollStore,
    period: Option<(NaiveDate, NaiveDate)>,
    status: Option<PaymentStatus>,
) -> Result<Vec<PayrollRecord>, ApiError> {
    let mut payrolls = match period {
        Some((from, to)) => store.list_by_date_range(from, to).await?,
        None => store.list_all().await?,
    };

    if let Some(status) = status {
        payrolls.retain(|p| p.payment_status == status);
    }

    payrolls.sort_by(|a, b| b.period_start.cmp(&a.period_start));
    Ok(payrolls)
}

async fn list_with_status(
    store: &dyn PayrollStore,
    query: &PeriodQuery,
    status: PaymentStatus,
) -> Result<HttpResponse, ApiError> {
    let period = validate_period(query.from, query.to)?;
    let payrolls = filtered_payrolls(store, period, Some(status)).await?;

    Ok(HttpResponse::Ok().json(payrolls))
}

#[utoipa::path(
    get,
    path = "/api/payrolls",
    params(PayrollFilter),
    responses(
        (status = 200, description = "Payrolls, newest period first", body = [PayrollRecord]),
        (status = 400, description = "Invalid status or date range", body = Object, example = json!({
            "message": "End date cannot be before start date"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    store: web::Data<dyn PayrollStore>,
    query: web::Query<PayrollFilter>,
) -> Result<HttpResponse, ApiError> {
    let period = validate_period(query.from, query.to)?;
    let status = parse_status(query.status.as_deref())?;

    let payrolls = filtered_payrolls(store.get_ref(), period, status).await?;

    Ok(HttpResponse::Ok().json(payrolls))
}

#[utoipa::path(
    get,
    path = "/api/payrolls/paid",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Paid payrolls, newest period first", body = [PayrollRecord]),
        (status = 400, description = "Invalid date range")
    ),
    tag = "Payroll"
)]
pub async fn list_paid(
    store: web::Data<dyn PayrollStore>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    list_with_status(store.get_ref(), &query, PaymentStatus::Paid).await
}

#[utoipa::path(
    get,
    path = "/api/payrolls/pending",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Pending payrolls, newest period first", body = [PayrollRecord]),
        (status = 400, description = "Invalid date range")
    ),
    tag = "Payroll"
)]
pub async fn list_pending(
    store: web::Data<dyn PayrollStore>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    list_with_status(store.get_ref(), &query, PaymentStatus::Pending).await
}

#[utoipa::path(
    get,
    path = "/api/payrolls/rejected",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Rejected payrolls, newest period first", body = [PayrollRecord]),
        (status = 400, description = "Invalid date range")
    ),
    tag = "Payroll"
)]
pub async fn list_rejected(
    store: web::Data<dyn PayrollStore>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    list_with_status(store.get_ref(), &query, PaymentStatus::Rejected).await
}

#[utoipa::path(
    get,
    path = "/api/payrolls/{payroll_id}",
    params(
        ("payroll_id" = i64, Path, description = "Payroll ID, a positive integer")
    ),
    responses(
        (status = 200, body = PayrollRecord),
        (status = 400, description = "Invalid payroll ID"),
        (status = 404, description = "Payroll not found", body = Object, example = json!({
            "message": "Payroll not found"
        }))
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    store: web::Data<dyn PayrollStore>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();
    if payroll_id <= 0 {
        return Err(ApiError::Validation(
            "Payroll ID must be a positive integer".to_string(),
        ));
    }

    match store.find_by_id(payroll_id as u64).await? {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Err(ApiError::NotFound("Payroll not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use crate::service::payroll::memory::MemoryPayrollStore;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web::Data};
    use std::sync::Arc;

    macro_rules! test_app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(Data::from($store.clone() as Arc<dyn PayrollStore>))
                    .service(web::scope("/api").configure(routes::api_routes)),
            )
            .await
        };
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: u64, start: NaiveDate, end: NaiveDate, status: PaymentStatus) -> PayrollRecord {
        PayrollRecord {
            id,
            employee_id: 1000 + id,
            period_start: start,
            period_end: end,
            base_salary: 1000.0,
            bonus: 0.0,
            deductions: 0.0,
            net_salary: 1000.0,
            payment_status: status,
            payment_date: None,
        }
    }

    /// The two records from the worked example.
    fn example_store() -> Arc<MemoryPayrollStore> {
        Arc::new(MemoryPayrollStore::new(vec![
            record(1, date(2024, 1, 1), date(2024, 1, 15), PaymentStatus::Paid),
            record(2, date(2024, 2, 1), date(2024, 2, 15), PaymentStatus::Pending),
        ]))
    }

    fn larger_store() -> Arc<MemoryPayrollStore> {
        Arc::new(MemoryPayrollStore::new(vec![
            record(1, date(2024, 1, 1), date(2024, 1, 15), PaymentStatus::Paid),
            record(2, date(2024, 2, 1), date(2024, 2, 15), PaymentStatus::Pending),
            record(3, date(2023, 12, 1), date(2023, 12, 15), PaymentStatus::Rejected),
            record(4, date(2024, 1, 16), date(2024, 1, 31), PaymentStatus::Paid),
            record(5, date(2024, 3, 1), date(2024, 3, 15), PaymentStatus::Rejected),
        ]))
    }

    fn ids(records: &[PayrollRecord]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[actix_web::test]
    async fn status_filter_returns_matching_records() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/api/payrolls?status=paid").to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ids(&body), vec![1]);
    }

    #[actix_web::test]
    async fn date_range_returns_overlapping_records() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?from=2024-01-01&to=2024-01-31")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ids(&body), vec![1]);
    }

    #[actix_web::test]
    async fn end_before_start_is_rejected_without_querying() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?from=2024-02-01&to=2024-01-01")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "End date cannot be before start date");
        assert_eq!(store.calls(), 0);
    }

    #[actix_web::test]
    async fn unknown_status_is_rejected_without_querying() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?status=approved")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body["message"],
            "Payment status must be one of: Paid, Pending, Rejected"
        );
        assert_eq!(store.calls(), 0);
    }

    #[actix_web::test]
    async fn malformed_date_is_a_json_bad_request() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?from=yesterday&to=2024-01-01")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());
        assert_eq!(store.calls(), 0);
    }

    #[actix_web::test]
    async fn empty_status_means_no_filter() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/api/payrolls?status=").to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ids(&body), vec![2, 1]);
    }

    #[actix_web::test]
    async fn blank_dates_mean_no_range() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?status=&from=&to=")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ids(&body), vec![2, 1]);

        let req = test::TestRequest::get()
            .uri("/api/payrolls/paid?from=&to=")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ids(&body), vec![1]);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?from=2024-01-01&to=")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ids(&body), vec![2, 1]);
    }

    #[actix_web::test]
    async fn list_is_sorted_by_period_start_descending() {
        let store = larger_store();
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/api/payrolls").to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ids(&body), vec![5, 2, 4, 1, 3]);
        assert!(body.windows(2).all(|w| w[0].period_start >= w[1].period_start));
    }

    #[actix_web::test]
    async fn single_bound_falls_back_to_full_list() {
        let store = larger_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?from=2024-03-01")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.len(), 5);
    }

    #[actix_web::test]
    async fn status_and_range_combine() {
        let store = larger_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?status=PAID&from=2024-01-10&to=2024-02-28")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ids(&body), vec![4, 1]);
        assert!(body.iter().all(|r| r.payment_status == PaymentStatus::Paid));
    }

    #[actix_web::test]
    async fn spanish_status_label_is_accepted() {
        let store = larger_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls?status=rechazado")
            .to_request();
        let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ids(&body), vec![5, 3]);
    }

    #[actix_web::test]
    async fn repeated_requests_return_the_same_order() {
        let store = larger_store();
        let app = test_app!(store);

        let first: Vec<PayrollRecord> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/payrolls").to_request(),
        )
        .await;
        let second: Vec<PayrollRecord> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/payrolls").to_request(),
        )
        .await;

        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn status_endpoints_fix_the_status() {
        let store = larger_store();
        let app = test_app!(store);

        for (uri, expected) in [
            ("/api/payrolls/paid", vec![4, 1]),
            ("/api/payrolls/pending", vec![2]),
            ("/api/payrolls/rejected", vec![5, 3]),
            ("/api/payrolls/rejected?from=2024-01-01&to=2024-12-31", vec![5]),
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Vec<PayrollRecord> = test::call_and_read_body_json(&app, req).await;
            assert_eq!(ids(&body), expected, "{uri}");
        }
    }

    #[actix_web::test]
    async fn status_endpoint_validates_range() {
        let store = larger_store();
        let app = test_app!(store);

        let req = test::TestRequest::get()
            .uri("/api/payrolls/pending?from=2024-05-01&to=2024-04-01")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.calls(), 0);
    }

    #[actix_web::test]
    async fn get_existing_payroll() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/api/payrolls/2").to_request();
        let body: PayrollRecord = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.id, 2);
        assert_eq!(body.payment_status, PaymentStatus::Pending);
    }

    #[actix_web::test]
    async fn get_missing_payroll_is_not_found() {
        let store = example_store();
        let app = test_app!(store);

        let req = test::TestRequest::get().uri("/api/payrolls/42").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Payroll not found");
    }

    #[actix_web::test]
    async fn non_positive_or_malformed_id_is_a_bad_request() {
        let store = example_store();
        let app = test_app!(store);

        for uri in ["/api/payrolls/0", "/api/payrolls/-3", "/api/payrolls/abc"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        assert_eq!(store.calls(), 0);
    }
}
