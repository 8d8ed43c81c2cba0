use crate::{
    api::{diagnostics, health, payroll},
    config::Config,
    error::ApiError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build the per-peer limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_api_per_min)) // rate limiting
            .configure(api_routes),
    );
}

/// Routes below the API prefix. Extractor failures answer with the same JSON
/// 400 body as handler validation.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid query parameters: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid path parameter: {err}")).into()
    }))
    .service(web::resource("/health").route(web::get().to(health::health)))
    .service(
        web::scope("/diagnostics")
            .service(
                web::resource("/connection").route(web::get().to(diagnostics::check_connection)),
            )
            .service(
                web::resource("/simple-query").route(web::get().to(diagnostics::simple_query)),
            ),
    )
    .service(
        web::scope("/payrolls")
            // /payrolls
            .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
            // status shortcuts, registered before /{id}
            .service(web::resource("/paid").route(web::get().to(payroll::list_paid)))
            .service(web::resource("/pending").route(web::get().to(payroll::list_pending)))
            .service(web::resource("/rejected").route(web::get().to(payroll::list_rejected)))
            // /payrolls/{id}
            .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll))),
    );
}
