use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    HttpResponse,
    error::{InternalError, JsonPayloadError},
    web,
};
use serde_json::json;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let cfg = GovernorConfigBuilder::default()
            .milliseconds_per_request(replenish_period_ms(requests_per_min))
            .burst_size(requests_per_min.max(1))
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("limiter period and burst are non-zero");
        Governor::new(&cfg)
    }

    let import_limiter = Arc::new(build_limiter(config.rate_import_per_min));
    let report_limiter = build_limiter(config.rate_report_per_min);

    let import_max_bytes = config.import_max_bytes;

    // Anything that is not a JSON array of punches
    let json_config = web::JsonConfig::default()
        .limit(import_max_bytes)
        .error_handler(move |err, _req| {
            tracing::debug!(error = %err, "Rejected attendance import payload");
            let response = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    HttpResponse::PayloadTooLarge().json(json!({
                        "message": format!("Import is larger than {import_max_bytes} bytes")
                    }))
                }
                _ => HttpResponse::BadRequest().json(json!({ "message": "Invalid data format" })),
            };
            InternalError::from_response(err, response).into()
        });

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(report_limiter)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_punches)))
                    // /attendance/import
                    .service(
                        web::resource("/import")
                            .wrap(import_limiter.clone())
                            .app_data(json_config)
                            .route(web::post().to(attendance::import_punches)),
                    )
                    // /attendance/import/csv
                    .service(
                        web::resource("/import/csv")
                            .wrap(import_limiter)
                            .app_data(web::PayloadConfig::new(import_max_bytes))
                            .route(web::post().to(attendance::import_csv)),
                    )
                    // /attendance/report
                    .service(web::resource("/report").route(web::get().to(attendance::report)))
                    .service(
                        web::resource("/report/export")
                            .route(web::get().to(attendance::export_report)),
                    )
                    // /attendance/recap
                    .service(web::resource("/recap").route(web::get().to(attendance::recap)))
                    .service(
                        web::resource("/recap/export")
                            .route(web::get().to(attendance::export_recap)),
                    ),
            ),
    );
}

// Governor refills one request per period; a period of 0 ms is rejected.
fn replenish_period_ms(requests_per_min: u32) -> u64 {
    (60_000 / u64::from(requests_per_min.max(1))).max(1)
}

// IMPORT
//  ├─ POST /attendance/import      (JSON array)
//  └─ POST /attendance/import/csv  (terminal CSV export)

// REPORT
//  ├─ GET /attendance/report       one row per employee-day
//  └─ GET /attendance/recap        one row per employee (+ totals)

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replenish_period_spreads_a_minute() {
        assert_eq!(replenish_period_ms(30), 2_000);
        assert_eq!(replenish_period_ms(1_000), 60);
        assert_eq!(replenish_period_ms(0), 60_000);
    }

    #[test]
    fn replenish_period_never_reaches_zero() {
        assert_eq!(replenish_period_ms(60_000), 1);
        assert_eq!(replenish_period_ms(120_000), 1);
        assert_eq!(replenish_period_ms(u32::MAX), 1);
    }
}
