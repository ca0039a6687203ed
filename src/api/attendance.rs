use crate::{
    attendance::{
        build_recap, build_report,
        classify::Policy,
        recap::{RecapGrouping, RecapQuery, RecapTotals},
        spreadsheet::{self, CsvError},
    },
    model::attendance::{DayRecord, EmployeeRecap, RawPunch},
    store::PunchStore,
};
use actix_web::{
    HttpResponse, Responder,
    error::ErrorInternalServerError,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct RecapResponse {
    pub data: Vec<EmployeeRecap>,
    pub totals: RecapTotals,
}

async fn load_punches(store: &dyn PunchStore) -> actix_web::Result<Vec<RawPunch>> {
    store.load_all().await.map_err(|e| {
        error!(error = %e, "Failed to load attendance punches");
        ErrorInternalServerError("Internal Server Error")
    })
}

async fn store_punches(store: &dyn PunchStore, punches: &[RawPunch]) -> actix_web::Result<HttpResponse> {
    if punches.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No attendance rows found"
        })));
    }

    if let Some(row) = punches.iter().position(|p| !p.is_identified()) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("Row {} is missing id or date", row + 1)
        })));
    }

    let count = store.append(punches).await.map_err(|e| {
        error!(error = %e, rows = punches.len(), "Failed to import attendance punches");
        ErrorInternalServerError("Internal Server Error")
    })?;

    info!(count, "Attendance punches imported");
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": count
    })))
}

fn csv_download(kind: &str, body: Result<Vec<u8>, CsvError>) -> actix_web::Result<HttpResponse> {
    let body = body.map_err(|e| {
        error!(error = %e, kind, "Failed to write CSV export");
        ErrorInternalServerError("Internal Server Error")
    })?;
    let file_name = spreadsheet::export_file_name(kind, chrono::Local::now().date_naive());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(body))
}

/* =========================
Raw punch feed
========================= */
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Stored punches in import order", body = [RawPunch]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_punches(store: web::Data<dyn PunchStore>) -> actix_web::Result<impl Responder> {
    let punches = load_punches(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(punches))
}

#[utoipa::path(
    post,
    path = "/api/attendance/import",
    request_body(
        content = [RawPunch],
        description = "Punches exported from the attendance terminal",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Punches imported", body = Object, example = json!({
            "success": true,
            "count": 2
        })),
        (status = 400, description = "Invalid data format, no rows, or a row without id/date", body = Object, example = json!({
            "message": "Invalid data format"
        })),
        (status = 413, description = "Body larger than the configured import limit"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn import_punches(
    store: web::Data<dyn PunchStore>,
    payload: web::Json<Vec<RawPunch>>,
) -> actix_web::Result<impl Responder> {
    store_punches(store.get_ref(), &payload).await
}

#[utoipa::path(
    post,
    path = "/api/attendance/import/csv",
    request_body(
        content = String,
        description = "CSV export with the terminal's column headers",
        content_type = "text/csv"
    ),
    responses(
        (status = 200, description = "Punches imported", body = Object, example = json!({
            "success": true,
            "count": 2
        })),
        (status = 400, description = "Malformed or empty CSV, or a row without id/date", body = Object, example = json!({
            "message": "no attendance rows found"
        })),
        (status = 413, description = "Body larger than the configured import limit"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn import_csv(
    store: web::Data<dyn PunchStore>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    let punches = match spreadsheet::read_punches(&body) {
        Ok(punches) => punches,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": e.to_string()
            })));
        }
    };

    store_punches(store.get_ref(), &punches).await
}

/* =========================
Day report
========================= */
#[utoipa::path(
    get,
    path = "/api/attendance/report",
    responses(
        (status = 200, description = "One row per employee per day", body = [DayRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn report(
    store: web::Data<dyn PunchStore>,
    policy: web::Data<Policy>,
) -> actix_web::Result<impl Responder> {
    let punches = load_punches(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(build_report(&punches, &policy)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/report/export",
    responses(
        (status = 200, description = "Day report as a CSV download", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn export_report(
    store: web::Data<dyn PunchStore>,
    policy: web::Data<Policy>,
) -> actix_web::Result<impl Responder> {
    let punches = load_punches(store.get_ref()).await?;
    csv_download("report", spreadsheet::write_report(&build_report(&punches, &policy)))
}

/* =========================
Employee recap
========================= */
async fn recap_rows(
    store: &dyn PunchStore,
    policy: &Policy,
    grouping: RecapGrouping,
) -> actix_web::Result<Vec<EmployeeRecap>> {
    let punches = load_punches(store).await?;
    Ok(build_recap(&punches, policy, grouping))
}

#[utoipa::path(
    get,
    path = "/api/attendance/recap",
    params(RecapQuery),
    responses(
        (status = 200, description = "One row per employee with totals", body = RecapResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn recap(
    store: web::Data<dyn PunchStore>,
    policy: web::Data<Policy>,
    query: web::Query<RecapQuery>,
) -> actix_web::Result<impl Responder> {
    let data = recap_rows(store.get_ref(), &policy, query.group_by.unwrap_or_default()).await?;
    let totals = RecapTotals::from_recap(&data);
    Ok(HttpResponse::Ok().json(RecapResponse { data, totals }))
}

#[utoipa::path(
    get,
    path = "/api/attendance/recap/export",
    params(RecapQuery),
    responses(
        (status = 200, description = "Recap as a CSV download", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn export_recap(
    store: web::Data<dyn PunchStore>,
    policy: web::Data<Policy>,
    query: web::Query<RecapQuery>,
) -> actix_web::Result<impl Responder> {
    let data = recap_rows(store.get_ref(), &policy, query.group_by.unwrap_or_default()).await?;
    csv_download("recap", spreadsheet::write_recap(&data))
}
